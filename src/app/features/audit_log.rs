use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::app::{
    db::{self, audit_events::AuditEvent},
    domain::Action,
    error::AppError,
    tenant::TenantContext,
    AppState,
};

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 500;

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<i64>,
}

/// GET /app/audit?limit= — Recent activity in the organization (managers).
pub async fn list(
    ctx: TenantContext,
    State(state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<Vec<AuditEvent>>, AppError> {
    ctx.authorize(Action::ManageMembers)?;
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    Ok(Json(db::audit_events::list_recent(ctx.scope(), &state.db, limit).await?))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/app/audit", get(list))
}
