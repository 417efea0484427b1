use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::app::{
    db::{self, organizations::Organization},
    domain::{Action, OrganizationRole},
    error::AppError,
    session::SessionUser,
    tenant::TenantContext,
    AppState,
};

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub user: SessionUser,
    pub organization: Organization,
    pub role: OrganizationRole,
    pub fraction_count: usize,
    pub open_ticket_count: i64,
}

/// GET /app — Active organization overview.
pub async fn show(
    ctx: TenantContext,
    State(state): State<AppState>,
) -> Result<Json<DashboardView>, AppError> {
    ctx.authorize(Action::ViewOrganization)?;

    let organization = db::organizations::find_scoped(ctx.scope(), &state.db)
        .await?
        .ok_or(AppError::NotFound)?;
    let fraction_count = db::fractions::list(ctx.scope(), &state.db).await?.len();
    let open_ticket_count = db::tickets::count_active(ctx.scope(), &state.db).await?;

    Ok(Json(DashboardView {
        user: ctx.user().clone(),
        organization,
        role: ctx.role(),
        fraction_count,
        open_ticket_count,
    }))
}

/// Dashboard routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/app", get(show))
}
