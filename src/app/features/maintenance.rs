use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;

use crate::app::{
    audit,
    db::{
        self,
        maintenance::{MaintenanceRecord, NewMaintenanceRecord},
    },
    domain::{validation_helpers, Action},
    error::AppError,
    tenant::TenantContext,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct MaintenanceFilter {
    pub supplier_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateMaintenanceRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub performed_on: String,
    #[serde(default)]
    pub cost_cents: Option<i64>,
    #[serde(default)]
    pub supplier_id: Option<String>,
}

/// GET /app/maintenance?supplier_id=
pub async fn list(
    ctx: TenantContext,
    State(state): State<AppState>,
    Query(filter): Query<MaintenanceFilter>,
) -> Result<Json<Vec<MaintenanceRecord>>, AppError> {
    ctx.authorize(Action::ViewOrganization)?;
    let records = db::maintenance::list(ctx.scope(), &state.db, filter.supplier_id.as_deref()).await?;
    Ok(Json(records))
}

/// POST /app/maintenance — A referenced supplier must belong to the same
/// organization.
pub async fn create(
    ctx: TenantContext,
    State(state): State<AppState>,
    Json(body): Json<CreateMaintenanceRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.authorize(Action::ManageMaintenance)?;

    let title = validation_helpers::required_text(&body.title, "title", 200).map_err(AppError::validation)?;
    let description = validation_helpers::optional_text(body.description.as_deref(), "description", 5000)
        .map_err(AppError::validation)?
        .unwrap_or_default();
    let performed_on = validation_helpers::iso_date(&body.performed_on).map_err(AppError::validation)?;
    if body.cost_cents.is_some_and(|c| c < 0) {
        return Err(AppError::Validation("cost must not be negative".to_string()));
    }

    let supplier_id = match body.supplier_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => Some(
            db::suppliers::find_by_id(ctx.scope(), &state.db, id)
                .await?
                .ok_or(AppError::NotFound)?
                .id,
        ),
        None => None,
    };

    let record = NewMaintenanceRecord {
        id: db::new_id(),
        supplier_id,
        title,
        description,
        performed_on,
        cost_cents: body.cost_cents,
    };
    db::maintenance::insert(ctx.scope(), &state.db, &record).await?;
    audit::record(&state.db, &ctx, "maintenance.created", "maintenance_record", record.id.clone());

    let created = db::maintenance::find_by_id(ctx.scope(), &state.db, &record.id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// DELETE /app/maintenance/:id
pub async fn destroy(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    ctx.authorize(Action::ManageMaintenance)?;

    if !db::maintenance::delete(ctx.scope(), &state.db, &id).await? {
        return Err(AppError::NotFound);
    }
    audit::record(&state.db, &ctx, "maintenance.deleted", "maintenance_record", id);
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/app/maintenance", get(list).post(create))
        .route("/app/maintenance/:id", delete(destroy))
}
