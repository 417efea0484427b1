use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Deserialize;

use crate::app::{
    audit,
    db::{
        self,
        suppliers::{Supplier, SupplierFields},
    },
    domain::{validation_helpers, Action, Email, SupplierCategory},
    error::AppError,
    tenant::TenantContext,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct SupplierRequest {
    pub name: String,
    pub category: SupplierCategory,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

impl SupplierRequest {
    fn into_fields(self) -> Result<SupplierFields, AppError> {
        let name = validation_helpers::required_text(&self.name, "name", 120).map_err(AppError::validation)?;
        let email = match validation_helpers::optional_text(self.email.as_deref(), "email", 254)
            .map_err(AppError::validation)?
        {
            Some(raw) => Some(Email::new(raw).map_err(AppError::validation)?.as_str().to_string()),
            None => None,
        };
        let phone = validation_helpers::optional_text(self.phone.as_deref(), "phone", 40)
            .map_err(AppError::validation)?;
        Ok(SupplierFields {
            name,
            category: self.category,
            email,
            phone,
        })
    }
}

/// GET /app/suppliers
pub async fn list(
    ctx: TenantContext,
    State(state): State<AppState>,
) -> Result<Json<Vec<Supplier>>, AppError> {
    ctx.authorize(Action::ViewOrganization)?;
    Ok(Json(db::suppliers::list(ctx.scope(), &state.db).await?))
}

/// POST /app/suppliers
pub async fn create(
    ctx: TenantContext,
    State(state): State<AppState>,
    Json(body): Json<SupplierRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.authorize(Action::ManageSuppliers)?;
    let fields = body.into_fields()?;

    let id = db::new_id();
    db::suppliers::insert(ctx.scope(), &state.db, &id, &fields).await?;
    audit::record(&state.db, &ctx, "supplier.created", "supplier", id.clone());
    tracing::info!(
        organization_id = %ctx.scope().organization_id(),
        supplier_id = %id,
        category = fields.category.label(),
        "supplier added"
    );

    let created = db::suppliers::find_by_id(ctx.scope(), &state.db, &id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /app/suppliers/:id
pub async fn show(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Supplier>, AppError> {
    ctx.authorize(Action::ViewOrganization)?;
    db::suppliers::find_by_id(ctx.scope(), &state.db, &id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// PATCH /app/suppliers/:id
pub async fn update(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<SupplierRequest>,
) -> Result<Json<Supplier>, AppError> {
    ctx.authorize(Action::ManageSuppliers)?;
    let fields = body.into_fields()?;

    if !db::suppliers::update(ctx.scope(), &state.db, &id, &fields).await? {
        return Err(AppError::NotFound);
    }
    audit::record(&state.db, &ctx, "supplier.updated", "supplier", id.clone());

    db::suppliers::find_by_id(ctx.scope(), &state.db, &id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// DELETE /app/suppliers/:id — Maintenance records keep their history with
/// the supplier link cleared.
pub async fn destroy(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    ctx.authorize(Action::ManageSuppliers)?;

    if !db::suppliers::delete(ctx.scope(), &state.db, &id).await? {
        return Err(AppError::NotFound);
    }
    audit::record(&state.db, &ctx, "supplier.deleted", "supplier", id);
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/app/suppliers", get(list).post(create))
        .route("/app/suppliers/:id", get(show).patch(update).delete(destroy))
}
