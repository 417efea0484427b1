//! Document metadata. File bytes live with an external storage provider under
//! `storage_key`.

use axum::{
    extract::{Path, Query, State},
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
        documents::{Document, NewDocument},
    },
    domain::{validation_helpers, Action, DocumentCategory},
    error::AppError,
    tenant::{OrgScope, TenantContext},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct DocumentFilter {
    pub category: Option<DocumentCategory>,
}

#[derive(Debug, Deserialize)]
pub struct CreateDocumentRequest {
    pub title: String,
    pub category: DocumentCategory,
    pub file_name: String,
}

/// Last path segment of a client file name, restricted to a safe charset.
fn safe_file_name(file_name: &str) -> String {
    file_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(file_name)
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect()
}

/// Storage key under the organization's prefix.
fn storage_key(scope: &OrgScope, document_id: &str, file_name: &str) -> String {
    format!(
        "organizations/{}/documents/{}/{}",
        scope.as_str(),
        document_id,
        safe_file_name(file_name)
    )
}

/// GET /app/documents?category=
pub async fn list(
    ctx: TenantContext,
    State(state): State<AppState>,
    Query(filter): Query<DocumentFilter>,
) -> Result<Json<Vec<Document>>, AppError> {
    ctx.authorize(Action::ViewOrganization)?;
    Ok(Json(db::documents::list(ctx.scope(), &state.db, filter.category).await?))
}

/// POST /app/documents
pub async fn create(
    ctx: TenantContext,
    State(state): State<AppState>,
    Json(body): Json<CreateDocumentRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.authorize(Action::ManageDocuments)?;

    let title = validation_helpers::required_text(&body.title, "title", 200).map_err(AppError::validation)?;
    let file_name =
        validation_helpers::required_text(&body.file_name, "file name", 255).map_err(AppError::validation)?;

    let id = db::new_id();
    let document = NewDocument {
        storage_key: storage_key(ctx.scope(), &id, &file_name),
        id,
        title,
        category: body.category,
        uploaded_by: ctx.user_id().clone(),
    };
    db::documents::insert(ctx.scope(), &state.db, &document).await?;
    audit::record(&state.db, &ctx, "document.created", "document", document.id.clone());
    tracing::info!(
        organization_id = %ctx.scope().organization_id(),
        document_id = %document.id,
        category = document.category.label(),
        "document registered"
    );

    let created = db::documents::find_by_id(ctx.scope(), &state.db, &document.id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /app/documents/:id
pub async fn show(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, AppError> {
    ctx.authorize(Action::ViewOrganization)?;
    db::documents::find_by_id(ctx.scope(), &state.db, &id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// DELETE /app/documents/:id
pub async fn destroy(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    ctx.authorize(Action::ManageDocuments)?;

    if !db::documents::delete(ctx.scope(), &state.db, &id).await? {
        return Err(AppError::NotFound);
    }
    audit::record(&state.db, &ctx, "document.deleted", "document", id);
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/app/documents", get(list).post(create))
        .route("/app/documents/:id", get(show).delete(destroy))
}
