use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;

use crate::app::{
    audit,
    db::{
        self,
        tickets::{NewTicket, Ticket},
    },
    domain::{validation_helpers, Action, TicketPriority, TicketStatus},
    error::AppError,
    tenant::TenantContext,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct TicketFilter {
    pub status: Option<TicketStatus>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: TicketPriority,
    #[serde(default)]
    pub fraction_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: TicketStatus,
}

/// GET /app/tickets?status=
pub async fn list(
    ctx: TenantContext,
    State(state): State<AppState>,
    Query(filter): Query<TicketFilter>,
) -> Result<Json<Vec<Ticket>>, AppError> {
    ctx.authorize(Action::ViewOrganization)?;
    Ok(Json(db::tickets::list(ctx.scope(), &state.db, filter.status).await?))
}

/// POST /app/tickets — Any member may open a ticket. A referenced fraction
/// must belong to the same organization.
pub async fn create(
    ctx: TenantContext,
    State(state): State<AppState>,
    Json(body): Json<CreateTicketRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.authorize(Action::CreateTicket)?;

    let title = validation_helpers::required_text(&body.title, "title", 200).map_err(AppError::validation)?;
    let description = validation_helpers::optional_text(body.description.as_deref(), "description", 5000)
        .map_err(AppError::validation)?
        .unwrap_or_default();

    let fraction_id = match body.fraction_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => Some(
            db::fractions::find_by_id(ctx.scope(), &state.db, id)
                .await?
                .ok_or(AppError::NotFound)?
                .id,
        ),
        None => None,
    };

    let ticket = NewTicket {
        id: db::new_id(),
        fraction_id,
        created_by: ctx.user_id().clone(),
        title,
        description,
        priority: body.priority,
    };
    db::tickets::insert(ctx.scope(), &state.db, &ticket).await?;
    audit::record(&state.db, &ctx, "ticket.created", "ticket", ticket.id.clone());

    let created = db::tickets::find_by_id(ctx.scope(), &state.db, &ticket.id)
        .await?
        .ok_or(AppError::Internal)?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /app/tickets/:id
pub async fn show(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Ticket>, AppError> {
    ctx.authorize(Action::ViewOrganization)?;
    db::tickets::find_by_id(ctx.scope(), &state.db, &id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// PATCH /app/tickets/:id/status
pub async fn update_status(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<StatusRequest>,
) -> Result<Json<Ticket>, AppError> {
    ctx.authorize(Action::ManageTickets)?;

    if !db::tickets::update_status(ctx.scope(), &state.db, &id, body.status).await? {
        return Err(AppError::NotFound);
    }
    audit::record(&state.db, &ctx, "ticket.status_changed", "ticket", id.clone());

    db::tickets::find_by_id(ctx.scope(), &state.db, &id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// DELETE /app/tickets/:id
pub async fn destroy(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    ctx.authorize(Action::DeleteTicket)?;

    if !db::tickets::delete(ctx.scope(), &state.db, &id).await? {
        return Err(AppError::NotFound);
    }
    audit::record(&state.db, &ctx, "ticket.deleted", "ticket", id);
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/app/tickets", get(list).post(create))
        .route("/app/tickets/:id", get(show).delete(destroy))
        .route("/app/tickets/:id/status", patch(update_status))
}
