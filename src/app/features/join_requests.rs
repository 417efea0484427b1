//! Review of requests filed with the organization's join code.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};

use crate::app::{
    audit,
    db::{self, join_requests::JoinRequest},
    domain::{Action, JoinRequestStatus, OrganizationRole, UserId},
    error::AppError,
    tenant::TenantContext,
    AppState,
};

/// GET /app/join-requests — Pending requests, oldest first.
pub async fn list(
    ctx: TenantContext,
    State(state): State<AppState>,
) -> Result<Json<Vec<JoinRequest>>, AppError> {
    ctx.authorize(Action::ReviewJoinRequests)?;
    Ok(Json(db::join_requests::list_pending(ctx.scope(), &state.db).await?))
}

/// POST /app/join-requests/:id/approve — The requester becomes a member.
pub async fn approve(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<JoinRequest>>, AppError> {
    ctx.authorize(Action::ReviewJoinRequests)?;

    let request = db::join_requests::find_pending(ctx.scope(), &state.db, &id)
        .await?
        .ok_or(AppError::NotFound)?;
    let user_id = UserId::from_string(&request.user_id).map_err(|_| AppError::Internal)?;
    let organization_id = ctx.scope().organization_id();

    let mut tx = state.db.begin().await?;
    if !db::join_requests::decide(ctx.scope(), &mut *tx, &id, JoinRequestStatus::Approved).await? {
        return Err(AppError::NotFound);
    }
    if db::organizations::find_member_role(&mut *tx, organization_id, &user_id)
        .await?
        .is_none()
    {
        db::organizations::add_member(&mut *tx, organization_id, &user_id, OrganizationRole::Member).await?;
    }
    tx.commit().await?;

    audit::record(&state.db, &ctx, "join_request.approved", "join_request", id);
    tracing::info!(%organization_id, %user_id, "join request approved");
    Ok(Json(db::join_requests::list_pending(ctx.scope(), &state.db).await?))
}

/// POST /app/join-requests/:id/reject
pub async fn reject(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Vec<JoinRequest>>, AppError> {
    ctx.authorize(Action::ReviewJoinRequests)?;

    if !db::join_requests::decide(ctx.scope(), &state.db, &id, JoinRequestStatus::Rejected).await? {
        return Err(AppError::NotFound);
    }
    audit::record(&state.db, &ctx, "join_request.rejected", "join_request", id);
    Ok(Json(db::join_requests::list_pending(ctx.scope(), &state.db).await?))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/app/join-requests", get(list))
        .route("/app/join-requests/:id/approve", post(approve))
        .route("/app/join-requests/:id/reject", post(reject))
}
