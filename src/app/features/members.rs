//! Membership management inside the active organization.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, patch},
    Json, Router,
};
use serde::Deserialize;

use crate::app::{
    audit,
    db::{self, organizations::MemberWithUser},
    domain::{Action, OrganizationRole, UserId},
    error::AppError,
    tenant::TenantContext,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: OrganizationRole,
}

/// Role of a member of the caller's organization; 404 for anyone else.
async fn target_role(
    state: &AppState,
    ctx: &TenantContext,
    user_id: &str,
) -> Result<(UserId, OrganizationRole), AppError> {
    let user_id = UserId::from_string(user_id).map_err(|_| AppError::NotFound)?;
    let role = db::organizations::find_scoped_member_role(ctx.scope(), &state.db, &user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    Ok((user_id, role))
}

fn last_owner() -> AppError {
    AppError::Conflict("An organization needs at least one owner".to_string())
}

/// GET /app/members
pub async fn list(
    ctx: TenantContext,
    State(state): State<AppState>,
) -> Result<Json<Vec<MemberWithUser>>, AppError> {
    ctx.authorize(Action::ViewOrganization)?;
    Ok(Json(db::organizations::list_members(ctx.scope(), &state.db).await?))
}

/// PATCH /app/members/:user_id — Change a member's role. Granting or taking
/// away ownership is reserved to owners.
pub async fn update_role(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Json(body): Json<RoleRequest>,
) -> Result<Json<Vec<MemberWithUser>>, AppError> {
    ctx.authorize(Action::ManageMembers)?;
    let (user_id, current) = target_role(&state, &ctx, &user_id).await?;

    if current == OrganizationRole::Owner || body.role == OrganizationRole::Owner {
        ctx.authorize(Action::TransferOwnership)?;
    }

    if current != body.role {
        if current == OrganizationRole::Owner {
            if !db::organizations::demote_owner(ctx.scope(), &state.db, &user_id, body.role).await? {
                return Err(last_owner());
            }
        } else {
            db::organizations::update_member_role(ctx.scope(), &state.db, &user_id, body.role).await?;
        }
        audit::record(&state.db, &ctx, "member.role_changed", "user", user_id.as_str());
        tracing::info!(
            organization_id = %ctx.scope().organization_id(),
            %user_id,
            from = %current,
            to = %body.role,
            "member role changed"
        );
    }

    Ok(Json(db::organizations::list_members(ctx.scope(), &state.db).await?))
}

/// DELETE /app/members/:user_id — Remove a member with their fraction
/// associations. Their sessions pointing here lose the active organization.
pub async fn remove(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<StatusCode, AppError> {
    ctx.authorize(Action::ManageMembers)?;
    let (user_id, current) = target_role(&state, &ctx, &user_id).await?;

    if current == OrganizationRole::Owner {
        ctx.authorize(Action::TransferOwnership)?;
    }

    let mut tx = state.db.begin().await?;
    if current == OrganizationRole::Owner {
        if !db::organizations::remove_owner(ctx.scope(), &mut *tx, &user_id).await? {
            return Err(last_owner());
        }
    } else {
        db::organizations::remove_member(ctx.scope(), &mut *tx, &user_id).await?;
    }
    db::fractions::remove_user_everywhere(ctx.scope(), &mut *tx, &user_id).await?;
    db::sessions::clear_active_organization_for_user(&mut *tx, &user_id, ctx.scope().organization_id())
        .await?;
    tx.commit().await?;

    audit::record(&state.db, &ctx, "member.removed", "user", user_id.as_str());
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/app/members", get(list))
        .route("/app/members/:user_id", patch(update_role).delete(remove))
}
