//! Organization settings: profile, join code and email invites.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use crate::app::{
    audit,
    db::{
        self,
        organization_invites::{NewOrganizationInvite, PendingInvite},
        organizations::Organization,
    },
    domain::{validation_helpers, Action, Email, OrganizationName, OrganizationRole, UserId},
    error::AppError,
    mail::{self, EmailMessage},
    tenant::TenantContext,
    tokens, AppState, APP_NAME,
};

/// Invites stay valid for a week.
const INVITE_TTL: Duration = Duration::days(7);

#[derive(Debug, Serialize)]
pub struct SettingsView {
    pub organization: Organization,
    pub pending_invites: Vec<PendingInvite>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrganizationRequest {
    pub name: String,
    #[serde(default)]
    pub city: String,
    pub invite_enabled: bool,
}

#[derive(Debug, Deserialize)]
pub struct InviteRequest {
    pub email: String,
    #[serde(default = "default_invite_role")]
    pub role: OrganizationRole,
}

fn default_invite_role() -> OrganizationRole {
    OrganizationRole::Member
}

async fn load_organization(state: &AppState, ctx: &TenantContext) -> Result<Organization, AppError> {
    db::organizations::find_scoped(ctx.scope(), &state.db)
        .await?
        .ok_or(AppError::NotFound)
}

/// GET /app/settings/organization — Organization profile, join code and
/// pending invites (owners/admins).
pub async fn show(
    ctx: TenantContext,
    State(state): State<AppState>,
) -> Result<Json<SettingsView>, AppError> {
    ctx.authorize(Action::ManageInvites)?;

    let organization = load_organization(&state, &ctx).await?;
    let pending_invites = db::organization_invites::list_pending(ctx.scope(), &state.db)
        .await?
        .into_iter()
        .map(PendingInvite::from)
        .collect();

    Ok(Json(SettingsView {
        organization,
        pending_invites,
    }))
}

/// PATCH /app/settings/organization — Rename, move, or toggle join requests.
/// The slug is kept.
pub async fn update(
    ctx: TenantContext,
    State(state): State<AppState>,
    Json(body): Json<UpdateOrganizationRequest>,
) -> Result<Json<Organization>, AppError> {
    ctx.authorize(Action::UpdateOrganization)?;

    let name = OrganizationName::new(&body.name).map_err(AppError::validation)?;
    let city = validation_helpers::optional_text(Some(&body.city), "city", 120)
        .map_err(AppError::validation)?
        .unwrap_or_default();

    db::organizations::update_settings(ctx.scope(), &state.db, name.as_str(), &city, body.invite_enabled)
        .await?;
    audit::record(&state.db, &ctx, "organization.updated", "organization", ctx.scope().as_str());

    Ok(Json(load_organization(&state, &ctx).await?))
}

/// POST /app/settings/organization/invite-code — Replace the join code; the
/// old one stops working immediately.
pub async fn regenerate_invite_code(
    ctx: TenantContext,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    ctx.authorize(Action::UpdateOrganization)?;

    let invite_code = tokens::join_code();
    db::organizations::set_invite_code(ctx.scope(), &state.db, &invite_code).await?;
    audit::record(&state.db, &ctx, "organization.invite_code_regenerated", "organization", ctx.scope().as_str());

    Ok(Json(serde_json::json!({ "invite_code": invite_code })))
}

/// POST /app/settings/organization/invite — Invite someone by email. Only
/// owners can invite another owner.
pub async fn create_invite(
    ctx: TenantContext,
    State(state): State<AppState>,
    Json(body): Json<InviteRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.authorize(Action::ManageInvites)?;
    if body.role == OrganizationRole::Owner {
        ctx.authorize(Action::TransferOwnership)?;
    }

    let email = Email::new(&body.email).map_err(AppError::validation)?;

    if let Some(existing) = db::find_by_email(&state.db, &email).await? {
        let existing_id = UserId::from_string(&existing.id)
            .map_err(|_| AppError::Internal)?;
        if db::organizations::find_scoped_member_role(ctx.scope(), &state.db, &existing_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict("That email is already a member of this organization".to_string()));
        }
    }
    if db::organization_invites::find_pending_by_email(ctx.scope(), &state.db, email.as_str())
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("An invite has already been sent to that email".to_string()));
    }

    let organization = load_organization(&state, &ctx).await?;
    let token = tokens::secret_token();
    let invite = NewOrganizationInvite {
        id: db::new_id(),
        email: email.as_str().to_string(),
        role: body.role,
        invited_by_user_id: ctx.user_id().clone(),
        token: token.clone(),
        expires_at: (OffsetDateTime::now_utc() + INVITE_TTL).unix_timestamp(),
    };
    db::organization_invites::insert(ctx.scope(), &state.db, &invite).await?;
    audit::record(&state.db, &ctx, "invite.created", "invite", invite.id.clone());

    let invite_url = format!(
        "{}/accept-invite?token={}",
        state.config.app_url_base(),
        urlencoding::encode(&token)
    );
    mail::dispatch(
        state.mail.clone(),
        EmailMessage::new(
            email,
            format!("You're invited to join {}", organization.name),
            format!(
                "You've been invited to join {} on {} as {}. Accept here: {}",
                organization.name,
                APP_NAME,
                invite.role.label(),
                invite_url
            ),
            state.config.mail_from.clone(),
        ),
    );

    Ok((
        StatusCode::CREATED,
        Json(PendingInvite {
            id: invite.id,
            email: invite.email,
            role: invite.role,
            expires_at: invite.expires_at,
        }),
    ))
}

/// DELETE /app/settings/organization/invites/:id — Revoke a pending invite.
pub async fn revoke_invite(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    ctx.authorize(Action::ManageInvites)?;

    if !db::organization_invites::delete(ctx.scope(), &state.db, &id).await? {
        return Err(AppError::NotFound);
    }
    audit::record(&state.db, &ctx, "invite.revoked", "invite", id);
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/app/settings/organization", get(show).patch(update))
        .route("/app/settings/organization/invite", post(create_invite))
        .route("/app/settings/organization/invites/:id", delete(revoke_invite))
        .route("/app/settings/organization/invite-code", post(regenerate_invite_code))
}
