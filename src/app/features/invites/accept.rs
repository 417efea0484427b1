use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::get,
    Form, Json, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use time::OffsetDateTime;
use validator::Validate;

use crate::app::{
    db::{self, organization_invites::OrganizationInvite},
    domain::{validation_helpers, Email, HashedPassword, OrganizationId, Password, UserId},
    error::AppError,
    session::{self, AuthenticatedSession},
    AppState,
};

/// Query for GET /accept-invite and GET /accept-invite/confirm.
#[derive(Debug, Deserialize)]
pub struct InviteTokenQuery {
    pub token: Option<String>,
}

/// What the invite link leads to.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AcceptInviteState {
    Invalid {
        message: String,
    },
    NewUser {
        organization_name: String,
        email: String,
        token: String,
    },
    ExistingUser {
        organization_name: String,
        login_url: String,
    },
}

/// Form for POST /accept-invite (new user signup with invite).
#[derive(Debug, Deserialize, Validate)]
pub struct AcceptInviteForm {
    #[validate(length(min = 1))]
    pub token: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,

    #[serde(default)]
    pub name: Option<String>,
}

/// An unexpired invite together with its organization's id and name.
struct ValidInvite {
    invite: OrganizationInvite,
    organization_id: OrganizationId,
    organization_name: String,
}

async fn load_invite(pool: &SqlitePool, token: &str) -> Result<Option<ValidInvite>, AppError> {
    let Some(invite) = db::organization_invites::find_by_token(pool, token).await? else {
        return Ok(None);
    };
    let organization_id =
        OrganizationId::from_string(&invite.organization_id).map_err(|_| AppError::Internal)?;
    let Some(organization) = db::organizations::find_by_id(pool, &organization_id).await? else {
        return Ok(None);
    };
    Ok(Some(ValidInvite {
        invite,
        organization_id,
        organization_name: organization.name,
    }))
}

/// GET /accept-invite — Invite state: invalid, signup for a new user, or a
/// login link for an existing one.
pub async fn show(
    State(state): State<AppState>,
    Query(query): Query<InviteTokenQuery>,
) -> Result<Json<AcceptInviteState>, AppError> {
    let token = match query.token.as_deref().map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => {
            return Ok(Json(AcceptInviteState::Invalid {
                message: "Invalid or missing invite link.".to_string(),
            }))
        }
    };

    let Some(valid) = load_invite(&state.db, &token).await? else {
        return Ok(Json(AcceptInviteState::Invalid {
            message: "This invite is invalid or has expired. Ask for a new one.".to_string(),
        }));
    };

    let email = Email::new(&valid.invite.email).map_err(|_| AppError::Internal)?;
    let view = if db::find_by_email(&state.db, &email).await?.is_some() {
        let login_url = format!(
            "/login?next={}",
            urlencoding::encode(&format!("/accept-invite/confirm?token={}", urlencoding::encode(&token)))
        );
        AcceptInviteState::ExistingUser {
            organization_name: valid.organization_name,
            login_url,
        }
    } else {
        AcceptInviteState::NewUser {
            organization_name: valid.organization_name,
            email: valid.invite.email,
            token,
        }
    };
    Ok(Json(view))
}

/// POST /accept-invite — Create the invited account, join the organization and
/// start a session on it.
pub async fn submit_new_user(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<AcceptInviteForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    form.validate().map_err(|_| {
        AppError::Validation("Password must be 8-128 characters and match confirmation".to_string())
    })?;

    let valid = load_invite(&state.db, &form.token)
        .await?
        .ok_or(AppError::NotFound)?;
    let email = Email::new(&valid.invite.email).map_err(|_| AppError::Internal)?;
    if db::find_by_email(&state.db, &email).await?.is_some() {
        return Err(AppError::Conflict("An account already exists for this email; log in to accept".to_string()));
    }

    let password = Password::new(form.password).map_err(AppError::validation)?;
    let name = validation_helpers::optional_text(form.name.as_deref(), "name", 120)
        .map_err(AppError::validation)?;
    let password_hash = HashedPassword::from_password(&password).map_err(|err| {
        tracing::error!(%err, "password hashing failed");
        AppError::Internal
    })?;

    let new_user = db::NewUser {
        id: UserId::new(),
        email,
        name,
        password_hash,
        verified: true,
    };
    let expires_at = OffsetDateTime::now_utc() + state.config.session_ttl();

    let mut tx = state.db.begin().await?;
    db::users::insert(&mut *tx, &new_user).await?;
    db::organizations::add_member(&mut *tx, &valid.organization_id, &new_user.id, valid.invite.role).await?;
    db::organization_invites::consume_by_token(&mut *tx, &valid.invite.token).await?;
    let session_id =
        db::sessions::create(&mut *tx, &new_user.id, Some(&valid.organization_id), expires_at).await?;
    tx.commit().await?;

    tracing::info!(
        user_id = %new_user.id,
        organization_id = %valid.organization_id,
        role = %valid.invite.role,
        "invite accepted by new user"
    );
    let jar = jar.add(session::session_cookie(session_id, &state.config));
    Ok((jar, Redirect::to("/app")))
}

/// GET /accept-invite/confirm — Signed-in user consumes an invite addressed
/// to them; the session switches to that organization.
pub async fn confirm_existing_user(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    Query(query): Query<InviteTokenQuery>,
) -> Result<Redirect, AppError> {
    let token = query
        .token
        .filter(|t| !t.trim().is_empty())
        .ok_or(AppError::NotFound)?;
    let valid = load_invite(&state.db, token.trim())
        .await?
        .ok_or(AppError::NotFound)?;

    let invited = Email::new(&valid.invite.email).map_err(|_| AppError::Internal)?;
    if !invited.matches(&session.user.email) {
        tracing::debug!(user_id = %session.user.id, "invite addressed to another email");
        return Err(AppError::Forbidden);
    }

    let user_id = &session.user.id;
    let mut tx = state.db.begin().await?;
    if db::organizations::find_member_role(&mut *tx, &valid.organization_id, user_id)
        .await?
        .is_none()
    {
        db::organizations::add_member(&mut *tx, &valid.organization_id, user_id, valid.invite.role).await?;
    }
    db::organization_invites::consume_by_token(&mut *tx, &valid.invite.token).await?;
    db::sessions::set_active_organization(&mut *tx, &session.id, Some(&valid.organization_id)).await?;
    tx.commit().await?;

    tracing::info!(%user_id, organization_id = %valid.organization_id, "invite accepted by existing user");
    Ok(Redirect::to("/app"))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/accept-invite", get(show).post(submit_new_user))
        .route("/accept-invite/confirm", get(confirm_existing_user))
}
