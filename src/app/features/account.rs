use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::app::{
    db::{self, organizations::Membership, users::UserProfile},
    domain::{validation_helpers, HashedPassword, Password},
    error::AppError,
    session::AuthenticatedSession,
    AppState,
};

#[derive(Debug, Serialize)]
pub struct AccountView {
    pub profile: UserProfile,
    pub memberships: Vec<Membership>,
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub name: Option<String>,
}

/// Change password form data.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordForm {
    #[validate(length(min = 1))]
    pub current_password: String,

    #[validate(length(min = 8, max = 128))]
    pub new_password: String,

    #[validate(must_match(other = "new_password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

async fn load_view(state: &AppState, session: &AuthenticatedSession) -> Result<AccountView, AppError> {
    let user_id = &session.0.user.id;
    let user = db::users::find_by_id(&state.db, user_id)
        .await?
        .ok_or(AppError::Unauthenticated)?;
    let memberships = db::organizations::list_memberships(&state.db, user_id).await?;
    Ok(AccountView {
        profile: user.into(),
        memberships,
    })
}

/// GET /account — Profile and memberships of the signed-in user.
pub async fn show(
    session: AuthenticatedSession,
    State(state): State<AppState>,
) -> Result<Json<AccountView>, AppError> {
    Ok(Json(load_view(&state, &session).await?))
}

/// POST /account — Update the display name. A blank name clears it.
pub async fn update_profile(
    session: AuthenticatedSession,
    State(state): State<AppState>,
    Form(form): Form<ProfileForm>,
) -> Result<Json<AccountView>, AppError> {
    let name = validation_helpers::optional_text(form.name.as_deref(), "name", 120)
        .map_err(AppError::validation)?;
    db::users::update_name(&state.db, &session.0.user.id, name.as_deref()).await?;
    Ok(Json(load_view(&state, &session).await?))
}

/// POST /account/change-password — Validate input first, then verify the
/// current password, then write.
pub async fn change_password(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    Form(form): Form<ChangePasswordForm>,
) -> Result<StatusCode, AppError> {
    form.validate().map_err(|_| {
        AppError::Validation("New password and confirmation must match and be 8-128 characters".to_string())
    })?;
    let new_password = Password::new(form.new_password).map_err(AppError::validation)?;

    let user = db::users::find_by_id(&state.db, &session.user.id)
        .await?
        .ok_or(AppError::Unauthenticated)?;
    HashedPassword::from_string(user.password_hash)
        .verify(&Password::for_verification(form.current_password))
        .map_err(|_| AppError::Auth("Current password is wrong".to_string()))?;

    let password_hash = HashedPassword::from_password(&new_password).map_err(|err| {
        tracing::error!(%err, "password hashing failed");
        AppError::Internal
    })?;
    db::users::update_password(&state.db, &session.user.id, &password_hash).await?;

    tracing::info!(user_id = %session.user.id, "password changed");
    Ok(StatusCode::NO_CONTENT)
}

/// Account routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/account", get(show).post(update_profile))
        .route("/account/change-password", post(change_password))
}
