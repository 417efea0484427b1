use axum::{extract::State, response::Redirect, routing::post, Form, Router};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use validator::Validate;

use crate::app::{
    domain::{validation_helpers, Email, Password},
    error::AppError,
    features::auth::service,
    session, AppState,
};

/// Signup form data from HTTP request.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupForm {
    #[validate(length(min = 1, max = 254))]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(must_match(other = "password", message = "Passwords do not match"))]
    pub confirm_password: String,

    #[serde(default)]
    pub name: Option<String>,
}

/// POST /signup — Create the account and a session, then send the user to
/// onboarding.
pub async fn submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<SignupForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    form.validate()
        .map_err(|_| AppError::Validation("Invalid form data".to_string()))?;

    let email = Email::new(&form.email).map_err(AppError::validation)?;
    let password = Password::new(form.password).map_err(AppError::validation)?;
    let name = validation_helpers::optional_text(form.name.as_deref(), "name", 120)
        .map_err(AppError::validation)?;

    let session_id =
        service::signup(&state.db, &email, name, &password, state.config.session_ttl()).await?;

    let jar = jar.add(session::session_cookie(session_id, &state.config));
    Ok((jar, Redirect::to("/onboarding")))
}

/// Signup routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/signup", post(submit))
}
