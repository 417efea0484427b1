use axum::{
    extract::{Query, State},
    response::Redirect,
    routing::post,
    Form, Router,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use validator::Validate;

use crate::app::{
    domain::{Email, Password},
    error::AppError,
    features::auth::service,
    session, AppState,
};

/// Login form data from HTTP request.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginForm {
    #[validate(length(min = 1, max = 254))]
    pub email: String,

    #[validate(length(min = 1))]
    pub password: String,

    /// Where to continue after login, as a hidden field.
    #[serde(default)]
    pub next: Option<String>,
}

/// `?next=` on the login URL, as handed out in invite links.
#[derive(Debug, Deserialize)]
pub struct LoginQuery {
    pub next: Option<String>,
}

/// Accept only paths on this site: a single leading slash, no scheme-relative
/// `//host` and no backslashes.
fn safe_next(next: Option<&str>) -> Option<&str> {
    let next = next?.trim();
    let on_site = next.starts_with('/') && !next.starts_with("//") && !next.contains('\\');
    on_site.then_some(next)
}

/// POST /login — Check credentials, start a session, redirect to `next` when
/// it is a local path, else /app.
pub async fn submit(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Result<(CookieJar, Redirect), AppError> {
    form.validate()
        .map_err(|_| AppError::Validation("Invalid form data".to_string()))?;

    let email = Email::new(&form.email)
        .map_err(|_| AppError::Auth("Invalid email or password".to_string()))?;

    // Strength rules apply at signup, not login.
    let password = Password::for_verification(form.password);

    let session_id =
        service::login(&state.db, &email, &password, state.config.session_ttl()).await?;

    let target = safe_next(form.next.as_deref().or(query.next.as_deref())).unwrap_or("/app");
    let redirect = Redirect::to(target);
    let jar = jar.add(session::session_cookie(session_id, &state.config));
    Ok((jar, redirect))
}

/// Login routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/login", post(submit))
}
