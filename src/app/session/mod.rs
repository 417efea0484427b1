//! Session resolution: `session_id` cookie → user identity + active
//! organization pointer.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use sqlx::SqlitePool;

use crate::app::{
    config::Config,
    db,
    domain::{OrganizationId, UserId},
    error::AppError,
    AppState,
};

pub const SESSION_COOKIE: &str = "session_id";

/// Identity of the signed-in user.
#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    pub id: UserId,
    pub email: String,
    pub name: Option<String>,
    pub verified: bool,
}

/// A valid session as seen by request handlers.
#[derive(Debug, Clone)]
pub struct CurrentSession {
    pub id: String,
    pub user: SessionUser,
    pub active_organization_id: Option<OrganizationId>,
}

/// Resolve the request's session. Never errors: a missing cookie, an unknown
/// or expired session, a malformed row and a database failure all yield `None`.
pub async fn resolve(pool: &SqlitePool, jar: &CookieJar) -> Option<CurrentSession> {
    let session_id = jar.get(SESSION_COOKIE)?.value();
    if session_id.is_empty() {
        return None;
    }

    let row = match db::sessions::find_valid_with_user(pool, session_id).await {
        Ok(row) => row?,
        Err(err) => {
            tracing::warn!(%err, "session lookup failed");
            return None;
        }
    };

    let user_id = UserId::from_string(&row.user_id).ok()?;
    let active_organization_id = row
        .active_organization_id
        .as_deref()
        .and_then(|id| OrganizationId::from_string(id).ok());

    Some(CurrentSession {
        id: row.id,
        user: SessionUser {
            id: user_id,
            email: row.email,
            name: row.name,
            verified: row.email_verified_at.is_some(),
        },
        active_organization_id,
    })
}

/// Extractor for routes that need a signed-in user but no organization
/// (onboarding, account, org switch). Rejects with a redirect to /login.
#[derive(Debug, Clone)]
pub struct AuthenticatedSession(pub CurrentSession);

#[async_trait]
impl FromRequestParts<AppState> for AuthenticatedSession {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_headers(&parts.headers);
        resolve(&state.db, &jar)
            .await
            .map(AuthenticatedSession)
            .ok_or(AppError::Unauthenticated)
    }
}

pub fn session_cookie(session_id: impl Into<String>, config: &Config) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session_id.into()))
        .http_only(true)
        .secure(config.cookie_secure)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(config.session_ttl())
        .build()
}

pub fn clear_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .removal()
        .build()
}
