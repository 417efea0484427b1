use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;
use sqlx::Error as SqlxError;

use crate::app::domain::validation_helpers;

/// Application error type. Every handler returns it; `IntoResponse` maps the
/// access-control variants to redirects and the rest to JSON bodies.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// No valid session (redirect to /login).
    #[error("authentication required")]
    Unauthenticated,

    /// Valid session but no active organization, or no membership in it
    /// (redirect to /onboarding).
    #[error("no active organization")]
    NoActiveOrganization,

    /// Role does not allow the action (403).
    #[error("forbidden")]
    Forbidden,

    /// Absent, or owned by another organization (404). The two are never
    /// distinguished.
    #[error("not found")]
    NotFound,

    /// Invalid input (400).
    #[error("{0}")]
    Validation(String),

    /// Wrong credentials and similar (400).
    #[error("{0}")]
    Auth(String),

    /// Uniqueness or state conflicts (409).
    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] SqlxError),

    #[error("internal error")]
    Internal,
}

impl AppError {
    pub fn validation(err: validator::ValidationError) -> Self {
        AppError::Validation(validation_helpers::message(&err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::Unauthenticated => return Redirect::to("/login").into_response(),
            AppError::NoActiveOrganization => return Redirect::to("/onboarding").into_response(),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden".to_string()),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Not found".to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Auth(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            AppError::Database(err) => {
                tracing::error!(%err, "database error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
            AppError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
