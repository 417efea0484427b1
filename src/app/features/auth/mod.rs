pub mod login;
pub mod logout;
pub mod service;
pub mod signup;

use axum::Router;
use crate::app::AppState;

/// Authentication routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(signup::routes())
        .merge(login::routes())
        .merge(logout::routes())
}
