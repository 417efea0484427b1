mod accept;

use axum::Router;

use crate::app::AppState;

/// Invite acceptance routes. The token in the link is the credential.
pub fn routes() -> Router<AppState> {
    Router::new().merge(accept::routes())
}
