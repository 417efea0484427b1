use std::sync::Arc;

use axum::{middleware, Router};
use sqlx::SqlitePool;

/// Human-readable application name, used in mail subjects and the landing
/// response.
pub const APP_NAME: &str = "Condodesk";

/// Shared state available to all handlers via Axum's state extractor.
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub mail: Arc<dyn mail::EmailSender>,
    pub config: config::Config,
}

/// App routes. Everything under `/app` sits behind [`tenant::require_tenant`];
/// auth, onboarding and account routes only need a session (or nothing).
pub fn routes(state: AppState) -> Router<AppState> {
    let tenant_routes = Router::new()
        .merge(features::dashboard::routes())
        .merge(features::fractions::routes())
        .merge(features::tickets::routes())
        .merge(features::suppliers::routes())
        .merge(features::maintenance::routes())
        .merge(features::documents::routes())
        .merge(features::members::routes())
        .merge(features::organization::settings::routes())
        .merge(features::join_requests::routes())
        .merge(features::audit_log::routes())
        .route_layer(middleware::from_fn_with_state(state, tenant::require_tenant));

    Router::new()
        .merge(features::auth::routes())
        .merge(features::invites::routes())
        .merge(features::onboarding::routes())
        .merge(features::organization::switch::routes())
        .merge(features::account::routes())
        .merge(tenant_routes)
}

pub mod audit;
pub mod config;
pub mod db;
pub mod domain;
pub mod error;
pub mod features;
pub mod mail;
pub mod session;
pub mod tenant;
pub mod tokens;
