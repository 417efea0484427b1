use axum::{extract::State, routing::get, Json, Router};
use serde_json::{json, Value};

use crate::app::{AppState, APP_NAME};

/// GET / — Where to go next.
pub async fn index() -> Json<Value> {
    Json(json!({
        "name": APP_NAME,
        "signup": "/signup",
        "login": "/login",
        "app": "/app",
    }))
}

/// GET /health — Liveness plus a database round trip.
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let database = match sqlx::query("SELECT 1").execute(&state.db).await {
        Ok(_) => "ok",
        Err(err) => {
            tracing::warn!(%err, "health check database probe failed");
            "unavailable"
        }
    };
    Json(json!({ "status": "ok", "database": database }))
}

/// Routes for the home feature slice.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
}
