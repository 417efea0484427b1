use condodesk::app;
use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Load .env file (silently ignore if missing)
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=debug,tower_http=debug", env!("CARGO_PKG_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match app::config::Config::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(%err, "failed to load config (check DATABASE_URL and other env vars)");
            std::process::exit(1);
        }
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::query("PRAGMA journal_mode=WAL")
        .execute(&pool)
        .await
        .expect("Failed to set WAL mode");

    sqlx::query("PRAGMA busy_timeout=5000")
        .execute(&pool)
        .await
        .expect("Failed to set busy timeout");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    match app::db::sessions::delete_expired(&pool).await {
        Ok(0) => {}
        Ok(removed) => tracing::info!(removed, "expired sessions purged"),
        Err(err) => tracing::warn!(%err, "failed to purge expired sessions"),
    }

    let mail = app::mail::from_config(&config).unwrap_or_else(|e| {
        tracing::error!("Failed to initialize mail adapter: {}", e);
        std::process::exit(1);
    });

    let bind_addr = config.bind_addr.clone();
    let state = app::AppState {
        db: pool,
        mail,
        config,
    };
    let router = condodesk::create_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("Failed to bind to {bind_addr}: {e}"));

    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, router).await.expect("server error");
}
