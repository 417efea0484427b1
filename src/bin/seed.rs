use condodesk::{app, seeds};
use dotenvy::dotenv;
use sqlx::sqlite::SqlitePoolOptions;
use std::env;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Usage: `seed [--force-all | --force <version>]`
#[tokio::main]
async fn main() {
    dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("{}=info", env!("CARGO_PKG_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = app::config::Config::from_env()
        .expect("Failed to load config (check DATABASE_URL and other env vars)");

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::query("PRAGMA busy_timeout=5000")
        .execute(&pool)
        .await
        .expect("Failed to set busy timeout");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run database migrations");

    let args: Vec<String> = env::args().collect();
    let forced: Vec<i64> = if args.iter().any(|a| a == "--force-all") {
        seeds::all_seeds().iter().map(|s| s.version()).collect()
    } else {
        args.iter()
            .position(|a| a == "--force")
            .and_then(|i| args.get(i + 1))
            .and_then(|s| s.parse::<i64>().ok())
            .into_iter()
            .collect()
    };

    if let Err(err) = seeds::run_seeds(&pool, &forced).await {
        eprintln!("Seeding failed: {}", err);
        std::process::exit(1);
    }
}
