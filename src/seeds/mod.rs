mod dev_admin_user;

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::app::error::AppError;

/// Name of the table tracking applied seeds.
pub const SEEDS_TABLE: &str = "_condodesk_seeds";

/// Outcome of running a seed. Skipped seeds are not recorded so they may run again later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedOutcome {
    /// Seed executed and made changes; record it.
    Applied,
    /// Seed chose not to run (e.g. env not set); do not record.
    Skipped,
}

/// A database seed. Seeds run in version order and are tracked for idempotency.
#[async_trait]
pub trait Seed: Send + Sync {
    /// Unique version identifier (timestamp format: YYYYMMDDHHMMSS).
    fn version(&self) -> i64;

    fn description(&self) -> &str;

    /// Execute the seed through the db layer.
    async fn run(&self, pool: &SqlitePool) -> Result<SeedOutcome, AppError>;
}

/// All seeds in execution order (sorted by version).
pub fn all_seeds() -> Vec<Box<dyn Seed>> {
    let mut seeds: Vec<Box<dyn Seed>> = vec![Box::new(dev_admin_user::DevAdminUser)];
    seeds.sort_by_key(|s| s.version());
    seeds
}

/// Run every seed not yet recorded. `forced` versions run again even if
/// they were applied before.
pub async fn run_seeds(pool: &SqlitePool, forced: &[i64]) -> Result<(), AppError> {
    ensure_seeds_table(pool).await?;
    let applied = applied_versions(pool).await?;

    for seed in all_seeds() {
        let version = seed.version();
        let description = seed.description();
        let already_applied = applied.contains(&version);
        let force = forced.contains(&version);

        if already_applied && !force {
            tracing::debug!(version, description, "seed already applied");
            continue;
        }
        if already_applied {
            forget_seed(pool, version).await?;
        }

        match seed.run(pool).await? {
            SeedOutcome::Applied => {
                record_seed(pool, version, description).await?;
                tracing::info!(version, description, "seed applied");
            }
            SeedOutcome::Skipped => tracing::info!(version, description, "seed skipped"),
        }
    }
    Ok(())
}

async fn ensure_seeds_table(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(&format!(
        "CREATE TABLE IF NOT EXISTS {SEEDS_TABLE} (
            version INTEGER PRIMARY KEY NOT NULL,
            description TEXT NOT NULL,
            installed_on INTEGER NOT NULL DEFAULT (unixepoch()),
            success INTEGER NOT NULL DEFAULT 1
        )"
    ))
    .execute(pool)
    .await?;
    Ok(())
}

async fn applied_versions(pool: &SqlitePool) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar::<_, i64>(&format!("SELECT version FROM {SEEDS_TABLE}"))
        .fetch_all(pool)
        .await
}

async fn record_seed(pool: &SqlitePool, version: i64, description: &str) -> Result<(), sqlx::Error> {
    sqlx::query(&format!("INSERT INTO {SEEDS_TABLE} (version, description) VALUES (?, ?)"))
        .bind(version)
        .bind(description)
        .execute(pool)
        .await?;
    Ok(())
}

async fn forget_seed(pool: &SqlitePool, version: i64) -> Result<(), sqlx::Error> {
    sqlx::query(&format!("DELETE FROM {SEEDS_TABLE} WHERE version = ?"))
        .bind(version)
        .execute(pool)
        .await?;
    Ok(())
}
