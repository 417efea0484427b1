use serde::Serialize;
use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::tenant::OrgScope;

/// Database row for maintenance_records table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MaintenanceRecord {
    pub id: String,
    pub organization_id: String,
    pub supplier_id: Option<String>,
    pub title: String,
    pub description: String,
    pub performed_on: String,
    pub cost_cents: Option<i64>,
    pub created_at: i64,
}

/// The supplier, when set, must already have been found in the same scope.
pub struct NewMaintenanceRecord {
    pub id: String,
    pub supplier_id: Option<String>,
    pub title: String,
    pub description: String,
    pub performed_on: String,
    pub cost_cents: Option<i64>,
}

const COLUMNS: &str =
    "id, organization_id, supplier_id, title, description, performed_on, cost_cents, created_at";

pub async fn insert<'e, E>(scope: &OrgScope, executor: E, record: &NewMaintenanceRecord) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO maintenance_records (id, organization_id, supplier_id, title, description, performed_on, cost_cents, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&record.id)
    .bind(scope.as_str())
    .bind(&record.supplier_id)
    .bind(&record.title)
    .bind(&record.description)
    .bind(&record.performed_on)
    .bind(record.cost_cents)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Records of the caller's organization, most recent work first. Optionally
/// only those done by one supplier.
pub async fn list<'e, E>(
    scope: &OrgScope,
    executor: E,
    supplier_id: Option<&str>,
) -> Result<Vec<MaintenanceRecord>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, MaintenanceRecord>(&format!(
        "SELECT {COLUMNS} FROM maintenance_records WHERE organization_id = ? AND (? IS NULL OR supplier_id = ?) \
         ORDER BY performed_on DESC, created_at DESC"
    ))
    .bind(scope.as_str())
    .bind(supplier_id)
    .bind(supplier_id)
    .fetch_all(executor)
    .await
}

pub async fn find_by_id<'e, E>(
    scope: &OrgScope,
    executor: E,
    id: &str,
) -> Result<Option<MaintenanceRecord>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, MaintenanceRecord>(&format!(
        "SELECT {COLUMNS} FROM maintenance_records WHERE id = ? AND organization_id = ?"
    ))
    .bind(id)
    .bind(scope.as_str())
    .fetch_optional(executor)
    .await
}

pub async fn delete<'e, E>(scope: &OrgScope, executor: E, id: &str) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM maintenance_records WHERE id = ? AND organization_id = ?")
        .bind(id)
        .bind(scope.as_str())
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
