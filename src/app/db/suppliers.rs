use serde::Serialize;
use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::{domain::SupplierCategory, tenant::OrgScope};

/// Database row for suppliers table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Supplier {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub category: SupplierCategory,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub created_at: i64,
}

/// Insert/update payload. The organization comes from the scope.
pub struct SupplierFields {
    pub name: String,
    pub category: SupplierCategory,
    pub email: Option<String>,
    pub phone: Option<String>,
}

const COLUMNS: &str = "id, organization_id, name, category, email, phone, created_at";

pub async fn insert<'e, E>(scope: &OrgScope, executor: E, id: &str, supplier: &SupplierFields) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO suppliers (id, organization_id, name, category, email, phone, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(scope.as_str())
    .bind(&supplier.name)
    .bind(supplier.category)
    .bind(&supplier.email)
    .bind(&supplier.phone)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn list<'e, E>(scope: &OrgScope, executor: E) -> Result<Vec<Supplier>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Supplier>(&format!(
        "SELECT {COLUMNS} FROM suppliers WHERE organization_id = ? ORDER BY name"
    ))
    .bind(scope.as_str())
    .fetch_all(executor)
    .await
}

pub async fn find_by_id<'e, E>(scope: &OrgScope, executor: E, id: &str) -> Result<Option<Supplier>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Supplier>(&format!(
        "SELECT {COLUMNS} FROM suppliers WHERE id = ? AND organization_id = ?"
    ))
    .bind(id)
    .bind(scope.as_str())
    .fetch_optional(executor)
    .await
}

pub async fn update<'e, E>(scope: &OrgScope, executor: E, id: &str, supplier: &SupplierFields) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE suppliers SET name = ?, category = ?, email = ?, phone = ? WHERE id = ? AND organization_id = ?",
    )
    .bind(&supplier.name)
    .bind(supplier.category)
    .bind(&supplier.email)
    .bind(&supplier.phone)
    .bind(id)
    .bind(scope.as_str())
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn delete<'e, E>(scope: &OrgScope, executor: E, id: &str) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM suppliers WHERE id = ? AND organization_id = ?")
        .bind(id)
        .bind(scope.as_str())
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
