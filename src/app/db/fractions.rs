use serde::Serialize;
use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::{
    domain::{FractionRole, UserId},
    tenant::OrgScope,
};

/// Database row for fractions table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Fraction {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub description: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Data structure for inserting a new fraction. The organization comes from
/// the scope.
pub struct NewFraction {
    pub id: String,
    pub name: String,
    pub description: String,
}

/// A resident associated with a fraction.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct FractionResident {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: FractionRole,
    pub created_at: i64,
}

const COLUMNS: &str = "id, organization_id, name, description, created_at, updated_at";

pub async fn insert<'e, E>(scope: &OrgScope, executor: E, fraction: &NewFraction) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO fractions (id, organization_id, name, description, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&fraction.id)
    .bind(scope.as_str())
    .bind(&fraction.name)
    .bind(&fraction.description)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn list<'e, E>(scope: &OrgScope, executor: E) -> Result<Vec<Fraction>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Fraction>(&format!(
        "SELECT {COLUMNS} FROM fractions WHERE organization_id = ? ORDER BY name"
    ))
    .bind(scope.as_str())
    .fetch_all(executor)
    .await
}

/// Find a fraction in the caller's organization. `None` for absent and
/// foreign fractions alike.
pub async fn find_by_id<'e, E>(scope: &OrgScope, executor: E, id: &str) -> Result<Option<Fraction>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Fraction>(&format!(
        "SELECT {COLUMNS} FROM fractions WHERE id = ? AND organization_id = ?"
    ))
    .bind(id)
    .bind(scope.as_str())
    .fetch_optional(executor)
    .await
}

pub async fn name_exists<'e, E>(scope: &OrgScope, executor: E, name: &str) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar(
        "SELECT count(*) FROM fractions WHERE organization_id = ? AND name = ?",
    )
    .bind(scope.as_str())
    .bind(name)
    .fetch_one(executor)
    .await?;
    Ok(count > 0)
}

/// Returns false when nothing matched in this organization.
pub async fn update<'e, E>(
    scope: &OrgScope,
    executor: E,
    id: &str,
    name: &str,
    description: &str,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let result = sqlx::query(
        "UPDATE fractions SET name = ?, description = ?, updated_at = ? WHERE id = ? AND organization_id = ?",
    )
    .bind(name)
    .bind(description)
    .bind(now)
    .bind(id)
    .bind(scope.as_str())
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Returns false when nothing matched in this organization.
pub async fn delete<'e, E>(scope: &OrgScope, executor: E, id: &str) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM fractions WHERE id = ? AND organization_id = ?")
        .bind(id)
        .bind(scope.as_str())
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// The user's role in one fraction of the caller's organization.
pub async fn find_member_role<'e, E>(
    scope: &OrgScope,
    executor: E,
    fraction_id: &str,
    user_id: &UserId,
) -> Result<Option<FractionRole>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar::<_, FractionRole>(
        "SELECT role FROM fraction_members WHERE fraction_id = ? AND user_id = ? AND organization_id = ?",
    )
    .bind(fraction_id)
    .bind(user_id.as_str())
    .bind(scope.as_str())
    .fetch_optional(executor)
    .await
}

/// Associate a user with a fraction, or change their fraction role.
pub async fn upsert_member<'e, E>(
    scope: &OrgScope,
    executor: E,
    fraction_id: &str,
    user_id: &UserId,
    role: FractionRole,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO fraction_members (fraction_id, organization_id, user_id, role, created_at) VALUES (?, ?, ?, ?, ?) \
         ON CONFLICT (fraction_id, user_id) DO UPDATE SET role = excluded.role",
    )
    .bind(fraction_id)
    .bind(scope.as_str())
    .bind(user_id.as_str())
    .bind(role)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn remove_member<'e, E>(
    scope: &OrgScope,
    executor: E,
    fraction_id: &str,
    user_id: &UserId,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "DELETE FROM fraction_members WHERE fraction_id = ? AND user_id = ? AND organization_id = ?",
    )
    .bind(fraction_id)
    .bind(user_id.as_str())
    .bind(scope.as_str())
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Drop every fraction association a user has in this organization (used
/// when the membership is removed).
pub async fn remove_user_everywhere<'e, E>(scope: &OrgScope, executor: E, user_id: &UserId) -> Result<u64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM fraction_members WHERE organization_id = ? AND user_id = ?")
        .bind(scope.as_str())
        .bind(user_id.as_str())
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}

pub async fn list_residents<'e, E>(
    scope: &OrgScope,
    executor: E,
    fraction_id: &str,
) -> Result<Vec<FractionResident>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, FractionResident>(
        "SELECT fm.user_id, u.email, u.name, fm.role, fm.created_at \
         FROM fraction_members fm JOIN users u ON u.id = fm.user_id \
         WHERE fm.fraction_id = ? AND fm.organization_id = ? ORDER BY fm.created_at",
    )
    .bind(fraction_id)
    .bind(scope.as_str())
    .fetch_all(executor)
    .await
}
