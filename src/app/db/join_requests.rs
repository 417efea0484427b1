use serde::Serialize;
use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::{
    domain::{JoinRequestStatus, OrganizationId, UserId},
    tenant::OrgScope,
};

/// Database row for join_requests table, joined with the requesting user.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JoinRequest {
    pub id: String,
    pub organization_id: String,
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub status: JoinRequestStatus,
    pub created_at: i64,
    pub decided_at: Option<i64>,
}

/// A user's own request, as shown on the onboarding page.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct OwnJoinRequest {
    pub id: String,
    pub organization_id: String,
    pub organization_name: String,
    pub status: JoinRequestStatus,
    pub created_at: i64,
}

const COLUMNS: &str = "r.id, r.organization_id, r.user_id, u.email, u.name, r.status, r.created_at, r.decided_at";

/// File a request to join an organization found by invite code. The caller
/// is not a member yet, so this is keyed by organization id rather than scope.
pub async fn insert<'e, E>(
    executor: E,
    id: &str,
    organization_id: &OrganizationId,
    user_id: &UserId,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO join_requests (id, organization_id, user_id, status, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(organization_id.as_str())
    .bind(user_id.as_str())
    .bind(JoinRequestStatus::Pending)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn has_pending<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    user_id: &UserId,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar(
        "SELECT count(*) FROM join_requests WHERE organization_id = ? AND user_id = ? AND status = 'pending'",
    )
    .bind(organization_id.as_str())
    .bind(user_id.as_str())
    .fetch_one(executor)
    .await?;
    Ok(count > 0)
}

pub async fn list_for_user<'e, E>(executor: E, user_id: &UserId) -> Result<Vec<OwnJoinRequest>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, OwnJoinRequest>(
        "SELECT r.id, r.organization_id, o.name AS organization_name, r.status, r.created_at \
         FROM join_requests r JOIN organizations o ON o.id = r.organization_id \
         WHERE r.user_id = ? ORDER BY r.created_at DESC",
    )
    .bind(user_id.as_str())
    .fetch_all(executor)
    .await
}

/// Pending requests for the caller's organization, oldest first.
pub async fn list_pending<'e, E>(scope: &OrgScope, executor: E) -> Result<Vec<JoinRequest>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, JoinRequest>(&format!(
        "SELECT {COLUMNS} FROM join_requests r JOIN users u ON u.id = r.user_id \
         WHERE r.organization_id = ? AND r.status = 'pending' ORDER BY r.created_at"
    ))
    .bind(scope.as_str())
    .fetch_all(executor)
    .await
}

pub async fn find_pending<'e, E>(scope: &OrgScope, executor: E, id: &str) -> Result<Option<JoinRequest>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, JoinRequest>(&format!(
        "SELECT {COLUMNS} FROM join_requests r JOIN users u ON u.id = r.user_id \
         WHERE r.id = ? AND r.organization_id = ? AND r.status = 'pending'"
    ))
    .bind(id)
    .bind(scope.as_str())
    .fetch_optional(executor)
    .await
}

/// Move a pending request to approved/rejected. Returns false if it was not
/// pending in this organization.
pub async fn decide<'e, E>(
    scope: &OrgScope,
    executor: E,
    id: &str,
    status: JoinRequestStatus,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let result = sqlx::query(
        "UPDATE join_requests SET status = ?, decided_at = ? WHERE id = ? AND organization_id = ? AND status = 'pending'",
    )
    .bind(status)
    .bind(now)
    .bind(id)
    .bind(scope.as_str())
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}
