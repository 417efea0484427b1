use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::{
    domain::{OrganizationId, UserId},
    tokens,
};

/// A valid session joined with its user, as loaded by the session resolver.
#[derive(Debug, FromRow)]
pub struct SessionWithUser {
    pub id: String,
    pub user_id: String,
    pub active_organization_id: Option<String>,
    pub email: String,
    pub name: Option<String>,
    pub email_verified_at: Option<i64>,
}

/// Create a new session for a user. Returns the session ID.
pub async fn create<'e, E>(
    executor: E,
    user_id: &UserId,
    active_organization_id: Option<&OrganizationId>,
    expires_at: OffsetDateTime,
) -> Result<String, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let session_id = tokens::secret_token();
    let now = OffsetDateTime::now_utc().unix_timestamp();

    sqlx::query(
        "INSERT INTO sessions (id, user_id, active_organization_id, expires_at, created_at) VALUES (?, ?, ?, ?, ?)",
    )
    .bind(&session_id)
    .bind(user_id.as_str())
    .bind(active_organization_id.map(OrganizationId::as_str))
    .bind(expires_at.unix_timestamp())
    .bind(now)
    .execute(executor)
    .await?;

    Ok(session_id)
}

/// Find a valid session together with its user in one query.
pub async fn find_valid_with_user<'e, E>(
    executor: E,
    session_id: &str,
) -> Result<Option<SessionWithUser>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();

    sqlx::query_as::<_, SessionWithUser>(
        "SELECT s.id, s.user_id, s.active_organization_id, u.email, u.name, u.email_verified_at \
         FROM sessions s JOIN users u ON u.id = s.user_id \
         WHERE s.id = ? AND s.expires_at > ?",
    )
    .bind(session_id)
    .bind(now)
    .fetch_optional(executor)
    .await
}

/// Point a session at another organization (org switch). Membership must
/// already have been checked by the caller.
pub async fn set_active_organization<'e, E>(
    executor: E,
    session_id: &str,
    organization_id: Option<&OrganizationId>,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("UPDATE sessions SET active_organization_id = ? WHERE id = ?")
        .bind(organization_id.map(OrganizationId::as_str))
        .bind(session_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Clear the active organization on every session of a user that points at
/// `organization_id` (used when the user loses membership).
pub async fn clear_active_organization_for_user<'e, E>(
    executor: E,
    user_id: &UserId,
    organization_id: &OrganizationId,
) -> Result<u64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE sessions SET active_organization_id = NULL WHERE user_id = ? AND active_organization_id = ?",
    )
    .bind(user_id.as_str())
    .bind(organization_id.as_str())
    .execute(executor)
    .await?;
    Ok(result.rows_affected())
}

/// Delete a session (logout).
pub async fn delete<'e, E>(executor: E, session_id: &str) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(session_id)
        .execute(executor)
        .await?;
    Ok(())
}

/// Remove expired sessions. Returns how many were deleted.
pub async fn delete_expired<'e, E>(executor: E) -> Result<u64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
        .bind(now)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
