use serde::Serialize;
use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::{
    domain::{OrganizationRole, UserId},
    tenant::OrgScope,
};

/// Database row for organization_invites table.
#[derive(Debug, Clone, FromRow)]
pub struct OrganizationInvite {
    pub id: String,
    pub organization_id: String,
    pub email: String,
    pub role: OrganizationRole,
    pub invited_by_user_id: String,
    pub token: String,
    pub expires_at: i64,
    pub created_at: i64,
}

/// Pending invite as shown to admins (no token).
#[derive(Debug, Clone, Serialize)]
pub struct PendingInvite {
    pub id: String,
    pub email: String,
    pub role: OrganizationRole,
    pub expires_at: i64,
}

impl From<OrganizationInvite> for PendingInvite {
    fn from(invite: OrganizationInvite) -> Self {
        Self {
            id: invite.id,
            email: invite.email,
            role: invite.role,
            expires_at: invite.expires_at,
        }
    }
}

/// Data structure for inserting a new organization invite.
pub struct NewOrganizationInvite {
    pub id: String,
    pub email: String,
    pub role: OrganizationRole,
    pub invited_by_user_id: UserId,
    pub token: String,
    pub expires_at: i64,
}

const COLUMNS: &str = "id, organization_id, email, role, invited_by_user_id, token, expires_at, created_at";

pub async fn insert<'e, E>(scope: &OrgScope, executor: E, invite: &NewOrganizationInvite) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO organization_invites (id, organization_id, email, role, invited_by_user_id, token, expires_at, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&invite.id)
    .bind(scope.as_str())
    .bind(&invite.email)
    .bind(invite.role)
    .bind(invite.invited_by_user_id.as_str())
    .bind(&invite.token)
    .bind(invite.expires_at)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Find an unexpired invite by token. The token is the credential here: this
/// lookup is what lets someone outside the organization join it.
pub async fn find_by_token<'e, E>(executor: E, token: &str) -> Result<Option<OrganizationInvite>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query_as::<_, OrganizationInvite>(&format!(
        "SELECT {COLUMNS} FROM organization_invites WHERE token = ? AND expires_at > ?"
    ))
    .bind(token)
    .bind(now)
    .fetch_optional(executor)
    .await
}

/// Delete an invite after it has been accepted, by its token.
pub async fn consume_by_token<'e, E>(executor: E, token: &str) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("DELETE FROM organization_invites WHERE token = ?")
        .bind(token)
        .execute(executor)
        .await?;
    Ok(())
}

/// Find a pending invite for the same email in the caller's organization.
pub async fn find_pending_by_email<'e, E>(
    scope: &OrgScope,
    executor: E,
    email: &str,
) -> Result<Option<OrganizationInvite>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query_as::<_, OrganizationInvite>(&format!(
        "SELECT {COLUMNS} FROM organization_invites WHERE organization_id = ? AND email = ? AND expires_at > ?"
    ))
    .bind(scope.as_str())
    .bind(email)
    .bind(now)
    .fetch_optional(executor)
    .await
}

/// Pending invites of the caller's organization, newest first.
pub async fn list_pending<'e, E>(scope: &OrgScope, executor: E) -> Result<Vec<OrganizationInvite>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query_as::<_, OrganizationInvite>(&format!(
        "SELECT {COLUMNS} FROM organization_invites WHERE organization_id = ? AND expires_at > ? ORDER BY created_at DESC"
    ))
    .bind(scope.as_str())
    .bind(now)
    .fetch_all(executor)
    .await
}

/// Revoke an invite. Returns false when nothing matched in this organization.
pub async fn delete<'e, E>(scope: &OrgScope, executor: E, id: &str) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM organization_invites WHERE id = ? AND organization_id = ?")
        .bind(id)
        .bind(scope.as_str())
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
