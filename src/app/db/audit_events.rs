use serde::Serialize;
use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::{domain::UserId, tenant::OrgScope};

/// Database row for audit_events table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditEvent {
    pub id: String,
    pub organization_id: String,
    pub actor_user_id: String,
    pub action: String,
    pub entity_type: String,
    pub entity_id: String,
    pub created_at: i64,
}

pub async fn insert<'e, E>(
    scope: &OrgScope,
    executor: E,
    actor: &UserId,
    action: &str,
    entity_type: &str,
    entity_id: &str,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO audit_events (id, organization_id, actor_user_id, action, entity_type, entity_id, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(ulid::Ulid::new().to_string())
    .bind(scope.as_str())
    .bind(actor.as_str())
    .bind(action)
    .bind(entity_type)
    .bind(entity_id)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Most recent events of the caller's organization.
pub async fn list_recent<'e, E>(scope: &OrgScope, executor: E, limit: i64) -> Result<Vec<AuditEvent>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, AuditEvent>(
        "SELECT id, organization_id, actor_user_id, action, entity_type, entity_id, created_at \
         FROM audit_events WHERE organization_id = ? ORDER BY created_at DESC, id DESC LIMIT ?",
    )
    .bind(scope.as_str())
    .bind(limit)
    .fetch_all(executor)
    .await
}
