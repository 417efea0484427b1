use serde::Serialize;
use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::{
    domain::{TicketPriority, TicketStatus, UserId},
    tenant::OrgScope,
};

/// Database row for tickets table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Ticket {
    pub id: String,
    pub organization_id: String,
    pub fraction_id: Option<String>,
    pub created_by: String,
    pub title: String,
    pub description: String,
    pub status: TicketStatus,
    pub priority: TicketPriority,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Data structure for inserting a new ticket. The fraction, when set, must
/// already have been found in the same scope.
pub struct NewTicket {
    pub id: String,
    pub fraction_id: Option<String>,
    pub created_by: UserId,
    pub title: String,
    pub description: String,
    pub priority: TicketPriority,
}

const COLUMNS: &str =
    "id, organization_id, fraction_id, created_by, title, description, status, priority, created_at, updated_at";

pub async fn insert<'e, E>(scope: &OrgScope, executor: E, ticket: &NewTicket) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO tickets (id, organization_id, fraction_id, created_by, title, description, status, priority, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&ticket.id)
    .bind(scope.as_str())
    .bind(&ticket.fraction_id)
    .bind(ticket.created_by.as_str())
    .bind(&ticket.title)
    .bind(&ticket.description)
    .bind(TicketStatus::Open)
    .bind(ticket.priority)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Tickets of the caller's organization, newest first, optionally filtered by
/// status.
pub async fn list<'e, E>(
    scope: &OrgScope,
    executor: E,
    status: Option<TicketStatus>,
) -> Result<Vec<Ticket>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Ticket>(&format!(
        "SELECT {COLUMNS} FROM tickets WHERE organization_id = ? AND (? IS NULL OR status = ?) \
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(scope.as_str())
    .bind(status)
    .bind(status)
    .fetch_all(executor)
    .await
}

pub async fn find_by_id<'e, E>(scope: &OrgScope, executor: E, id: &str) -> Result<Option<Ticket>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Ticket>(&format!(
        "SELECT {COLUMNS} FROM tickets WHERE id = ? AND organization_id = ?"
    ))
    .bind(id)
    .bind(scope.as_str())
    .fetch_optional(executor)
    .await
}

pub async fn count_active<'e, E>(scope: &OrgScope, executor: E) -> Result<i64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar(
        "SELECT count(*) FROM tickets WHERE organization_id = ? AND status IN ('open', 'in_progress')",
    )
    .bind(scope.as_str())
    .fetch_one(executor)
    .await
}

/// Returns false when nothing matched in this organization.
pub async fn update_status<'e, E>(
    scope: &OrgScope,
    executor: E,
    id: &str,
    status: TicketStatus,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let result = sqlx::query(
        "UPDATE tickets SET status = ?, updated_at = ? WHERE id = ? AND organization_id = ?",
    )
    .bind(status)
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
    let result = sqlx::query("DELETE FROM tickets WHERE id = ? AND organization_id = ?")
        .bind(id)
        .bind(scope.as_str())
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
