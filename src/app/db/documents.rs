use serde::Serialize;
use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::{
    domain::{DocumentCategory, UserId},
    tenant::OrgScope,
};

/// Database row for documents table. The file itself lives in external
/// storage under `storage_key`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Document {
    pub id: String,
    pub organization_id: String,
    pub title: String,
    pub category: DocumentCategory,
    pub storage_key: String,
    pub uploaded_by: String,
    pub created_at: i64,
}

pub struct NewDocument {
    pub id: String,
    pub title: String,
    pub category: DocumentCategory,
    pub storage_key: String,
    pub uploaded_by: UserId,
}

const COLUMNS: &str = "id, organization_id, title, category, storage_key, uploaded_by, created_at";

pub async fn insert<'e, E>(scope: &OrgScope, executor: E, document: &NewDocument) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO documents (id, organization_id, title, category, storage_key, uploaded_by, created_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&document.id)
    .bind(scope.as_str())
    .bind(&document.title)
    .bind(document.category)
    .bind(&document.storage_key)
    .bind(document.uploaded_by.as_str())
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

pub async fn list<'e, E>(
    scope: &OrgScope,
    executor: E,
    category: Option<DocumentCategory>,
) -> Result<Vec<Document>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Document>(&format!(
        "SELECT {COLUMNS} FROM documents WHERE organization_id = ? AND (? IS NULL OR category = ?) \
         ORDER BY created_at DESC, id DESC"
    ))
    .bind(scope.as_str())
    .bind(category)
    .bind(category)
    .fetch_all(executor)
    .await
}

pub async fn find_by_id<'e, E>(scope: &OrgScope, executor: E, id: &str) -> Result<Option<Document>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Document>(&format!(
        "SELECT {COLUMNS} FROM documents WHERE id = ? AND organization_id = ?"
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
    let result = sqlx::query("DELETE FROM documents WHERE id = ? AND organization_id = ?")
        .bind(id)
        .bind(scope.as_str())
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
