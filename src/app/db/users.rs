use serde::Serialize;
use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::domain::{Email, HashedPassword, UserId};

/// Database row for users table.
#[derive(Debug, FromRow)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub password_hash: String,
    pub email_verified_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    pub fn verified(&self) -> bool {
        self.email_verified_at.is_some()
    }
}

/// Public view of a user, safe to serialize.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: String,
    pub email: String,
    pub name: Option<String>,
    pub verified: bool,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        let verified = user.verified();
        Self {
            id: user.id,
            email: user.email,
            name: user.name,
            verified,
        }
    }
}

/// Data structure for inserting a new user.
pub struct NewUser {
    pub id: UserId,
    pub email: Email,
    pub name: Option<String>,
    pub password_hash: HashedPassword,
    /// Invite acceptance proves the address, so those users start verified.
    pub verified: bool,
}

const COLUMNS: &str = "id, email, name, password_hash, email_verified_at, created_at, updated_at";

/// Find a user by email address.
pub async fn find_by_email<'e, E>(executor: E, email: &Email) -> Result<Option<User>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE email = ?"))
        .bind(email.as_str())
        .fetch_optional(executor)
        .await
}

/// Find a user by ID.
pub async fn find_by_id<'e, E>(executor: E, user_id: &UserId) -> Result<Option<User>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, User>(&format!("SELECT {COLUMNS} FROM users WHERE id = ?"))
        .bind(user_id.as_str())
        .fetch_optional(executor)
        .await
}

/// Insert a new user into the database.
pub async fn insert<'e, E>(executor: E, user: &NewUser) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let verified_at = user.verified.then_some(now);

    sqlx::query(
        "INSERT INTO users (id, email, name, password_hash, email_verified_at, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(user.id.as_str())
    .bind(user.email.as_str())
    .bind(&user.name)
    .bind(user.password_hash.as_str())
    .bind(verified_at)
    .bind(now)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(())
}

/// Update the display name (profile edit).
pub async fn update_name<'e, E>(
    executor: E,
    user_id: &UserId,
    name: Option<&str>,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query("UPDATE users SET name = ?, updated_at = ? WHERE id = ?")
        .bind(name)
        .bind(now)
        .bind(user_id.as_str())
        .execute(executor)
        .await?;
    Ok(())
}

/// Replace the stored password hash.
pub async fn update_password<'e, E>(
    executor: E,
    user_id: &UserId,
    password_hash: &HashedPassword,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
        .bind(password_hash.as_str())
        .bind(now)
        .bind(user_id.as_str())
        .execute(executor)
        .await?;
    Ok(())
}
