use sqlx::SqlitePool;
use time::{Duration, OffsetDateTime};

use crate::app::{
    db,
    domain::{Email, HashedPassword, OrganizationId, Password, UserId},
    error::AppError,
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Sign up a new user. Returns the session ID on success. The session has no
/// active organization until the user creates or joins one.
pub async fn signup(
    pool: &SqlitePool,
    email: &Email,
    name: Option<String>,
    password: &Password,
    session_ttl: Duration,
) -> Result<String, AppError> {
    if db::find_by_email(pool, email).await?.is_some() {
        return Err(AppError::Auth(
            "Unable to create account. If you already have an account, please log in.".to_string(),
        ));
    }

    let password_hash = HashedPassword::from_password(password).map_err(|err| {
        tracing::error!(%err, "password hashing failed");
        AppError::Internal
    })?;

    let new_user = db::NewUser {
        id: UserId::new(),
        email: email.clone(),
        name,
        password_hash,
        verified: false,
    };

    let mut tx = pool.begin().await?;
    db::users::insert(&mut *tx, &new_user).await?;
    let expires_at = OffsetDateTime::now_utc() + session_ttl;
    let session_id = db::sessions::create(&mut *tx, &new_user.id, None, expires_at).await?;
    tx.commit().await?;

    tracing::info!(user_id = %new_user.id, "user signed up");
    Ok(session_id)
}

/// Log in a user. Returns the session ID on success. The session starts on
/// the user's earliest membership, or on no organization at all.
pub async fn login(
    pool: &SqlitePool,
    email: &Email,
    password: &Password,
    session_ttl: Duration,
) -> Result<String, AppError> {
    let user = db::find_by_email(pool, email)
        .await?
        .ok_or_else(|| AppError::Auth(INVALID_CREDENTIALS.to_string()))?;

    HashedPassword::from_string(user.password_hash)
        .verify(password)
        .map_err(|_| AppError::Auth(INVALID_CREDENTIALS.to_string()))?;

    let user_id = UserId::from_string(&user.id).map_err(|_| AppError::Internal)?;

    let active_organization_id = db::organizations::list_memberships(pool, &user_id)
        .await?
        .into_iter()
        .find_map(|m| OrganizationId::from_string(&m.organization_id).ok());

    let expires_at = OffsetDateTime::now_utc() + session_ttl;
    let session_id =
        db::sessions::create(pool, &user_id, active_organization_id.as_ref(), expires_at).await?;

    tracing::info!(%user_id, has_organization = active_organization_id.is_some(), "user logged in");
    Ok(session_id)
}
