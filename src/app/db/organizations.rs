use serde::Serialize;
use sqlx::{FromRow, SqliteExecutor};
use time::OffsetDateTime;

use crate::app::{
    domain::{OrganizationId, OrganizationRole, UserId},
    tenant::OrgScope,
};

/// Database row for organizations table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Organization {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub city: String,
    pub invite_code: String,
    pub invite_enabled: bool,
    pub created_at: i64,
}

/// Data structure for inserting a new organization.
pub struct NewOrganization {
    pub id: OrganizationId,
    pub name: String,
    pub slug: String,
    pub city: String,
    pub invite_code: String,
}

/// One membership of a user, with the organization it points at.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Membership {
    pub organization_id: String,
    pub organization_name: String,
    pub slug: String,
    pub role: OrganizationRole,
    pub created_at: i64,
}

/// One member row for the members listing.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MemberWithUser {
    pub user_id: String,
    pub email: String,
    pub name: Option<String>,
    pub role: OrganizationRole,
    pub created_at: i64,
}

const COLUMNS: &str = "id, name, slug, city, invite_code, invite_enabled, created_at";

/// Find an organization by ID. Callers outside onboarding should use
/// [`find_scoped`].
pub async fn find_by_id<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
) -> Result<Option<Organization>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Organization>(&format!("SELECT {COLUMNS} FROM organizations WHERE id = ?"))
        .bind(organization_id.as_str())
        .fetch_optional(executor)
        .await
}

/// The caller's own organization.
pub async fn find_scoped<'e, E>(scope: &OrgScope, executor: E) -> Result<Option<Organization>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    find_by_id(executor, scope.organization_id()).await
}

/// Find an organization accepting join requests by its invite code.
pub async fn find_by_invite_code<'e, E>(
    executor: E,
    invite_code: &str,
) -> Result<Option<Organization>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Organization>(&format!(
        "SELECT {COLUMNS} FROM organizations WHERE invite_code = ? AND invite_enabled = 1"
    ))
    .bind(invite_code.trim().to_uppercase())
    .fetch_optional(executor)
    .await
}

pub async fn slug_exists<'e, E>(executor: E, slug: &str) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar("SELECT count(*) FROM organizations WHERE slug = ?")
        .bind(slug)
        .fetch_one(executor)
        .await?;
    Ok(count > 0)
}

/// Insert a new organization.
pub async fn insert<'e, E>(executor: E, organization: &NewOrganization) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO organizations (id, name, slug, city, invite_code, invite_enabled, created_at) VALUES (?, ?, ?, ?, ?, 1, ?)",
    )
    .bind(organization.id.as_str())
    .bind(&organization.name)
    .bind(&organization.slug)
    .bind(&organization.city)
    .bind(&organization.invite_code)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Update name, city and the invite flag of the caller's organization.
pub async fn update_settings<'e, E>(
    scope: &OrgScope,
    executor: E,
    name: &str,
    city: &str,
    invite_enabled: bool,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("UPDATE organizations SET name = ?, city = ?, invite_enabled = ? WHERE id = ?")
        .bind(name)
        .bind(city)
        .bind(invite_enabled)
        .bind(scope.as_str())
        .execute(executor)
        .await?;
    Ok(())
}

pub async fn set_invite_code<'e, E>(scope: &OrgScope, executor: E, invite_code: &str) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query("UPDATE organizations SET invite_code = ? WHERE id = ?")
        .bind(invite_code)
        .bind(scope.as_str())
        .execute(executor)
        .await?;
    Ok(())
}

/// Add a user to an organization with a specific role.
pub async fn add_member<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    user_id: &UserId,
    role: OrganizationRole,
) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let now = OffsetDateTime::now_utc().unix_timestamp();
    sqlx::query(
        "INSERT INTO organization_members (organization_id, user_id, role, created_at) VALUES (?, ?, ?, ?)",
    )
    .bind(organization_id.as_str())
    .bind(user_id.as_str())
    .bind(role)
    .bind(now)
    .execute(executor)
    .await?;
    Ok(())
}

/// Find a member's role in an organization. Returns None if not a member.
pub async fn find_member_role<'e, E>(
    executor: E,
    organization_id: &OrganizationId,
    user_id: &UserId,
) -> Result<Option<OrganizationRole>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar::<_, OrganizationRole>(
        "SELECT role FROM organization_members WHERE organization_id = ? AND user_id = ?",
    )
    .bind(organization_id.as_str())
    .bind(user_id.as_str())
    .fetch_optional(executor)
    .await
}

/// All organizations a user belongs to, oldest membership first.
pub async fn list_memberships<'e, E>(executor: E, user_id: &UserId) -> Result<Vec<Membership>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Membership>(
        "SELECT m.organization_id, o.name AS organization_name, o.slug, m.role, m.created_at \
         FROM organization_members m JOIN organizations o ON o.id = m.organization_id \
         WHERE m.user_id = ? ORDER BY m.created_at, m.organization_id",
    )
    .bind(user_id.as_str())
    .fetch_all(executor)
    .await
}

/// Members of the caller's organization with their email and name.
pub async fn list_members<'e, E>(scope: &OrgScope, executor: E) -> Result<Vec<MemberWithUser>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, MemberWithUser>(
        "SELECT m.user_id, u.email, u.name, m.role, m.created_at \
         FROM organization_members m JOIN users u ON u.id = m.user_id \
         WHERE m.organization_id = ? ORDER BY m.created_at",
    )
    .bind(scope.as_str())
    .fetch_all(executor)
    .await
}

/// Role of another member of the caller's organization.
pub async fn find_scoped_member_role<'e, E>(
    scope: &OrgScope,
    executor: E,
    user_id: &UserId,
) -> Result<Option<OrganizationRole>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    find_member_role(executor, scope.organization_id(), user_id).await
}

/// Demote an owner while another owner remains; the owner count is checked
/// in the same statement. Returns false when the user is not an owner or is
/// the last one.
pub async fn demote_owner<'e, E>(
    scope: &OrgScope,
    executor: E,
    user_id: &UserId,
    role: OrganizationRole,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE organization_members SET role = ? \
         WHERE organization_id = ? AND user_id = ? AND role = 'owner' \
         AND (SELECT count(*) FROM organization_members WHERE organization_id = ? AND role = 'owner') > 1",
    )
    .bind(role)
    .bind(scope.as_str())
    .bind(user_id.as_str())
    .bind(scope.as_str())
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Remove an owner's membership while another owner remains. Returns false
/// when the user is not an owner or is the last one.
pub async fn remove_owner<'e, E>(scope: &OrgScope, executor: E, user_id: &UserId) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "DELETE FROM organization_members \
         WHERE organization_id = ? AND user_id = ? AND role = 'owner' \
         AND (SELECT count(*) FROM organization_members WHERE organization_id = ? AND role = 'owner') > 1",
    )
    .bind(scope.as_str())
    .bind(user_id.as_str())
    .bind(scope.as_str())
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Change a member's role. Returns false when the user is not a member.
pub async fn update_member_role<'e, E>(
    scope: &OrgScope,
    executor: E,
    user_id: &UserId,
    role: OrganizationRole,
) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE organization_members SET role = ? WHERE organization_id = ? AND user_id = ?",
    )
    .bind(role)
    .bind(scope.as_str())
    .bind(user_id.as_str())
    .execute(executor)
    .await?;
    Ok(result.rows_affected() > 0)
}

/// Remove a membership. Returns false when the user is not a member.
pub async fn remove_member<'e, E>(scope: &OrgScope, executor: E, user_id: &UserId) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM organization_members WHERE organization_id = ? AND user_id = ?")
        .bind(scope.as_str())
        .bind(user_id.as_str())
        .execute(executor)
        .await?;
    Ok(result.rows_affected() > 0)
}
