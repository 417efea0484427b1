//! Audit trail for tenant mutations. Writes happen off the request path.

use sqlx::SqlitePool;

use crate::app::{db, tenant::TenantContext};

/// Record that the caller did `action` to an entity of their organization.
/// Never fails the request; a failed insert is logged.
pub fn record(
    pool: &SqlitePool,
    ctx: &TenantContext,
    action: &'static str,
    entity_type: &'static str,
    entity_id: impl Into<String>,
) {
    let pool = pool.clone();
    let scope = ctx.scope().clone();
    let actor = ctx.user_id().clone();
    let entity_id = entity_id.into();

    tokio::spawn(async move {
        if let Err(err) =
            db::audit_events::insert(&scope, &pool, &actor, action, entity_type, &entity_id).await
        {
            tracing::warn!(
                %err,
                organization_id = %scope.organization_id(),
                action,
                entity_type,
                %entity_id,
                "audit event not recorded"
            );
        }
    });
}
