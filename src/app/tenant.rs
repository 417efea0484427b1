//! Tenant isolation enforcement.
//!
//! **Rule**: tenant data is only reachable through an [`OrgScope`], and an
//! `OrgScope` only exists after a membership row has been found for the
//! caller. Client-supplied organization ids never scope a query directly.

use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;
use sqlx::SqlitePool;

use crate::app::{
    db,
    domain::{Action, EffectiveRole, OrganizationId, OrganizationRole, UserId},
    error::AppError,
    session::{self, CurrentSession, SessionUser},
    AppState,
};

/// Capability to query one organization's rows. Tenant-scoped accessors take
/// it as their first parameter and filter every statement by it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrgScope(OrganizationId);

impl OrgScope {
    fn new(organization_id: OrganizationId) -> Self {
        Self(organization_id)
    }

    pub fn organization_id(&self) -> &OrganizationId {
        &self.0
    }

    /// Organization id as stored in `organization_id` columns.
    pub fn as_str(&self) -> String {
        self.0.as_str()
    }
}

/// Request-scoped access context produced by [`require_tenant`]. Read-only
/// for handlers.
#[derive(Debug, Clone)]
pub struct TenantContext {
    user: SessionUser,
    session_id: String,
    scope: OrgScope,
    role: OrganizationRole,
}

impl TenantContext {
    pub fn user(&self) -> &SessionUser {
        &self.user
    }

    pub fn user_id(&self) -> &UserId {
        &self.user.id
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn scope(&self) -> &OrgScope {
        &self.scope
    }

    /// Organization-level role from the membership row.
    pub fn role(&self) -> OrganizationRole {
        self.role
    }

    /// Check an organization-level action.
    pub fn authorize(&self, action: Action) -> Result<EffectiveRole, AppError> {
        let effective = EffectiveRole::resolve(self.role, None, action);
        self.decide(effective, action)
    }

    /// Check an action against one fraction. The caller's fraction role is
    /// looked up inside this organization only; managers skip the lookup.
    pub async fn authorize_fraction(
        &self,
        pool: &SqlitePool,
        fraction_id: &str,
        action: Action,
    ) -> Result<EffectiveRole, AppError> {
        let fraction_role = if self.role.is_manager() || !action.is_fraction_scoped() {
            None
        } else {
            db::fractions::find_member_role(&self.scope, pool, fraction_id, &self.user.id).await?
        };
        let effective = EffectiveRole::resolve(self.role, fraction_role, action);
        self.decide(effective, action)
    }

    fn decide(&self, effective: EffectiveRole, action: Action) -> Result<EffectiveRole, AppError> {
        if effective.allows(action) {
            Ok(effective)
        } else {
            tracing::debug!(
                user_id = %self.user.id,
                organization_id = %self.scope.organization_id(),
                %action,
                ?effective,
                "action denied"
            );
            Err(AppError::Forbidden)
        }
    }
}

/// Validates that the user is a member of the organization. Returns a scope
/// for it and the member's role.
///
/// Returns `NotFound` (not `Forbidden`) to avoid leaking whether the org exists.
pub async fn require_org_member(
    pool: &SqlitePool,
    user_id: &UserId,
    organization_id: &OrganizationId,
) -> Result<(OrgScope, OrganizationRole), AppError> {
    db::organizations::find_member_role(pool, organization_id, user_id)
        .await?
        .map(|role| (OrgScope::new(organization_id.clone()), role))
        .ok_or(AppError::NotFound)
}

/// Organization resolver: active organization pointer + membership lookup.
pub async fn resolve(pool: &SqlitePool, session: CurrentSession) -> Result<TenantContext, AppError> {
    let Some(organization_id) = session.active_organization_id.clone() else {
        tracing::debug!(user_id = %session.user.id, "no active organization");
        return Err(AppError::NoActiveOrganization);
    };

    match require_org_member(pool, &session.user.id, &organization_id).await {
        Ok((scope, role)) => Ok(TenantContext {
            user: session.user,
            session_id: session.id,
            scope,
            role,
        }),
        Err(AppError::NotFound) => {
            tracing::debug!(
                user_id = %session.user.id,
                %organization_id,
                "active organization without membership"
            );
            Err(AppError::NoActiveOrganization)
        }
        Err(err) => Err(err),
    }
}

/// Middleware guarding every tenant route. Unauthenticated requests redirect
/// to /login and requests without a usable organization to /onboarding,
/// before any handler runs.
pub async fn require_tenant(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let jar = CookieJar::from_headers(request.headers());
    let session = session::resolve(&state.db, &jar)
        .await
        .ok_or(AppError::Unauthenticated)?;
    let context = resolve(&state.db, session).await?;

    request.extensions_mut().insert(context);
    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for TenantContext
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts.extensions.get::<TenantContext>().cloned().ok_or_else(|| {
            tracing::error!(path = %parts.uri.path(), "tenant route mounted without require_tenant");
            AppError::Internal
        })
    }
}
