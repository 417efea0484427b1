//! First steps after signup: create a condominium or ask to join one.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Form, Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use validator::Validate;

use crate::app::{
    db::{self, join_requests::OwnJoinRequest, organizations::Membership},
    domain::{validation_helpers, OrganizationId, OrganizationName, OrganizationRole, UserId},
    error::AppError,
    session::{AuthenticatedSession, SessionUser},
    tokens, AppState,
};

/// Slug suffixes tried before giving up on a name.
const MAX_SLUG_ATTEMPTS: u32 = 50;

#[derive(Debug, Serialize)]
pub struct OnboardingView {
    pub user: SessionUser,
    pub active_organization_id: Option<OrganizationId>,
    pub memberships: Vec<Membership>,
    pub join_requests: Vec<OwnJoinRequest>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrganizationForm {
    #[validate(length(min = 1, max = 120))]
    pub name: String,

    #[serde(default)]
    pub city: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct JoinForm {
    #[validate(length(min = 1, max = 32))]
    pub code: String,
}

/// Create an organization owned by `owner`, with a unique slug and a fresh
/// join code. Returns the new organization's id.
pub async fn create_organization(
    pool: &SqlitePool,
    owner: &UserId,
    name: &OrganizationName,
    city: &str,
) -> Result<OrganizationId, AppError> {
    let mut tx = pool.begin().await?;

    let base = name.slug();
    let mut slug = base.clone();
    let mut attempt = 1;
    while db::organizations::slug_exists(&mut *tx, slug.as_str()).await? {
        attempt += 1;
        if attempt > MAX_SLUG_ATTEMPTS {
            return Err(AppError::Conflict("An organization with this name already exists".to_string()));
        }
        slug = base.with_suffix(attempt);
    }

    let organization_id = OrganizationId::new();
    let organization = db::organizations::NewOrganization {
        id: organization_id.clone(),
        name: name.as_str().to_string(),
        slug: slug.as_str().to_string(),
        city: city.to_string(),
        invite_code: tokens::join_code(),
    };
    db::organizations::insert(&mut *tx, &organization).await?;
    db::organizations::add_member(&mut *tx, &organization_id, owner, OrganizationRole::Owner).await?;
    tx.commit().await?;

    tracing::info!(%organization_id, slug = slug.as_str(), owner = %owner, "organization created");
    Ok(organization_id)
}

/// GET /onboarding — Memberships and join requests of the signed-in user.
pub async fn show(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
) -> Result<Json<OnboardingView>, AppError> {
    let memberships = db::organizations::list_memberships(&state.db, &session.user.id).await?;
    let join_requests = db::join_requests::list_for_user(&state.db, &session.user.id).await?;

    Ok(Json(OnboardingView {
        user: session.user,
        active_organization_id: session.active_organization_id,
        memberships,
        join_requests,
    }))
}

/// POST /onboarding/organization — Create a condominium, become its owner and
/// make it the active organization.
pub async fn create(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    Form(form): Form<CreateOrganizationForm>,
) -> Result<Redirect, AppError> {
    form.validate()
        .map_err(|_| AppError::Validation("Name is required".to_string()))?;
    let name = OrganizationName::new(&form.name).map_err(AppError::validation)?;
    let city = validation_helpers::optional_text(Some(&form.city), "city", 120)
        .map_err(AppError::validation)?
        .unwrap_or_default();

    let organization_id = create_organization(&state.db, &session.user.id, &name, &city).await?;
    db::sessions::set_active_organization(&state.db, &session.id, Some(&organization_id)).await?;

    Ok(Redirect::to("/app"))
}

/// POST /onboarding/join — Ask to join the organization behind a join code.
pub async fn join(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    Form(form): Form<JoinForm>,
) -> Result<impl IntoResponse, AppError> {
    form.validate()
        .map_err(|_| AppError::Validation("Code is required".to_string()))?;

    let organization = db::organizations::find_by_invite_code(&state.db, &form.code)
        .await?
        .ok_or(AppError::NotFound)?;
    let organization_id =
        OrganizationId::from_string(&organization.id).map_err(|_| AppError::Internal)?;
    let user_id = &session.user.id;

    if db::organizations::find_member_role(&state.db, &organization_id, user_id)
        .await?
        .is_some()
    {
        return Err(AppError::Conflict("You are already a member of this condominium".to_string()));
    }
    if db::join_requests::has_pending(&state.db, &organization_id, user_id).await? {
        return Err(AppError::Conflict("A request to join is already pending".to_string()));
    }

    let id = db::new_id();
    db::join_requests::insert(&state.db, &id, &organization_id, user_id).await?;
    tracing::info!(%organization_id, %user_id, join_request_id = %id, "join request filed");

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "id": id,
            "organization_name": organization.name,
            "status": "pending",
        })),
    ))
}

/// Onboarding routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/onboarding", get(show))
        .route("/onboarding/organization", post(create))
        .route("/onboarding/join", post(join))
}
