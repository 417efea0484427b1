use axum::{extract::State, response::Redirect, routing::post, Form, Router};
use serde::Deserialize;

use crate::app::{
    db,
    domain::OrganizationId,
    error::AppError,
    session::AuthenticatedSession,
    tenant, AppState,
};

#[derive(Debug, Deserialize)]
pub struct SwitchOrganizationForm {
    #[serde(rename = "organizationId")]
    pub organization_id: String,
}

/// POST /organizations/switch — Point the session at another organization
/// the user belongs to. Unknown and foreign organizations are both 404.
pub async fn submit(
    AuthenticatedSession(session): AuthenticatedSession,
    State(state): State<AppState>,
    Form(form): Form<SwitchOrganizationForm>,
) -> Result<Redirect, AppError> {
    let organization_id =
        OrganizationId::from_string(&form.organization_id).map_err(|_| AppError::NotFound)?;

    let (scope, role) =
        tenant::require_org_member(&state.db, &session.user.id, &organization_id).await?;
    db::sessions::set_active_organization(&state.db, &session.id, Some(scope.organization_id()))
        .await?;

    tracing::info!(user_id = %session.user.id, %organization_id, %role, "active organization switched");
    Ok(Redirect::to("/app"))
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/organizations/switch", post(submit))
}
