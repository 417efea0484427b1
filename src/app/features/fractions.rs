//! Fractions (units) of a condominium and their residents.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::app::{
    audit,
    db::{
        self,
        fractions::{Fraction, FractionResident, NewFraction},
    },
    domain::{validation_helpers, Action, EffectiveRole, FractionRole, UserId},
    error::AppError,
    tenant::{OrgScope, TenantContext},
    AppState,
};

const NAME_MAX: usize = 80;
const DESCRIPTION_MAX: usize = 2000;

#[derive(Debug, Deserialize)]
pub struct FractionRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ResidentRequest {
    pub user_id: String,
    #[serde(default = "default_resident_role")]
    pub role: FractionRole,
}

fn default_resident_role() -> FractionRole {
    FractionRole::FractionMember
}

#[derive(Debug, Serialize)]
pub struct FractionDetail {
    pub fraction: Fraction,
    pub residents: Vec<FractionResident>,
}

fn parse_fields(body: &FractionRequest) -> Result<(String, String), AppError> {
    let name = validation_helpers::required_text(&body.name, "name", NAME_MAX).map_err(AppError::validation)?;
    let description = validation_helpers::optional_text(body.description.as_deref(), "description", DESCRIPTION_MAX)
        .map_err(AppError::validation)?
        .unwrap_or_default();
    Ok((name, description))
}

async fn find_fraction(scope: &OrgScope, pool: &SqlitePool, id: &str) -> Result<Fraction, AppError> {
    db::fractions::find_by_id(scope, pool, id)
        .await?
        .ok_or(AppError::NotFound)
}

/// GET /app/fractions
pub async fn list(
    ctx: TenantContext,
    State(state): State<AppState>,
) -> Result<Json<Vec<Fraction>>, AppError> {
    ctx.authorize(Action::ViewOrganization)?;
    Ok(Json(db::fractions::list(ctx.scope(), &state.db).await?))
}

/// POST /app/fractions
pub async fn create(
    ctx: TenantContext,
    State(state): State<AppState>,
    Json(body): Json<FractionRequest>,
) -> Result<impl IntoResponse, AppError> {
    ctx.authorize(Action::CreateFraction)?;
    let (name, description) = parse_fields(&body)?;

    if db::fractions::name_exists(ctx.scope(), &state.db, &name).await? {
        return Err(AppError::Conflict(format!("A fraction named {name} already exists")));
    }

    let fraction = NewFraction {
        id: db::new_id(),
        name,
        description,
    };
    db::fractions::insert(ctx.scope(), &state.db, &fraction).await?;
    audit::record(&state.db, &ctx, "fraction.created", "fraction", fraction.id.clone());

    let created = find_fraction(ctx.scope(), &state.db, &fraction.id).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /app/fractions/:id — Fraction with its residents.
pub async fn show(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<FractionDetail>, AppError> {
    ctx.authorize(Action::ViewOrganization)?;
    let fraction = find_fraction(ctx.scope(), &state.db, &id).await?;
    let residents = db::fractions::list_residents(ctx.scope(), &state.db, &fraction.id).await?;
    Ok(Json(FractionDetail { fraction, residents }))
}

/// PATCH /app/fractions/:id — Managers, or the fraction's owner-admin.
pub async fn update(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<FractionRequest>,
) -> Result<Json<Fraction>, AppError> {
    let fraction = find_fraction(ctx.scope(), &state.db, &id).await?;
    ctx.authorize_fraction(&state.db, &fraction.id, Action::EditFraction).await?;
    let (name, description) = parse_fields(&body)?;

    if name != fraction.name && db::fractions::name_exists(ctx.scope(), &state.db, &name).await? {
        return Err(AppError::Conflict(format!("A fraction named {name} already exists")));
    }

    if !db::fractions::update(ctx.scope(), &state.db, &fraction.id, &name, &description).await? {
        return Err(AppError::NotFound);
    }
    audit::record(&state.db, &ctx, "fraction.updated", "fraction", fraction.id.clone());

    Ok(Json(find_fraction(ctx.scope(), &state.db, &fraction.id).await?))
}

/// DELETE /app/fractions/:id
pub async fn destroy(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    ctx.authorize(Action::DeleteFraction)?;

    if !db::fractions::delete(ctx.scope(), &state.db, &id).await? {
        return Err(AppError::NotFound);
    }
    audit::record(&state.db, &ctx, "fraction.deleted", "fraction", id);
    Ok(StatusCode::NO_CONTENT)
}

/// POST /app/fractions/:id/members — Add a resident or change their role.
/// Fraction owner-admins may only add plain residents and may not touch
/// other owner-admins.
pub async fn add_resident(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ResidentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let fraction = find_fraction(ctx.scope(), &state.db, &id).await?;
    let effective = ctx
        .authorize_fraction(&state.db, &fraction.id, Action::ManageFractionResidents)
        .await?;
    if matches!(effective, EffectiveRole::Fraction(_)) && body.role != FractionRole::FractionMember {
        return Err(AppError::Forbidden);
    }

    let user_id = UserId::from_string(&body.user_id).map_err(|_| AppError::NotFound)?;
    db::organizations::find_scoped_member_role(ctx.scope(), &state.db, &user_id)
        .await?
        .ok_or(AppError::NotFound)?;

    // Owner-admins never change another owner-admin's role.
    if matches!(effective, EffectiveRole::Fraction(_)) {
        let current = db::fractions::find_member_role(ctx.scope(), &state.db, &fraction.id, &user_id).await?;
        if current == Some(FractionRole::FractionOwnerAdmin) {
            return Err(AppError::Forbidden);
        }
    }

    db::fractions::upsert_member(ctx.scope(), &state.db, &fraction.id, &user_id, body.role).await?;
    audit::record(&state.db, &ctx, "fraction.resident_added", "fraction", fraction.id.clone());
    tracing::info!(
        fraction_id = %fraction.id,
        %user_id,
        role = body.role.label(),
        "fraction resident set"
    );

    let residents = db::fractions::list_residents(ctx.scope(), &state.db, &fraction.id).await?;
    Ok((StatusCode::CREATED, Json(residents)))
}

/// DELETE /app/fractions/:id/members/:user_id
pub async fn remove_resident(
    ctx: TenantContext,
    State(state): State<AppState>,
    Path((id, user_id)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let fraction = find_fraction(ctx.scope(), &state.db, &id).await?;
    let effective = ctx
        .authorize_fraction(&state.db, &fraction.id, Action::ManageFractionResidents)
        .await?;

    let user_id = UserId::from_string(&user_id).map_err(|_| AppError::NotFound)?;
    let target_role = db::fractions::find_member_role(ctx.scope(), &state.db, &fraction.id, &user_id)
        .await?
        .ok_or(AppError::NotFound)?;
    if matches!(effective, EffectiveRole::Fraction(_)) && target_role == FractionRole::FractionOwnerAdmin {
        return Err(AppError::Forbidden);
    }

    db::fractions::remove_member(ctx.scope(), &state.db, &fraction.id, &user_id).await?;
    audit::record(&state.db, &ctx, "fraction.resident_removed", "fraction", fraction.id);
    Ok(StatusCode::NO_CONTENT)
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/app/fractions", get(list).post(create))
        .route("/app/fractions/:id", get(show).patch(update).delete(destroy))
        .route("/app/fractions/:id/members", post(add_resident))
        .route("/app/fractions/:id/members/:user_id", delete(remove_resident))
}
