use axum::extract::State;
use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use crate::auth::extractor::{Area, AuthUser};
use crate::db;
use crate::dtos::{CreateOwner, UpdateOwner};
use crate::error::AppError;
use crate::extract::{Json, Path};
use crate::middleware::audit;
use crate::models::{Owner, OwnerDetail};
use crate::state::SharedState;

/// Owners are shared across companies. Outside the admin role, an owner may
/// only be changed while all of their units belong to the caller's company.
async fn ensure_not_shared(
    state: &SharedState,
    auth: &AuthUser,
    id: Uuid,
) -> Result<(), AppError> {
    if let Some(company_id) = auth.scope() {
        if db::owners::linked_outside(&state.pool, id, company_id).await? {
            return Err(AppError::Forbidden(
                "Owner has units in another company".to_string(),
            ));
        }
    }
    Ok(())
}

/// Units are filtered to the caller's companies.
async fn detail(
    state: &SharedState,
    auth: &AuthUser,
    owner: Owner,
) -> Result<OwnerDetail, AppError> {
    let id = owner.id;
    db::owners::with_units(&state.pool, vec![owner], auth.scope())
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("Owner", id))
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<OwnerDetail>>, AppError> {
    let rows = db::owners::list(&state.pool).await?;
    let details = db::owners::with_units(&state.pool, rows, auth.scope()).await?;
    Ok(Json(details))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateOwner>,
) -> Result<(StatusCode, Json<Owner>), AppError> {
    auth.require_write(Area::Owners)?;
    req.validate()?;

    let owner = db::owners::create(&state.pool, &req).await?;

    audit::log_event(&state.pool, &auth, "owner.created", "owner", Some(owner.id)).await;

    Ok((StatusCode::CREATED, Json(owner)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<OwnerDetail>, AppError> {
    let owner = db::owners::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Owner", id))?;

    Ok(Json(detail(&state, &auth, owner).await?))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateOwner>,
) -> Result<Json<OwnerDetail>, AppError> {
    auth.require_write(Area::Owners)?;
    req.validate()?;

    let mut owner = db::owners::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Owner", id))?;
    ensure_not_shared(&state, &auth, id).await?;
    req.apply(&mut owner);

    let owner = db::owners::update(&state.pool, &owner)
        .await?
        .ok_or_else(|| AppError::not_found("Owner", id))?;

    audit::log_event(&state.pool, &auth, "owner.updated", "owner", Some(owner.id)).await;

    Ok(Json(detail(&state, &auth, owner).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_write(Area::Owners)?;

    db::owners::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Owner", id))?;
    ensure_not_shared(&state, &auth, id).await?;

    db::owners::delete(&state.pool, id).await?;

    audit::log_event(&state.pool, &auth, "owner.deleted", "owner", Some(id)).await;

    Ok(StatusCode::NO_CONTENT)
}
