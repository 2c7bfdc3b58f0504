use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::extractor::{Area, AuthUser};
use crate::db;
use crate::db::units::NewUnit;
use crate::dtos::{CreateUnit, UpdateUnit};
use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::middleware::audit;
use crate::models::{Unit, UnitDetail};
use crate::routes::ensure_condominium;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub condominium_id: Option<Uuid>,
}

async fn detail(state: &SharedState, unit: Unit) -> Result<UnitDetail, AppError> {
    let id = unit.id;
    db::units::with_relations(&state.pool, vec![unit], true)
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("Unit", id))
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<UnitDetail>>, AppError> {
    let rows = db::units::list(&state.pool, auth.scope(), query.condominium_id).await?;
    let details =
        db::units::with_relations(&state.pool, rows, query.condominium_id.is_none()).await?;
    Ok(Json(details))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateUnit>,
) -> Result<(StatusCode, Json<Unit>), AppError> {
    auth.require_write(Area::Property)?;
    req.validate()?;
    ensure_condominium(&state, &auth, req.condominium_id).await?;

    let mut tx = state.pool.begin().await?;
    let unit = db::units::create(
        &mut *tx,
        NewUnit {
            condominium_id: req.condominium_id,
            door_number: &req.door_number,
            floor: req.floor,
            typology: &req.typology,
            permillage: req.permillage,
        },
    )
    .await?;
    if let Some(owner_ids) = &req.owner_ids {
        db::unit_owners::replace(&mut *tx, unit.id, owner_ids).await?;
    }
    tx.commit().await?;

    audit::log_event(&state.pool, &auth, "unit.created", "unit", Some(unit.id)).await;

    Ok((StatusCode::CREATED, Json(unit)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UnitDetail>, AppError> {
    let unit = db::units::find_by_id(&state.pool, id, auth.scope())
        .await?
        .ok_or_else(|| AppError::not_found("Unit", id))?;
    Ok(Json(detail(&state, unit).await?))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(mut req): Json<UpdateUnit>,
) -> Result<Json<UnitDetail>, AppError> {
    auth.require_write(Area::Property)?;
    req.validate()?;

    let mut unit = db::units::find_by_id(&state.pool, id, auth.scope())
        .await?
        .ok_or_else(|| AppError::not_found("Unit", id))?;

    if let Some(condominium_id) = req.condominium_id {
        ensure_condominium(&state, &auth, condominium_id).await?;
    }
    req.apply(&mut unit);

    let mut tx = state.pool.begin().await?;
    let unit = db::units::update(&mut *tx, &unit)
        .await?
        .ok_or_else(|| AppError::not_found("Unit", id))?;
    if let Some(owner_ids) = &req.owner_ids {
        db::unit_owners::replace(&mut *tx, unit.id, owner_ids).await?;
    }
    tx.commit().await?;

    audit::log_event(&state.pool, &auth, "unit.updated", "unit", Some(unit.id)).await;

    Ok(Json(detail(&state, unit).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_write(Area::Property)?;

    db::units::find_by_id(&state.pool, id, auth.scope())
        .await?
        .ok_or_else(|| AppError::not_found("Unit", id))?;

    db::units::delete(&state.pool, id).await?;

    audit::log_event(&state.pool, &auth, "unit.deleted", "unit", Some(id)).await;

    Ok(StatusCode::NO_CONTENT)
}

/// Link an owner. Linking twice leaves a single membership.
pub async fn add_owner(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path((id, owner_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<UnitDetail>, AppError> {
    auth.require_write(Area::Property)?;

    let unit = db::units::find_by_id(&state.pool, id, auth.scope())
        .await?
        .ok_or_else(|| AppError::not_found("Unit", id))?;
    db::owners::find_by_id(&state.pool, owner_id)
        .await?
        .ok_or_else(|| AppError::not_found("Owner", owner_id))?;

    db::unit_owners::add(&state.pool, id, owner_id).await?;

    audit::log_event(&state.pool, &auth, "unit.owner_added", "unit", Some(id)).await;

    Ok(Json(detail(&state, unit).await?))
}

/// Unlink an owner. Unlinking a non-member is a no-op.
pub async fn remove_owner(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path((id, owner_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<UnitDetail>, AppError> {
    auth.require_write(Area::Property)?;

    let unit = db::units::find_by_id(&state.pool, id, auth.scope())
        .await?
        .ok_or_else(|| AppError::not_found("Unit", id))?;

    db::unit_owners::remove(&state.pool, id, owner_id).await?;

    audit::log_event(&state.pool, &auth, "unit.owner_removed", "unit", Some(id)).await;

    Ok(Json(detail(&state, unit).await?))
}
