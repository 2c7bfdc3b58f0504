use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::extractor::{Area, AuthUser};
use crate::db;
use crate::dtos::{CreateCondominium, UpdateCondominium};
use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::middleware::audit;
use crate::models::{Condominium, CondominiumDetail};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub company_id: Option<Uuid>,
}

async fn detail(
    state: &SharedState,
    condominium: Condominium,
) -> Result<CondominiumDetail, AppError> {
    let id = condominium.id;
    db::condominiums::with_relations(&state.pool, vec![condominium], true)
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("Condominium", id))
}

/// Units, expenses and documents are always attached; the company only when
/// the listing is not already narrowed to one.
pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<CondominiumDetail>>, AppError> {
    let rows = db::condominiums::list(&state.pool, auth.scope(), query.company_id).await?;
    let details =
        db::condominiums::with_relations(&state.pool, rows, query.company_id.is_none()).await?;
    Ok(Json(details))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateCondominium>,
) -> Result<(StatusCode, Json<Condominium>), AppError> {
    auth.require_write(Area::Property)?;
    req.validate()?;
    auth.require_company(req.company_id)?;

    let condominium = db::condominiums::create(&state.pool, &req).await?;

    audit::log_event(
        &state.pool,
        &auth,
        "condominium.created",
        "condominium",
        Some(condominium.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(condominium)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CondominiumDetail>, AppError> {
    let condominium = db::condominiums::find_by_id(&state.pool, id, auth.scope())
        .await?
        .ok_or_else(|| AppError::not_found("Condominium", id))?;

    Ok(Json(detail(&state, condominium).await?))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCondominium>,
) -> Result<Json<CondominiumDetail>, AppError> {
    auth.require_write(Area::Property)?;
    req.validate()?;

    let mut condominium = db::condominiums::find_by_id(&state.pool, id, auth.scope())
        .await?
        .ok_or_else(|| AppError::not_found("Condominium", id))?;

    if let Some(company_id) = req.company_id {
        auth.require_company(company_id)?;
    }
    req.apply(&mut condominium);

    let condominium = db::condominiums::update(&state.pool, &condominium)
        .await?
        .ok_or_else(|| AppError::not_found("Condominium", id))?;

    audit::log_event(
        &state.pool,
        &auth,
        "condominium.updated",
        "condominium",
        Some(condominium.id),
    )
    .await;

    Ok(Json(detail(&state, condominium).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_write(Area::Property)?;

    db::condominiums::find_by_id(&state.pool, id, auth.scope())
        .await?
        .ok_or_else(|| AppError::not_found("Condominium", id))?;

    db::condominiums::delete(&state.pool, id).await?;

    audit::log_event(
        &state.pool,
        &auth,
        "condominium.deleted",
        "condominium",
        Some(id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
