use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::extractor::{Area, AuthUser};
use crate::db;
use crate::dtos::{CreateDocument, UpdateDocument};
use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::middleware::audit;
use crate::models::{Document, DocumentDetail};
use crate::routes::{ensure_condominium, ensure_expense};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub condominium_id: Option<Uuid>,
    pub expense_id: Option<Uuid>,
}

async fn detail(state: &SharedState, document: Document) -> Result<DocumentDetail, AppError> {
    let id = document.id;
    db::documents::with_relations(&state.pool, vec![document], true, true)
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("Document", id))
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<DocumentDetail>>, AppError> {
    let rows = db::documents::list(
        &state.pool,
        auth.scope(),
        query.condominium_id,
        query.expense_id,
    )
    .await?;
    let details = db::documents::with_relations(
        &state.pool,
        rows,
        query.condominium_id.is_none(),
        query.expense_id.is_none(),
    )
    .await?;
    Ok(Json(details))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateDocument>,
) -> Result<(StatusCode, Json<Document>), AppError> {
    auth.require_write(Area::Finance)?;
    req.validate()?;
    ensure_condominium(&state, &auth, req.condominium_id).await?;
    ensure_expense(&state, &auth, req.expense_id).await?;

    let document = db::documents::create(&state.pool, &req).await?;

    audit::log_event(
        &state.pool,
        &auth,
        "document.created",
        "document",
        Some(document.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(document)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DocumentDetail>, AppError> {
    let document = db::documents::find_by_id(&state.pool, id, auth.scope())
        .await?
        .ok_or_else(|| AppError::not_found("Document", id))?;

    Ok(Json(detail(&state, document).await?))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateDocument>,
) -> Result<Json<DocumentDetail>, AppError> {
    auth.require_write(Area::Finance)?;
    req.validate()?;

    let mut document = db::documents::find_by_id(&state.pool, id, auth.scope())
        .await?
        .ok_or_else(|| AppError::not_found("Document", id))?;

    if let Some(condominium_id) = req.condominium_id {
        ensure_condominium(&state, &auth, condominium_id).await?;
    }
    if let Some(expense_id) = req.expense_id {
        ensure_expense(&state, &auth, expense_id).await?;
    }
    req.apply(&mut document);

    let document = db::documents::update(&state.pool, &document)
        .await?
        .ok_or_else(|| AppError::not_found("Document", id))?;

    audit::log_event(
        &state.pool,
        &auth,
        "document.updated",
        "document",
        Some(document.id),
    )
    .await;

    Ok(Json(detail(&state, document).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_write(Area::Finance)?;

    db::documents::find_by_id(&state.pool, id, auth.scope())
        .await?
        .ok_or_else(|| AppError::not_found("Document", id))?;

    db::documents::delete(&state.pool, id).await?;

    audit::log_event(&state.pool, &auth, "document.deleted", "document", Some(id)).await;

    Ok(StatusCode::NO_CONTENT)
}
