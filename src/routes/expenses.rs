use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::extractor::{Area, AuthUser};
use crate::db;
use crate::dtos::{CreateExpense, UpdateExpense};
use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::middleware::audit;
use crate::models::{Expense, ExpenseDetail};
use crate::routes::ensure_condominium;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub condominium_id: Option<Uuid>,
}

async fn detail(state: &SharedState, expense: Expense) -> Result<ExpenseDetail, AppError> {
    let id = expense.id;
    db::expenses::with_relations(&state.pool, vec![expense], true)
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("Expense", id))
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<ExpenseDetail>>, AppError> {
    let rows = db::expenses::list(&state.pool, auth.scope(), query.condominium_id).await?;
    let details =
        db::expenses::with_relations(&state.pool, rows, query.condominium_id.is_none()).await?;
    Ok(Json(details))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateExpense>,
) -> Result<(StatusCode, Json<Expense>), AppError> {
    auth.require_write(Area::Finance)?;
    req.validate()?;
    ensure_condominium(&state, &auth, req.condominium_id).await?;

    let expense = db::expenses::create(&state.pool, &req).await?;

    audit::log_event(
        &state.pool,
        &auth,
        "expense.created",
        "expense",
        Some(expense.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(expense)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ExpenseDetail>, AppError> {
    let expense = db::expenses::find_by_id(&state.pool, id, auth.scope())
        .await?
        .ok_or_else(|| AppError::not_found("Expense", id))?;

    Ok(Json(detail(&state, expense).await?))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateExpense>,
) -> Result<Json<ExpenseDetail>, AppError> {
    auth.require_write(Area::Finance)?;
    req.validate()?;

    let mut expense = db::expenses::find_by_id(&state.pool, id, auth.scope())
        .await?
        .ok_or_else(|| AppError::not_found("Expense", id))?;

    if let Some(condominium_id) = req.condominium_id {
        ensure_condominium(&state, &auth, condominium_id).await?;
    }
    req.apply(&mut expense);

    let expense = db::expenses::update(&state.pool, &expense)
        .await?
        .ok_or_else(|| AppError::not_found("Expense", id))?;

    audit::log_event(
        &state.pool,
        &auth,
        "expense.updated",
        "expense",
        Some(expense.id),
    )
    .await;

    Ok(Json(detail(&state, expense).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_write(Area::Finance)?;

    db::expenses::find_by_id(&state.pool, id, auth.scope())
        .await?
        .ok_or_else(|| AppError::not_found("Expense", id))?;

    db::expenses::delete(&state.pool, id).await?;

    audit::log_event(&state.pool, &auth, "expense.deleted", "expense", Some(id)).await;

    Ok(StatusCode::NO_CONTENT)
}
