use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::extractor::{Area, AuthUser};
use crate::db;
use crate::dtos::{CreatePayment, UpdatePayment};
use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::middleware::audit;
use crate::models::{Payment, PaymentDetail};
use crate::routes::{ensure_expense, ensure_unit};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub unit_id: Option<Uuid>,
    pub expense_id: Option<Uuid>,
}

async fn detail(state: &SharedState, payment: Payment) -> Result<PaymentDetail, AppError> {
    let id = payment.id;
    db::payments::with_relations(&state.pool, vec![payment], true, true)
        .await?
        .pop()
        .ok_or_else(|| AppError::not_found("Payment", id))
}

/// A listing narrowed by unit leaves the unit off each payment, and likewise
/// for the expense.
pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<PaymentDetail>>, AppError> {
    let rows = db::payments::list(&state.pool, auth.scope(), query.unit_id, query.expense_id)
        .await?;
    let details = db::payments::with_relations(
        &state.pool,
        rows,
        query.unit_id.is_none(),
        query.expense_id.is_none(),
    )
    .await?;
    Ok(Json(details))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreatePayment>,
) -> Result<(StatusCode, Json<Payment>), AppError> {
    auth.require_write(Area::Finance)?;
    req.validate()?;
    ensure_unit(&state, &auth, req.unit_id).await?;
    ensure_expense(&state, &auth, req.expense_id).await?;

    let payment = db::payments::create(&state.pool, &req).await?;

    audit::log_event(
        &state.pool,
        &auth,
        "payment.created",
        "payment",
        Some(payment.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PaymentDetail>, AppError> {
    let payment = db::payments::find_by_id(&state.pool, id, auth.scope())
        .await?
        .ok_or_else(|| AppError::not_found("Payment", id))?;

    Ok(Json(detail(&state, payment).await?))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdatePayment>,
) -> Result<Json<PaymentDetail>, AppError> {
    auth.require_write(Area::Finance)?;
    req.validate()?;

    let mut payment = db::payments::find_by_id(&state.pool, id, auth.scope())
        .await?
        .ok_or_else(|| AppError::not_found("Payment", id))?;

    if let Some(unit_id) = req.unit_id {
        ensure_unit(&state, &auth, unit_id).await?;
    }
    if let Some(expense_id) = req.expense_id {
        ensure_expense(&state, &auth, expense_id).await?;
    }
    req.apply(&mut payment);

    let payment = db::payments::update(&state.pool, &payment)
        .await?
        .ok_or_else(|| AppError::not_found("Payment", id))?;

    audit::log_event(
        &state.pool,
        &auth,
        "payment.updated",
        "payment",
        Some(payment.id),
    )
    .await;

    Ok(Json(detail(&state, payment).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_write(Area::Finance)?;

    db::payments::find_by_id(&state.pool, id, auth.scope())
        .await?
        .ok_or_else(|| AppError::not_found("Payment", id))?;

    db::payments::delete(&state.pool, id).await?;

    audit::log_event(&state.pool, &auth, "payment.deleted", "payment", Some(id)).await;

    Ok(StatusCode::NO_CONTENT)
}
