//! Email sink and the triage inbox fed by it.

use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::extractor::{Area, AuthUser};
use crate::db;
use crate::db::inbox_items::NewInboxItem;
use crate::dtos::{CreateEmailMessage, CreateInboxItem, UpdateInboxItem};
use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::middleware::audit;
use crate::models::{EmailMessage, InboxItem, InboxSource};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailQuery {
    pub company_id: Option<Uuid>,
}

async fn visible_company(
    state: &SharedState,
    auth: &AuthUser,
    company_id: Uuid,
) -> Result<(), AppError> {
    db::companies::find_by_id(&state.pool, company_id, auth.scope())
        .await?
        .ok_or_else(|| AppError::not_found("Company", company_id))?;
    Ok(())
}

/// Store an inbound email and open a `NEW` inbox item pointing at it.
pub async fn receive_email(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateEmailMessage>,
) -> Result<(StatusCode, Json<InboxItem>), AppError> {
    auth.require_write(Area::Inbox)?;
    req.validate()?;
    auth.require_company(req.company_id)?;

    let mut tx = state.pool.begin().await?;
    let message = db::email_messages::create(&mut *tx, &req).await?;
    let item = db::inbox_items::create(
        &mut *tx,
        NewInboxItem {
            company_id: message.company_id,
            source: InboxSource::Email,
            email_message_id: Some(message.id),
            suggested_type: None,
            extracted_data: None,
        },
    )
    .await?;
    tx.commit().await?;

    tracing::debug!(
        message_id = %message.id,
        inbox_item_id = %item.id,
        "Email message received"
    );

    audit::log_event(
        &state.pool,
        &auth,
        "email_message.received",
        "email_message",
        Some(message.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(item)))
}

/// Defaults to the caller's own company.
pub async fn list_email_messages(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<EmailQuery>,
) -> Result<Json<Vec<EmailMessage>>, AppError> {
    let company_id = query.company_id.unwrap_or(auth.company_id);
    visible_company(&state, &auth, company_id).await?;

    let messages = db::email_messages::list_by_company(&state.pool, company_id).await?;
    Ok(Json(messages))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateInboxItem>,
) -> Result<(StatusCode, Json<InboxItem>), AppError> {
    auth.require_write(Area::Inbox)?;
    req.validate()?;
    auth.require_company(req.company_id)?;

    let item = db::inbox_items::create(
        &state.pool,
        NewInboxItem {
            company_id: req.company_id,
            source: InboxSource::Manual,
            email_message_id: None,
            suggested_type: req.suggested_type.as_deref(),
            extracted_data: req.extracted_data.as_ref(),
        },
    )
    .await?;

    audit::log_event(
        &state.pool,
        &auth,
        "inbox_item.created",
        "inbox_item",
        Some(item.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(item)))
}

/// Items of one company, newest first.
pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(company_id): Path<Uuid>,
) -> Result<Json<Vec<InboxItem>>, AppError> {
    visible_company(&state, &auth, company_id).await?;

    let items = db::inbox_items::list_by_company(&state.pool, company_id).await?;
    Ok(Json(items))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateInboxItem>,
) -> Result<Json<InboxItem>, AppError> {
    auth.require_write(Area::Inbox)?;
    req.validate()?;

    let mut item = db::inbox_items::find_by_id(&state.pool, id, auth.scope())
        .await?
        .ok_or_else(|| AppError::not_found("InboxItem", id))?;
    req.apply(&mut item);

    let item = db::inbox_items::update(&state.pool, &item)
        .await?
        .ok_or_else(|| AppError::not_found("InboxItem", id))?;

    audit::log_event(
        &state.pool,
        &auth,
        "inbox_item.updated",
        "inbox_item",
        Some(item.id),
    )
    .await;

    Ok(Json(item))
}
