use axum::extract::State;
use axum::http::StatusCode;
use uuid::Uuid;
use validator::Validate;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::dtos::{CreateCompany, UpdateCompany};
use crate::error::AppError;
use crate::extract::{Json, Path};
use crate::middleware::audit;
use crate::models::{Company, CompanyDetail};
use crate::state::SharedState;

async fn detail(state: &SharedState, company: Company) -> Result<CompanyDetail, AppError> {
    let ids = [company.id];
    let users = db::users::list_by_companies(&state.pool, &ids).await?;
    let condominiums = db::condominiums::list_by_companies(&state.pool, &ids).await?;
    Ok(CompanyDetail {
        company,
        users,
        condominiums,
    })
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<Vec<Company>>, AppError> {
    let companies = db::companies::list(&state.pool, auth.scope()).await?;
    Ok(Json(companies))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateCompany>,
) -> Result<(StatusCode, Json<Company>), AppError> {
    auth.require_admin()?;
    req.validate()?;

    let company = db::companies::create(&state.pool, &req).await?;

    audit::log_event(
        &state.pool,
        &auth,
        "company.created",
        "company",
        Some(company.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(company)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompanyDetail>, AppError> {
    let company = db::companies::find_by_id(&state.pool, id, auth.scope())
        .await?
        .ok_or_else(|| AppError::not_found("Company", id))?;

    Ok(Json(detail(&state, company).await?))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateCompany>,
) -> Result<Json<CompanyDetail>, AppError> {
    auth.require_manager()?;
    req.validate()?;

    let mut company = db::companies::find_by_id(&state.pool, id, auth.scope())
        .await?
        .ok_or_else(|| AppError::not_found("Company", id))?;
    req.apply(&mut company);

    let company = db::companies::update(&state.pool, &company)
        .await?
        .ok_or_else(|| AppError::not_found("Company", id))?;

    audit::log_event(
        &state.pool,
        &auth,
        "company.updated",
        "company",
        Some(company.id),
    )
    .await;

    Ok(Json(detail(&state, company).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_admin()?;

    db::companies::find_by_id(&state.pool, id, None)
        .await?
        .ok_or_else(|| AppError::not_found("Company", id))?;

    db::companies::delete(&state.pool, id).await?;

    // The company's own trail is gone with it.
    if id != auth.company_id {
        audit::log_event(
            &state.pool,
            &auth,
            "company.deleted",
            "company",
            Some(id),
        )
        .await;
    }

    Ok(StatusCode::NO_CONTENT)
}
