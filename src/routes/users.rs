use axum::extract::State;
use axum::http::StatusCode;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::auth::extractor::{Area, AuthUser};
use crate::auth::password;
use crate::db;
use crate::db::users::NewUser;
use crate::dtos::{CreateUser, UpdateUser};
use crate::error::AppError;
use crate::extract::{Json, Path, Query};
use crate::middleware::audit;
use crate::models::{Role, User, UserDetail};
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub company_id: Option<Uuid>,
}

fn email_taken(e: sqlx::Error) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
            AppError::Conflict("A user with this email already exists".to_string())
        }
        _ => AppError::from(e),
    }
}

fn check_grant(auth: &AuthUser, role: Role) -> Result<(), AppError> {
    if role == Role::Admin {
        auth.require_admin()?;
    }
    Ok(())
}

async fn detail(state: &SharedState, user: User) -> Result<UserDetail, AppError> {
    let company = db::companies::find_by_id(&state.pool, user.company_id, None)
        .await?
        .ok_or_else(|| AppError::not_found("Company", user.company_id))?;
    Ok(UserDetail { user, company })
}

pub async fn list(
    auth: AuthUser,
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<User>>, AppError> {
    let users = db::users::list(&state.pool, auth.scope(), query.company_id).await?;
    Ok(Json(users))
}

pub async fn create(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<CreateUser>,
) -> Result<(StatusCode, Json<User>), AppError> {
    auth.require_write(Area::Staff)?;
    req.validate()?;
    auth.require_company(req.company_id)?;

    let role = req.role.unwrap_or(Role::Manager);
    check_grant(&auth, role)?;

    let pw_hash = password::hash(&req.password)?;

    let user = db::users::create(
        &state.pool,
        NewUser {
            company_id: req.company_id,
            first_name: &req.first_name,
            last_name: &req.last_name,
            email: &req.email,
            password_hash: &pw_hash,
            role,
            is_active: req.is_active.unwrap_or(true),
        },
    )
    .await
    .map_err(email_taken)?;

    audit::log_event(
        &state.pool,
        &auth,
        "user.created",
        "user",
        Some(user.id),
    )
    .await;

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn get(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<UserDetail>, AppError> {
    let user = db::users::find_by_id(&state.pool, id, auth.scope())
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;

    Ok(Json(detail(&state, user).await?))
}

pub async fn update(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUser>,
) -> Result<Json<UserDetail>, AppError> {
    auth.require_write(Area::Staff)?;
    req.validate()?;

    let mut user = db::users::find_by_id(&state.pool, id, auth.scope())
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;

    if let Some(company_id) = req.company_id {
        auth.require_company(company_id)?;
    }
    if let Some(role) = req.role {
        check_grant(&auth, role)?;
    }
    // Demoting an admin is an admin decision too.
    if user.role == Role::Admin {
        auth.require_admin()?;
    }

    req.apply(&mut user);
    let user = db::users::update(&state.pool, &user)
        .await
        .map_err(email_taken)?
        .ok_or_else(|| AppError::not_found("User", id))?;

    audit::log_event(
        &state.pool,
        &auth,
        "user.updated",
        "user",
        Some(user.id),
    )
    .await;

    Ok(Json(detail(&state, user).await?))
}

pub async fn delete(
    auth: AuthUser,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    auth.require_write(Area::Staff)?;

    let user = db::users::find_by_id(&state.pool, id, auth.scope())
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;

    if user.role == Role::Admin {
        auth.require_admin()?;
    }
    if user.id == auth.user_id {
        return Err(AppError::BadRequest(
            "You cannot delete your own account".to_string(),
        ));
    }

    db::users::delete(&state.pool, id).await?;

    audit::log_event(
        &state.pool,
        &auth,
        "user.deleted",
        "user",
        Some(id),
    )
    .await;

    Ok(StatusCode::NO_CONTENT)
}
