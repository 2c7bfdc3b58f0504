use axum::extract::State;
use axum::http::StatusCode;
use axum_extra::extract::cookie::{Cookie, SameSite};
use axum_extra::extract::CookieJar;
use chrono::{Duration, Utc};
use sha2::{Digest, Sha256};
use validator::Validate;

use crate::auth::extractor::AuthUser;
use crate::auth::jwt::{encode_token, Claims, ACCESS_TOKEN_MINUTES};
use crate::auth::password;
use crate::db;
use crate::db::audit::NewAuditEvent;
use crate::db::users::NewUser;
use crate::dtos::{
    AuthResponse, BootstrapRequest, ChangePasswordRequest, CreateCompany, LoginRequest,
    RefreshRequest,
};
use crate::error::AppError;
use crate::extract::Json;
use crate::middleware::audit;
use crate::models::{Role, User, UserDetail};
use crate::state::SharedState;

const REFRESH_TOKEN_DAYS: i64 = 7;

fn auth_cookies(access_token: &str, refresh_token: &str) -> CookieJar {
    let access = Cookie::build(("access_token", access_token.to_string()))
        .path("/")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Lax)
        .max_age(time::Duration::minutes(ACCESS_TOKEN_MINUTES))
        .build();

    let refresh = Cookie::build(("refresh_token", refresh_token.to_string()))
        .path("/api/v1/auth")
        .http_only(true)
        .secure(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::days(REFRESH_TOKEN_DAYS))
        .build();

    CookieJar::new().add(access).add(refresh)
}

fn clear_auth_cookies() -> CookieJar {
    let access = Cookie::build(("access_token", ""))
        .path("/")
        .max_age(time::Duration::ZERO)
        .build();
    let refresh = Cookie::build(("refresh_token", ""))
        .path("/api/v1/auth")
        .max_age(time::Duration::ZERO)
        .build();
    CookieJar::new().add(access).add(refresh)
}

fn generate_refresh_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Body token first, then the cookie.
fn presented_refresh_token(
    jar: &CookieJar,
    body: Option<axum::Json<RefreshRequest>>,
) -> Option<String> {
    body.and_then(|axum::Json(req)| req.refresh_token)
        .or_else(|| jar.get("refresh_token").map(|c| c.value().to_string()))
}

/// Mint an access token and a fresh refresh token for `user`.
async fn issue_tokens(
    state: &SharedState,
    user: &User,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let claims = Claims::new(user.id, user.company_id, user.role);
    let access_token =
        encode_token(&claims, &state.config.jwt_secret).map_err(AppError::Internal)?;

    let refresh = generate_refresh_token();
    db::refresh_tokens::create(
        &state.pool,
        user.id,
        &hash_token(&refresh),
        Utc::now() + Duration::days(REFRESH_TOKEN_DAYS),
    )
    .await?;

    let jar = auth_cookies(&access_token, &refresh);
    Ok((
        jar,
        Json(AuthResponse {
            access_token,
            refresh_token: refresh,
        }),
    ))
}

/// Inactive users and users of inactive companies may not hold a session.
async fn ensure_active(state: &SharedState, user: &User) -> Result<(), AppError> {
    let company = db::companies::find_by_id(&state.pool, user.company_id, None).await?;
    let company_active = company.map(|c| c.is_active).unwrap_or(false);
    if !user.is_active || !company_active {
        return Err(AppError::Unauthorized("Account is disabled".to_string()));
    }
    Ok(())
}

/// First-run setup: creates the initial company and its administrator.
pub async fn bootstrap(
    State(state): State<SharedState>,
    Json(req): Json<BootstrapRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), AppError> {
    req.validate()?;

    let pw_hash = password::hash(&req.password)?;

    // Advisory lock prevents concurrent bootstrap requests
    let mut tx = state.pool.begin().await?;
    sqlx::query("SELECT pg_advisory_xact_lock(1)")
        .execute(&mut *tx)
        .await?;

    let count = db::users::count_all(&mut *tx).await?;
    if count > 0 {
        return Err(AppError::Forbidden(
            "This installation is already set up".to_string(),
        ));
    }

    let company = db::companies::create(
        &mut *tx,
        &CreateCompany {
            name: req.company_name.clone(),
            vat_number: None,
            email: req.company_email.clone(),
            phone: None,
            address: None,
            is_active: Some(true),
        },
    )
    .await?;

    let user = db::users::create(
        &mut *tx,
        NewUser {
            company_id: company.id,
            first_name: &req.first_name,
            last_name: &req.last_name,
            email: &req.email,
            password_hash: &pw_hash,
            role: Role::Admin,
            is_active: true,
        },
    )
    .await?;

    tx.commit().await?;

    tracing::info!(company_id = %company.id, user_id = %user.id, "Installation bootstrapped");

    audit::record(
        &state.pool,
        NewAuditEvent {
            company_id: company.id,
            user_id: Some(user.id),
            action: "auth.bootstrapped",
            resource_type: "user",
            resource_id: Some(user.id),
            details: None,
        },
    )
    .await;

    let (jar, body) = issue_tokens(&state, &user).await?;
    Ok((StatusCode::CREATED, jar, body))
}

pub async fn login(
    State(state): State<SharedState>,
    Json(req): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    if let Err(retry_after) = state.login_limiter.check(&req.email) {
        return Err(AppError::RateLimited(format!(
            "Too many login attempts. Try again in {retry_after} seconds."
        )));
    }

    let user = match db::users::find_by_email(&state.pool, &req.email).await? {
        Some(user) if password::verify(&req.password, &user.password_hash) => user,
        _ => {
            state.login_limiter.record_failure(&req.email);
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }
    };

    ensure_active(&state, &user).await?;
    state.login_limiter.reset(&req.email);

    audit::record(
        &state.pool,
        NewAuditEvent {
            company_id: user.company_id,
            user_id: Some(user.id),
            action: "auth.login",
            resource_type: "user",
            resource_id: Some(user.id),
            details: None,
        },
    )
    .await;

    issue_tokens(&state, &user).await
}

pub async fn refresh(
    State(state): State<SharedState>,
    jar: CookieJar,
    body: Option<axum::Json<RefreshRequest>>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    let refresh_value = presented_refresh_token(&jar, body)
        .ok_or_else(|| AppError::Unauthorized("Missing refresh token".to_string()))?;

    let stored = db::refresh_tokens::find_by_hash(&state.pool, &hash_token(&refresh_value))
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid refresh token".to_string()))?;

    if stored.expires_at < Utc::now() {
        return Err(AppError::Unauthorized("Refresh token expired".to_string()));
    }

    if stored.used || !db::refresh_tokens::consume(&state.pool, stored.id).await? {
        tracing::warn!(
            user_id = %stored.user_id,
            "Refresh token reuse detected, revoking all sessions"
        );
        db::refresh_tokens::delete_all_for_user(&state.pool, stored.user_id).await?;
        return Err(AppError::Unauthorized(
            "Refresh token reuse detected. All sessions revoked.".to_string(),
        ));
    }

    let user = db::users::find_by_id_unscoped(&state.pool, stored.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;
    ensure_active(&state, &user).await?;

    issue_tokens(&state, &user).await
}

pub async fn logout(
    State(state): State<SharedState>,
    jar: CookieJar,
    body: Option<axum::Json<RefreshRequest>>,
) -> Result<(CookieJar, StatusCode), AppError> {
    if let Some(token) = presented_refresh_token(&jar, body) {
        db::refresh_tokens::delete_by_hash(&state.pool, &hash_token(&token)).await?;
    }

    Ok((clear_auth_cookies(), StatusCode::NO_CONTENT))
}

pub async fn me(
    auth: AuthUser,
    State(state): State<SharedState>,
) -> Result<Json<UserDetail>, AppError> {
    let user = db::users::find_by_id_unscoped(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;
    let company = db::companies::find_by_id(&state.pool, user.company_id, None)
        .await?
        .ok_or_else(|| AppError::not_found("Company", user.company_id))?;

    Ok(Json(UserDetail { user, company }))
}

pub async fn change_password(
    auth: AuthUser,
    State(state): State<SharedState>,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), AppError> {
    req.validate()?;

    let user = db::users::find_by_id_unscoped(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))?;

    if !password::verify(&req.current_password, &user.password_hash) {
        return Err(AppError::Unauthorized(
            "Current password is incorrect".to_string(),
        ));
    }

    let pw_hash = password::hash(&req.new_password)?;
    db::users::update_password(&state.pool, user.id, &pw_hash).await?;

    // Every other session goes
    db::refresh_tokens::delete_all_for_user(&state.pool, user.id).await?;

    audit::log_event(
        &state.pool,
        &auth,
        "auth.password_changed",
        "user",
        Some(user.id),
    )
    .await;

    issue_tokens(&state, &user).await
}
