use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::CookieJar;
use uuid::Uuid;

use crate::auth::jwt;
use crate::error::AppError;
use crate::models::Role;
use crate::state::SharedState;

/// Groups of resources that share a write policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Area {
    /// Users of a company.
    Staff,
    /// Condominiums and units, including unit membership.
    Property,
    Owners,
    /// Expenses, payments, documents.
    Finance,
    Inbox,
}

impl Role {
    /// Write policy. Reads are allowed to every role within its scope.
    pub fn can_write(self, area: Area) -> bool {
        match self {
            Role::Admin | Role::Manager => true,
            Role::Accountant => area == Area::Finance,
        }
    }
}

/// The authenticated principal of a request.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: Uuid,
    pub company_id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Company filter for queries. `None` means every company.
    pub fn scope(&self) -> Option<Uuid> {
        if self.is_admin() {
            None
        } else {
            Some(self.company_id)
        }
    }

    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(AppError::Forbidden("Admin access required".to_string()))
        }
    }

    /// ADMIN or MANAGER.
    pub fn require_manager(&self) -> Result<(), AppError> {
        match self.role {
            Role::Admin | Role::Manager => Ok(()),
            Role::Accountant => Err(AppError::Forbidden(
                "Manager access required".to_string(),
            )),
        }
    }

    pub fn require_write(&self, area: Area) -> Result<(), AppError> {
        if self.role.can_write(area) {
            Ok(())
        } else {
            Err(AppError::Forbidden(format!(
                "Role {} may not modify this resource",
                self.role.as_str()
            )))
        }
    }

    /// Reject writes that target a company outside the principal's scope.
    pub fn require_company(&self, company_id: Uuid) -> Result<(), AppError> {
        if self.is_admin() || self.company_id == company_id {
            Ok(())
        } else {
            Err(AppError::Forbidden(
                "Access to this company is not allowed".to_string(),
            ))
        }
    }

    fn from_claims(claims: jwt::Claims) -> Self {
        AuthUser {
            user_id: claims.sub,
            company_id: claims.cid,
            role: claims.role,
        }
    }
}

impl FromRequestParts<SharedState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &SharedState,
    ) -> Result<Self, Self::Rejection> {
        // Try Bearer token from Authorization header first
        if let Some(auth_header) = parts.headers.get("authorization") {
            let auth_str = auth_header
                .to_str()
                .map_err(|_| AppError::Unauthorized("Invalid authorization header".to_string()))?;

            if let Some(token) = auth_str.strip_prefix("Bearer ") {
                let claims = jwt::decode_token(token, &state.config.jwt_secret)
                    .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;
                return Ok(AuthUser::from_claims(claims));
            }
        }

        // Dashboard sessions carry the token in a cookie
        let jar = CookieJar::from_headers(&parts.headers);
        if let Some(cookie) = jar.get("access_token") {
            let claims = jwt::decode_token(cookie.value(), &state.config.jwt_secret)
                .map_err(|_| AppError::Unauthorized("Invalid or expired token".to_string()))?;
            return Ok(AuthUser::from_claims(claims));
        }

        Err(AppError::Unauthorized(
            "Missing authentication token".to_string(),
        ))
    }
}
