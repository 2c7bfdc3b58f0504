pub mod audit;
pub mod auth;
pub mod companies;
pub mod condominiums;
pub mod documents;
pub mod expenses;
pub mod inbox;
pub mod owners;
pub mod payments;
pub mod units;
pub mod users;

use axum::routing::{get, post};
use axum::Router;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db;
use crate::error::AppError;
use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/v1/auth/bootstrap", post(auth::bootstrap))
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/refresh", post(auth::refresh))
        .route("/api/v1/auth/logout", post(auth::logout))
        .route("/api/v1/auth/me", get(auth::me))
        .route("/api/v1/auth/change-password", post(auth::change_password))
        // Companies
        .route(
            "/api/v1/companies",
            get(companies::list).post(companies::create),
        )
        .route(
            "/api/v1/companies/{id}",
            get(companies::get)
                .patch(companies::update)
                .delete(companies::delete),
        )
        // Users
        .route("/api/v1/users", get(users::list).post(users::create))
        .route(
            "/api/v1/users/{id}",
            get(users::get).patch(users::update).delete(users::delete),
        )
        // Condominiums
        .route(
            "/api/v1/condominiums",
            get(condominiums::list).post(condominiums::create),
        )
        .route(
            "/api/v1/condominiums/{id}",
            get(condominiums::get)
                .patch(condominiums::update)
                .delete(condominiums::delete),
        )
        // Units
        .route("/api/v1/units", get(units::list).post(units::create))
        .route(
            "/api/v1/units/{id}",
            get(units::get).patch(units::update).delete(units::delete),
        )
        .route(
            "/api/v1/units/{id}/owners/{owner_id}",
            post(units::add_owner).delete(units::remove_owner),
        )
        // Owners
        .route("/api/v1/owners", get(owners::list).post(owners::create))
        .route(
            "/api/v1/owners/{id}",
            get(owners::get).patch(owners::update).delete(owners::delete),
        )
        // Expenses
        .route(
            "/api/v1/expenses",
            get(expenses::list).post(expenses::create),
        )
        .route(
            "/api/v1/expenses/{id}",
            get(expenses::get)
                .patch(expenses::update)
                .delete(expenses::delete),
        )
        // Payments
        .route(
            "/api/v1/payments",
            get(payments::list).post(payments::create),
        )
        .route(
            "/api/v1/payments/{id}",
            get(payments::get)
                .patch(payments::update)
                .delete(payments::delete),
        )
        // Documents
        .route(
            "/api/v1/documents",
            get(documents::list).post(documents::create),
        )
        .route(
            "/api/v1/documents/{id}",
            get(documents::get)
                .patch(documents::update)
                .delete(documents::delete),
        )
        // Inbox
        .route(
            "/api/v1/email-messages",
            get(inbox::list_email_messages).post(inbox::receive_email),
        )
        .route("/api/v1/inbox", post(inbox::create))
        .route("/api/v1/inbox/{id}", get(inbox::list).patch(inbox::update))
        // Audit
        .route("/api/v1/audit", get(audit::list))
}

// Parent checks for bodies that point at another record. Admins skip them and
// rely on the foreign keys; everyone else gets NotFound for anything outside
// their company.

pub(crate) async fn ensure_condominium(
    state: &SharedState,
    auth: &AuthUser,
    id: Uuid,
) -> Result<(), AppError> {
    if let Some(scope) = auth.scope() {
        db::condominiums::find_by_id(&state.pool, id, Some(scope))
            .await?
            .ok_or_else(|| AppError::not_found("Condominium", id))?;
    }
    Ok(())
}

pub(crate) async fn ensure_unit(
    state: &SharedState,
    auth: &AuthUser,
    id: Uuid,
) -> Result<(), AppError> {
    if let Some(scope) = auth.scope() {
        db::units::find_by_id(&state.pool, id, Some(scope))
            .await?
            .ok_or_else(|| AppError::not_found("Unit", id))?;
    }
    Ok(())
}

pub(crate) async fn ensure_expense(
    state: &SharedState,
    auth: &AuthUser,
    id: Option<Uuid>,
) -> Result<(), AppError> {
    if let (Some(scope), Some(id)) = (auth.scope(), id) {
        db::expenses::find_by_id(&state.pool, id, Some(scope))
            .await?
            .ok_or_else(|| AppError::not_found("Expense", id))?;
    }
    Ok(())
}
