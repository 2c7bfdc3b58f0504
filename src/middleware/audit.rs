use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::extractor::AuthUser;
use crate::db::audit::{self, NewAuditEvent};

/// Record a mutation made by `actor` under the actor's company. Called
/// explicitly in handlers after the write succeeds; failures are logged and
/// never surface to the client.
pub async fn log_event(
    pool: &PgPool,
    actor: &AuthUser,
    action: &str,
    resource_type: &str,
    resource_id: Option<Uuid>,
) {
    record(
        pool,
        NewAuditEvent {
            company_id: actor.company_id,
            user_id: Some(actor.user_id),
            action,
            resource_type,
            resource_id,
            details: None,
        },
    )
    .await;
}

pub async fn record(pool: &PgPool, event: NewAuditEvent<'_>) {
    if let Err(e) = audit::insert(pool, event).await {
        tracing::error!("Failed to log audit event: {e}");
    }
}
