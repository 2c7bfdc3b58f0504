use sqlx::PgPool;
use uuid::Uuid;

use crate::models::AuditEvent;

pub struct NewAuditEvent<'a> {
    pub company_id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: &'a str,
    pub resource_type: &'a str,
    pub resource_id: Option<Uuid>,
    pub details: Option<serde_json::Value>,
}

pub async fn insert(pool: &PgPool, event: NewAuditEvent<'_>) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO audit_events (company_id, user_id, action, resource_type, resource_id, details)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(event.company_id)
    .bind(event.user_id)
    .bind(event.action)
    .bind(event.resource_type)
    .bind(event.resource_id)
    .bind(event.details)
    .execute(pool)
    .await?;
    Ok(())
}

/// Newest first. `scope` of `None` lists every company.
pub async fn list(
    pool: &PgPool,
    scope: Option<Uuid>,
    limit: i64,
    offset: i64,
) -> Result<Vec<AuditEvent>, sqlx::Error> {
    sqlx::query_as::<_, AuditEvent>(
        "SELECT * FROM audit_events WHERE ($1::uuid IS NULL OR company_id = $1)
         ORDER BY created_at DESC, id DESC LIMIT $2 OFFSET $3",
    )
    .bind(scope)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await
}
