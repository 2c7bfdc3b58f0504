use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::{InboxItem, InboxSource};

pub struct NewInboxItem<'a> {
    pub company_id: Uuid,
    pub source: InboxSource,
    pub email_message_id: Option<Uuid>,
    pub suggested_type: Option<&'a str>,
    pub extracted_data: Option<&'a Value>,
}

/// Items always start out `NEW`.
pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    item: NewInboxItem<'_>,
) -> Result<InboxItem, sqlx::Error> {
    sqlx::query_as::<_, InboxItem>(
        "INSERT INTO inbox_items (company_id, source, email_message_id, suggested_type, extracted_data)
         VALUES ($1, $2, $3, $4, $5) RETURNING *",
    )
    .bind(item.company_id)
    .bind(item.source)
    .bind(item.email_message_id)
    .bind(item.suggested_type)
    .bind(item.extracted_data)
    .fetch_one(executor)
    .await
}

/// Newest first.
pub async fn list_by_company(
    pool: &PgPool,
    company_id: Uuid,
) -> Result<Vec<InboxItem>, sqlx::Error> {
    sqlx::query_as::<_, InboxItem>(
        "SELECT * FROM inbox_items WHERE company_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(company_id)
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(
    pool: &PgPool,
    id: Uuid,
    scope: Option<Uuid>,
) -> Result<Option<InboxItem>, sqlx::Error> {
    sqlx::query_as::<_, InboxItem>(
        "SELECT * FROM inbox_items WHERE id = $1 AND ($2::uuid IS NULL OR company_id = $2)",
    )
    .bind(id)
    .bind(scope)
    .fetch_optional(pool)
    .await
}

pub async fn update(pool: &PgPool, item: &InboxItem) -> Result<Option<InboxItem>, sqlx::Error> {
    sqlx::query_as::<_, InboxItem>(
        "UPDATE inbox_items SET status = $2, linked_entity_type = $3, linked_entity_id = $4,
             updated_at = now()
         WHERE id = $1 RETURNING *",
    )
    .bind(item.id)
    .bind(item.status)
    .bind(&item.linked_entity_type)
    .bind(item.linked_entity_id)
    .fetch_optional(pool)
    .await
}
