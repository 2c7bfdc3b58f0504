use sqlx::PgPool;
use uuid::Uuid;

use crate::dtos::CreateEmailMessage;
use crate::models::EmailMessage;

pub async fn create<'e, E: sqlx::PgExecutor<'e>>(
    executor: E,
    req: &CreateEmailMessage,
) -> Result<EmailMessage, sqlx::Error> {
    sqlx::query_as::<_, EmailMessage>(
        "INSERT INTO email_messages
             (company_id, provider, from_address, to_address, subject, body_text, body_html,
              external_message_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING *",
    )
    .bind(req.company_id)
    .bind(req.provider)
    .bind(&req.from)
    .bind(&req.to)
    .bind(&req.subject)
    .bind(&req.body_text)
    .bind(&req.body_html)
    .bind(&req.external_message_id)
    .fetch_one(executor)
    .await
}

/// Newest first.
pub async fn list_by_company(
    pool: &PgPool,
    company_id: Uuid,
) -> Result<Vec<EmailMessage>, sqlx::Error> {
    sqlx::query_as::<_, EmailMessage>(
        "SELECT * FROM email_messages WHERE company_id = $1 ORDER BY received_at DESC, id DESC",
    )
    .bind(company_id)
    .fetch_all(pool)
    .await
}
