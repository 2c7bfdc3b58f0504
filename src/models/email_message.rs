use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::EmailProvider;

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailMessage {
    pub id: Uuid,
    pub company_id: Uuid,
    pub provider: EmailProvider,
    #[serde(rename = "from")]
    pub from_address: String,
    #[serde(rename = "to")]
    pub to_address: String,
    pub subject: Option<String>,
    pub body_text: String,
    pub body_html: Option<serde_json::Value>,
    pub external_message_id: Option<String>,
    pub received_at: DateTime<Utc>,
}
