use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{InboxItemStatus, InboxSource};

/// A triage candidate. `linked_entity_*` is an untyped pointer and is never
/// checked against real rows.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InboxItem {
    pub id: Uuid,
    pub company_id: Uuid,
    pub source: InboxSource,
    pub email_message_id: Option<Uuid>,
    pub status: InboxItemStatus,
    pub suggested_type: Option<String>,
    pub extracted_data: Option<serde_json::Value>,
    pub linked_entity_type: Option<String>,
    pub linked_entity_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
