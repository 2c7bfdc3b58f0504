use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Condominium, Expense};

/// Metadata for a stored file. Only the path and MIME type are kept here.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: Uuid,
    pub condominium_id: Uuid,
    pub expense_id: Option<Uuid>,
    pub title: String,
    pub file_path: String,
    pub mime_type: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDetail {
    #[serde(flatten)]
    pub document: Document,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condominium: Option<Condominium>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expense: Option<Expense>,
}
