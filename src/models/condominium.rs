use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Company, Document, Expense, Unit};

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Condominium {
    pub id: Uuid,
    pub company_id: Uuid,
    pub name: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    /// Declared size. Never checked against the actual unit count.
    pub total_units: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `company` is only attached on single-record and unscoped reads; listings
/// scoped by company leave it out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CondominiumDetail {
    #[serde(flatten)]
    pub condominium: Condominium,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<Company>,
    pub units: Vec<Unit>,
    pub expenses: Vec<Expense>,
    pub documents: Vec<Document>,
}
