use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Condominium, Document, ExpenseType, Payment};

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    pub condominium_id: Uuid,
    pub title: String,
    pub description: Option<String>,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub expense_type: ExpenseType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseDetail {
    #[serde(flatten)]
    pub expense: Expense,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condominium: Option<Condominium>,
    pub payments: Vec<Payment>,
    pub documents: Vec<Document>,
}
