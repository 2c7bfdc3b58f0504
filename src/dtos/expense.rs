use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{double_option, merge};
use crate::models::{Expense, ExpenseType};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpense {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    pub description: Option<String>,
    pub amount: f64,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub expense_type: ExpenseType,
    pub condominium_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateExpense {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub expense_type: Option<ExpenseType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condominium_id: Option<Uuid>,
}

impl UpdateExpense {
    pub fn apply(self, expense: &mut Expense) {
        merge(&mut expense.title, self.title);
        merge(&mut expense.description, self.description);
        merge(&mut expense.amount, self.amount);
        merge(&mut expense.date, self.date);
        merge(&mut expense.expense_type, self.expense_type);
        merge(&mut expense.condominium_id, self.condominium_id);
    }
}
