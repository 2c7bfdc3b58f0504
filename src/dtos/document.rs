use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{double_option, merge};
use crate::models::Document;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocument {
    #[validate(length(min = 1, max = 255))]
    pub title: String,
    #[validate(length(min = 1, max = 500))]
    pub file_path: String,
    #[validate(length(min = 1, max = 100))]
    pub mime_type: String,
    pub condominium_id: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expense_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255))]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 500))]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condominium_id: Option<Uuid>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub expense_id: Option<Option<Uuid>>,
}

impl UpdateDocument {
    pub fn apply(self, document: &mut Document) {
        merge(&mut document.title, self.title);
        merge(&mut document.file_path, self.file_path);
        merge(&mut document.mime_type, self.mime_type);
        merge(&mut document.condominium_id, self.condominium_id);
        merge(&mut document.expense_id, self.expense_id);
    }
}
