use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::{double_option, merge};
use crate::models::{EmailProvider, InboxItem, InboxItemStatus};

/// An email handed over by a provider integration.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmailMessage {
    pub company_id: Uuid,
    pub provider: EmailProvider,
    #[validate(length(min = 1, max = 255))]
    pub from: String,
    #[validate(length(min = 1, max = 255))]
    pub to: String,
    #[validate(length(max = 500))]
    pub subject: Option<String>,
    pub body_text: String,
    pub body_html: Option<serde_json::Value>,
    #[validate(length(max = 255))]
    pub external_message_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateInboxItem {
    pub company_id: Uuid,
    #[validate(length(max = 50))]
    pub suggested_type: Option<String>,
    pub extracted_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInboxItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<InboxItemStatus>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub linked_entity_type: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub linked_entity_id: Option<Option<Uuid>>,
}

impl UpdateInboxItem {
    pub fn apply(self, item: &mut InboxItem) {
        merge(&mut item.status, self.status);
        merge(&mut item.linked_entity_type, self.linked_entity_type);
        merge(&mut item.linked_entity_id, self.linked_entity_id);
    }
}
