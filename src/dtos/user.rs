use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::merge;
use crate::models::{Role, User};

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUser {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email, length(max = 255))]
    pub email: String,
    #[validate(length(min = 8, max = 255, message = "Password must be between 8 and 255 characters"))]
    pub password: String,
    pub role: Option<Role>,
    pub is_active: Option<bool>,
    pub company_id: Uuid,
}

/// Passwords are changed through the auth endpoints only.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUser {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 100))]
    pub last_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(email, length(max = 255))]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Uuid>,
}

impl UpdateUser {
    pub fn apply(self, user: &mut User) {
        merge(&mut user.first_name, self.first_name);
        merge(&mut user.last_name, self.last_name);
        merge(&mut user.email, self.email);
        merge(&mut user.role, self.role);
        merge(&mut user.is_active, self.is_active);
        merge(&mut user.company_id, self.company_id);
    }
}
