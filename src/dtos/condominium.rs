use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::merge;
use crate::models::Condominium;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCondominium {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub address: String,
    #[validate(length(max = 100))]
    pub city: String,
    #[validate(length(max = 20))]
    pub postal_code: String,
    #[validate(range(min = 1, message = "totalUnits must be at least 1"))]
    pub total_units: i32,
    pub company_id: Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCondominium {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100))]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 20))]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1, message = "totalUnits must be at least 1"))]
    pub total_units: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_id: Option<Uuid>,
}

impl UpdateCondominium {
    pub fn apply(self, condominium: &mut Condominium) {
        merge(&mut condominium.name, self.name);
        merge(&mut condominium.address, self.address);
        merge(&mut condominium.city, self.city);
        merge(&mut condominium.postal_code, self.postal_code);
        merge(&mut condominium.total_units, self.total_units);
        merge(&mut condominium.company_id, self.company_id);
    }
}
