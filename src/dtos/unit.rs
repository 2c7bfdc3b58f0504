use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use super::merge;
use crate::models::Unit;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateUnit {
    #[validate(length(min = 1, max = 20))]
    pub door_number: String,
    pub floor: i32,
    #[validate(length(max = 50))]
    pub typology: String,
    pub permillage: f64,
    pub condominium_id: Uuid,
    /// Initial owners. Ids that do not resolve are ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUnit {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 20))]
    pub door_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub floor: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 50))]
    pub typology: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permillage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condominium_id: Option<Uuid>,
    /// Replaces the whole owner set when present; an empty list clears it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_ids: Option<Vec<Uuid>>,
}

impl UpdateUnit {
    /// Merge the column fields. `owner_ids` is handled by the caller.
    pub fn apply(&mut self, unit: &mut Unit) {
        merge(&mut unit.door_number, self.door_number.take());
        merge(&mut unit.floor, self.floor.take());
        merge(&mut unit.typology, self.typology.take());
        merge(&mut unit.permillage, self.permillage.take());
        merge(&mut unit.condominium_id, self.condominium_id.take());
    }
}
