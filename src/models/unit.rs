use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Condominium, Owner, Payment};

#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unit {
    pub id: Uuid,
    pub condominium_id: Uuid,
    pub door_number: String,
    pub floor: i32,
    pub typology: String,
    /// Per-mille share of the condominium. No cross-unit total is enforced.
    pub permillage: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnitDetail {
    #[serde(flatten)]
    pub unit: Unit,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condominium: Option<Condominium>,
    pub owners: Vec<Owner>,
    pub payments: Vec<Payment>,
}

/// A unit row tagged with the owner it was reached through.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct OwnerUnit {
    pub owner_id: Uuid,
    #[sqlx(flatten)]
    pub unit: Unit,
}
