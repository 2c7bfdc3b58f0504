//! Request bodies shared by the HTTP handlers and the typed client.
//!
//! Create DTOs carry every required field. Update DTOs are partial: a field
//! left out keeps the stored value. Nullable columns use `Option<Option<T>>`
//! so that an explicit `null` clears the column.

pub mod auth;
pub mod company;
pub mod condominium;
pub mod document;
pub mod expense;
pub mod inbox;
pub mod owner;
pub mod payment;
pub mod unit;
pub mod user;

pub use auth::{
    AuthResponse, BootstrapRequest, ChangePasswordRequest, LoginRequest, RefreshRequest,
};
pub use company::{CreateCompany, UpdateCompany};
pub use condominium::{CreateCondominium, UpdateCondominium};
pub use document::{CreateDocument, UpdateDocument};
pub use expense::{CreateExpense, UpdateExpense};
pub use inbox::{CreateEmailMessage, CreateInboxItem, UpdateInboxItem};
pub use owner::{CreateOwner, UpdateOwner};
pub use payment::{CreatePayment, UpdatePayment};
pub use unit::{CreateUnit, UpdateUnit};
pub use user::{CreateUser, UpdateUser};

use serde::{Deserialize, Deserializer};

/// Maps a present field to `Some`, so `null` becomes `Some(None)` while an
/// absent field stays `None` through `#[serde(default)]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Overwrite `target` when the patch carries a value.
pub(crate) fn merge<T>(target: &mut T, value: Option<T>) {
    if let Some(v) = value {
        *target = v;
    }
}
