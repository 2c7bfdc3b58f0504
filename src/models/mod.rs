pub mod audit_event;
pub mod company;
pub mod condominium;
pub mod document;
pub mod email_message;
pub mod enums;
pub mod expense;
pub mod inbox_item;
pub mod owner;
pub mod payment;
pub mod refresh_token;
pub mod unit;
pub mod user;

pub use audit_event::AuditEvent;
pub use company::{Company, CompanyDetail};
pub use condominium::{Condominium, CondominiumDetail};
pub use document::{Document, DocumentDetail};
pub use email_message::EmailMessage;
pub use enums::{
    EmailProvider, ExpenseType, InboxItemStatus, InboxSource, PaymentMethod, PaymentStatus, Role,
};
pub use expense::{Expense, ExpenseDetail};
pub use inbox_item::InboxItem;
pub use owner::{Owner, OwnerDetail, UnitOwner};
pub use payment::{Payment, PaymentDetail};
pub use refresh_token::RefreshToken;
pub use unit::{OwnerUnit, Unit, UnitDetail};
pub use user::{User, UserDetail};
