use std::fmt;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use serde::Serialize;
use uuid::Uuid;

use super::{ApiClient, ClientError};
use crate::dtos::{
    CreateCompany, CreateCondominium, CreateDocument, CreateEmailMessage, CreateExpense,
    CreateInboxItem, CreateOwner, CreatePayment, CreateUnit, CreateUser, UpdateCompany,
    UpdateCondominium, UpdateDocument, UpdateExpense, UpdateInboxItem, UpdateOwner, UpdatePayment,
    UpdateUnit, UpdateUser,
};
use crate::models::{
    Company, CompanyDetail, Condominium, CondominiumDetail, Document, DocumentDetail,
    EmailMessage, Expense, ExpenseDetail, InboxItem, Owner, OwnerDetail, Payment, PaymentDetail,
    Unit, UnitDetail, User, UserDetail,
};

/// Which slice of a collection to fetch. Passed explicitly into every list
/// call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Company(Uuid),
    Condominium(Uuid),
    Unit(Uuid),
    Expense(Uuid),
}

impl Scope {
    fn query(&self) -> Vec<(&'static str, String)> {
        match self {
            Scope::All => vec![],
            Scope::Company(id) => vec![("companyId", id.to_string())],
            Scope::Condominium(id) => vec![("condominiumId", id.to_string())],
            Scope::Unit(id) => vec![("unitId", id.to_string())],
            Scope::Expense(id) => vec![("expenseId", id.to_string())],
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::All => write!(f, "all"),
            Scope::Company(id) => write!(f, "company {id}"),
            Scope::Condominium(id) => write!(f, "condominium {id}"),
            Scope::Unit(id) => write!(f, "unit {id}"),
            Scope::Expense(id) => write!(f, "expense {id}"),
        }
    }
}

/// A REST collection under `/api/v1`.
pub trait Resource {
    /// Collection path, e.g. `/units`.
    const PATH: &'static str;
    /// Shape of a listed record.
    type Record: DeserializeOwned + Clone + Send;
    /// Shape of a single fetched record.
    type Detail: DeserializeOwned;
    /// Shape returned by create.
    type Row: DeserializeOwned;
    type Create: Serialize + Send + Sync;
    type Update: Serialize + Default + Send + Sync;

    fn id(record: &Self::Record) -> Uuid;

    /// Scopes the list endpoint understands besides `All`.
    fn accepts(scope: &Scope) -> bool;
}

macro_rules! resource {
    ($name:ident, $path:literal, $record:ty, $detail:ty, $row:ty, $create:ty, $update:ty,
     |$r:ident| $id:expr, [$($scope:ident),*]) => {
        pub struct $name;

        impl Resource for $name {
            const PATH: &'static str = $path;
            type Record = $record;
            type Detail = $detail;
            type Row = $row;
            type Create = $create;
            type Update = $update;

            fn id($r: &Self::Record) -> Uuid {
                $id
            }

            fn accepts(scope: &Scope) -> bool {
                matches!(scope, Scope::All $(| Scope::$scope(_))*)
            }
        }
    };
}

resource!(Companies, "/companies", Company, CompanyDetail, Company,
    CreateCompany, UpdateCompany, |r| r.id, []);
resource!(Users, "/users", User, UserDetail, User,
    CreateUser, UpdateUser, |r| r.id, [Company]);
resource!(Condominiums, "/condominiums", CondominiumDetail, CondominiumDetail, Condominium,
    CreateCondominium, UpdateCondominium, |r| r.condominium.id, [Company]);
resource!(Units, "/units", UnitDetail, UnitDetail, Unit,
    CreateUnit, UpdateUnit, |r| r.unit.id, [Condominium]);
resource!(Owners, "/owners", OwnerDetail, OwnerDetail, Owner,
    CreateOwner, UpdateOwner, |r| r.owner.id, []);
resource!(Expenses, "/expenses", ExpenseDetail, ExpenseDetail, Expense,
    CreateExpense, UpdateExpense, |r| r.expense.id, [Condominium]);
resource!(Payments, "/payments", PaymentDetail, PaymentDetail, Payment,
    CreatePayment, UpdatePayment, |r| r.payment.id, [Unit, Expense]);
resource!(Documents, "/documents", DocumentDetail, DocumentDetail, Document,
    CreateDocument, UpdateDocument, |r| r.document.id, [Condominium, Expense]);

/// One request per call; nothing is cached.
pub struct ResourceClient<R: Resource> {
    api: ApiClient,
    _resource: PhantomData<R>,
}

impl<R: Resource> Clone for ResourceClient<R> {
    fn clone(&self) -> Self {
        Self::new(self.api.clone())
    }
}

impl<R: Resource> ResourceClient<R> {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            _resource: PhantomData,
        }
    }

    fn item_path(id: Uuid) -> String {
        format!("{}/{id}", R::PATH)
    }

    pub async fn list(&self, scope: &Scope) -> Result<Vec<R::Record>, ClientError> {
        if !R::accepts(scope) {
            return Err(ClientError::UnsupportedScope {
                resource: R::PATH,
                scope: scope.to_string(),
            });
        }
        self.api.get(R::PATH, &scope.query()).await
    }

    pub async fn get(&self, id: Uuid) -> Result<R::Detail, ClientError> {
        self.api.get(&Self::item_path(id), &[]).await
    }

    pub async fn create(&self, input: &R::Create) -> Result<R::Row, ClientError> {
        self.api.post(R::PATH, input).await
    }

    /// Returns the record as `get` would, relations included.
    pub async fn update(&self, id: Uuid, patch: &R::Update) -> Result<R::Detail, ClientError> {
        self.api.patch(&Self::item_path(id), patch).await
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), ClientError> {
        self.api.delete_no_content(&Self::item_path(id)).await
    }
}

impl ResourceClient<Units> {
    pub async fn add_owner(&self, unit_id: Uuid, owner_id: Uuid) -> Result<UnitDetail, ClientError> {
        self.api
            .post_empty(&format!("/units/{unit_id}/owners/{owner_id}"))
            .await
    }

    pub async fn remove_owner(
        &self,
        unit_id: Uuid,
        owner_id: Uuid,
    ) -> Result<UnitDetail, ClientError> {
        self.api
            .delete(&format!("/units/{unit_id}/owners/{owner_id}"))
            .await
    }
}

/// The inbox and the email sink feeding it.
#[derive(Clone)]
pub struct InboxClient {
    api: ApiClient,
}

impl InboxClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Newest first.
    pub async fn list_for_company(&self, company_id: Uuid) -> Result<Vec<InboxItem>, ClientError> {
        self.api.get(&format!("/inbox/{company_id}"), &[]).await
    }

    pub async fn create(&self, input: &CreateInboxItem) -> Result<InboxItem, ClientError> {
        self.api.post("/inbox", input).await
    }

    pub async fn update(&self, id: Uuid, patch: &UpdateInboxItem) -> Result<InboxItem, ClientError> {
        self.api.patch(&format!("/inbox/{id}"), patch).await
    }

    /// Returns the inbox item opened for the message.
    pub async fn receive_email(&self, input: &CreateEmailMessage) -> Result<InboxItem, ClientError> {
        self.api.post("/email-messages", input).await
    }

    pub async fn email_messages(&self, company_id: Uuid) -> Result<Vec<EmailMessage>, ClientError> {
        self.api
            .get("/email-messages", &[("companyId", company_id.to_string())])
            .await
    }
}
