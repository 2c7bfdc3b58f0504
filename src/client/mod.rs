//! Typed HTTP client for the dashboard.
//!
//! [`ApiClient`] holds the base URL and the bearer token; [`ResourceClient`]
//! maps each REST collection to one method per endpoint, and [`PageState`]
//! keeps the per-page UI state a CRUD screen needs.
//!
//! ```ignore
//! let mut api = ApiClient::new("http://localhost:3000");
//! api.login("admin@acme.test", "secret-password").await?;
//! let condos = api.resource::<Condominiums>().list(&Scope::Company(acme)).await?;
//! ```

pub mod page;
pub mod resources;

pub use page::{Notification, PageState, Submission};
pub use resources::{
    Companies, Condominiums, Documents, Expenses, InboxClient, Owners, Payments, Resource,
    ResourceClient, Scope, Units, Users,
};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::dtos::{AuthResponse, LoginRequest};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    #[error("network: {0}")]
    Network(#[from] reqwest::Error),

    #[error("decode: {0}")]
    Decode(String),

    #[error("{resource} cannot be listed by {scope}")]
    UnsupportedScope { resource: &'static str, scope: String },
}

impl ClientError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Connection to one API server. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Log in and keep the access token for later requests.
    pub async fn login(&mut self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let body = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };
        let tokens: AuthResponse = self.post("/auth/login", &body).await?;
        self.token = Some(tokens.access_token.clone());
        Ok(tokens)
    }

    pub fn resource<R: Resource>(&self) -> ResourceClient<R> {
        ResourceClient::new(self.clone())
    }

    pub fn inbox(&self) -> InboxClient {
        InboxClient::new(self.clone())
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/v1{}", self.base_url, path)
    }

    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let text = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.error)
            .unwrap_or(text);
        Err(ClientError::Server {
            status: status.as_u16(),
            message,
        })
    }

    async fn parse<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
        Self::check(resp)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(format!("response body: {e}")))
    }

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ClientError> {
        let req = self.authed(self.http.get(self.url(path)).query(query));
        Self::parse(req.send().await?).await
    }

    pub(crate) async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let req = self.authed(self.http.post(self.url(path)).json(body));
        Self::parse(req.send().await?).await
    }

    pub(crate) async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let req = self.authed(self.http.post(self.url(path)));
        Self::parse(req.send().await?).await
    }

    pub(crate) async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ClientError> {
        let req = self.authed(self.http.patch(self.url(path)).json(body));
        Self::parse(req.send().await?).await
    }

    pub(crate) async fn delete_no_content(&self, path: &str) -> Result<(), ClientError> {
        let req = self.authed(self.http.delete(self.url(path)));
        Self::check(req.send().await?).await?;
        Ok(())
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        let req = self.authed(self.http.delete(self.url(path)));
        Self::parse(req.send().await?).await
    }
}
