#![allow(dead_code)]

use std::net::SocketAddr;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use uuid::Uuid;

use condoman::config::Config;

pub const ADMIN_EMAIL: &str = "admin@acme.test";
pub const ADMIN_PASSWORD: &str = "password123";

/// A running test server instance with a dedicated test database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: PgPool,
    pub client: Client,
    pub db_name: String,
}

/// The administrator created by `bootstrap` and the company it belongs to.
pub struct Admin {
    pub token: String,
    pub company_id: String,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// First-run setup request.
    pub async fn register_bootstrap(&self, email: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/bootstrap"))
            .json(&json!({
                "companyName": "Acme",
                "companyEmail": "office@acme.test",
                "firstName": "Ada",
                "lastName": "Admin",
                "email": email,
                "password": password,
            }))
            .send()
            .await
            .expect("bootstrap request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Login and return the auth response body + status.
    pub async fn login(&self, email: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("login request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Bootstrap the installation, return the admin token and company.
    pub async fn bootstrap(&self) -> Admin {
        let (body, status) = self.register_bootstrap(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        assert_eq!(status, StatusCode::CREATED, "bootstrap failed: {body}");
        let token = body["access_token"].as_str().unwrap().to_string();

        let (me, status) = self.get_auth("/api/v1/auth/me", &token).await;
        assert_eq!(status, StatusCode::OK, "me failed: {me}");

        Admin {
            token,
            company_id: me["companyId"].as_str().unwrap().to_string(),
        }
    }

    /// POST and expect 201, returning the created record.
    pub async fn create(&self, path: &str, token: &str, body: &Value) -> Value {
        let (created, status) = self.post_auth(path, token, body).await;
        assert_eq!(status, StatusCode::CREATED, "create {path} failed: {created}");
        created
    }

    pub async fn create_company(&self, token: &str, name: &str) -> Value {
        self.create(
            "/api/v1/companies",
            token,
            &json!({ "name": name, "email": format!("{}@example.test", name.to_lowercase()) }),
        )
        .await
    }

    pub async fn create_condominium(&self, token: &str, company_id: &str, name: &str) -> Value {
        self.create(
            "/api/v1/condominiums",
            token,
            &json!({
                "name": name,
                "address": "Rua das Flores 1",
                "city": "Lisboa",
                "postalCode": "1000-001",
                "totalUnits": 10,
                "companyId": company_id,
            }),
        )
        .await
    }

    pub async fn create_unit(&self, token: &str, condominium_id: &str, door: &str) -> Value {
        self.create(
            "/api/v1/units",
            token,
            &json!({
                "doorNumber": door,
                "floor": 3,
                "typology": "T2",
                "permillage": 85.5,
                "condominiumId": condominium_id,
            }),
        )
        .await
    }

    pub async fn create_owner(&self, token: &str, name: &str) -> Value {
        self.create("/api/v1/owners", token, &json!({ "name": name }))
            .await
    }

    pub async fn create_expense(&self, token: &str, condominium_id: &str, amount: f64) -> Value {
        self.create(
            "/api/v1/expenses",
            token,
            &json!({
                "title": "Elevator repair",
                "amount": amount,
                "date": "2026-03-01",
                "type": "MAINTENANCE",
                "condominiumId": condominium_id,
            }),
        )
        .await
    }

    pub async fn create_payment(
        &self,
        token: &str,
        unit_id: &str,
        expense_id: Option<&str>,
        amount: f64,
    ) -> Value {
        self.create(
            "/api/v1/payments",
            token,
            &json!({
                "amount": amount,
                "date": "2026-03-05",
                "method": "TRANSFER",
                "unitId": unit_id,
                "expenseId": expense_id,
            }),
        )
        .await
    }

    /// Create a user with `role` in `company_id` and log in as them.
    pub async fn user_token(
        &self,
        admin_token: &str,
        company_id: &str,
        email: &str,
        role: &str,
    ) -> String {
        self.create(
            "/api/v1/users",
            admin_token,
            &json!({
                "firstName": "Test",
                "lastName": role,
                "email": email,
                "password": "password123",
                "role": role,
                "companyId": company_id,
            }),
        )
        .await;
        let (body, status) = self.login(email, "password123").await;
        assert_eq!(status, StatusCode::OK, "login as {email} failed: {body}");
        body["access_token"].as_str().unwrap().to_string()
    }

    /// Make an authenticated GET request.
    pub async fn get_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("get request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated POST request with JSON body.
    pub async fn post_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("post request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated PATCH request with JSON body.
    pub async fn patch_auth(&self, path: &str, token: &str, body: &Value) -> (Value, StatusCode) {
        let resp = self
            .client
            .patch(self.url(path))
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .expect("patch request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Make an authenticated DELETE request.
    pub async fn delete_auth(&self, path: &str, token: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .delete(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .expect("delete request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }
}

/// Spawn a test app with a fresh temporary database.
pub async fn spawn_app() -> TestApp {
    let _ = dotenvy::dotenv();

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");

    // Create a unique test database
    let db_name = format!(
        "condoman_test_{}",
        Uuid::now_v7().to_string().replace('-', "")
    );

    // Connect to default postgres DB to create test DB
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect to postgres for test DB creation");

    sqlx::query(&format!("CREATE DATABASE \"{db_name}\""))
        .execute(&admin_pool)
        .await
        .expect("Failed to create test database");

    admin_pool.close().await;

    // Connect to test DB and run migrations
    let test_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/{db_name}"))
        .unwrap_or_else(|| base_url.clone());

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&test_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations on test database");

    let config = Config {
        database_url: test_url,
        jwt_secret: "test-jwt-secret-that-is-long-enough".to_string(),
        host: "127.0.0.1".parse().unwrap(),
        port: 0, // unused, we bind to random port
        max_body_size: 1_048_576,
        cors_origins: vec!["http://localhost:5173".to_string()],
        db_max_connections: 5,
        log_level: "warn".to_string(),
    };

    let app = condoman::build_app(pool.clone(), config);

    // Bind to random port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind to random port");
    let addr = listener.local_addr().unwrap();

    // Spawn server in background
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    let client = Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp {
        addr,
        pool,
        client,
        db_name,
    }
}

/// Drop stale test databases (useful after test crashes).
#[allow(dead_code)]
pub async fn cleanup_stale_test_dbs() {
    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    if let Ok(admin_pool) = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
    {
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT datname FROM pg_database WHERE datname LIKE 'condoman_test_%'",
        )
        .fetch_all(&admin_pool)
        .await
        .unwrap_or_default();

        for db_name in rows {
            let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
                .execute(&admin_pool)
                .await;
        }
        admin_pool.close().await;
    }
}

/// Drop the test database after tests complete.
pub async fn cleanup(app: TestApp) {
    let db_name = app.db_name.clone();
    app.pool.close().await;

    let base_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for tests");
    let admin_url = base_url
        .rsplit_once('/')
        .map(|(base, _)| format!("{base}/postgres"))
        .unwrap_or_else(|| base_url.clone());

    let admin_pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&admin_url)
        .await
        .expect("Failed to connect for cleanup");

    let _ = sqlx::query(&format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE)"))
        .execute(&admin_pool)
        .await;

    admin_pool.close().await;
}
