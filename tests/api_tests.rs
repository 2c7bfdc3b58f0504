mod common;

use reqwest::StatusCode;
use serde_json::json;
use uuid::Uuid;

// ── Health ──────────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_ok() {
    let app = common::spawn_app().await;

    let resp = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get("x-content-type-options").unwrap(),
        "nosniff"
    );
    assert_eq!(resp.text().await.unwrap(), "ok");

    common::cleanup(app).await;
}

// ── Bootstrap & Auth ────────────────────────────────────────────

#[tokio::test]
async fn bootstrap_creates_admin_and_company() {
    let app = common::spawn_app().await;

    let (body, status) = app
        .register_bootstrap(common::ADMIN_EMAIL, common::ADMIN_PASSWORD)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["access_token"].is_string());
    assert!(body["refresh_token"].is_string());

    let token = body["access_token"].as_str().unwrap();
    let (me, status) = app.get_auth("/api/v1/auth/me", token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["role"], "ADMIN");
    assert_eq!(me["company"]["name"], "Acme");
    assert!(me.get("passwordHash").is_none());

    common::cleanup(app).await;
}

#[tokio::test]
async fn bootstrap_only_works_once() {
    let app = common::spawn_app().await;
    app.bootstrap().await;

    let (_, status) = app
        .register_bootstrap("other@acme.test", "password123")
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    common::cleanup(app).await;
}

#[tokio::test]
async fn bootstrap_rejects_short_password() {
    let app = common::spawn_app().await;

    let (_, status) = app.register_bootstrap(common::ADMIN_EMAIL, "short").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    common::cleanup(app).await;
}

#[tokio::test]
async fn login_valid_and_invalid_credentials() {
    let app = common::spawn_app().await;
    app.bootstrap().await;

    let (body, status) = app
        .login(common::ADMIN_EMAIL, common::ADMIN_PASSWORD)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].is_string());

    let (_, status) = app.login(common::ADMIN_EMAIL, "wrongpassword").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, status) = app.login("nobody@acme.test", "password123").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    common::cleanup(app).await;
}

#[tokio::test]
async fn login_rate_limited_after_five_failures() {
    let app = common::spawn_app().await;
    app.bootstrap().await;

    for _ in 0..5 {
        let (_, status) = app.login(common::ADMIN_EMAIL, "wrongpassword").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    let (_, status) = app
        .login(common::ADMIN_EMAIL, common::ADMIN_PASSWORD)
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    common::cleanup(app).await;
}

#[tokio::test]
async fn inactive_user_cannot_log_in() {
    let app = common::spawn_app().await;
    let admin = app.bootstrap().await;

    let user = app
        .create(
            "/api/v1/users",
            &admin.token,
            &json!({
                "firstName": "Ina",
                "lastName": "Active",
                "email": "ina@acme.test",
                "password": "password123",
                "isActive": false,
                "companyId": admin.company_id,
            }),
        )
        .await;
    assert_eq!(user["isActive"], false);

    let (_, status) = app.login("ina@acme.test", "password123").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    common::cleanup(app).await;
}

#[tokio::test]
async fn requests_without_token_are_rejected() {
    let app = common::spawn_app().await;

    let resp = app
        .client
        .get(app.url("/api/v1/condominiums"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    common::cleanup(app).await;
}

#[tokio::test]
async fn refresh_rotates_and_detects_reuse() {
    let app = common::spawn_app().await;

    let (body, _) = app
        .register_bootstrap(common::ADMIN_EMAIL, common::ADMIN_PASSWORD)
        .await;
    let first = body["refresh_token"].as_str().unwrap().to_string();

    let resp = app
        .client
        .post(app.url("/api/v1/auth/refresh"))
        .json(&json!({ "refresh_token": first }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let rotated: serde_json::Value = resp.json().await.unwrap();
    let second = rotated["refresh_token"].as_str().unwrap().to_string();
    assert_ne!(first, second);

    // Replaying the first token revokes every session
    let resp = app
        .client
        .post(app.url("/api/v1/auth/refresh"))
        .json(&json!({ "refresh_token": first }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = app
        .client
        .post(app.url("/api/v1/auth/refresh"))
        .json(&json!({ "refresh_token": second }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    common::cleanup(app).await;
}

#[tokio::test]
async fn change_password_requires_current_password() {
    let app = common::spawn_app().await;
    let admin = app.bootstrap().await;

    let (_, status) = app
        .post_auth(
            "/api/v1/auth/change-password",
            &admin.token,
            &json!({ "currentPassword": "wrong-password", "newPassword": "new-password-1" }),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, status) = app
        .post_auth(
            "/api/v1/auth/change-password",
            &admin.token,
            &json!({ "currentPassword": common::ADMIN_PASSWORD, "newPassword": "new-password-1" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, status) = app.login(common::ADMIN_EMAIL, "new-password-1").await;
    assert_eq!(status, StatusCode::OK);

    common::cleanup(app).await;
}

// ── Companies & Users ───────────────────────────────────────────

#[tokio::test]
async fn company_crud() {
    let app = common::spawn_app().await;
    let admin = app.bootstrap().await;

    let company = app.create_company(&admin.token, "Globex").await;
    let id = company["id"].as_str().unwrap();
    assert_eq!(company["isActive"], true);
    assert!(company["vatNumber"].is_null());

    let (list, status) = app.get_auth("/api/v1/companies", &admin.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 2);

    let (updated, status) = app
        .patch_auth(
            &format!("/api/v1/companies/{id}"),
            &admin.token,
            &json!({ "vatNumber": "PT123456789" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["vatNumber"], "PT123456789");
    assert_eq!(updated["name"], "Globex");

    let (detail, status) = app
        .get_auth(&format!("/api/v1/companies/{id}"), &admin.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["users"].as_array().unwrap().len(), 0);
    assert_eq!(detail["condominiums"].as_array().unwrap().len(), 0);

    let (_, status) = app
        .delete_auth(&format!("/api/v1/companies/{id}"), &admin.token)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (body, status) = app
        .get_auth(&format!("/api/v1/companies/{id}"), &admin.token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"],
        format!("Company with ID {id} not found")
    );

    common::cleanup(app).await;
}

#[tokio::test]
async fn user_crud_never_exposes_or_changes_password() {
    let app = common::spawn_app().await;
    let admin = app.bootstrap().await;

    let user = app
        .create(
            "/api/v1/users",
            &admin.token,
            &json!({
                "firstName": "Maria",
                "lastName": "Silva",
                "email": "maria@acme.test",
                "password": "password123",
                "companyId": admin.company_id,
            }),
        )
        .await;
    assert_eq!(user["role"], "MANAGER");
    assert_eq!(user["isActive"], true);
    assert!(user.get("password").is_none());
    assert!(user.get("passwordHash").is_none());
    let id = user["id"].as_str().unwrap();

    let (updated, status) = app
        .patch_auth(
            &format!("/api/v1/users/{id}"),
            &admin.token,
            &json!({ "lastName": "Santos", "password": "ignored-password" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["lastName"], "Santos");
    assert_eq!(updated["firstName"], "Maria");

    // Password unchanged
    let (_, status) = app.login("maria@acme.test", "password123").await;
    assert_eq!(status, StatusCode::OK);

    let (detail, status) = app
        .get_auth(&format!("/api/v1/users/{id}"), &admin.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["company"]["id"], admin.company_id.as_str());

    let (_, status) = app
        .post_auth(
            "/api/v1/users",
            &admin.token,
            &json!({
                "firstName": "Dup",
                "lastName": "Licate",
                "email": "maria@acme.test",
                "password": "password123",
                "companyId": admin.company_id,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    common::cleanup(app).await;
}

#[tokio::test]
async fn company_delete_cascades_to_everything_below() {
    let app = common::spawn_app().await;
    let admin = app.bootstrap().await;

    let company = app.create_company(&admin.token, "Initech").await;
    let company_id = company["id"].as_str().unwrap();

    app.user_token(&admin.token, company_id, "m@initech.test", "MANAGER")
        .await;

    let owner = app.create_owner(&admin.token, "Shared Owner").await;
    let owner_id = owner["id"].as_str().unwrap();

    let mut unit_ids = Vec::new();
    for condo in ["North", "South"] {
        let c = app
            .create_condominium(&admin.token, company_id, condo)
            .await;
        let cid = c["id"].as_str().unwrap();
        for door in ["1A", "1B"] {
            let u = app.create_unit(&admin.token, cid, door).await;
            let uid = u["id"].as_str().unwrap().to_string();
            let (_, status) = app
                .post_auth(
                    &format!("/api/v1/units/{uid}/owners/{owner_id}"),
                    &admin.token,
                    &json!({}),
                )
                .await;
            assert_eq!(status, StatusCode::OK);
            app.create_payment(&admin.token, &uid, None, 10.0).await;
            unit_ids.push(uid);
        }
    }

    let (_, status) = app
        .delete_auth(&format!("/api/v1/companies/{company_id}"), &admin.token)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    for uid in &unit_ids {
        let (_, status) = app
            .get_auth(&format!("/api/v1/units/{uid}"), &admin.token)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    let company_uuid: Uuid = company_id.parse().unwrap();
    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE company_id = $1")
        .bind(company_uuid)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(users, 0);

    let links: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM unit_owners")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(links, 0);

    let payments: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM payments")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(payments, 0);

    // Owners are not company property
    let (_, status) = app
        .get_auth(&format!("/api/v1/owners/{owner_id}"), &admin.token)
        .await;
    assert_eq!(status, StatusCode::OK);

    common::cleanup(app).await;
}

#[tokio::test]
async fn user_email_is_unique_regardless_of_case() {
    let app = common::spawn_app().await;
    let admin = app.bootstrap().await;

    let user = |email: &str| {
        json!({
            "firstName": "Ana",
            "lastName": "Silva",
            "email": email,
            "password": "password123",
            "companyId": admin.company_id,
        })
    };

    app.create("/api/v1/users", &admin.token, &user("Ana@acme.test"))
        .await;

    let (body, status) = app
        .post_auth("/api/v1/users", &admin.token, &user("ana@acme.test"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "A user with this email already exists");

    let (_, status) = app
        .post_auth("/api/v1/users", &admin.token, &user("ADMIN@ACME.TEST"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, status) = app.login("ana@acme.test", "password123").await;
    assert_eq!(status, StatusCode::OK);

    common::cleanup(app).await;
}

// ── Condominiums & Units ────────────────────────────────────────

#[tokio::test]
async fn condominium_listing_by_company_includes_units() {
    let app = common::spawn_app().await;
    let admin = app.bootstrap().await;

    let acme = admin.company_id.as_str();
    let other = app.create_company(&admin.token, "Other").await;
    app.create_condominium(&admin.token, other["id"].as_str().unwrap(), "Elsewhere")
        .await;

    let sunset = app.create_condominium(&admin.token, acme, "Sunset").await;
    assert_eq!(sunset["totalUnits"], 10);
    let sunset_id = sunset["id"].as_str().unwrap();
    let unit = app.create_unit(&admin.token, sunset_id, "3A").await;

    let (list, status) = app
        .get_auth(&format!("/api/v1/condominiums?companyId={acme}"), &admin.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["name"], "Sunset");
    assert!(list[0].get("company").is_none());
    let units = list[0]["units"].as_array().unwrap();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0]["id"], unit["id"]);
    assert_eq!(units[0]["doorNumber"], "3A");

    let (all, _) = app.get_auth("/api/v1/condominiums", &admin.token).await;
    assert_eq!(all.as_array().unwrap().len(), 2);
    assert!(all[0]["company"].is_object());

    common::cleanup(app).await;
}

#[tokio::test]
async fn condominium_validation_and_not_found() {
    let app = common::spawn_app().await;
    let admin = app.bootstrap().await;

    let (_, status) = app
        .post_auth(
            "/api/v1/condominiums",
            &admin.token,
            &json!({
                "name": "Tiny",
                "address": "Rua 1",
                "city": "Porto",
                "postalCode": "4000-001",
                "totalUnits": 0,
                "companyId": admin.company_id,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = Uuid::now_v7();
    let (body, status) = app
        .patch_auth(
            &format!("/api/v1/condominiums/{missing}"),
            &admin.token,
            &json!({ "name": "Nope" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body["error"],
        format!("Condominium with ID {missing} not found")
    );

    let (_, status) = app
        .delete_auth(&format!("/api/v1/condominiums/{missing}"), &admin.token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (body, status) = app
        .get_auth("/api/v1/condominiums/not-a-uuid", &admin.token)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    common::cleanup(app).await;
}

#[tokio::test]
async fn unit_with_unknown_condominium_is_a_conflict() {
    let app = common::spawn_app().await;
    let admin = app.bootstrap().await;

    let (body, status) = app
        .post_auth(
            "/api/v1/units",
            &admin.token,
            &json!({
                "doorNumber": "1A",
                "floor": 1,
                "typology": "T1",
                "permillage": 50.0,
                "condominiumId": Uuid::now_v7(),
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "Referenced record does not exist");

    common::cleanup(app).await;
}

#[tokio::test]
async fn empty_patch_keeps_every_field() {
    let app = common::spawn_app().await;
    let admin = app.bootstrap().await;

    let condo = app
        .create_condominium(&admin.token, &admin.company_id, "Sunset")
        .await;
    let unit = app
        .create_unit(&admin.token, condo["id"].as_str().unwrap(), "3A")
        .await;
    let id = unit["id"].as_str().unwrap();

    let (patched, status) = app
        .patch_auth(&format!("/api/v1/units/{id}"), &admin.token, &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);
    for field in ["doorNumber", "floor", "typology", "permillage", "condominiumId"] {
        assert_eq!(patched[field], unit[field], "{field} changed");
    }

    common::cleanup(app).await;
}

#[tokio::test]
async fn unit_owner_membership() {
    let app = common::spawn_app().await;
    let admin = app.bootstrap().await;

    let condo = app
        .create_condominium(&admin.token, &admin.company_id, "Sunset")
        .await;
    let unit = app
        .create_unit(&admin.token, condo["id"].as_str().unwrap(), "3A")
        .await;
    let unit_id = unit["id"].as_str().unwrap();
    let owner = app.create_owner(&admin.token, "Ana").await;
    let owner_id = owner["id"].as_str().unwrap();

    let path = format!("/api/v1/units/{unit_id}/owners/{owner_id}");

    // Adding twice leaves one membership
    for _ in 0..2 {
        let (detail, status) = app.post_auth(&path, &admin.token, &json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(detail["owners"].as_array().unwrap().len(), 1);
        assert_eq!(detail["owners"][0]["id"], owner["id"]);
    }

    let (owner_detail, _) = app
        .get_auth(&format!("/api/v1/owners/{owner_id}"), &admin.token)
        .await;
    assert_eq!(owner_detail["units"][0]["id"], unit["id"]);

    // Removing twice is harmless
    for _ in 0..2 {
        let (detail, status) = app.delete_auth(&path, &admin.token).await;
        assert_eq!(status, StatusCode::OK);
        assert!(detail["owners"].as_array().unwrap().is_empty());
    }

    let missing = Uuid::now_v7();
    let (body, status) = app
        .post_auth(
            &format!("/api/v1/units/{unit_id}/owners/{missing}"),
            &admin.token,
            &json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], format!("Owner with ID {missing} not found"));

    let (body, status) = app
        .post_auth(
            &format!("/api/v1/units/{missing}/owners/{owner_id}"),
            &admin.token,
            &json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], format!("Unit with ID {missing} not found"));

    common::cleanup(app).await;
}

#[tokio::test]
async fn unit_owner_ids_on_create_and_update() {
    let app = common::spawn_app().await;
    let admin = app.bootstrap().await;

    let condo = app
        .create_condominium(&admin.token, &admin.company_id, "Sunset")
        .await;
    let condo_id = condo["id"].as_str().unwrap();
    let ana = app.create_owner(&admin.token, "Ana").await;
    let rui = app.create_owner(&admin.token, "Rui").await;

    let unit = app
        .create(
            "/api/v1/units",
            &admin.token,
            &json!({
                "doorNumber": "2B",
                "floor": 2,
                "typology": "T3",
                "permillage": 120.0,
                "condominiumId": condo_id,
                "ownerIds": [ana["id"], Uuid::now_v7()],
            }),
        )
        .await;
    let id = unit["id"].as_str().unwrap();
    let path = format!("/api/v1/units/{id}");

    let (detail, _) = app.get_auth(&path, &admin.token).await;
    let owners = detail["owners"].as_array().unwrap();
    assert_eq!(owners.len(), 1);
    assert_eq!(owners[0]["id"], ana["id"]);

    // Absent list keeps memberships
    app.patch_auth(&path, &admin.token, &json!({ "floor": 4 }))
        .await;
    let (detail, _) = app.get_auth(&path, &admin.token).await;
    assert_eq!(detail["floor"], 4);
    assert_eq!(detail["owners"].as_array().unwrap().len(), 1);

    // Present list replaces, and the response already shows it
    let (patched, status) = app
        .patch_auth(&path, &admin.token, &json!({ "ownerIds": [rui["id"]] }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(patched["owners"].as_array().unwrap().len(), 1);
    assert_eq!(patched["owners"][0]["id"], rui["id"]);
    assert_eq!(patched["condominium"]["id"], condo_id);
    let (detail, _) = app.get_auth(&path, &admin.token).await;
    assert_eq!(detail["owners"][0]["id"], rui["id"]);

    // Empty list clears
    app.patch_auth(&path, &admin.token, &json!({ "ownerIds": [] }))
        .await;
    let (detail, _) = app.get_auth(&path, &admin.token).await;
    assert!(detail["owners"].as_array().unwrap().is_empty());

    common::cleanup(app).await;
}

#[tokio::test]
async fn owner_nullable_fields_clear_with_null() {
    let app = common::spawn_app().await;
    let admin = app.bootstrap().await;

    let owner = app
        .create(
            "/api/v1/owners",
            &admin.token,
            &json!({ "name": "Ana", "email": "ana@example.test", "phone": "912345678" }),
        )
        .await;
    let id = owner["id"].as_str().unwrap();

    let (updated, status) = app
        .patch_auth(
            &format!("/api/v1/owners/{id}"),
            &admin.token,
            &json!({ "email": null }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(updated["email"].is_null());
    assert_eq!(updated["phone"], "912345678");

    let (_, status) = app
        .delete_auth(&format!("/api/v1/owners/{id}"), &admin.token)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, status) = app
        .get_auth(&format!("/api/v1/owners/{id}"), &admin.token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}

// ── Expenses, Payments & Documents ──────────────────────────────

#[tokio::test]
async fn payment_marked_paid_keeps_amount_unit_and_expense() {
    let app = common::spawn_app().await;
    let admin = app.bootstrap().await;

    let condo = app
        .create_condominium(&admin.token, &admin.company_id, "Sunset")
        .await;
    let condo_id = condo["id"].as_str().unwrap();
    let unit = app.create_unit(&admin.token, condo_id, "3A").await;
    let unit_id = unit["id"].as_str().unwrap();
    let expense = app.create_expense(&admin.token, condo_id, 450.00).await;
    assert_eq!(expense["type"], "MAINTENANCE");
    let expense_id = expense["id"].as_str().unwrap();

    let payment = app
        .create_payment(&admin.token, unit_id, Some(expense_id), 450.00)
        .await;
    assert_eq!(payment["status"], "PENDING");
    let id = payment["id"].as_str().unwrap();

    let (_, status) = app
        .patch_auth(
            &format!("/api/v1/payments/{id}"),
            &admin.token,
            &json!({ "status": "PAID" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (fetched, status) = app
        .get_auth(&format!("/api/v1/payments/{id}"), &admin.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["status"], "PAID");
    assert_eq!(fetched["amount"].as_f64(), Some(450.0));
    assert_eq!(fetched["unitId"], unit_id);
    assert_eq!(fetched["expenseId"], expense_id);
    assert_eq!(fetched["unit"]["doorNumber"], "3A");
    assert_eq!(fetched["expense"]["id"], expense_id);

    let (by_unit, _) = app
        .get_auth(&format!("/api/v1/payments?unitId={unit_id}"), &admin.token)
        .await;
    assert_eq!(by_unit.as_array().unwrap().len(), 1);
    assert!(by_unit[0].get("unit").is_none());
    assert!(by_unit[0]["expense"].is_object());

    common::cleanup(app).await;
}

#[tokio::test]
async fn expense_delete_keeps_payments_and_documents() {
    let app = common::spawn_app().await;
    let admin = app.bootstrap().await;

    let condo = app
        .create_condominium(&admin.token, &admin.company_id, "Sunset")
        .await;
    let condo_id = condo["id"].as_str().unwrap();
    let unit = app.create_unit(&admin.token, condo_id, "3A").await;
    let expense = app.create_expense(&admin.token, condo_id, 120.0).await;
    let expense_id = expense["id"].as_str().unwrap();

    let payment = app
        .create_payment(
            &admin.token,
            unit["id"].as_str().unwrap(),
            Some(expense_id),
            120.0,
        )
        .await;
    let document = app
        .create(
            "/api/v1/documents",
            &admin.token,
            &json!({
                "title": "Invoice",
                "filePath": "/docs/invoice.pdf",
                "mimeType": "application/pdf",
                "condominiumId": condo_id,
                "expenseId": expense_id,
            }),
        )
        .await;

    let (detail, _) = app
        .get_auth(&format!("/api/v1/expenses/{expense_id}"), &admin.token)
        .await;
    assert_eq!(detail["payments"].as_array().unwrap().len(), 1);
    assert_eq!(detail["documents"].as_array().unwrap().len(), 1);
    assert_eq!(detail["condominium"]["id"], condo_id);

    let (_, status) = app
        .delete_auth(&format!("/api/v1/expenses/{expense_id}"), &admin.token)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (p, status) = app
        .get_auth(
            &format!("/api/v1/payments/{}", payment["id"].as_str().unwrap()),
            &admin.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(p["expenseId"].is_null());
    assert!(p.get("expense").is_none());

    let (d, status) = app
        .get_auth(
            &format!("/api/v1/documents/{}", document["id"].as_str().unwrap()),
            &admin.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(d["expenseId"].is_null());

    common::cleanup(app).await;
}

#[tokio::test]
async fn malformed_input_is_a_json_bad_request() {
    let app = common::spawn_app().await;
    let admin = app.bootstrap().await;

    let condo = app
        .create_condominium(&admin.token, &admin.company_id, "Sunset")
        .await;

    let bodies = [
        // Unknown enum value
        json!({
            "title": "Gardening",
            "amount": 80.0,
            "date": "2026-04-01",
            "type": "GARDENING",
            "condominiumId": condo["id"],
        }),
        // Missing amount
        json!({
            "title": "Gardening",
            "date": "2026-04-01",
            "type": "MAINTENANCE",
            "condominiumId": condo["id"],
        }),
        // Wrong type
        json!({
            "title": "Gardening",
            "amount": "eighty",
            "date": "2026-04-01",
            "type": "MAINTENANCE",
            "condominiumId": condo["id"],
        }),
    ];
    for body in &bodies {
        let (resp, status) = app.post_auth("/api/v1/expenses", &admin.token, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "accepted {body}");
        assert!(resp["error"].is_string(), "no error field for {body}: {resp}");
    }

    let (resp, status) = app
        .get_auth("/api/v1/units/not-a-uuid", &admin.token)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(resp["error"].is_string());

    let (resp, status) = app
        .get_auth("/api/v1/units?condominiumId=nope", &admin.token)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(resp["error"].is_string());

    common::cleanup(app).await;
}

#[tokio::test]
async fn unknown_ids_are_not_found_everywhere() {
    let app = common::spawn_app().await;
    let admin = app.bootstrap().await;

    let resources = [
        ("companies", "Company"),
        ("users", "User"),
        ("condominiums", "Condominium"),
        ("units", "Unit"),
        ("owners", "Owner"),
        ("expenses", "Expense"),
        ("payments", "Payment"),
        ("documents", "Document"),
    ];

    for (path, entity) in resources {
        let missing = Uuid::now_v7();
        let url = format!("/api/v1/{path}/{missing}");
        let expected = format!("{entity} with ID {missing} not found");

        let (body, status) = app.get_auth(&url, &admin.token).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "GET {url}");
        assert_eq!(body["error"], expected);

        let (body, status) = app.patch_auth(&url, &admin.token, &json!({})).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "PATCH {url}");
        assert_eq!(body["error"], expected);

        let (body, status) = app.delete_auth(&url, &admin.token).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "DELETE {url}");
        assert_eq!(body["error"], expected);
    }

    let missing = Uuid::now_v7();
    let (body, status) = app
        .patch_auth(
            &format!("/api/v1/inbox/{missing}"),
            &admin.token,
            &json!({ "status": "IGNORED" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], format!("InboxItem with ID {missing} not found"));

    common::cleanup(app).await;
}

#[tokio::test]
async fn update_of_a_vanished_row_returns_none() {
    let app = common::spawn_app().await;
    let admin = app.bootstrap().await;

    let condo = app
        .create_condominium(&admin.token, &admin.company_id, "Sunset")
        .await;
    let unit = app
        .create_unit(&admin.token, condo["id"].as_str().unwrap(), "3A")
        .await;
    let id: Uuid = unit["id"].as_str().unwrap().parse().unwrap();

    let row = condoman::db::units::find_by_id(&app.pool, id, None)
        .await
        .unwrap()
        .unwrap();
    condoman::db::units::delete(&app.pool, id).await.unwrap();

    let updated = condoman::db::units::update(&app.pool, &row).await.unwrap();
    assert!(updated.is_none());

    common::cleanup(app).await;
}

// ── Roles & Scoping ─────────────────────────────────────────────

#[tokio::test]
async fn manager_sees_only_own_company() {
    let app = common::spawn_app().await;
    let admin = app.bootstrap().await;

    let other = app.create_company(&admin.token, "Other").await;
    let other_id = other["id"].as_str().unwrap();
    let foreign = app
        .create_condominium(&admin.token, other_id, "Foreign")
        .await;
    let foreign_id = foreign["id"].as_str().unwrap();
    app.create_condominium(&admin.token, &admin.company_id, "Home")
        .await;

    let manager = app
        .user_token(&admin.token, &admin.company_id, "mgr@acme.test", "MANAGER")
        .await;

    let (list, _) = app.get_auth("/api/v1/condominiums", &manager).await;
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["name"], "Home");

    let (_, status) = app
        .get_auth(&format!("/api/v1/condominiums/{foreign_id}"), &manager)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Cannot place a unit under a foreign condominium
    let (_, status) = app
        .post_auth(
            "/api/v1/units",
            &manager,
            &json!({
                "doorNumber": "X",
                "floor": 0,
                "typology": "T0",
                "permillage": 1.0,
                "condominiumId": foreign_id,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Cannot create companies or grant ADMIN
    let (_, status) = app
        .post_auth(
            "/api/v1/companies",
            &manager,
            &json!({ "name": "Mine", "email": "mine@example.test" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, status) = app
        .post_auth(
            "/api/v1/users",
            &manager,
            &json!({
                "firstName": "Evil",
                "lastName": "Twin",
                "email": "evil@acme.test",
                "password": "password123",
                "role": "ADMIN",
                "companyId": admin.company_id,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (companies, _) = app.get_auth("/api/v1/companies", &manager).await;
    assert_eq!(companies.as_array().unwrap().len(), 1);

    common::cleanup(app).await;
}

#[tokio::test]
async fn manager_cannot_change_owner_shared_with_another_company() {
    let app = common::spawn_app().await;
    let admin = app.bootstrap().await;

    let other = app.create_company(&admin.token, "Other").await;
    let other_id = other["id"].as_str().unwrap();
    let foreign = app
        .create_condominium(&admin.token, other_id, "Foreign")
        .await;
    let foreign_unit = app
        .create_unit(&admin.token, foreign["id"].as_str().unwrap(), "1A")
        .await;

    let shared = app.create_owner(&admin.token, "Shared").await;
    let shared_id = shared["id"].as_str().unwrap();
    let (_, status) = app
        .post_auth(
            &format!(
                "/api/v1/units/{}/owners/{shared_id}",
                foreign_unit["id"].as_str().unwrap()
            ),
            &admin.token,
            &json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let manager = app
        .user_token(&admin.token, &admin.company_id, "mgr@acme.test", "MANAGER")
        .await;

    let (_, status) = app
        .patch_auth(
            &format!("/api/v1/owners/{shared_id}"),
            &manager,
            &json!({ "name": "Renamed" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, status) = app
        .delete_auth(&format!("/api/v1/owners/{shared_id}"), &manager)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Membership of the other company survives
    let (detail, _) = app
        .get_auth(
            &format!("/api/v1/units/{}", foreign_unit["id"].as_str().unwrap()),
            &admin.token,
        )
        .await;
    assert_eq!(detail["owners"][0]["id"], shared["id"]);

    // An owner without foreign units stays editable
    let own = app.create_owner(&manager, "Local").await;
    let (updated, status) = app
        .patch_auth(
            &format!("/api/v1/owners/{}", own["id"].as_str().unwrap()),
            &manager,
            &json!({ "name": "Local Renamed" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Local Renamed");
    assert!(updated["units"].as_array().unwrap().is_empty());

    // Admins are not limited
    let (_, status) = app
        .patch_auth(
            &format!("/api/v1/owners/{shared_id}"),
            &admin.token,
            &json!({ "name": "Renamed" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    common::cleanup(app).await;
}

#[tokio::test]
async fn accountant_writes_finance_only() {
    let app = common::spawn_app().await;
    let admin = app.bootstrap().await;

    let condo = app
        .create_condominium(&admin.token, &admin.company_id, "Sunset")
        .await;
    let condo_id = condo["id"].as_str().unwrap();

    let accountant = app
        .user_token(&admin.token, &admin.company_id, "acc@acme.test", "ACCOUNTANT")
        .await;

    let (_, status) = app.get_auth("/api/v1/condominiums", &accountant).await;
    assert_eq!(status, StatusCode::OK);

    let (_, status) = app
        .patch_auth(
            &format!("/api/v1/condominiums/{condo_id}"),
            &accountant,
            &json!({ "name": "Renamed" }),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, status) = app
        .post_auth("/api/v1/owners", &accountant, &json!({ "name": "Nope" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    app.create_expense(&accountant, condo_id, 99.0).await;

    let (_, status) = app.get_auth("/api/v1/audit", &accountant).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    common::cleanup(app).await;
}

#[tokio::test]
async fn mutations_are_audited() {
    let app = common::spawn_app().await;
    let admin = app.bootstrap().await;

    let condo = app
        .create_condominium(&admin.token, &admin.company_id, "Sunset")
        .await;

    let (events, status) = app.get_auth("/api/v1/audit?limit=10", &admin.token).await;
    assert_eq!(status, StatusCode::OK);
    let events = events.as_array().unwrap();
    assert_eq!(events[0]["action"], "condominium.created");
    assert_eq!(events[0]["resourceId"], condo["id"]);

    common::cleanup(app).await;
}

// ── Inbox ───────────────────────────────────────────────────────

#[tokio::test]
async fn email_opens_inbox_item() {
    let app = common::spawn_app().await;
    let admin = app.bootstrap().await;
    let company_id = admin.company_id.as_str();

    let item = app
        .create(
            "/api/v1/email-messages",
            &admin.token,
            &json!({
                "companyId": company_id,
                "provider": "GMAIL",
                "from": "supplier@example.test",
                "to": "office@acme.test",
                "subject": "Invoice 42",
                "bodyText": "Please find attached.",
            }),
        )
        .await;
    assert_eq!(item["source"], "EMAIL");
    assert_eq!(item["status"], "NEW");
    assert!(item["emailMessageId"].is_string());

    let manual = app
        .create(
            "/api/v1/inbox",
            &admin.token,
            &json!({
                "companyId": company_id,
                "suggestedType": "EXPENSE",
                "extractedData": { "amount": 42.0 },
            }),
        )
        .await;
    assert_eq!(manual["source"], "MANUAL");
    assert!(manual["emailMessageId"].is_null());

    let (items, status) = app
        .get_auth(&format!("/api/v1/inbox/{company_id}"), &admin.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    let items = items.as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["id"], manual["id"]);
    assert_eq!(items[1]["id"], item["id"]);

    let linked = Uuid::now_v7();
    let (updated, status) = app
        .patch_auth(
            &format!("/api/v1/inbox/{}", item["id"].as_str().unwrap()),
            &admin.token,
            &json!({
                "status": "PROCESSED",
                "linkedEntityType": "EXPENSE",
                "linkedEntityId": linked,
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "PROCESSED");
    assert_eq!(updated["linkedEntityId"], linked.to_string());

    let (messages, status) = app
        .get_auth(
            &format!("/api/v1/email-messages?companyId={company_id}"),
            &admin.token,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(messages[0]["from"], "supplier@example.test");
    assert_eq!(messages[0]["subject"], "Invoice 42");

    common::cleanup(app).await;
}
