//! HTTP-level tests for company-scoped resources, served against a real
//! `#[sqlx::test]` database: deletion guards, the running time entry rule,
//! tenant isolation and page totals.

mod common;

use axum::http::StatusCode;
use axum::Router;
use common::{
    body_json, build_app_with_pool, delete_auth, get_auth, post_json_auth, register_tenant,
};
use ledgerline_core::types::DbId;
use serde_json::{json, Value};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// POST and return `data` of a 201 response.
async fn create(app: &Router, uri: &str, token: &str, body: Value) -> Value {
    let response = post_json_auth(app.clone(), uri, token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED, "POST {uri}");
    body_json(response).await["data"].clone()
}

fn id_of(data: &Value) -> DbId {
    data["id"].as_i64().expect("id in response")
}

async fn create_account(app: &Router, token: &str, name: &str) -> DbId {
    let data = create(
        app,
        "/api/accounts",
        token,
        json!({ "name": name, "account_type": "bank", "currency": "USD" }),
    )
    .await;
    id_of(&data)
}

async fn create_employee(app: &Router, token: &str, email: &str) -> DbId {
    let data = create(
        app,
        "/api/employees",
        token,
        json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": email,
            "hire_date": "2024-01-15",
            "base_salary": "4200.00"
        }),
    )
    .await;
    id_of(&data)
}

// ---------------------------------------------------------------------------
// Deletion guards
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_account_with_transactions_cannot_be_deleted(pool: PgPool) {
    let app = build_app_with_pool(pool).await;
    let tenant = register_tenant(&app, "acme").await;
    let token = &tenant.access_token;

    let account_id = create_account(&app, token, "Operating").await;
    create(
        &app,
        "/api/transactions",
        token,
        json!({
            "kind": "receivable",
            "account_id": account_id,
            "counterparty": "Initech",
            "amount": "125.00"
        }),
    )
    .await;

    let response = delete_auth(app.clone(), &format!("/api/accounts/{account_id}"), token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");

    // An unused account deletes normally.
    let spare = create_account(&app, token, "Spare").await;
    let response = delete_auth(app.clone(), &format!("/api/accounts/{spare}"), token).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_role_with_users_cannot_be_deleted(pool: PgPool) {
    let app = build_app_with_pool(pool).await;
    let tenant = register_tenant(&app, "acme").await;
    let token = &tenant.access_token;

    let role = create(
        &app,
        "/api/roles",
        token,
        json!({ "name": "Auditor", "permissions": {} }),
    )
    .await;
    let role_id = id_of(&role);
    create(
        &app,
        "/api/users",
        token,
        json!({
            "username": "auditor",
            "email": "auditor@acme.test",
            "password": "another-long-password",
            "role_id": role_id
        }),
    )
    .await;

    let response = delete_auth(app.clone(), &format!("/api/roles/{role_id}"), token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

// ---------------------------------------------------------------------------
// Running time entries
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_second_running_entry_conflicts(pool: PgPool) {
    let app = build_app_with_pool(pool).await;
    let tenant = register_tenant(&app, "acme").await;
    let token = &tenant.access_token;
    let employee_id = create_employee(&app, token, "ada@acme.test").await;

    let running = json!({
        "employee_id": employee_id,
        "started_at": "2026-03-02T09:00:00Z",
        "billable": true
    });
    create(&app, "/api/time-entries", token, running.clone()).await;

    let response = post_json_auth(app.clone(), "/api/time-entries", token, running).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

// ---------------------------------------------------------------------------
// Tenant isolation
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_other_companys_rows_are_not_found(pool: PgPool) {
    let app = build_app_with_pool(pool).await;
    let acme = register_tenant(&app, "acme").await;
    let globex = register_tenant(&app, "globex").await;

    let employee_id = create_employee(&app, &acme.access_token, "ada@acme.test").await;
    let account_id = create_account(&app, &acme.access_token, "Operating").await;

    for uri in [
        format!("/api/employees/{employee_id}"),
        format!("/api/accounts/{account_id}"),
    ] {
        let response = get_auth(app.clone(), &uri, &globex.access_token).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "GET {uri}");

        let response = get_auth(app.clone(), &uri, &acme.access_token).await;
        assert_eq!(response.status(), StatusCode::OK, "GET {uri}");
    }

    let response = delete_auth(
        app.clone(),
        &format!("/api/accounts/{account_id}"),
        &globex.access_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(app.clone(), "/api/employees", &globex.access_token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["total"], 0);
}

// ---------------------------------------------------------------------------
// Pagination
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../db/migrations")]
async fn test_page_totals_reflect_stored_rows(pool: PgPool) {
    let app = build_app_with_pool(pool).await;
    let tenant = register_tenant(&app, "acme").await;
    let token = &tenant.access_token;
    for name in ["Cash", "Operating", "Payroll"] {
        create_account(&app, token, name).await;
    }

    let response = get_auth(app.clone(), "/api/accounts?page=1&page_size=2", token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let page = body_json(response).await["data"].clone();
    assert_eq!(page["total"], 3);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["pageSize"], 2);
    assert_eq!(page["items"].as_array().unwrap().len(), 2);
    assert_eq!(page["items"][0]["name"], "Cash");

    let response = get_auth(app.clone(), "/api/accounts?page=2&page_size=2", token).await;
    let page = body_json(response).await["data"].clone();
    assert_eq!(page["items"].as_array().unwrap().len(), 1);
    assert_eq!(page["items"][0]["name"], "Payroll");
}
