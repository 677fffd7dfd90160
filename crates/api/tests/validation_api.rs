//! HTTP-level tests for request validation.
//!
//! Every request here is rejected before the handler touches the database:
//! malformed bodies become `BAD_REQUEST`, DTO and business-rule checks that
//! run up front become `VALIDATION_ERROR`.

mod common;

use axum::http::StatusCode;
use common::{admin_token, body_json, post_json, post_json_auth, post_raw, put_json_auth};
use serde_json::json;

#[tokio::test]
async fn malformed_json_is_bad_request() {
    let app = common::build_test_app().await;
    let response = post_raw(app, "/api/auth/login", "{\"username\": ").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "BAD_REQUEST");
    assert!(json["data"].is_null());
}

#[tokio::test]
async fn missing_field_is_bad_request() {
    let app = common::build_test_app().await;
    let response = post_json(app, "/api/auth/login", json!({ "username": "alice" })).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn empty_login_username_is_validation_error() {
    let app = common::build_test_app().await;
    let response = post_json(
        app,
        "/api/auth/login",
        json!({ "username": "", "password": "whatever" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["message"].as_str().unwrap().starts_with("username"));
}

#[tokio::test]
async fn register_rejects_short_password() {
    let app = common::build_test_app().await;
    let response = post_json(
        app,
        "/api/auth/register",
        json!({
            "company": { "name": "Acme Ltd" },
            "username": "founder",
            "email": "founder@acme.test",
            "password": "short"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["message"], "Password must be at least 12 characters long");
}

#[tokio::test]
async fn employee_with_invalid_email_is_rejected() {
    let app = common::build_test_app().await;
    let response = post_json_auth(
        app,
        "/api/employees",
        &admin_token(),
        json!({
            "first_name": "Ada",
            "last_name": "Lovelace",
            "email": "not-an-email",
            "hire_date": "2024-01-15",
            "base_salary": "4200.00"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["message"], "email: must be a valid email");
}

#[tokio::test]
async fn account_currency_must_be_iso_code() {
    let app = common::build_test_app().await;
    let response = post_json_auth(
        app,
        "/api/accounts",
        &admin_token(),
        json!({ "name": "Main", "account_type": "bank", "currency": "usd" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["message"].as_str().unwrap().starts_with("currency"));
}

#[tokio::test]
async fn contract_end_before_start_is_rejected() {
    let app = common::build_test_app().await;
    let response = post_json_auth(
        app,
        "/api/contracts",
        &admin_token(),
        json!({
            "title": "Office lease",
            "counterparty": "Landlord Inc",
            "contract_type": "lease",
            "start_date": "2024-06-01",
            "end_date": "2024-05-31"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(
        json["message"],
        "contract end date must not precede its start date"
    );
}

#[tokio::test]
async fn purchase_order_needs_lines() {
    let app = common::build_test_app().await;
    let response = post_json_auth(
        app,
        "/api/purchase-orders",
        &admin_token(),
        json!({
            "supplier_name": "Paper Co",
            "order_date": "2024-06-01",
            "lines": []
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn payroll_generation_rejects_reversed_period() {
    let app = common::build_test_app().await;
    let response = post_json_auth(
        app,
        "/api/payrolls/generate",
        &admin_token(),
        json!({ "period_start": "2024-06-30", "period_end": "2024-06-01" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(json["message"], "period_end: must not precede period_start");
}

#[tokio::test]
async fn unknown_task_status_is_bad_request() {
    let app = common::build_test_app().await;
    let response = put_json_auth(
        app,
        "/api/tasks/1/status",
        &admin_token(),
        json!({ "status": "bogus" }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn purchase_order_quantity_beyond_column_limit_is_rejected() {
    let app = common::build_test_app().await;
    let response = post_json_auth(
        app,
        "/api/purchase-orders",
        &admin_token(),
        json!({
            "supplier_name": "Paper Co",
            "order_date": "2024-06-01",
            "lines": [
                { "description": "Paper", "quantity": "79228162514264337593543950", "unit_price": "1" }
            ]
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn purchase_order_line_total_beyond_limit_is_rejected() {
    let app = common::build_test_app().await;
    let response = post_json_auth(
        app,
        "/api/purchase-orders",
        &admin_token(),
        json!({
            "supplier_name": "Paper Co",
            "order_date": "2024-06-01",
            "lines": [
                { "description": "Paper", "quantity": "99999999999", "unit_price": "99999999" }
            ]
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["message"]
        .as_str()
        .unwrap()
        .starts_with("lines[0]: line total exceeds"));
}
