//! Integration tests for authentication and the per-request permission
//! filter.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    admin_token, body_json, get, get_auth, post_json_auth, seed_role, send, test_state,
    token_for, COMPANY_ID, EMPLOYEE_ROLE_ID,
};
use ledgerline_api::auth::jwt::{generate_access_token, TokenSubject};
use ledgerline_api::router::build_app_router;
use ledgerline_core::permissions::{ModulePermissions, RolePermissions};
use serde_json::json;

#[tokio::test]
async fn protected_route_without_token_is_401() {
    let app = common::build_test_app().await;
    let response = get(app, "/api/employees").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNAUTHORIZED");
    assert!(json["data"].is_null());
}

#[tokio::test]
async fn malformed_bearer_token_is_401() {
    let app = common::build_test_app().await;
    let response = get_auth(app, "/api/employees", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_for_another_audience_is_401() {
    let mut config = common::test_config();
    config.jwt.audience = "some-other-service".into();
    let token = generate_access_token(
        TokenSubject {
            user_id: 1,
            company_id: COMPANY_ID,
            role: "admin",
            role_id: common::ADMIN_ROLE_ID,
        },
        &config.jwt,
    )
    .unwrap();

    let app = common::build_test_app().await;
    let response = get_auth(app, "/api/roles/modules", &token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn auth_me_requires_a_token() {
    let app = common::build_test_app().await;
    let response = get(app, "/api/auth/me").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_bypasses_module_checks() {
    let app = common::build_test_app().await;
    let response = get_auth(app, "/api/roles/modules", &admin_token()).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let modules = json["data"]["modules"].as_array().expect("modules array");
    assert_eq!(modules.len(), 11);
    assert!(modules.iter().any(|m| m["key"] == "purchase_orders"));
    assert_eq!(json["data"]["capabilities"][4], "export");
}

#[tokio::test]
async fn employee_role_is_denied_roles_module() {
    let app = common::build_test_app().await;
    let token = token_for("employee", EMPLOYEE_ROLE_ID);
    let response = get_auth(app, "/api/roles/modules", &token).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = body_json(response).await;
    assert_eq!(json["code"], "FORBIDDEN");
    assert!(json["data"].is_null());
}

#[tokio::test]
async fn employee_role_cannot_export_or_create_employees() {
    let token = token_for("employee", EMPLOYEE_ROLE_ID);

    let app = common::build_test_app().await;
    let response = get_auth(app, "/api/employees/export", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let app = common::build_test_app().await;
    let response = post_json_auth(app, "/api/employees", &token, json!({})).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn custom_role_route_rule_grants_single_endpoint() {
    let state = test_state().await;
    let document = RolePermissions::default()
        .with_module("tasks", ModulePermissions::READ_ONLY)
        .with_route("GET", "/api/roles/modules");
    seed_role(&state, 50, Some(COMPANY_ID), "Auditor", Some(document.compile())).await;
    let token = token_for("Auditor", 50);

    let app = build_app_router(state.clone());
    let response = get_auth(app, "/api/roles/modules", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    // The rule is method-specific.
    let app = build_app_router(state);
    let response = send(app, Method::POST, "/api/roles", Some(&token), Some(json!({}))).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn role_of_another_company_is_denied() {
    let state = test_state().await;
    let document = RolePermissions::default().with_module("roles", ModulePermissions::FULL);
    seed_role(&state, 77, Some(COMPANY_ID + 1), "Foreign", Some(document.compile())).await;
    let token = token_for("Foreign", 77);

    let app = build_app_router(state);
    let response = get_auth(app, "/api/roles/modules", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn malformed_role_document_denies_everything() {
    let state = test_state().await;
    seed_role(&state, 60, Some(COMPANY_ID), "Broken", None).await;
    let token = token_for("Broken", 60);

    let app = build_app_router(state);
    let response = get_auth(app, "/api/roles/modules", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn company_role_named_admin_is_not_an_administrator() {
    let state = test_state().await;
    let document = RolePermissions::default().with_module("tasks", ModulePermissions::READ_ONLY);
    seed_role(&state, 61, Some(COMPANY_ID), "admin", Some(document.compile())).await;
    let token = token_for("admin", 61);

    let app = build_app_router(state);
    let response = get_auth(app, "/api/roles/modules", &token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
