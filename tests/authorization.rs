mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{offline_app, send, token_for};

// Every denial below happens before storage is touched, so these run without
// a database. Allowed requests are detected by reaching a later, non-401
// failure (body validation or an empty update).

#[tokio::test]
async fn anonymous_callers_cannot_write_companies() {
    let app = offline_app();
    let body = json!({"handle": "c1", "name": "C1", "description": "Desc"});

    let res = send(&app, Method::POST, "/companies", None, Some(body)).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.body["error"]["status"], 401);

    let res = send(&app, Method::DELETE, "/companies/c1", None, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn non_admins_cannot_write_companies_or_jobs() {
    let app = offline_app();
    let token = token_for("u1", false);

    let res = send(&app, Method::PATCH, "/companies/c1", Some(&token), Some(json!({"name": "New"}))).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = send(
        &app,
        Method::POST,
        "/jobs",
        Some(&token),
        Some(json!({"title": "J", "companyHandle": "c1"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = send(&app, Method::DELETE, "/jobs/1", Some(&token), None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_passes_authorization_on_company_update() {
    let app = offline_app();
    let token = token_for("admin", true);

    let res = send(&app, Method::PATCH, "/companies/c1", Some(&token), Some(json!({}))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_message(), "No data");
}

#[tokio::test]
async fn admin_body_is_validated() {
    let app = offline_app();
    let token = token_for("admin", true);
    let body = json!({"handle": "BAD", "name": "C1", "description": "Desc", "numEmployees": -5});

    let res = send(&app, Method::POST, "/companies", Some(&token), Some(body)).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"]["code"], "VALIDATION_ERROR");
    assert!(res.body["error"]["field_errors"]["handle"].is_string());
    assert!(res.body["error"]["field_errors"]["numEmployees"].is_string());
}

#[tokio::test]
async fn user_listing_is_admin_only() {
    let app = offline_app();

    let res = send(&app, Method::GET, "/users", None, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = send(&app, Method::GET, "/users", Some(&token_for("u1", false)), None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = send(
        &app,
        Method::POST,
        "/users",
        Some(&token_for("u1", false)),
        Some(json!({"username": "x"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn users_can_only_reach_their_own_record() {
    let app = offline_app();
    let bob = token_for("bob", false);

    let res = send(&app, Method::GET, "/users/alice", Some(&bob), None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = send(&app, Method::DELETE, "/users/alice", Some(&bob), None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = send(&app, Method::PATCH, "/users/alice", Some(&bob), Some(json!({"firstName": "A"}))).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = send(&app, Method::PATCH, "/users/bob", Some(&bob), Some(json!({}))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_message(), "No data");
}

#[tokio::test]
async fn anonymous_user_routes_are_denied() {
    let app = offline_app();

    for (method, uri) in [
        (Method::GET, "/users/bob"),
        (Method::DELETE, "/users/bob"),
        (Method::POST, "/users/bob/jobs/1"),
    ] {
        let res = send(&app, method.clone(), uri, None, None).await;
        assert_eq!(res.status, StatusCode::UNAUTHORIZED, "{} {}", method, uri);
    }
}

#[tokio::test]
async fn admins_cannot_change_another_users_password() {
    let app = offline_app();
    let admin = token_for("admin", true);

    let res = send(&app, Method::PATCH, "/users/alice", Some(&admin), Some(json!({"password": "newpass1"}))).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = send(
        &app,
        Method::PATCH,
        "/users/alice",
        Some(&admin),
        Some(json!({"firstName": "A", "password": "newpass1"})),
    )
    .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    // Same admin, no password: authorized, then rejected as an empty update
    let res = send(&app, Method::PATCH, "/users/alice", Some(&admin), Some(json!({}))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn password_with_unknown_fields_still_needs_the_user() {
    let app = offline_app();
    let admin = token_for("admin", true);

    let res = send(
        &app,
        Method::PATCH,
        "/users/alice",
        Some(&admin),
        Some(json!({"password": "newpass1", "isAdmin": true})),
    )
    .await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = send(&app, Method::PATCH, "/users/alice", Some(&admin), Some(json!({"password": null}))).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    // A non-object body names no password; it passes authorization and then fails to parse
    let res = send(&app, Method::PATCH, "/users/alice", Some(&admin), Some(json!("password"))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_update_fields_are_rejected_for_the_user() {
    let app = offline_app();
    let bob = token_for("bob", false);

    let res = send(&app, Method::PATCH, "/users/bob", Some(&bob), Some(json!({"isAdmin": true}))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"]["code"], "INVALID_JSON");

    let res = send(&app, Method::PATCH, "/users/bob", Some(&bob), Some(json!({"firstName": null}))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["error"]["field_errors"]["firstName"], "cannot be null");
}

#[tokio::test]
async fn users_may_change_their_own_password() {
    let app = offline_app();
    let bob = token_for("bob", false);

    // Authorized; the short password then fails validation before storage
    let res = send(&app, Method::PATCH, "/users/bob", Some(&bob), Some(json!({"password": "pw"}))).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["error"]["field_errors"]["password"].is_string());
}

#[tokio::test]
async fn applying_checks_the_path_user() {
    let app = offline_app();

    let res = send(&app, Method::POST, "/users/alice/jobs/1", Some(&token_for("bob", false)), None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = send(&app, Method::POST, "/users/bob/jobs/abc", Some(&token_for("bob", false)), None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = send(&app, Method::POST, "/users/alice/jobs/abc", Some(&token_for("root", true)), None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn bad_tokens_degrade_to_anonymous() {
    let app = offline_app();

    // Public route stays reachable: the range check fails, not authorization
    let res = send(
        &app,
        Method::GET,
        "/companies?minEmployees=50&maxEmployees=10",
        Some("garbage"),
        None,
    )
    .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.error_message(), "minEmployees cannot be greater than maxEmployees");

    // Protected route treats the caller as anonymous
    let res = send(&app, Method::GET, "/users", Some("garbage"), None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn search_parameters_are_validated() {
    let app = offline_app();

    let res = send(&app, Method::GET, "/companies?color=red", None, None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = send(&app, Method::GET, "/jobs?hasEquity=maybe", None, None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = send(&app, Method::GET, "/jobs?minSalary=-1&hasEquity=false", None, None).await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body["error"]["field_errors"]["minSalary"].is_string());
}

#[tokio::test]
async fn unknown_routes_are_404() {
    let app = offline_app();
    let res = send(&app, Method::GET, "/no-such-page", None, None).await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["error"]["status"], 404);
}

#[tokio::test]
async fn root_is_public() {
    let app = offline_app();
    let res = send(&app, Method::GET, "/", None, None).await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["name"], "Jobly API");
}
