mod common;

use axum::http::{Method, StatusCode};
use common::{academic_token, admin_token, offline_app, send};
use serde_json::json;

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = offline_app();

    let response = send(&app, Method::GET, "/api/athletes", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "Missing authorization header");
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let app = offline_app();

    let response = send(&app, Method::GET, "/api/coaches", Some("not-a-jwt"), None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_operations_require_token() {
    let app = offline_app();

    for uri in ["/api/bookings", "/api/bookings/calendar", "/api/dashboard"] {
        let response = send(&app, Method::GET, uri, None, None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED, "{}", uri);
    }
}

#[tokio::test]
async fn test_academy_admin_cannot_manage_academics() {
    let app = offline_app();
    let token = academic_token();

    let response = send(&app, Method::GET, "/api/academics", Some(&token), None).await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["error"], "System admin access required");
}

#[tokio::test]
async fn test_system_admin_cannot_use_tenant_routes() {
    let app = offline_app();
    let token = admin_token();

    for uri in ["/api/athletes", "/api/programs", "/api/onboarding", "/api/bookings"] {
        let response = send(&app, Method::GET, uri, Some(&token), None).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{}", uri);
    }
}

#[tokio::test]
async fn test_academy_admin_cannot_write_reference_data() {
    let app = offline_app();
    let token = academic_token();

    let response = send(
        &app,
        Method::POST,
        "/api/sports",
        Some(&token),
        Some(json!({ "name": "Padel" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_athlete_reports_field() {
    let app = offline_app();
    let token = academic_token();

    let response = send(
        &app,
        Method::POST,
        "/api/athletes",
        Some(&token),
        Some(json!({ "first_name": "", "last_name": "Ali" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["field"], "first_name");
    assert_eq!(response.body["error"], "First name is required");
}

#[tokio::test]
async fn test_login_rejects_bad_email_before_lookup() {
    let app = offline_app();

    let response = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "not-an-email", "password": "secret" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["field"], "email");
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = offline_app();

    let response = send(&app, Method::GET, "/api-docs/openapi.json", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["paths"].get("/api/bookings").is_some());
    assert!(response.body["paths"].get("/api/dashboard").is_some());
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    let app = offline_app();
    let request = Request::builder()
        .uri("/api/athletes")
        .header("x-request-id", "trace-42")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(response.headers()["x-request-id"], "trace-42");
}
