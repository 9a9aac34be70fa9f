//! End-to-end flows against Postgres. Run with a `DATABASE_URL` pointing at
//! a disposable server: `cargo test -- --ignored`.

mod common;

use axum::http::{Method, StatusCode};
use common::{TEST_PASSWORD, create_academy, id_of, send, setup_app};
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_login_returns_tenant_user(pool: PgPool) {
    let academy = create_academy(&pool, false).await;
    let app = setup_app(pool);

    let response = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": academy.email, "password": TEST_PASSWORD })),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["access_token"].is_string());
    assert_eq!(response.body["user"]["role"], "academic_admin");
    assert_eq!(response.body["user"]["academic_id"], academy.id.to_string());
    assert!(response.body["user"].get("password").is_none());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_wrong_password_is_unauthorized(pool: PgPool) {
    let academy = create_academy(&pool, false).await;
    let app = setup_app(pool);

    let response = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": academy.email, "password": "wrong-password" })),
    )
    .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_bookings_wait_for_onboarding(pool: PgPool) {
    let pending = create_academy(&pool, false).await;
    let ready = create_academy(&pool, true).await;
    let app = setup_app(pool);

    let blocked = send(&app, Method::GET, "/api/bookings", Some(&pending.token), None).await;
    assert_eq!(blocked.status, StatusCode::FORBIDDEN);

    let allowed = send(&app, Method::GET, "/api/bookings", Some(&ready.token), None).await;
    assert_eq!(allowed.status, StatusCode::OK);
    assert_eq!(allowed.body["meta"]["total"], 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_fresh_academy_cannot_complete_onboarding(pool: PgPool) {
    let academy = create_academy(&pool, false).await;
    let app = setup_app(pool);

    let status = send(&app, Method::GET, "/api/onboarding", Some(&academy.token), None).await;
    assert_eq!(status.status, StatusCode::OK);
    assert_eq!(status.body["completed"], false);
    assert_eq!(status.body["onboarded"], false);
    assert_eq!(status.body["steps"].as_array().map(Vec::len), Some(5));

    let complete = send(
        &app,
        Method::POST,
        "/api/onboarding/complete",
        Some(&academy.token),
        None,
    )
    .await;
    assert_eq!(complete.status, StatusCode::CONFLICT);
    assert!(complete.body["field"].is_string());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_onboarded_academy_with_missing_steps_completes_as_no_op(pool: PgPool) {
    let academy = create_academy(&pool, true).await;
    let app = setup_app(pool);

    let complete = send(
        &app,
        Method::POST,
        "/api/onboarding/complete",
        Some(&academy.token),
        None,
    )
    .await;
    assert_eq!(complete.status, StatusCode::OK);
    assert_eq!(complete.body["onboarded"], true);
    assert_eq!(complete.body["current_step"], "academy_details");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_first_location_becomes_default(pool: PgPool) {
    let academy = create_academy(&pool, false).await;
    let app = setup_app(pool);

    let first = send(
        &app,
        Method::POST,
        "/api/locations",
        Some(&academy.token),
        Some(json!({ "name": "North Field" })),
    )
    .await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.body["is_default"], true);

    let second = send(
        &app,
        Method::POST,
        "/api/locations",
        Some(&academy.token),
        Some(json!({ "name": "South Hall", "is_default": true })),
    )
    .await;
    assert_eq!(second.status, StatusCode::CREATED);
    assert_eq!(second.body["is_default"], true);

    let previous = send(
        &app,
        Method::GET,
        &format!("/api/locations/{}", first.body["id"].as_str().unwrap()),
        Some(&academy.token),
        None,
    )
    .await;
    assert_eq!(previous.body["is_default"], false);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_first_locations_keep_one_default(pool: PgPool) {
    let academy = create_academy(&pool, false).await;
    let app = setup_app(pool.clone());

    let (north, south) = tokio::join!(
        send(
            &app,
            Method::POST,
            "/api/locations",
            Some(&academy.token),
            Some(json!({ "name": "North Field" })),
        ),
        send(
            &app,
            Method::POST,
            "/api/locations",
            Some(&academy.token),
            Some(json!({ "name": "South Hall" })),
        ),
    );
    assert_eq!(north.status, StatusCode::CREATED);
    assert_eq!(south.status, StatusCode::CREATED);

    let defaults: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM locations WHERE academic_id = $1 AND is_default",
    )
    .bind(academy.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(defaults, 1);

    let promoted = send(
        &app,
        Method::PUT,
        &format!("/api/locations/{}", id_of(&south)),
        Some(&academy.token),
        Some(json!({ "is_default": true })),
    )
    .await;
    assert_eq!(promoted.status, StatusCode::OK);
    assert_eq!(promoted.body["is_default"], true);

    // The database itself refuses a second default.
    let second_default = sqlx::query(
        "INSERT INTO locations (academic_id, name, is_default) VALUES ($1, 'West Court', TRUE)",
    )
    .bind(academy.id)
    .execute(&pool)
    .await;
    assert!(second_default.is_err());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_athletes_are_scoped_to_their_academy(pool: PgPool) {
    let owner = create_academy(&pool, false).await;
    let other = create_academy(&pool, false).await;
    let app = setup_app(pool);

    let created = send(
        &app,
        Method::POST,
        "/api/athletes",
        Some(&owner.token),
        Some(json!({ "first_name": "Sara", "last_name": "Ali" })),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED);
    assert_eq!(created.body["athlete_type"], "primary");
    let uri = format!("/api/athletes/{}", created.body["id"].as_str().unwrap());

    let foreign = send(&app, Method::GET, &uri, Some(&other.token), None).await;
    assert_eq!(foreign.status, StatusCode::NOT_FOUND);

    let foreign_delete = send(&app, Method::DELETE, &uri, Some(&other.token), None).await;
    assert_eq!(foreign_delete.status, StatusCode::NOT_FOUND);

    let own = send(&app, Method::GET, &uri, Some(&owner.token), None).await;
    assert_eq!(own.status, StatusCode::OK);
    assert_eq!(own.body["first_name"], "Sara");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_promo_code_is_a_field_conflict(pool: PgPool) {
    let academy = create_academy(&pool, false).await;
    let app = setup_app(pool);
    let body = json!({
        "code": "summer25",
        "discount_type": "percentage",
        "discount_value": 25.0,
        "start_date": "2026-06-01T00:00:00Z",
        "end_date": "2026-09-01T00:00:00Z"
    });

    let first = send(
        &app,
        Method::POST,
        "/api/promo-codes",
        Some(&academy.token),
        Some(body.clone()),
    )
    .await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.body["code"], "SUMMER25");

    let second = send(
        &app,
        Method::POST,
        "/api/promo-codes",
        Some(&academy.token),
        Some(body),
    )
    .await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.body["field"], "code");
}
