//! Booking, pricing and dashboard flows against Postgres. Run with a
//! `DATABASE_URL` pointing at a disposable server: `cargo test -- --ignored`.

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, NaiveDate, Utc};
use common::{OnboardedAcademy, id_of, onboard_academy, send, setup_app};
use serde_json::{Value, json};
use sqlx::PgPool;

fn booking_date(days_from_today: i64) -> NaiveDate {
    Utc::now().date_naive() + Duration::days(days_from_today)
}

fn booking(athlete_id: &str, package_id: &str, date: NaiveDate, promo_code: Option<&str>) -> Value {
    json!({
        "athlete_id": athlete_id,
        "package_id": package_id,
        "date": date,
        "time": "16:00:00",
        "promo_code": promo_code
    })
}

async fn add_athlete(app: &axum::Router, setup: &OnboardedAcademy, first_name: &str) -> String {
    let athlete = send(
        app,
        Method::POST,
        "/api/athletes",
        Some(&setup.academy.token),
        Some(json!({ "first_name": first_name, "last_name": "Nasser" })),
    )
    .await;
    assert_eq!(athlete.status, StatusCode::CREATED);
    id_of(&athlete)
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_completed_onboarding_opens_bookings(pool: PgPool) {
    let app = setup_app(pool.clone());
    let setup = onboard_academy(&pool, &app).await;

    let status = send(&app, Method::GET, "/api/onboarding", Some(&setup.academy.token), None).await;
    assert_eq!(status.body["completed"], true);
    assert_eq!(status.body["progress"], 100);
    assert!(status.body["current_step"].is_null());

    let bookings = send(&app, Method::GET, "/api/bookings", Some(&setup.academy.token), None).await;
    assert_eq!(bookings.status, StatusCode::OK);
    assert_eq!(bookings.body["meta"]["total"], 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_first_booking_pays_discounted_price_plus_entry_fees(pool: PgPool) {
    let app = setup_app(pool.clone());
    let setup = onboard_academy(&pool, &app).await;
    let token = Some(setup.academy.token.as_str());

    // 100 at 50% off, plus the academy's 20 entry fees.
    let first = send(
        &app,
        Method::POST,
        "/api/bookings",
        token,
        Some(booking(
            &setup.athlete_id,
            &setup.package_id,
            booking_date(7),
            Some(&setup.promo_code),
        )),
    )
    .await;
    assert_eq!(first.status, StatusCode::CREATED, "{}", first.body);
    assert_eq!(first.body["price"], 70.0);
    assert_eq!(first.body["status"], "pending");
    assert_eq!(first.body["program_id"], setup.program_id.as_str());
    assert_eq!(first.body["athlete_name"], "Sara Ali");

    // Entry fees are charged once per athlete.
    let second = send(
        &app,
        Method::POST,
        "/api/bookings",
        token,
        Some(booking(&setup.athlete_id, &setup.open_package_id, booking_date(9), None)),
    )
    .await;
    assert_eq!(second.status, StatusCode::CREATED, "{}", second.body);
    assert_eq!(second.body["price"], 100.0);

    let times_used: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE promo_code_id IS NOT NULL")
            .fetch_one(&pool)
            .await
            .unwrap();
    assert_eq!(times_used, 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_full_package_rejects_another_booking(pool: PgPool) {
    let app = setup_app(pool.clone());
    let setup = onboard_academy(&pool, &app).await;
    let token = Some(setup.academy.token.as_str());
    let other_athlete = add_athlete(&app, &setup, "Yousef").await;

    let taken = send(
        &app,
        Method::POST,
        "/api/bookings",
        token,
        Some(booking(&setup.athlete_id, &setup.package_id, booking_date(7), None)),
    )
    .await;
    assert_eq!(taken.status, StatusCode::CREATED);

    let full = send(
        &app,
        Method::POST,
        "/api/bookings",
        token,
        Some(booking(&other_athlete, &setup.package_id, booking_date(7), None)),
    )
    .await;
    assert_eq!(full.status, StatusCode::CONFLICT);
    assert_eq!(full.body["field"], "package_id");

    // A cancelled booking frees its seat.
    let cancelled = send(
        &app,
        Method::PATCH,
        &format!("/api/bookings/{}/status", id_of(&taken)),
        token,
        Some(json!({ "status": "cancelled" })),
    )
    .await;
    assert_eq!(cancelled.status, StatusCode::OK);

    let seated = send(
        &app,
        Method::POST,
        "/api/bookings",
        token,
        Some(booking(&other_athlete, &setup.package_id, booking_date(7), None)),
    )
    .await;
    assert_eq!(seated.status, StatusCode::CREATED);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_booking_outside_package_dates_is_rejected(pool: PgPool) {
    let app = setup_app(pool.clone());
    let setup = onboard_academy(&pool, &app).await;

    let response = send(
        &app,
        Method::POST,
        "/api/bookings",
        Some(&setup.academy.token),
        Some(booking(&setup.athlete_id, &setup.open_package_id, booking_date(90), None)),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["field"], "date");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_unknown_package_is_a_field_error(pool: PgPool) {
    let app = setup_app(pool.clone());
    let setup = onboard_academy(&pool, &app).await;

    let response = send(
        &app,
        Method::POST,
        "/api/bookings",
        Some(&setup.academy.token),
        Some(booking(
            &setup.athlete_id,
            &uuid::Uuid::new_v4().to_string(),
            booking_date(7),
            None,
        )),
    )
    .await;
    assert_eq!(response.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response.body["field"], "package_id");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_settled_booking_cannot_return_to_pending(pool: PgPool) {
    let app = setup_app(pool.clone());
    let setup = onboard_academy(&pool, &app).await;
    let token = Some(setup.academy.token.as_str());

    let created = send(
        &app,
        Method::POST,
        "/api/bookings",
        token,
        Some(booking(&setup.athlete_id, &setup.package_id, booking_date(7), None)),
    )
    .await;
    let uri = format!("/api/bookings/{}/status", id_of(&created));

    let accepted = send(&app, Method::PATCH, &uri, token, Some(json!({ "status": "success" }))).await;
    assert_eq!(accepted.status, StatusCode::OK);
    assert_eq!(accepted.body["status"], "success");

    let reverted = send(&app, Method::PATCH, &uri, token, Some(json!({ "status": "pending" }))).await;
    assert_eq!(reverted.status, StatusCode::CONFLICT);
    assert_eq!(reverted.body["field"], "status");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_dashboard_follows_booking_status(pool: PgPool) {
    let app = setup_app(pool.clone());
    let setup = onboard_academy(&pool, &app).await;
    let token = Some(setup.academy.token.as_str());
    let date = booking_date(7);

    let first = send(
        &app,
        Method::POST,
        "/api/bookings",
        token,
        Some(booking(&setup.athlete_id, &setup.package_id, date, Some(&setup.promo_code))),
    )
    .await;
    assert_eq!(first.status, StatusCode::CREATED);
    let second = send(
        &app,
        Method::POST,
        "/api/bookings",
        token,
        Some(booking(&setup.athlete_id, &setup.open_package_id, date, None)),
    )
    .await;
    assert_eq!(second.status, StatusCode::CREATED);

    let uri = "/api/dashboard?period=all_time";
    let before = send(&app, Method::GET, uri, token, None).await;
    assert_eq!(before.status, StatusCode::OK);
    assert_eq!(before.body["totals"]["bookings"], 2);
    assert_eq!(before.body["totals"]["revenue"], 0.0);
    assert_eq!(before.body["by_status"], json!([{ "status": "pending", "count": 2 }]));

    let accepted = send(
        &app,
        Method::PATCH,
        &format!("/api/bookings/{}/status", id_of(&first)),
        token,
        Some(json!({ "status": "success" })),
    )
    .await;
    assert_eq!(accepted.status, StatusCode::OK);

    let after = send(&app, Method::GET, uri, token, None).await;
    assert_eq!(after.status, StatusCode::OK);
    assert_eq!(after.body["totals"]["revenue"], 70.0);
    assert_eq!(after.body["totals"]["athletes"], 1);
    assert_eq!(
        after.body["by_status"],
        json!([
            { "status": "pending", "count": 1 },
            { "status": "success", "count": 1 }
        ])
    );

    let by_program = after.body["by_program"].as_array().unwrap();
    assert_eq!(by_program.len(), 1);
    assert_eq!(by_program[0]["id"], setup.program_id.as_str());
    assert_eq!(by_program[0]["name"], "Under 12");
    assert_eq!(by_program[0]["bookings"], 2);
    assert_eq!(by_program[0]["revenue"], 70.0);

    let daily = after.body["daily"].as_array().unwrap();
    assert_eq!(daily.len(), 1);
    assert_eq!(daily[0]["date"], date.to_string());
    assert_eq!(daily[0]["bookings"], 2);
    assert_eq!(daily[0]["revenue"], 70.0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_onboarded_academy_completes_again_after_losing_a_step(pool: PgPool) {
    let app = setup_app(pool.clone());
    let setup = onboard_academy(&pool, &app).await;
    let token = Some(setup.academy.token.as_str());

    let again = send(&app, Method::POST, "/api/onboarding/complete", token, None).await;
    assert_eq!(again.status, StatusCode::OK);
    assert_eq!(again.body["onboarded"], true);

    let cleared = send(
        &app,
        Method::PUT,
        "/api/academy",
        token,
        Some(json!({ "description": "" })),
    )
    .await;
    assert_eq!(cleared.status, StatusCode::OK);

    let complete = send(&app, Method::POST, "/api/onboarding/complete", token, None).await;
    assert_eq!(complete.status, StatusCode::OK);
    assert_eq!(complete.body["onboarded"], true);
    assert_eq!(complete.body["completed"], false);
    assert_eq!(complete.body["current_step"], "academy_details");

    let bookings = send(&app, Method::GET, "/api/bookings", token, None).await;
    assert_eq!(bookings.status, StatusCode::OK);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_racing_first_bookings_charge_entry_fees_once(pool: PgPool) {
    let app = setup_app(pool.clone());
    let setup = onboard_academy(&pool, &app).await;
    let token = Some(setup.academy.token.as_str());

    let (left, right) = tokio::join!(
        send(
            &app,
            Method::POST,
            "/api/bookings",
            token,
            Some(booking(&setup.athlete_id, &setup.package_id, booking_date(7), None)),
        ),
        send(
            &app,
            Method::POST,
            "/api/bookings",
            token,
            Some(booking(&setup.athlete_id, &setup.open_package_id, booking_date(8), None)),
        ),
    );
    assert_eq!(left.status, StatusCode::CREATED);
    assert_eq!(right.status, StatusCode::CREATED);

    let mut prices = [
        left.body["price"].as_f64().unwrap(),
        right.body["price"].as_f64().unwrap(),
    ];
    prices.sort_by(f64::total_cmp);
    assert_eq!(prices, [100.0, 120.0]);
}
