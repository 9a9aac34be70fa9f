use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
    routing::get,
};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{BuildError, Matcher, PrometheusBuilder, PrometheusHandle};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use academix_models::{BookingStatus, DiscountType, Role};

static METRICS_ENABLED: AtomicBool = AtomicBool::new(false);

pub fn is_metrics_enabled() -> bool {
    METRICS_ENABLED.load(Ordering::Relaxed)
}

/// Installs the Prometheus recorder and its upkeep task. Returns `None` when
/// metrics are disabled.
pub fn init_metrics(enabled: bool) -> Result<Option<PrometheusHandle>, BuildError> {
    if !enabled {
        return Ok(None);
    }

    let handle = PrometheusBuilder::new()
        .set_buckets_for_metric(
            Matcher::Full("http_request_duration_seconds".to_string()),
            &[
                0.001, 0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5,
                10.0,
            ],
        )?
        .install_recorder()?;

    METRICS_ENABLED.store(true, Ordering::Relaxed);

    let upkeep_handle = handle.clone();
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(Duration::from_secs(5)).await;
            upkeep_handle.run_upkeep();
        }
    });

    Ok(Some(handle))
}

pub async fn metrics_middleware(req: Request, next: Next) -> Response {
    if !is_metrics_enabled() {
        return next.run(req).await;
    }

    let start = Instant::now();
    let method = req.method().as_str().to_owned();
    let uri_path = req.uri().path().to_owned();

    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_owned())
        .unwrap_or(uri_path);

    gauge!("http_requests_active").increment(1.0);

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();

    counter!("http_requests_total", "method" => method.clone(), "path" => path.clone(), "status" => status).increment(1);
    histogram!("http_request_duration_seconds", "method" => method, "path" => path).record(latency);

    gauge!("http_requests_active").decrement(1.0);

    response
}

pub fn metrics_app(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || async move { handle.render() }))
}

// Business counters

pub fn track_login_success(role: Role) {
    if !is_metrics_enabled() {
        return;
    }
    counter!("user_logins_total", "role" => role.as_str(), "status" => "success").increment(1);
}

pub fn track_login_failure(reason: &'static str) {
    if !is_metrics_enabled() {
        return;
    }
    counter!("user_logins_total", "status" => "failure", "reason" => reason).increment(1);
}

pub fn track_jwt_issued() {
    if !is_metrics_enabled() {
        return;
    }
    counter!("jwt_tokens_issued_total").increment(1);
}

pub fn track_academic_created() {
    if !is_metrics_enabled() {
        return;
    }
    counter!("academics_created_total").increment(1);
}

pub fn track_onboarding_completed() {
    if !is_metrics_enabled() {
        return;
    }
    counter!("onboarding_completed_total").increment(1);
}

pub fn track_booking_created(status: BookingStatus) {
    if !is_metrics_enabled() {
        return;
    }
    counter!("bookings_created_total", "status" => status.as_str()).increment(1);
}

pub fn track_promo_code_redeemed(discount_type: DiscountType) {
    if !is_metrics_enabled() {
        return;
    }
    counter!("promo_codes_redeemed_total", "discount_type" => discount_type.as_str()).increment(1);
}
