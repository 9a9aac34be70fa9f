//! HTTP caching for read-mostly endpoints: `Cache-Control` plus `ETag`
//! revalidation.
//!
//! ```ignore
//! Router::new()
//!     .route("/", get(list_sports))
//!     .layer(cache_control(CacheControlConfig::private(300)))
//!     .layer(axum::middleware::from_fn(etag_middleware));
//! ```

use axum::{
    body::Body,
    extract::Request,
    http::{
        HeaderValue, Method, StatusCode,
        header::{CACHE_CONTROL, ETAG, IF_NONE_MATCH},
    },
    middleware::Next,
    response::{IntoResponse, Response},
};
use http_body_util::BodyExt;
use sha2::{Digest, Sha256};
use tower_http::set_header::SetResponseHeaderLayer;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheControlConfig {
    /// Shared caches may store the response (otherwise browser only).
    pub public: bool,
    pub max_age: u64,
    pub no_store: bool,
    pub stale_while_revalidate: Option<u64>,
}

impl CacheControlConfig {
    pub fn public(max_age: u64) -> Self {
        Self {
            public: true,
            max_age,
            no_store: false,
            stale_while_revalidate: None,
        }
    }

    /// Browser-only caching; used for responses that depend on the bearer token.
    pub fn private(max_age: u64) -> Self {
        Self {
            public: false,
            ..Self::public(max_age)
        }
    }

    pub fn no_store() -> Self {
        Self {
            public: false,
            max_age: 0,
            no_store: true,
            stale_while_revalidate: None,
        }
    }

    pub fn with_stale_while_revalidate(mut self, seconds: u64) -> Self {
        self.stale_while_revalidate = Some(seconds);
        self
    }

    pub fn to_header_value(&self) -> HeaderValue {
        if self.no_store {
            return HeaderValue::from_static("no-store");
        }

        let mut directives = vec![
            if self.public { "public" } else { "private" }.to_string(),
            format!("max-age={}", self.max_age),
        ];
        if let Some(swr) = self.stale_while_revalidate {
            directives.push(format!("stale-while-revalidate={}", swr));
        }

        HeaderValue::from_str(&directives.join(", "))
            .unwrap_or_else(|_| HeaderValue::from_static("no-cache"))
    }
}

#[derive(Clone)]
pub struct CacheControlHeader(HeaderValue);

impl<B> tower_http::set_header::MakeHeaderValue<Response<B>> for CacheControlHeader {
    fn make_header_value(&mut self, message: &Response<B>) -> Option<HeaderValue> {
        // Errors must not be cached by the browser.
        message.status().is_success().then(|| self.0.clone())
    }
}

/// Adds `Cache-Control` to successful responses that do not set one themselves.
pub fn cache_control(config: CacheControlConfig) -> SetResponseHeaderLayer<CacheControlHeader> {
    SetResponseHeaderLayer::if_not_present(
        CACHE_CONTROL,
        CacheControlHeader(config.to_header_value()),
    )
}

fn generate_etag(body: &[u8]) -> String {
    let hash = Sha256::digest(body);
    format!("\"{}\"", hex::encode(&hash[..16]))
}

/// Weak comparison: `W/"x"` matches `"x"`.
fn etags_match(client_etag: &str, server_etag: &str) -> bool {
    let client = client_etag.trim().trim_start_matches("W/");
    let server = server_etag.trim().trim_start_matches("W/");
    client == server || client == "*"
}

/// Hashes successful GET bodies into an `ETag` and answers `If-None-Match`
/// hits with `304 Not Modified`. Buffers the body, so only use it on small
/// JSON responses.
pub async fn etag_middleware(request: Request, next: Next) -> Response {
    let is_get = request.method() == Method::GET;
    let if_none_match = request
        .headers()
        .get(IF_NONE_MATCH)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let response = next.run(request).await;

    if !is_get || !response.status().is_success() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let bytes = match body.collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(_) => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };

    let etag = match parts.headers.get(ETAG).and_then(|v| v.to_str().ok()) {
        Some(existing) => existing.to_string(),
        None => generate_etag(&bytes),
    };

    let matched = if_none_match
        .map(|client_etag| client_etag.split(',').any(|tag| etags_match(tag, &etag)))
        .unwrap_or(false);
    if matched {
        let mut not_modified = StatusCode::NOT_MODIFIED.into_response();
        if let Ok(value) = HeaderValue::from_str(&etag) {
            not_modified.headers_mut().insert(ETAG, value);
        }
        if let Some(cc) = parts.headers.get(CACHE_CONTROL) {
            not_modified.headers_mut().insert(CACHE_CONTROL, cc.clone());
        }
        return not_modified;
    }

    if let Ok(value) = HeaderValue::from_str(&etag) {
        parts.headers.insert(ETAG, value);
    }

    Response::from_parts(parts, Body::from(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{Router, routing::get};
    use tower::ServiceExt;

    fn app() -> Router {
        Router::new()
            .route("/sports", get(|| async { r#"[{"name":"Padel"}]"# }))
            .route(
                "/missing",
                get(|| async { (StatusCode::NOT_FOUND, "Sport not found") }),
            )
            .layer(cache_control(CacheControlConfig::private(300)))
            .layer(axum::middleware::from_fn(etag_middleware))
    }

    #[test]
    fn test_cache_control_public() {
        let header = CacheControlConfig::public(300).to_header_value();
        assert_eq!(header.to_str().unwrap(), "public, max-age=300");
    }

    #[test]
    fn test_cache_control_private_with_swr() {
        let header = CacheControlConfig::private(60)
            .with_stale_while_revalidate(30)
            .to_header_value();
        assert_eq!(
            header.to_str().unwrap(),
            "private, max-age=60, stale-while-revalidate=30"
        );
    }

    #[test]
    fn test_cache_control_no_store() {
        let header = CacheControlConfig::no_store().to_header_value();
        assert_eq!(header.to_str().unwrap(), "no-store");
    }

    #[test]
    fn test_etags_match() {
        assert!(etags_match("\"abc123\"", "\"abc123\""));
        assert!(etags_match("W/\"abc123\"", "\"abc123\""));
        assert!(etags_match(" * ", "\"abc123\""));
        assert!(!etags_match("\"abc123\"", "\"xyz789\""));
    }

    #[tokio::test]
    async fn test_response_carries_etag_and_cache_control() {
        let response = app()
            .oneshot(Request::get("/sports").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(ETAG));
        assert_eq!(
            response.headers().get(CACHE_CONTROL).unwrap(),
            "private, max-age=300"
        );
    }

    #[tokio::test]
    async fn test_matching_if_none_match_returns_304() {
        let first = app()
            .oneshot(Request::get("/sports").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let etag = first.headers().get(ETAG).unwrap().clone();

        let second = app()
            .oneshot(
                Request::get("/sports")
                    .header(IF_NONE_MATCH, etag)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(second.status(), StatusCode::NOT_MODIFIED);
    }

    #[tokio::test]
    async fn test_errors_are_not_tagged() {
        let response = app()
            .oneshot(Request::get("/missing").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(!response.headers().contains_key(ETAG));
        assert!(!response.headers().contains_key(CACHE_CONTROL));
    }
}
