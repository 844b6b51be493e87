//! CORS policy for the browser frontend.
//!
//! Note:
//! - CORS is enforced by browsers; server-to-server calls are not restricted by it.
//! - Applied at the outermost Router level so preflight requests are answered
//!   before the auth gate runs (browsers never send credentials on preflight).
//!
//! Policy:
//! - Allowlist origins from Config (comma-separated env var, exact match), WITHOUT credentials.
//! - `*` in the allowlist means any origin.

use axum::Router;
use axum::http::{HeaderName, HeaderValue, Method, header};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::Config;

/// Apply CORS policy to the given Router.
///
/// IMPORTANT:
/// - Do not combine wildcard origin (`Any`) with `allow_credentials(true)`.
pub fn apply(router: Router, config: &Config) -> Router {
    router.layer(layer(&config.cors_allowed_origins))
}

fn layer(origins: &[String]) -> CorsLayer {
    let cors = if origins.iter().any(|o| o == "*") {
        CorsLayer::new().allow_origin(Any)
    } else {
        // An empty allowlist allows none (no CORS headers).
        let allowed: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        let allow_origin = AllowOrigin::predicate(move |origin: &HeaderValue, _req| {
            allowed.iter().any(|v| v == origin)
        });

        CorsLayer::new().allow_origin(allow_origin)
    };

    cors.allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static("x-request-id"),
        ])
        .max_age(std::time::Duration::from_secs(60 * 10))
}
