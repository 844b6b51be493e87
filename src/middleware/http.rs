//! HTTP-level middleware for every route (`/health`, `/api/*`, static files).
//!
//! Responsibility:
//! - Request-Id generation + propagation (X-Request-Id)
//! - Request span carrying the request id, so auth-gate and key-store logs correlate
//! - Body size limits (the API is read-only; bodies are never consumed)
//! - Global timeout (bounds a hung verifier, key fetch or product query)

use std::time::Duration;

use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::http::{Request, StatusCode, header::HeaderName};
use tower::timeout::{TimeoutLayer, error::Elapsed};
use tower::{BoxError, ServiceBuilder};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::config::Config;

const REQUEST_ID_HEADER: &str = "x-request-id";
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Apply HTTP-level middleware to the given Router.
///
/// - Request-Id header: `x-request-id` (client value kept, otherwise a UUID)
/// - Body limit: 1 MiB
/// - Timeout: `REQUEST_TIMEOUT_SECONDS` (408 on expiry)
pub fn apply(router: Router, config: &Config) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);
    let timeout = Duration::from_secs(config.request_timeout_seconds);

    let layers = ServiceBuilder::new()
        // timeout などの layer エラーをレスポンスに変換する (Router は Infallible 前提)
        .layer(HandleErrorLayer::new(handle_layer_error))
        // 以降の layer とハンドラから request id が見えるよう、最初に付与する
        .layer(SetRequestIdLayer::new(
            request_id_header.clone(),
            MakeRequestUuid,
        ))
        // 401/403 を含む全レスポンスに同じ id を返す
        .layer(PropagateRequestIdLayer::new(request_id_header))
        .layer(RequestBodyLimitLayer::new(BODY_LIMIT_BYTES))
        // verifier の鍵取得や DB クエリが詰まってもここで打ち切る
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http().make_span_with(request_span));

    router.layer(layers)
}

async fn handle_layer_error(err: BoxError) -> StatusCode {
    if err.is::<Elapsed>() {
        tracing::warn!("request timed out");
        StatusCode::REQUEST_TIMEOUT
    } else {
        tracing::error!(error = %err, "unhandled middleware error");
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

// body 型は RequestBodyLimitLayer が包むので generic にしておく
fn request_span<B>(req: &Request<B>) -> Span {
    let request_id = req
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %req.method(),
        path = %req.uri().path(),
        request_id = %request_id,
    )
}
