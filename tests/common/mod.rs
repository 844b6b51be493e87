//! Shared fakes and helpers for integration tests.
#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use chrono::{DateTime, Utc};
use http_body_util::BodyExt;
use serde::Deserialize;
use tower::ServiceExt;

use catalog_api::app::build_router;
use catalog_api::config::{AppEnv, Config, DEFAULT_FIREBASE_JWKS_URL};
use catalog_api::repos::{ProductRepo, ProductRow, error::RepoResult};
use catalog_api::services::auth::{Identity, TokenVerifier, VerifyError};
use catalog_api::state::AppState;

pub const PRODUCTS_FIXTURE: &str = include_str!("../fixtures/products.json");

/// Fixture rows in the shape the API serves them (camelCase timestamps).
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct FixtureProduct {
    id: String,
    name: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

pub fn fixture_rows() -> Vec<ProductRow> {
    let products: Vec<FixtureProduct> =
        serde_json::from_str(PRODUCTS_FIXTURE).expect("products fixture is valid json");

    products
        .into_iter()
        .map(|p| ProductRow {
            id: p.id,
            name: p.name,
            created_at: p.created_at,
            updated_at: p.updated_at,
        })
        .collect()
}

/// Product repo serving the fixture and counting calls.
#[derive(Default)]
pub struct FixtureRepo {
    pub calls: AtomicUsize,
    pub fail: bool,
}

impl FixtureRepo {
    pub fn failing() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: true,
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProductRepo for FixtureRepo {
    async fn list(&self) -> RepoResult<Vec<ProductRow>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(sqlx::Error::PoolTimedOut.into());
        }
        Ok(fixture_rows())
    }
}

/// Verifier standing in for Firebase: resolves or rejects every credential.
pub struct MockVerifier {
    pub accept: bool,
    pub calls: AtomicUsize,
}

impl MockVerifier {
    pub fn resolving() -> Self {
        Self {
            accept: true,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn rejecting() -> Self {
        Self {
            accept: false,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TokenVerifier for MockVerifier {
    async fn verify(&self, credential: &str) -> Result<Identity, VerifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.accept {
            Ok(Identity::new(format!("uid-{credential}")))
        } else {
            Err(VerifyError::Rejected("id token has been revoked".to_string()))
        }
    }
}

/// Verifier that never answers within a short request timeout.
pub struct SlowVerifier {
    pub delay: Duration,
}

#[async_trait]
impl TokenVerifier for SlowVerifier {
    async fn verify(&self, credential: &str) -> Result<Identity, VerifyError> {
        tokio::time::sleep(self.delay).await;
        Ok(Identity::new(format!("uid-{credential}")))
    }
}

pub fn test_config() -> Config {
    Config {
        addr: "127.0.0.1:0".parse().expect("valid addr"),
        app_env: AppEnv::Development,
        database_url: "postgres://unused".to_string(),
        database_max_connections: 1,
        cors_allowed_origins: vec!["http://localhost:8080".to_string()],
        firebase_project_id: "demo-project".to_string(),
        firebase_jwks_url: DEFAULT_FIREBASE_JWKS_URL.to_string(),
        firebase_keys_cache_ttl_seconds: 3600,
        id_token_leeway_seconds: 60,
        request_timeout_seconds: 30,
        public_dir: PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/public"),
    }
}

pub fn app(repo: Arc<FixtureRepo>, verifier: Arc<MockVerifier>) -> Router {
    app_with(repo, verifier, &test_config())
}

pub fn app_with(
    repo: Arc<FixtureRepo>,
    verifier: Arc<dyn TokenVerifier>,
    config: &Config,
) -> Router {
    build_router(AppState::new(repo, verifier), config)
}

pub async fn get(app: Router, uri: &str, authorization: Option<&str>) -> Response<Body> {
    let mut req = Request::builder().method("GET").uri(uri);
    if let Some(value) = authorization {
        req = req.header(header::AUTHORIZATION, value);
    }

    app.oneshot(req.body(Body::empty()).expect("valid request"))
        .await
        .expect("router is infallible")
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("readable body")
        .to_bytes();
    serde_json::from_slice(&bytes).expect("json body")
}
