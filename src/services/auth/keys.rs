//! Signing-key store for Firebase ID tokens.
//!
//! Fetches Google's `securetoken` JWKS and caches it in memory. The cache
//! lifetime follows `Cache-Control: max-age` when the response carries one,
//! otherwise the configured fallback TTL.
//!
//! While the cache is fresh an unknown `kid` is rejected without a refetch:
//! Google publishes new keys before signing with them, so a fresh document
//! already lists every legitimate key. Concurrent misses on a stale cache
//! share a single fetch.
use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::http::{HeaderMap, header};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum KeyStoreError {
    #[error("signing keys unavailable: {0}")]
    Unavailable(String),
    #[error("unknown signing key: {0}")]
    UnknownKey(String),
}

/// RSA public key as published in the JWKS document.
#[derive(Debug, Clone, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub kid: String,
    #[serde(default)]
    pub alg: Option<String>,
    pub n: String,
    pub e: String,
}

#[derive(Debug, Deserialize)]
struct JwksDocument {
    keys: Vec<Jwk>,
}

struct CachedKeys {
    keys: HashMap<String, Jwk>,
    expires_at: Instant,
}

pub struct KeyStore {
    jwks_url: String,
    http: reqwest::Client,
    fallback_ttl: Duration,
    cache: RwLock<Option<CachedKeys>>,
    // 同時に期限切れを検知したリクエストが一度だけ fetch するための直列化
    refresh_lock: Mutex<()>,
}

impl std::fmt::Debug for KeyStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyStore")
            .field("jwks_url", &self.jwks_url)
            .field("fallback_ttl", &self.fallback_ttl)
            .finish()
    }
}

impl KeyStore {
    pub fn new(jwks_url: impl Into<String>, fallback_ttl: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(FETCH_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "failed to build key fetch client, using defaults");
                reqwest::Client::new()
            });

        Self {
            jwks_url: jwks_url.into(),
            http,
            fallback_ttl,
            cache: RwLock::new(None),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Look up a key by `kid`, fetching the document only when the cache is
    /// empty or expired.
    pub async fn get(&self, kid: &str) -> Result<Jwk, KeyStoreError> {
        if let Some(found) = self.lookup_fresh(kid).await {
            return found;
        }

        let _guard = self.refresh_lock.lock().await;
        // 待っている間に別のリクエストが更新済みならそれを使う
        if let Some(found) = self.lookup_fresh(kid).await {
            return found;
        }

        self.refresh().await?;

        // max-age=0 の document でも、今回の検証には取得したものを使う
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .and_then(|cached| cached.keys.get(kid).cloned())
            .ok_or_else(|| KeyStoreError::UnknownKey(kid.to_string()))
    }

    /// `None` when the cache is empty or expired.
    async fn lookup_fresh(&self, kid: &str) -> Option<Result<Jwk, KeyStoreError>> {
        let cache = self.cache.read().await;
        let cached = cache
            .as_ref()
            .filter(|cached| cached.expires_at > Instant::now())?;

        Some(
            cached
                .keys
                .get(kid)
                .cloned()
                .ok_or_else(|| KeyStoreError::UnknownKey(kid.to_string())),
        )
    }

    async fn refresh(&self) -> Result<(), KeyStoreError> {
        tracing::debug!(url = %self.jwks_url, "fetching signing keys");

        let response = self
            .http
            .get(&self.jwks_url)
            .send()
            .await
            .map_err(|e| KeyStoreError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(KeyStoreError::Unavailable(format!(
                "key endpoint returned {}",
                response.status()
            )));
        }

        let ttl = max_age(response.headers()).unwrap_or(self.fallback_ttl);

        let document: JwksDocument = response
            .json()
            .await
            .map_err(|e| KeyStoreError::Unavailable(e.to_string()))?;

        let keys: HashMap<String, Jwk> = document
            .keys
            .into_iter()
            .filter(|k| k.kty == "RSA")
            .map(|k| (k.kid.clone(), k))
            .collect();

        tracing::info!(key_count = keys.len(), ttl_secs = ttl.as_secs(), "signing keys refreshed");

        let mut cache = self.cache.write().await;
        *cache = Some(CachedKeys {
            keys,
            expires_at: Instant::now() + ttl,
        });

        Ok(())
    }
}

/// `max-age` directive of a `Cache-Control` header, if any.
fn max_age(headers: &HeaderMap) -> Option<Duration> {
    let value = headers.get(header::CACHE_CONTROL)?.to_str().ok()?;

    value
        .split(',')
        .filter_map(|directive| directive.trim().strip_prefix("max-age="))
        .find_map(|secs| secs.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}
