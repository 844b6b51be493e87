/// Factory: build the process-wide token verifier from application `Config`.
use std::sync::Arc;
use std::time::Duration;

use crate::config::Config;
use crate::services::auth::{FirebaseVerifier, KeyStore, TokenVerifier};

pub fn build_token_verifier(config: &Config) -> Arc<dyn TokenVerifier> {
    let keys = KeyStore::new(
        config.firebase_jwks_url.clone(),
        Duration::from_secs(config.firebase_keys_cache_ttl_seconds),
    );

    Arc::new(FirebaseVerifier::new(
        &config.firebase_project_id,
        Arc::new(keys),
        config.id_token_leeway_seconds,
    ))
}
