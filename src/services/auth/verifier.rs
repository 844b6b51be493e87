//! Token verification boundary used by the auth middleware.
use async_trait::async_trait;
use thiserror::Error;

use crate::services::auth::keys::KeyStoreError;

/// Authenticated subject resolved from a verified ID token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub auth_time: Option<i64>,
    pub sign_in_provider: Option<String>,
}

impl Identity {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            email_verified: None,
            auth_time: None,
            sign_in_provider: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("token is malformed")]
    Malformed,
    #[error("unsupported signing algorithm: {0:?}")]
    UnsupportedAlgorithm(jsonwebtoken::Algorithm),
    #[error("token header has no 'kid'")]
    MissingKeyId,
    #[error(transparent)]
    Keys(#[from] KeyStoreError),
    #[error("jwt verification failed: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
    #[error("invalid '{0}' claim")]
    InvalidClaim(&'static str),
    #[error("token rejected: {0}")]
    Rejected(String),
}

/// Verifies a bearer credential against an identity provider.
///
/// One call per request; failures are terminal (no retry).
#[async_trait]
pub trait TokenVerifier: Send + Sync + 'static {
    async fn verify(&self, credential: &str) -> Result<Identity, VerifyError>;
}
