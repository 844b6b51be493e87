use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::services::auth::keys::KeyStore;
use crate::services::auth::verifier::{Identity, TokenVerifier, VerifyError};

const ISSUER_PREFIX: &str = "https://securetoken.google.com/";
const MAX_UID_LEN: usize = 128;

/// Firebase ID token claims.
///
/// `iss`/`aud`/`exp` are checked by `jsonwebtoken::Validation`; the rest here.
#[derive(Debug, Clone, Deserialize)]
pub struct IdTokenClaims {
    pub sub: String,
    pub iat: i64,
    #[serde(default)]
    pub auth_time: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_verified: Option<bool>,
    #[serde(default)]
    pub firebase: Option<FirebaseClaim>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FirebaseClaim {
    #[serde(default)]
    pub sign_in_provider: Option<String>,
}

/// RS256 Firebase ID token verifier backed by Google's published signing keys.
#[derive(Debug)]
pub struct FirebaseVerifier {
    keys: Arc<KeyStore>,
    validation: Validation,
    leeway_seconds: i64,
}

impl FirebaseVerifier {
    pub fn new(project_id: &str, keys: Arc<KeyStore>, leeway_seconds: u64) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[format!("{ISSUER_PREFIX}{project_id}")]);
        validation.set_audience(&[project_id]);
        validation.set_required_spec_claims(&["exp", "iss", "aud", "sub"]);
        validation.leeway = leeway_seconds;

        Self {
            keys,
            validation,
            leeway_seconds: i64::try_from(leeway_seconds).unwrap_or(i64::MAX),
        }
    }

    fn check_claims(&self, claims: &IdTokenClaims) -> Result<(), VerifyError> {
        if claims.sub.trim().is_empty() || claims.sub.len() > MAX_UID_LEN {
            return Err(VerifyError::InvalidClaim("sub"));
        }

        let latest = Utc::now().timestamp().saturating_add(self.leeway_seconds);
        if claims.iat > latest {
            return Err(VerifyError::InvalidClaim("iat"));
        }
        if let Some(auth_time) = claims.auth_time
            && auth_time > latest
        {
            return Err(VerifyError::InvalidClaim("auth_time"));
        }

        Ok(())
    }
}

#[async_trait]
impl TokenVerifier for FirebaseVerifier {
    async fn verify(&self, credential: &str) -> Result<Identity, VerifyError> {
        if credential.is_empty() {
            return Err(VerifyError::Malformed);
        }

        let header = jsonwebtoken::decode_header(credential).map_err(|_| VerifyError::Malformed)?;
        if header.alg != Algorithm::RS256 {
            return Err(VerifyError::UnsupportedAlgorithm(header.alg));
        }
        let kid = header.kid.ok_or(VerifyError::MissingKeyId)?;

        let jwk = self.keys.get(&kid).await?;
        let key = DecodingKey::from_rsa_components(&jwk.n, &jwk.e)?;

        let data = jsonwebtoken::decode::<IdTokenClaims>(credential, &key, &self.validation)?;
        let claims = data.claims;
        self.check_claims(&claims)?;

        Ok(Identity {
            uid: claims.sub,
            email: claims.email,
            email_verified: claims.email_verified,
            auth_time: claims.auth_time,
            sign_in_provider: claims.firebase.and_then(|f| f.sign_in_provider),
        })
    }
}
