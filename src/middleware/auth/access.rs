//! Bearer ID token verification → Identity を extensions に入れる
//!
//! - ヘッダなし / 空          → 401 "No token provided"
//! - scheme が Bearer 以外    → 401 "Invalid token"
//! - credential が UTF-8 以外  → 403 "Could not authorize" (verifier は呼ばない)
//! - verifier が拒否           → 403 "Could not authorize" (理由はログのみ)
//! - 成功                      → Identity を request extensions に格納して next へ

use axum::{
    Router,
    body::Body,
    extract::State,
    http::{HeaderMap, Request, header},
    middleware::{self, Next},
    response::Response,
};

use crate::error::AppError;
use crate::middleware::auth::header::AuthHeader;
use crate::services::auth::{Identity, TokenVerifier};
use crate::state::AppState;

/// `/api/*` に認証を掛けるための middleware を適用する。
///
/// 例：
/// ```ignore
/// let api = api::routes();
/// let api = middleware::auth::apply(api, state.clone());
/// app = app.nest("/api", api);
/// ```
pub fn apply(router: Router<AppState>, state: AppState) -> Router<AppState> {
    // axum 0.8 の from_fn は State extractor を受け取れないため、`from_fn_with_state` で明示的に state を渡す
    router.layer(middleware::from_fn_with_state(state, access_middleware))
}

async fn access_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let identity = authorize(state.verifier.as_ref(), req.headers()).await?;

    tracing::debug!(uid = %identity.uid, "request authorized");

    // middleware → extractor への受け渡し
    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// Decide whether the request may proceed. Calls the verifier at most once.
pub async fn authorize(
    verifier: &dyn TokenVerifier,
    headers: &HeaderMap,
) -> Result<Identity, AppError> {
    let Some(value) = headers.get(header::AUTHORIZATION) else {
        tracing::debug!("missing authorization header");
        return Err(AppError::MissingCredential);
    };

    // バイト列のまま分割する (obs-text を含むヘッダでも scheme で判定できるように)
    let auth = AuthHeader::parse(Some(value.as_bytes())).ok_or(AppError::MissingCredential)?;
    if !auth.is_bearer() {
        tracing::debug!(
            scheme = %String::from_utf8_lossy(auth.scheme),
            "unsupported authorization scheme"
        );
        return Err(AppError::MalformedScheme);
    }

    // UTF-8 でない credential は ID トークンになり得ないので verifier に渡さず拒否
    let Some(credential) = auth.credential_str() else {
        tracing::warn!("bearer credential is not valid utf-8");
        return Err(AppError::VerificationFailure);
    };

    match verifier.verify(credential).await {
        Ok(identity) => Ok(identity),
        Err(err) => {
            tracing::warn!(error = ?err, "id token verification failed");
            Err(AppError::VerificationFailure)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use axum::http::HeaderValue;

    use super::*;
    use crate::services::auth::VerifyError;

    #[derive(Default)]
    struct StubVerifier {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl TokenVerifier for StubVerifier {
        async fn verify(&self, credential: &str) -> Result<Identity, VerifyError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match credential {
                "goodtoken" => Ok(Identity::new("user-1")),
                other => Err(VerifyError::Rejected(format!("bad token {other}"))),
            }
        }
    }

    fn headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[tokio::test]
    async fn missing_header_is_rejected_without_verifying() {
        let verifier = StubVerifier::default();
        let err = authorize(&verifier, &HeaderMap::new()).await.unwrap_err();

        assert!(matches!(err, AppError::MissingCredential));
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_header_counts_as_missing() {
        let verifier = StubVerifier::default();
        let err = authorize(&verifier, &headers("")).await.unwrap_err();

        assert!(matches!(err, AppError::MissingCredential));
    }

    #[tokio::test]
    async fn non_bearer_scheme_is_rejected_without_verifying() {
        let verifier = StubVerifier::default();
        let err = authorize(&verifier, &headers("Basic xyz")).await.unwrap_err();

        assert!(matches!(err, AppError::MalformedScheme));
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn bearer_with_non_utf8_credential_is_forbidden() {
        let verifier = StubVerifier::default();
        let mut map = HeaderMap::new();
        map.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"Bearer \xfa\xfb").unwrap(),
        );

        let err = authorize(&verifier, &map).await.unwrap_err();
        assert!(matches!(err, AppError::VerificationFailure));
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn non_ascii_scheme_is_an_invalid_token() {
        let verifier = StubVerifier::default();
        let mut map = HeaderMap::new();
        map.insert(
            header::AUTHORIZATION,
            HeaderValue::from_bytes(b"B\xe9arer abc").unwrap(),
        );

        let err = authorize(&verifier, &map).await.unwrap_err();
        assert!(matches!(err, AppError::MalformedScheme));
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn accepted_token_yields_identity() {
        let verifier = StubVerifier::default();
        let identity = authorize(&verifier, &headers("bearer goodtoken"))
            .await
            .unwrap();

        assert_eq!(identity.uid, "user-1");
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn rejected_token_is_forbidden_after_one_attempt() {
        let verifier = StubVerifier::default();
        let err = authorize(&verifier, &headers("Bearer badtoken"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::VerificationFailure));
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn bearer_without_credential_goes_to_verifier() {
        let verifier = StubVerifier::default();
        let err = authorize(&verifier, &headers("Bearer")).await.unwrap_err();

        assert!(matches!(err, AppError::VerificationFailure));
        assert_eq!(verifier.calls.load(Ordering::SeqCst), 1);
    }
}
