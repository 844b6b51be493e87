/*
 * Responsibility
 * - アプリ共通の AppError 定義
 * - IntoResponse 実装 (HTTP status / JSON error body)
 * - RepoError / 認証エラーを統一的に変換
 */
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::repos::error::RepoError;

/// Error body returned to clients: `{"message": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub message: String,
}

#[derive(Debug, Error)]
pub enum AppError {
    /// No (or empty) Authorization header.
    #[error("No token provided")]
    MissingCredential,
    /// Authorization scheme is not `Bearer`.
    #[error("Invalid token")]
    MalformedScheme,
    /// The identity provider rejected the credential. The cause is logged, never returned.
    #[error("Could not authorize")]
    VerificationFailure,
    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MissingCredential | AppError::MalformedScheme => StatusCode::UNAUTHORIZED,
            AppError::VerificationFailure => StatusCode::FORBIDDEN,
            AppError::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            message: self.to_string(),
        };

        (self.status(), Json(body)).into_response()
    }
}

impl From<RepoError> for AppError {
    fn from(e: RepoError) -> Self {
        tracing::error!(error = ?e, "product query failed");
        match e {
            RepoError::Db(_) => AppError::Internal,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_map_to_expected_statuses() {
        assert_eq!(AppError::MissingCredential.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::MalformedScheme.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::VerificationFailure.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::Internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn message_body_uses_display_text() {
        let body = serde_json::to_value(ErrorResponse {
            message: AppError::VerificationFailure.to_string(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"message": "Could not authorize"}));
    }
}
