use axum::{Json, http::StatusCode, response::IntoResponse};

use crate::error::ErrorResponse;

pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            message: "Not found".to_string(),
        }),
    )
}
