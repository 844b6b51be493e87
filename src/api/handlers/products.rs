/*
 * Responsibility
 * - GET /api/products
 * - auth middleware を通過したリクエストのみ到達する (AuthIdentity が必ずある)
 * - repo のエラーは AppError::Internal (500) に変換
 */
use axum::{Json, extract::State};

use crate::{
    api::{dto::products::ProductResponse, extractors::AuthIdentity},
    error::AppError,
    state::AppState,
};

pub async fn list_products(
    State(state): State<AppState>,
    AuthIdentity(identity): AuthIdentity,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let rows = state.products.list().await?;

    tracing::debug!(uid = %identity.uid, count = rows.len(), "listing products");

    Ok(Json(rows.into_iter().map(ProductResponse::from).collect()))
}
