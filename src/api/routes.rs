/*
 * Responsibility
 * - /api の URL 構造を定義
 * - /api 配下は全て認証必須 (未定義パスも認証を通してから 404)
 */
use axum::{Router, routing::get};

use crate::api::handlers::{not_found::not_found, products::list_products};
use crate::middleware;
use crate::state::AppState;

pub fn routes(state: AppState) -> Router<AppState> {
    let api = Router::new()
        .route("/products", get(list_products))
        .fallback(not_found);

    middleware::auth::apply(api, state)
}
