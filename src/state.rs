/*
 * Responsibility
 * - Router に紐づける共有コンテキスト (AppState)
 *   - products: 商品一覧の読み取り, verifier: ID トークン検証
 * - Clone 前提で持つ (内部は Arc で Clone cheap)
 * - 起動時に一度だけ組み立てる (リクエストごとの再初期化はしない)
 */
use std::sync::Arc;

use crate::repos::ProductRepo;
use crate::services::auth::TokenVerifier;

#[derive(Clone)]
pub struct AppState {
    pub products: Arc<dyn ProductRepo>,
    pub verifier: Arc<dyn TokenVerifier>,
}

impl AppState {
    pub fn new(products: Arc<dyn ProductRepo>, verifier: Arc<dyn TokenVerifier>) -> Self {
        Self { products, verifier }
    }
}
