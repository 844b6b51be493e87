/*
 * Responsibility
 * - Products の response DTO
 * - JSON のキーは既存フロントエンドに合わせて camelCase (createdAt/updatedAt)
 */
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::repos::ProductRow;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductResponse {
    pub id: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ProductRow> for ProductResponse {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
