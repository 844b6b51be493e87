/*
 * Responsibility
 * - "Products" テーブル向け SQLx 操作 (読み取りのみ)
 * - handler からは ProductRepo trait 越しに使う (テストでは差し替え)
 */
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};

use crate::repos::error::RepoResult;

#[derive(Debug, Clone, FromRow)]
pub struct ProductRow {
    pub id: String,
    pub name: String,

    #[sqlx(rename = "createdAt")]
    pub created_at: DateTime<Utc>,

    #[sqlx(rename = "updatedAt")]
    pub updated_at: DateTime<Utc>,
}

/// Read access to the product catalog.
#[async_trait]
pub trait ProductRepo: Send + Sync + 'static {
    async fn list(&self) -> RepoResult<Vec<ProductRow>>;
}

#[derive(Clone, Debug)]
pub struct PgProductRepo {
    db: PgPool,
}

impl PgProductRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ProductRepo for PgProductRepo {
    async fn list(&self) -> RepoResult<Vec<ProductRow>> {
        let rows = sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT id, name, "createdAt", "updatedAt"
            FROM "Products"
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }
}
