//! DVD category and producer lookups

use async_trait::async_trait;
use sqlx::{Pool, Postgres};

use crate::{
    error::AppResult,
    models::catalog::{DvdCategory, Producer},
};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_dvd_categories(&self) -> AppResult<Vec<DvdCategory>>;
    async fn list_producers(&self) -> AppResult<Vec<Producer>>;
}

#[derive(Clone)]
pub struct CatalogRepository {
    pool: Pool<Postgres>,
}

impl CatalogRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CatalogStore for CatalogRepository {
    async fn list_dvd_categories(&self) -> AppResult<Vec<DvdCategory>> {
        let categories = sqlx::query_as::<_, DvdCategory>(
            "SELECT id, description, age_restricted FROM dvd_categories ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn list_producers(&self) -> AppResult<Vec<Producer>> {
        let producers = sqlx::query_as::<_, Producer>("SELECT id, name FROM producers ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(producers)
    }
}
