//! DVD catalog lookup service

use std::sync::Arc;

use crate::{
    error::AppResult,
    models::catalog::{DvdCategory, Producer},
    repository::CatalogStore,
};

#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn CatalogStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn CatalogStore>) -> Self {
        Self { store }
    }

    pub async fn list_dvd_categories(&self) -> AppResult<Vec<DvdCategory>> {
        self.store.list_dvd_categories().await
    }

    pub async fn list_producers(&self) -> AppResult<Vec<Producer>> {
        self.store.list_producers().await
    }
}
