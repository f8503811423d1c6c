//! Business logic services

pub mod catalog;
pub mod eligibility;
pub mod images;
pub mod loan_status;
pub mod members;

use std::sync::Arc;

use crate::repository::Repository;

/// Container for all services
#[derive(Clone)]
pub struct Services {
    pub members: members::MembersService,
    pub catalog: catalog::CatalogService,
}

impl Services {
    /// Create all services on top of the Postgres repositories
    pub fn new(repository: Repository) -> Self {
        Self {
            members: members::MembersService::new(Arc::new(repository.members)),
            catalog: catalog::CatalogService::new(Arc::new(repository.catalog)),
        }
    }
}
