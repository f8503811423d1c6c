//! Repository layer for database operations

pub mod catalog;
pub mod members;

use sqlx::{Pool, Postgres};

pub use catalog::{CatalogRepository, CatalogStore};
pub use members::{MemberStore, MemberUnitOfWork, MembersRepository};

/// Postgres-backed repositories sharing one connection pool
#[derive(Clone)]
pub struct Repository {
    pub members: MembersRepository,
    pub catalog: CatalogRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            members: MembersRepository::new(pool.clone()),
            catalog: CatalogRepository::new(pool),
        }
    }
}
