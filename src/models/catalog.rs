//! DVD catalog lookups

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct DvdCategory {
    pub id: i32,
    pub description: String,
    pub age_restricted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Producer {
    pub id: i32,
    pub name: String,
}
