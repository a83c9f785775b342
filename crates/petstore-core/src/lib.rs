//! Pet data model, in-memory catalog store, and catalog service for Petstore.
//!
//! This crate holds everything with a non-trivial contract: the `Pet` record and
//! its `Status` labels, the `CatalogStore` keyed collection with status-filter
//! queries, the `CatalogService` that assigns identifiers on create, and the
//! built-in seed catalog.

pub mod model;
pub mod seed;
pub mod service;
pub mod store;

pub use model::{ApiResponse, Category, Pet, Status, Tag};
pub use seed::{default_pets, load_seed, parse_seed};
pub use service::CatalogService;
pub use store::{CatalogStore, STATUS_SEPARATOR};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("seed I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("seed parse error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CatalogError {
    pub(crate) fn pet_not_found(id: i64) -> Self {
        CatalogError::NotFound(format!("pet with id {id} not found"))
    }
}
