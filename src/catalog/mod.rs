//! Catalog services.
//!
//! [`CatalogQueryService`] serves the three unfiltered views (full product
//! list, admin list, categories) through the read-through cache and sends
//! everything else straight to the backing store. [`CatalogMutationService`]
//! writes to the backing store and, only after the write commits, clears the
//! cache keys mapped to that mutation.

mod mutation;
mod query;

pub use mutation::{CatalogMutationService, ReviewInput};
pub use query::{CatalogQueryService, RESULT_PER_PAGE, SearchResult};

use crate::database::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Product not found")]
    ProductNotFound,
    #[error("Review not found")]
    ReviewNotFound,
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
