/// Cache keys
/// Fixed catalog keys and the mutation → key invalidation map

pub mod catalog_keys;

pub use catalog_keys::{CacheKey, CatalogMutation};
