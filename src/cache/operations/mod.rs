/// Cache operations
/// Read-through helpers and invalidation for the catalog views

pub mod catalog;

pub use catalog::CatalogCache;
