/// Cache data models
/// Typed snapshots for each cached catalog view

pub mod catalog;

pub use catalog::{
    AdminProductsView, AllProductsView, CachedView, CategoriesView, ProductListing, decode, encode,
};
