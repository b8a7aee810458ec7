use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::cache::CacheError;
use crate::cache::keys::CacheKey;
use crate::database::models::Product;

/// A cached catalog view: the key it lives under and the snapshot type stored there.
pub trait CachedView: Send + Sync + 'static {
    const KEY: CacheKey;
    type Snapshot: Serialize + DeserializeOwned + Send + Sync;
}

/// Snapshot stored under `all-products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductListing {
    pub products: Vec<Product>,
    pub products_count: usize,
}

impl ProductListing {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products_count: products.len(),
            products,
        }
    }
}

pub struct AllProductsView;

impl CachedView for AllProductsView {
    const KEY: CacheKey = CacheKey::AllProducts;
    type Snapshot = ProductListing;
}

pub struct AdminProductsView;

impl CachedView for AdminProductsView {
    const KEY: CacheKey = CacheKey::AdminProducts;
    type Snapshot = Vec<Product>;
}

pub struct CategoriesView;

impl CachedView for CategoriesView {
    const KEY: CacheKey = CacheKey::Categories;
    type Snapshot = Vec<String>;
}

pub fn encode<V: CachedView>(snapshot: &V::Snapshot) -> Result<String, CacheError> {
    serde_json::to_string(snapshot).map_err(CacheError::Encode)
}

pub fn decode<V: CachedView>(raw: &str) -> Result<V::Snapshot, CacheError> {
    serde_json::from_str(raw).map_err(|source| CacheError::Corrupt {
        key: V::KEY,
        source,
    })
}
