use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use uuid::Uuid;

use crate::cache::{
    AdminProductsView, AllProductsView, CachedView, CatalogCache, CategoriesView, ProductListing,
};
use crate::database::models::{Product, ProductQuery, Review};
use crate::database::{ProductRepository, StoreError};

/// Page size of the filtered product search.
pub const RESULT_PER_PAGE: u32 = 10;

#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    pub products: Vec<Product>,
    pub products_count: i64,
    pub result_per_page: u32,
    pub filtered_products_count: usize,
}

#[derive(Clone)]
pub struct CatalogQueryService {
    products: Arc<dyn ProductRepository>,
    cache: CatalogCache,
}

impl CatalogQueryService {
    pub fn new(products: Arc<dyn ProductRepository>, cache: CatalogCache) -> Self {
        Self { products, cache }
    }

    /// Serves `V` from the cache, or loads it once from the store and caches it.
    async fn read_through<V, F, Fut>(&self, load: F) -> Result<V::Snapshot, StoreError>
    where
        V: CachedView,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = Result<V::Snapshot, StoreError>> + Send,
    {
        if let Some(snapshot) = self.cache.load::<V>().await {
            return Ok(snapshot);
        }
        let snapshot = load().await?;
        self.cache.put::<V>(&snapshot).await;
        Ok(snapshot)
    }

    /// All live products, newest first.
    pub async fn all_products(&self) -> Result<ProductListing, StoreError> {
        self.read_through::<AllProductsView, _, _>(|| async {
            self.products.list_all().await.map(ProductListing::new)
        })
        .await
    }

    pub async fn admin_products(&self) -> Result<Vec<Product>, StoreError> {
        self.read_through::<AdminProductsView, _, _>(|| self.products.list_all())
            .await
    }

    pub async fn categories(&self) -> Result<Vec<String>, StoreError> {
        self.read_through::<CategoriesView, _, _>(|| self.products.distinct_categories())
            .await
    }

    /// First page of the unfiltered catalog, cut from the cached listing.
    /// Same shape as `search` with `page=1` and no criteria.
    pub async fn first_page(&self) -> Result<SearchResult, StoreError> {
        let listing = self.all_products().await?;
        Ok(SearchResult {
            products_count: listing.products_count as i64,
            filtered_products_count: listing.products_count,
            result_per_page: RESULT_PER_PAGE,
            products: listing
                .products
                .into_iter()
                .take(RESULT_PER_PAGE as usize)
                .collect(),
        })
    }

    /// Filtered, paginated search. Never cached: the cache keys do not
    /// carry filter criteria.
    pub async fn search(&self, query: &ProductQuery) -> Result<SearchResult, StoreError> {
        let products_count = self.products.count().await?;
        let page = self.products.search(query, RESULT_PER_PAGE).await?;
        Ok(SearchResult {
            products: page.products,
            products_count,
            result_per_page: RESULT_PER_PAGE,
            filtered_products_count: page.filtered_count,
        })
    }

    pub async fn product(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        self.products.find_by_id(id).await
    }

    pub async fn reviews(&self, product_id: Uuid) -> Result<Option<Vec<Review>>, StoreError> {
        Ok(self
            .products
            .find_by_id(product_id)
            .await?
            .map(|p| p.reviews))
    }
}
