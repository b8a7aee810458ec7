use std::sync::Arc;

use serde::Deserialize;
use uuid::Uuid;

use super::CatalogError;
use crate::cache::{CatalogCache, CatalogMutation};
use crate::database::ProductRepository;
use crate::database::models::{NewProduct, Product, ProductPatch, Review, User};

#[derive(Debug, Clone, Deserialize)]
pub struct ReviewInput {
    #[serde(rename = "productId")]
    pub product_id: Uuid,
    pub rating: f64,
    pub comment: String,
}

impl ReviewInput {
    fn validate(&self) -> Result<(), CatalogError> {
        if !(0.0..=5.0).contains(&self.rating) {
            return Err(CatalogError::Invalid(
                "rating must be between 0 and 5".to_string(),
            ));
        }
        if self.comment.trim().is_empty() {
            return Err(CatalogError::Invalid("comment is required".to_string()));
        }
        Ok(())
    }
}

/// Every write that changes what a cached catalog view would return goes
/// through here. The cache is cleared after the store commits, never before,
/// and never when the write fails.
#[derive(Clone)]
pub struct CatalogMutationService {
    products: Arc<dyn ProductRepository>,
    cache: CatalogCache,
}

impl CatalogMutationService {
    pub fn new(products: Arc<dyn ProductRepository>, cache: CatalogCache) -> Self {
        Self { products, cache }
    }

    pub async fn create_product(&self, new: NewProduct) -> Result<Product, CatalogError> {
        new.validate().map_err(CatalogError::Invalid)?;
        let product = Product::from_new(new);
        self.products.insert(&product).await?;

        tracing::info!(product_id = %product.id, "product created");
        self.cache.invalidate(CatalogMutation::ProductCreated).await;
        Ok(product)
    }

    pub async fn update_product(
        &self,
        id: Uuid,
        patch: ProductPatch,
    ) -> Result<Product, CatalogError> {
        let mut product = self.load(id).await?;
        product.apply(patch).map_err(CatalogError::Invalid)?;
        if !self.products.save(&product).await? {
            return Err(CatalogError::ProductNotFound);
        }

        tracing::info!(product_id = %id, "product updated");
        self.cache.invalidate(CatalogMutation::ProductUpdated).await;
        Ok(product)
    }

    /// Soft-deletes the product. The store drops it from every wishlist in
    /// the same step, so invalidation runs after both are done.
    pub async fn delete_product(&self, id: Uuid) -> Result<(), CatalogError> {
        if !self.products.remove(id).await? {
            return Err(CatalogError::ProductNotFound);
        }

        tracing::info!(product_id = %id, "product deleted");
        self.cache.invalidate(CatalogMutation::ProductDeleted).await;
        Ok(())
    }

    /// Creates the caller's review, or replaces it if they already left one.
    pub async fn upsert_review(
        &self,
        author: &User,
        input: ReviewInput,
    ) -> Result<Product, CatalogError> {
        input.validate()?;
        let mut product = self.load(input.product_id).await?;
        product.upsert_review(Review {
            id: Uuid::new_v4(),
            user: author.id,
            name: author.full_name.clone(),
            avatar: author.avatar.as_ref().map(|a| a.url.clone()),
            rating: input.rating,
            comment: input.comment,
        });
        if !self.products.save(&product).await? {
            return Err(CatalogError::ProductNotFound);
        }

        self.cache.invalidate(CatalogMutation::ReviewChanged).await;
        Ok(product)
    }

    pub async fn delete_review(
        &self,
        product_id: Uuid,
        review_id: Uuid,
    ) -> Result<Product, CatalogError> {
        let mut product = self.load(product_id).await?;
        if !product.remove_review(review_id) {
            return Err(CatalogError::ReviewNotFound);
        }
        if !self.products.save(&product).await? {
            return Err(CatalogError::ProductNotFound);
        }

        self.cache.invalidate(CatalogMutation::ReviewChanged).await;
        Ok(product)
    }

    /// Applies stock deltas for each `(product, delta)` pair, all or nothing.
    ///
    /// Products that no longer exist are skipped. When a delta fails, the ones
    /// already applied are reverted before the error is returned. The cache is
    /// cleared once if any product was touched.
    pub async fn adjust_stock(&self, deltas: &[(Uuid, i32)]) -> Result<(), CatalogError> {
        let mut applied: Vec<(Uuid, i32)> = Vec::with_capacity(deltas.len());
        let mut outcome = Ok(());
        for &(id, delta) in deltas {
            match self.products.adjust_stock(id, delta).await {
                Ok(true) => applied.push((id, delta)),
                Ok(false) => tracing::warn!(product_id = %id, "stock adjustment for missing product"),
                Err(e) => {
                    outcome = Err(e.into());
                    break;
                }
            }
        }

        if outcome.is_err() {
            for &(id, delta) in applied.iter().rev() {
                if let Err(e) = self.products.adjust_stock(id, -delta).await {
                    tracing::error!(product_id = %id, delta, error = %e, "failed to revert stock adjustment");
                }
            }
        }

        if !applied.is_empty() {
            self.cache.invalidate(CatalogMutation::StockAdjusted).await;
        }
        outcome
    }

    async fn load(&self, id: Uuid) -> Result<Product, CatalogError> {
        self.products
            .find_by_id(id)
            .await?
            .ok_or(CatalogError::ProductNotFound)
    }
}
