use std::sync::Arc;

use cache::{CacheStore, CatalogCache};
use catalog::{CatalogMutationService, CatalogQueryService};
use config::Config;
use database::{CouponRepository, OrderRepository, ProductRepository, UserRepository};
use payment::PaymentGateway;

pub mod cache;
pub mod catalog;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod payment;
pub mod result;
pub mod routes;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub catalog: CatalogQueryService,
    pub catalog_mutations: CatalogMutationService,
    pub users: Arc<dyn UserRepository>,
    pub orders: Arc<dyn OrderRepository>,
    pub coupons: Arc<dyn CouponRepository>,
    pub payments: Arc<dyn PaymentGateway>,
}

impl AppState {
    /// Wires both catalog services to one shared cache instance.
    pub fn new<S>(
        config: Config,
        store: Arc<S>,
        cache_store: Arc<dyn CacheStore>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self
    where
        S: ProductRepository + UserRepository + OrderRepository + CouponRepository + 'static,
    {
        let cache = CatalogCache::new(cache_store);
        let products: Arc<dyn ProductRepository> = store.clone();
        Self {
            config,
            catalog: CatalogQueryService::new(products.clone(), cache.clone()),
            catalog_mutations: CatalogMutationService::new(products, cache),
            users: store.clone(),
            orders: store.clone(),
            coupons: store,
            payments,
        }
    }
}
