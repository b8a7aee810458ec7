use std::fmt;

/// Full product list, newest first.
const ALL_PRODUCTS_KEY: &str = "all-products";

/// Admin product listing.
const ADMIN_PRODUCTS_KEY: &str = "admin-products";

/// Distinct category list.
const CATEGORIES_KEY: &str = "categories";

/// Every catalog view the cache may hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    AllProducts,
    AdminProducts,
    Categories,
}

impl CacheKey {
    pub const ALL: [CacheKey; 3] = [
        CacheKey::AllProducts,
        CacheKey::AdminProducts,
        CacheKey::Categories,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            CacheKey::AllProducts => ALL_PRODUCTS_KEY,
            CacheKey::AdminProducts => ADMIN_PRODUCTS_KEY,
            CacheKey::Categories => CATEGORIES_KEY,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Catalog writes that can change a cached view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogMutation {
    ProductCreated,
    ProductUpdated,
    ProductDeleted,
    ReviewChanged,
    StockAdjusted,
}

impl CatalogMutation {
    /// Keys cleared after the mutation commits. A new cached view must be
    /// added here for every mutation that can change it.
    pub const fn invalidates(self) -> &'static [CacheKey] {
        match self {
            CatalogMutation::ProductCreated
            | CatalogMutation::ProductUpdated
            | CatalogMutation::ProductDeleted => &[
                CacheKey::AllProducts,
                CacheKey::Categories,
                CacheKey::AdminProducts,
            ],
            // Reviews and stock never touch categories.
            CatalogMutation::ReviewChanged | CatalogMutation::StockAdjusted => {
                &[CacheKey::AllProducts, CacheKey::AdminProducts]
            }
        }
    }
}
