// Backing store: repository traits plus the Postgres and in-memory implementations

pub mod memory;
pub mod models;
pub mod postgres;

use async_trait::async_trait;
use uuid::Uuid;

use models::{Coupon, Order, OrderStatus, Product, ProductPage, ProductQuery, Role, User, WishlistItem};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("{0}")]
    Conflict(String),
    #[error("stored record is malformed: {0}")]
    Corrupt(String),
    #[error("backing store unavailable: {0}")]
    Unavailable(String),
    #[error("stock of product {0} would leave the supported range")]
    StockOutOfRange(Uuid),
}

impl StoreError {
    /// Maps unique-constraint violations to `Conflict`, everything else to `Database`.
    pub(crate) fn from_write(err: sqlx::Error, conflict: &str) -> Self {
        match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                StoreError::Conflict(conflict.to_string())
            }
            _ => StoreError::Database(err),
        }
    }
}

/// Product persistence. Soft-deleted products are invisible to every read.
#[async_trait]
pub trait ProductRepository: Send + Sync {
    async fn count(&self) -> Result<i64, StoreError>;

    /// All live products, newest first.
    async fn list_all(&self) -> Result<Vec<Product>, StoreError>;

    /// Distinct categories of live products, sorted.
    async fn distinct_categories(&self) -> Result<Vec<String>, StoreError>;

    async fn search(&self, query: &ProductQuery, per_page: u32) -> Result<ProductPage, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError>;

    async fn insert(&self, product: &Product) -> Result<(), StoreError>;

    /// Overwrites a live product. Returns false when it does not exist.
    async fn save(&self, product: &Product) -> Result<bool, StoreError>;

    /// Soft-deletes the product and pulls it out of every wishlist in one step.
    async fn remove(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn adjust_stock(&self, id: Uuid, delta: i32) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the email is taken.
    async fn insert(&self, user: &User) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Persists profile, password and role. The wishlist is managed separately.
    async fn save(&self, user: &User) -> Result<bool, StoreError>;

    /// Users with `role`, newest first.
    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, StoreError>;

    /// Returns false when the product is already on the list.
    async fn add_to_wishlist(&self, user_id: Uuid, item: WishlistItem) -> Result<bool, StoreError>;

    async fn remove_from_wishlist(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn insert(&self, order: &Order) -> Result<(), StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError>;

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError>;

    /// Every order, newest first.
    async fn list_all(&self) -> Result<Vec<Order>, StoreError>;

    async fn save_status(&self, order: &Order) -> Result<bool, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait CouponRepository: Send + Sync {
    /// Fails with `Conflict` when the code is taken.
    async fn insert(&self, coupon: &Coupon) -> Result<(), StoreError>;

    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, StoreError>;

    async fn list(&self) -> Result<Vec<Coupon>, StoreError>;

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError>;
}

pub(crate) fn parse_role(raw: &str) -> Result<Role, StoreError> {
    raw.parse().map_err(StoreError::Corrupt)
}

pub(crate) fn parse_status(raw: &str) -> Result<OrderStatus, StoreError> {
    raw.parse().map_err(StoreError::Corrupt)
}
