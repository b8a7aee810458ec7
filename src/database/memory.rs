use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{Coupon, Order, Product, ProductPage, ProductQuery, Role, User, WishlistItem};
use super::{CouponRepository, OrderRepository, ProductRepository, StoreError, UserRepository};

struct ProductEntry {
    product: Product,
    deleted_at: Option<DateTime<Utc>>,
}

#[derive(Default)]
struct State {
    products: Vec<ProductEntry>,
    users: HashMap<Uuid, User>,
    orders: HashMap<Uuid, Order>,
    coupons: HashMap<Uuid, Coupon>,
}

impl State {
    fn live_products(&self) -> impl Iterator<Item = &Product> {
        self.products
            .iter()
            .filter(|e| e.deleted_at.is_none())
            .map(|e| &e.product)
    }

    fn live_product_mut(&mut self, id: Uuid) -> Option<&mut ProductEntry> {
        self.products
            .iter_mut()
            .find(|e| e.product.id == id && e.deleted_at.is_none())
    }

    fn newest_first(&self) -> Vec<Product> {
        let mut products: Vec<Product> = self.live_products().cloned().collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        products
    }
}

/// Process-local store behind one lock, so multi-entity writes such as a
/// product delete plus its wishlist cleanup are atomic to callers.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProductRepository for MemoryStore {
    async fn count(&self) -> Result<i64, StoreError> {
        Ok(self.state.read().await.live_products().count() as i64)
    }

    async fn list_all(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.state.read().await.newest_first())
    }

    async fn distinct_categories(&self) -> Result<Vec<String>, StoreError> {
        let state = self.state.read().await;
        let mut categories: Vec<String> = state.live_products().map(|p| p.category.clone()).collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    async fn search(&self, query: &ProductQuery, per_page: u32) -> Result<ProductPage, StoreError> {
        let matching: Vec<Product> = self
            .state
            .read()
            .await
            .newest_first()
            .into_iter()
            .filter(|p| query.matches(p))
            .collect();
        let skip = (query.page() as usize - 1) * per_page as usize;
        Ok(ProductPage {
            filtered_count: matching.len(),
            products: matching.into_iter().skip(skip).take(per_page as usize).collect(),
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        Ok(self
            .state
            .read()
            .await
            .live_products()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn insert(&self, product: &Product) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.products.iter().any(|e| e.product.id == product.id) {
            return Err(StoreError::Conflict("Product already exists".to_string()));
        }
        state.products.push(ProductEntry {
            product: product.clone(),
            deleted_at: None,
        });
        Ok(())
    }

    async fn save(&self, product: &Product) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        match state.live_product_mut(product.id) {
            Some(entry) => {
                entry.product = product.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn remove(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        match state.live_product_mut(id) {
            Some(entry) => entry.deleted_at = Some(Utc::now()),
            None => return Ok(false),
        }
        for user in state.users.values_mut() {
            user.wishlist.retain(|item| item.product != id);
        }
        Ok(true)
    }

    async fn adjust_stock(&self, id: Uuid, delta: i32) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        match state.live_product_mut(id) {
            Some(entry) => {
                entry.product.stock = entry
                    .product
                    .stock
                    .checked_add(delta)
                    .ok_or(StoreError::StockOutOfRange(id))?;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("Email is already registered".to_string()));
        }
        state.users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.state.read().await.users.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let email = email.trim().to_lowercase();
        Ok(self
            .state
            .read()
            .await
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn save(&self, user: &User) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        if state
            .users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(StoreError::Conflict("Email is already registered".to_string()));
        }
        match state.users.get_mut(&user.id) {
            Some(stored) => {
                let wishlist = std::mem::take(&mut stored.wishlist);
                *stored = user.clone();
                stored.wishlist = wishlist;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, StoreError> {
        let mut users: Vec<User> = self
            .state
            .read()
            .await
            .users
            .values()
            .filter(|u| u.role == role)
            .cloned()
            .collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    async fn add_to_wishlist(&self, user_id: Uuid, item: WishlistItem) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let Some(user) = state.users.get_mut(&user_id) else {
            return Ok(false);
        };
        if user.wishlist.iter().any(|w| w.product == item.product) {
            return Ok(false);
        }
        user.wishlist.push(item);
        Ok(true)
    }

    async fn remove_from_wishlist(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let Some(user) = state.users.get_mut(&user_id) else {
            return Ok(false);
        };
        let before = user.wishlist.len();
        user.wishlist.retain(|w| w.product != product_id);
        Ok(user.wishlist.len() != before)
    }
}

#[async_trait]
impl OrderRepository for MemoryStore {
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        self.state.write().await.orders.insert(order.id, order.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        Ok(self.state.read().await.orders.get(&id).cloned())
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self
            .state
            .read()
            .await
            .orders
            .values()
            .filter(|o| o.user == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        let mut orders: Vec<Order> = self.state.read().await.orders.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(orders)
    }

    async fn save_status(&self, order: &Order) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        match state.orders.get_mut(&order.id) {
            Some(stored) => {
                stored.order_status = order.order_status;
                stored.delivered_at = order.delivered_at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.state.write().await.orders.remove(&id).is_some())
    }
}

#[async_trait]
impl CouponRepository for MemoryStore {
    async fn insert(&self, coupon: &Coupon) -> Result<(), StoreError> {
        let mut state = self.state.write().await;
        if state.coupons.values().any(|c| c.code == coupon.code) {
            return Err(StoreError::Conflict("Coupon code already exists".to_string()));
        }
        state.coupons.insert(coupon.id, coupon.clone());
        Ok(())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, StoreError> {
        let code = code.trim().to_uppercase();
        Ok(self
            .state
            .read()
            .await
            .coupons
            .values()
            .find(|c| c.code == code)
            .cloned())
    }

    async fn list(&self) -> Result<Vec<Coupon>, StoreError> {
        let mut coupons: Vec<Coupon> = self.state.read().await.coupons.values().cloned().collect();
        coupons.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(coupons)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        Ok(self.state.write().await.coupons.remove(&id).is_some())
    }
}
