use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::models::{
    Coupon, ImageRef, Order, OrderItem, PaymentInfo, Product, ProductPage, ProductQuery, Review,
    Role, ShippingInfo, User, WishlistItem,
};
use super::{
    CouponRepository, OrderRepository, ProductRepository, StoreError, UserRepository, parse_role,
    parse_status,
};

const PRODUCT_COLUMNS: &str = r#"
    id, name, description, key_features, specification, base_price, discounted_price,
    ratings, images, category, sub_category, sub_category2, size, stock, color,
    available_color, num_of_reviews, reviews, created_at
"#;

const USER_COLUMNS: &str = r#"
    id, full_name, email, phone_no, gender, password_hash, role, avatar,
    country, city, street, address, postal_code, phone, created_at
"#;

const ORDER_COLUMNS: &str = r#"
    id, user_id, shipping_info, order_items, payment_info, items_price, tax_price,
    shipping_price, total_price, discount, paid_at, order_status, delivered_at, created_at
"#;

#[derive(Debug, FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    key_features: String,
    specification: String,
    base_price: f64,
    discounted_price: f64,
    ratings: f64,
    images: Json<Vec<ImageRef>>,
    category: String,
    sub_category: String,
    sub_category2: String,
    size: String,
    stock: i32,
    color: Option<String>,
    available_color: Option<String>,
    num_of_reviews: i32,
    reviews: Json<Vec<Review>>,
    created_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            key_features: row.key_features,
            specification: row.specification,
            base_price: row.base_price,
            discounted_price: row.discounted_price,
            ratings: row.ratings,
            images: row.images.0,
            category: row.category,
            sub_category: row.sub_category,
            sub_category2: row.sub_category2,
            size: row.size,
            stock: row.stock,
            color: row.color,
            available_color: row.available_color,
            num_of_reviews: row.num_of_reviews,
            reviews: row.reviews.0,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: Uuid,
    full_name: String,
    email: String,
    phone_no: String,
    gender: String,
    password_hash: String,
    role: String,
    avatar: Option<Json<ImageRef>>,
    country: Option<String>,
    city: Option<String>,
    street: Option<String>,
    address: Option<String>,
    postal_code: Option<String>,
    phone: Option<String>,
    created_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self, wishlist: Vec<WishlistItem>) -> Result<User, StoreError> {
        Ok(User {
            id: self.id,
            full_name: self.full_name,
            email: self.email,
            phone_no: self.phone_no,
            gender: self.gender,
            password_hash: self.password_hash,
            role: parse_role(&self.role)?,
            avatar: self.avatar.map(|a| a.0),
            country: self.country,
            city: self.city,
            street: self.street,
            address: self.address,
            postal_code: self.postal_code,
            phone: self.phone,
            wishlist,
            created_at: self.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct WishlistRow {
    user_id: Uuid,
    product_id: Uuid,
    poster: String,
}

#[derive(Debug, FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    shipping_info: Json<ShippingInfo>,
    order_items: Json<Vec<OrderItem>>,
    payment_info: Json<PaymentInfo>,
    items_price: f64,
    tax_price: f64,
    shipping_price: f64,
    total_price: f64,
    discount: f64,
    paid_at: DateTime<Utc>,
    order_status: String,
    delivered_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = StoreError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            user: row.user_id,
            shipping_info: row.shipping_info.0,
            order_items: row.order_items.0,
            payment_info: row.payment_info.0,
            items_price: row.items_price,
            tax_price: row.tax_price,
            shipping_price: row.shipping_price,
            total_price: row.total_price,
            discount: row.discount,
            paid_at: row.paid_at,
            order_status: parse_status(&row.order_status)?,
            delivered_at: row.delivered_at,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, FromRow)]
struct CouponRow {
    id: Uuid,
    code: String,
    discount_percent: i32,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<CouponRow> for Coupon {
    fn from(row: CouponRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            discount_percent: row.discount_percent,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

/// Escapes LIKE wildcards so a search keyword matches literally.
fn like_pattern(keyword: &str) -> String {
    let escaped = keyword
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

fn push_product_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ProductQuery) {
    builder.push(" WHERE deleted_at IS NULL");
    if let Some(keyword) = query.keyword() {
        builder.push(" AND name ILIKE ").push_bind(like_pattern(keyword));
    }
    if let Some(category) = &query.category {
        builder.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(min) = query.price_gte {
        builder.push(" AND discounted_price >= ").push_bind(min);
    }
    if let Some(max) = query.price_lte {
        builder.push(" AND discounted_price <= ").push_bind(max);
    }
}

/// Postgres-backed store for every repository.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn wishlists_for(&self, user_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<WishlistItem>>, StoreError> {
        let rows = sqlx::query_as::<_, WishlistRow>(
            r#"
            SELECT user_id, product_id, poster
            FROM wishlist_items
            WHERE user_id = ANY($1)
            ORDER BY added_at
            "#,
        )
        .bind(user_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<WishlistItem>> = HashMap::new();
        for row in rows {
            grouped.entry(row.user_id).or_default().push(WishlistItem {
                product: row.product_id,
                poster: row.poster,
            });
        }
        Ok(grouped)
    }

    async fn with_wishlist(&self, row: Option<UserRow>) -> Result<Option<User>, StoreError> {
        let Some(row) = row else {
            return Ok(None);
        };
        let mut wishlists = self.wishlists_for(&[row.id]).await?;
        let wishlist = wishlists.remove(&row.id).unwrap_or_default();
        row.into_user(wishlist).map(Some)
    }
}

#[async_trait]
impl ProductRepository for PgStore {
    async fn count(&self) -> Result<i64, StoreError> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE deleted_at IS NULL")
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    async fn list_all(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE deleted_at IS NULL ORDER BY created_at DESC",
            PRODUCT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn distinct_categories(&self) -> Result<Vec<String>, StoreError> {
        let categories: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT category FROM products WHERE deleted_at IS NULL ORDER BY category",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(categories)
    }

    async fn search(&self, query: &ProductQuery, per_page: u32) -> Result<ProductPage, StoreError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM products");
        push_product_filters(&mut count, query);
        let filtered_count: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;

        let mut select = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM products", PRODUCT_COLUMNS));
        push_product_filters(&mut select, query);
        let offset = i64::from(query.page() - 1) * i64::from(per_page);
        select
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(i64::from(per_page))
            .push(" OFFSET ")
            .push_bind(offset);
        let rows = select
            .build_query_as::<ProductRow>()
            .fetch_all(&self.pool)
            .await?;

        Ok(ProductPage {
            products: rows.into_iter().map(Product::from).collect(),
            filtered_count: filtered_count as usize,
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {} FROM products WHERE id = $1 AND deleted_at IS NULL",
            PRODUCT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Product::from))
    }

    async fn insert(&self, product: &Product) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, description, key_features, specification, base_price,
                discounted_price, ratings, images, category, sub_category, sub_category2,
                size, stock, color, available_color, num_of_reviews, reviews, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.key_features)
        .bind(&product.specification)
        .bind(product.base_price)
        .bind(product.discounted_price)
        .bind(product.ratings)
        .bind(Json(&product.images))
        .bind(&product.category)
        .bind(&product.sub_category)
        .bind(&product.sub_category2)
        .bind(&product.size)
        .bind(product.stock)
        .bind(&product.color)
        .bind(&product.available_color)
        .bind(product.num_of_reviews)
        .bind(Json(&product.reviews))
        .bind(product.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_write(e, "Product already exists"))?;
        Ok(())
    }

    async fn save(&self, product: &Product) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE products
            SET name = $2, description = $3, key_features = $4, specification = $5,
                base_price = $6, discounted_price = $7, ratings = $8, images = $9,
                category = $10, sub_category = $11, sub_category2 = $12, size = $13,
                stock = $14, color = $15, available_color = $16, num_of_reviews = $17,
                reviews = $18
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(&product.description)
        .bind(&product.key_features)
        .bind(&product.specification)
        .bind(product.base_price)
        .bind(product.discounted_price)
        .bind(product.ratings)
        .bind(Json(&product.images))
        .bind(&product.category)
        .bind(&product.sub_category)
        .bind(&product.sub_category2)
        .bind(&product.size)
        .bind(product.stock)
        .bind(&product.color)
        .bind(&product.available_color)
        .bind(product.num_of_reviews)
        .bind(Json(&product.reviews))
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query(
            "UPDATE products SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if removed == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        // Same transaction: no wishlist may point at a deleted product.
        sqlx::query("DELETE FROM wishlist_items WHERE product_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    async fn adjust_stock(&self, id: Uuid, delta: i32) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE products SET stock = stock + $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(delta)
        .execute(&self.pool)
        .await
        .map_err(|err| match &err {
            // numeric_value_out_of_range
            sqlx::Error::Database(db) if db.code().as_deref() == Some("22003") => {
                StoreError::StockOutOfRange(id)
            }
            _ => StoreError::Database(err),
        })?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl UserRepository for PgStore {
    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, full_name, email, phone_no, gender, password_hash, role, avatar,
                country, city, street, address, postal_code, phone, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.phone_no)
        .bind(&user.gender)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.avatar.as_ref().map(Json))
        .bind(&user.country)
        .bind(&user.city)
        .bind(&user.street)
        .bind(&user.address)
        .bind(&user.postal_code)
        .bind(&user.phone)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_write(e, "Email is already registered"))?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        self.with_wishlist(row).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE email = $1",
            USER_COLUMNS
        ))
        .bind(email.trim().to_lowercase())
        .fetch_optional(&self.pool)
        .await?;
        self.with_wishlist(row).await
    }

    async fn save(&self, user: &User) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET full_name = $2, email = $3, phone_no = $4, gender = $5, password_hash = $6,
                role = $7, avatar = $8, country = $9, city = $10, street = $11,
                address = $12, postal_code = $13, phone = $14
            WHERE id = $1
            "#,
        )
        .bind(user.id)
        .bind(&user.full_name)
        .bind(&user.email)
        .bind(&user.phone_no)
        .bind(&user.gender)
        .bind(&user.password_hash)
        .bind(user.role.as_str())
        .bind(user.avatar.as_ref().map(Json))
        .bind(&user.country)
        .bind(&user.city)
        .bind(&user.street)
        .bind(&user.address)
        .bind(&user.postal_code)
        .bind(&user.phone)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_write(e, "Email is already registered"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_by_role(&self, role: Role) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {} FROM users WHERE role = $1 ORDER BY created_at DESC",
            USER_COLUMNS
        ))
        .bind(role.as_str())
        .fetch_all(&self.pool)
        .await?;

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut wishlists = self.wishlists_for(&ids).await?;
        rows.into_iter()
            .map(|row| {
                let wishlist = wishlists.remove(&row.id).unwrap_or_default();
                row.into_user(wishlist)
            })
            .collect()
    }

    async fn add_to_wishlist(&self, user_id: Uuid, item: WishlistItem) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO wishlist_items (user_id, product_id, poster)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, product_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(item.product)
        .bind(&item.poster)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn remove_from_wishlist(&self, user_id: Uuid, product_id: Uuid) -> Result<bool, StoreError> {
        let result =
            sqlx::query("DELETE FROM wishlist_items WHERE user_id = $1 AND product_id = $2")
                .bind(user_id)
                .bind(product_id)
                .execute(&self.pool)
                .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl OrderRepository for PgStore {
    async fn insert(&self, order: &Order) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO orders (
                id, user_id, shipping_info, order_items, payment_info, items_price,
                tax_price, shipping_price, total_price, discount, paid_at, order_status,
                delivered_at, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(order.id)
        .bind(order.user)
        .bind(Json(&order.shipping_info))
        .bind(Json(&order.order_items))
        .bind(Json(&order.payment_info))
        .bind(order.items_price)
        .bind(order.tax_price)
        .bind(order.shipping_price)
        .bind(order.total_price)
        .bind(order.discount)
        .bind(order.paid_at)
        .bind(order.order_status.as_str())
        .bind(order.delivered_at)
        .bind(order.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Order>, StoreError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE id = $1",
            ORDER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Order::try_from).transpose()
    }

    async fn list_by_user(&self, user_id: Uuid) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders WHERE user_id = $1 ORDER BY created_at DESC",
            ORDER_COLUMNS
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Order::try_from).collect()
    }

    async fn list_all(&self) -> Result<Vec<Order>, StoreError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {} FROM orders ORDER BY created_at DESC",
            ORDER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(Order::try_from).collect()
    }

    async fn save_status(&self, order: &Order) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE orders SET order_status = $2, delivered_at = $3 WHERE id = $1",
        )
        .bind(order.id)
        .bind(order.order_status.as_str())
        .bind(order.delivered_at)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl CouponRepository for PgStore {
    async fn insert(&self, coupon: &Coupon) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO coupons (id, code, discount_percent, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(coupon.id)
        .bind(&coupon.code)
        .bind(coupon.discount_percent)
        .bind(coupon.expires_at)
        .bind(coupon.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::from_write(e, "Coupon code already exists"))?;
        Ok(())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Coupon>, StoreError> {
        let row = sqlx::query_as::<_, CouponRow>(
            r#"
            SELECT id, code, discount_percent, expires_at, created_at
            FROM coupons
            WHERE code = $1
            "#,
        )
        .bind(code.trim().to_uppercase())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Coupon::from))
    }

    async fn list(&self) -> Result<Vec<Coupon>, StoreError> {
        let rows = sqlx::query_as::<_, CouponRow>(
            r#"
            SELECT id, code, discount_percent, expires_at, created_at
            FROM coupons
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Coupon::from).collect())
    }

    async fn delete(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM coupons WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
