//! HTTP-level flows over the in-memory store and cache.

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use storefront::AppState;
use storefront::cache::{CacheStore, MemoryCache};
use storefront::config::Config;
use storefront::database::models::{Role, User};
use storefront::database::{MemoryStore, ProductRepository, UserRepository};
use storefront::payment::{PaymentError, PaymentGateway, PaymentIntent};
use storefront::routes;
use storefront::utils::generate_token;

struct StubGateway;

#[async_trait]
impl PaymentGateway for StubGateway {
    async fn create_intent(&self, amount_minor: i64) -> Result<PaymentIntent, PaymentError> {
        Ok(PaymentIntent {
            id: "pi_test".to_string(),
            client_secret: format!("pi_test_secret_{}", amount_minor),
        })
    }

    fn publishable_key(&self) -> &str {
        "pk_test"
    }
}

struct TestApp {
    router: Router,
    config: Config,
    store: Arc<MemoryStore>,
    cache: Arc<MemoryCache>,
}

impl TestApp {
    fn new() -> Self {
        let config = Config::from_lookup(|name| match name {
            "JWT_SECRET" => Some("integration-secret".to_string()),
            _ => None,
        })
        .unwrap();
        let store = Arc::new(MemoryStore::new());
        let cache = Arc::new(MemoryCache::new());
        let state = AppState::new(
            config.clone(),
            store.clone(),
            cache.clone(),
            Arc::new(StubGateway),
        );
        Self {
            router: routes::router(state),
            config,
            store,
            cache,
        }
    }

    /// Inserts a user directly and returns a bearer token for them.
    async fn seed_user(&self, email: &str, role: Role) -> (Uuid, String) {
        let mut user = User::new(
            "Seeded".to_string(),
            email.to_string(),
            "5550100".to_string(),
            "other".to_string(),
            "not-a-bcrypt-hash".to_string(),
        );
        user.role = role;
        UserRepository::insert(self.store.as_ref(), &user)
            .await
            .unwrap();
        let (token, _) = generate_token(user.id, &self.config).unwrap();
        (user.id, token)
    }

    async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method(method)
            .uri(format!("/api/v1{}", uri));
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    async fn create_product(&self, admin: &str, name: &str, category: &str, stock: i32) -> String {
        let (status, body) = self
            .call(
                "POST",
                "/admin/product/new",
                Some(admin),
                Some(json!({
                    "name": name,
                    "description": "A thing",
                    "key_features": "Sturdy",
                    "specification": "1kg",
                    "base_price": 100.0,
                    "discounted_price": 80.0,
                    "category": category,
                    "sub_category": "misc",
                    "size": "M",
                    "stock": stock,
                    "images": [{"public_id": "img1", "url": "https://cdn.example/img1.jpg"}]
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["resp_data"]["product"]["id"].as_str().unwrap().to_string()
    }
}

#[tokio::test]
async fn product_listing_is_cached_and_refreshed_after_create() {
    let app = TestApp::new();
    let (_, admin) = app.seed_user("admin@example.com", Role::Admin).await;

    let (status, body) = app.call("GET", "/products", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["code"], 0);
    assert_eq!(body["resp_data"]["products_count"], 0);
    assert!(app.cache.has("all-products").await.unwrap());

    let id = app.create_product(&admin, "Desk", "furniture", 4).await;
    assert!(!app.cache.has("all-products").await.unwrap());

    let (_, body) = app.call("GET", "/products", None, None).await;
    assert_eq!(body["resp_data"]["products_count"], 1);
    assert_eq!(body["resp_data"]["products"][0]["id"], id.as_str());

    let (_, body) = app.call("GET", "/products/categories", None, None).await;
    assert_eq!(body["resp_data"]["categories"], json!(["furniture"]));

    let (_, body) = app.call("GET", "/admin/products", Some(&admin), None).await;
    assert_eq!(body["resp_data"]["products"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn filtered_listing_searches_the_store() {
    let app = TestApp::new();
    let (_, admin) = app.seed_user("admin@example.com", Role::Admin).await;
    app.create_product(&admin, "Oak Table", "furniture", 2).await;
    app.create_product(&admin, "Floor Lamp", "lighting", 2).await;

    let (status, body) = app
        .call("GET", "/products?keyword=oak&price%5Bgte%5D=50", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["filtered_products_count"], 1);
    assert_eq!(body["resp_data"]["products_count"], 2);
    assert_eq!(body["resp_data"]["result_per_page"], 10);
    assert_eq!(body["resp_data"]["products"][0]["name"], "Oak Table");
    assert!(app.cache.is_empty().await);
}

#[tokio::test]
async fn product_update_and_delete() {
    let app = TestApp::new();
    let (_, admin) = app.seed_user("admin@example.com", Role::Admin).await;
    let id = app.create_product(&admin, "Stool", "furniture", 1).await;

    let (status, body) = app
        .call(
            "PUT",
            &format!("/admin/product/{}", id),
            Some(&admin),
            Some(json!({"name": "Bar Stool", "images": []})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["product"]["name"], "Bar Stool");
    assert_eq!(body["resp_data"]["product"]["images"], json!([]));

    let (status, _) = app
        .call("DELETE", &format!("/admin/product/{}", id), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.call("GET", &format!("/product/{}", id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], 1004);

    let (status, _) = app
        .call("DELETE", &format!("/admin/product/{}", id), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_product_is_rejected_without_invalidation() {
    let app = TestApp::new();
    let (_, admin) = app.seed_user("admin@example.com", Role::Admin).await;
    app.call("GET", "/products", None, None).await;

    let (status, body) = app
        .call(
            "POST",
            "/admin/product/new",
            Some(&admin),
            Some(json!({
                "name": "",
                "description": "d",
                "key_features": "k",
                "specification": "s",
                "base_price": 1.0,
                "discounted_price": 1.0,
                "category": "c",
                "sub_category": "s",
                "size": "M"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1000);
    assert!(app.cache.has("all-products").await.unwrap());
}

#[tokio::test]
async fn admin_routes_require_admin_role() {
    let app = TestApp::new();
    let (_, user) = app.seed_user("user@example.com", Role::User).await;

    let (status, _) = app.call("GET", "/admin/products", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.call("GET", "/admin/products", Some(&user), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["msg"], "Role: user is not allowed to access this resource");

    let (status, _) = app.call("GET", "/me", Some("not-a-jwt"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn register_login_and_session_cookie() {
    let app = TestApp::new();
    let registration = json!({
        "full_name": "Ada Lovelace",
        "email": "Ada@Example.com",
        "phone_no": "5550101",
        "gender": "female",
        "password": "analytical",
        "confirm_password": "analytical"
    });

    let (status, body) = app
        .call("POST", "/register", None, Some(registration.clone()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["resp_data"]["user"]["email"], "ada@example.com");
    assert!(body["resp_data"]["user"].get("password_hash").is_none());

    let (status, _) = app.call("POST", "/register", None, Some(registration)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .call(
            "POST",
            "/register",
            None,
            Some(json!({
                "full_name": "Bob",
                "email": "bob@example.com",
                "phone_no": "1",
                "gender": "male",
                "password": "password1",
                "confirm_password": "password2"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "Password does not match");

    let (status, _) = app
        .call(
            "POST",
            "/login",
            None,
            Some(json!({"email": "ada@example.com", "password": "wrong-password"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let login = Request::builder()
        .method("POST")
        .uri("/api/v1/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"email": "ada@example.com", "password": "analytical"}).to_string(),
        ))
        .unwrap();
    let response = app.router.clone().oneshot(login).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("token="));
    let cookie = set_cookie.split(';').next().unwrap().to_string();

    let me = Request::builder()
        .uri("/api/v1/me")
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(me).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["resp_data"]["user"]["full_name"], "Ada Lovelace");
}

#[tokio::test]
async fn wishlist_entries_disappear_with_deleted_product() {
    let app = TestApp::new();
    let (_, admin) = app.seed_user("admin@example.com", Role::Admin).await;
    let (_, shopper) = app.seed_user("shopper@example.com", Role::User).await;
    let id = app.create_product(&admin, "Vase", "home", 3).await;

    let (status, body) = app
        .call("POST", "/wishlist", Some(&shopper), Some(json!({"id": id})))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["resp_data"]["wishlist"][0]["poster"],
        "https://cdn.example/img1.jpg"
    );

    let (status, _) = app
        .call("POST", "/wishlist", Some(&shopper), Some(json!({"id": id})))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, _) = app
        .call(
            "POST",
            "/wishlist",
            Some(&shopper),
            Some(json!({"id": Uuid::new_v4()})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    app.call("DELETE", &format!("/admin/product/{}", id), Some(&admin), None)
        .await;

    let (_, body) = app.call("GET", "/me", Some(&shopper), None).await;
    assert_eq!(body["resp_data"]["user"]["wishlist"], json!([]));
}

#[tokio::test]
async fn reviews_update_ratings() {
    let app = TestApp::new();
    let (_, admin) = app.seed_user("admin@example.com", Role::Admin).await;
    let (_, alice) = app.seed_user("alice@example.com", Role::User).await;
    let (_, bob) = app.seed_user("bob@example.com", Role::User).await;
    let id = app.create_product(&admin, "Teapot", "kitchen", 5).await;

    for (token, rating) in [(&alice, 5.0), (&bob, 3.0)] {
        let (status, _) = app
            .call(
                "PUT",
                "/review",
                Some(token.as_str()),
                Some(json!({"productId": id, "rating": rating, "comment": "fine"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = app
        .call("GET", &format!("/reviews?id={}", id), None, None)
        .await;
    let reviews = body["resp_data"]["reviews"].as_array().unwrap().clone();
    assert_eq!(reviews.len(), 2);
    let bobs = reviews
        .iter()
        .find(|r| r["rating"] == 3.0)
        .unwrap()["id"]
        .as_str()
        .unwrap()
        .to_string();

    let (status, _) = app
        .call(
            "DELETE",
            &format!("/review?productId={}&id={}", id, bobs),
            Some(&alice),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call(
            "DELETE",
            &format!("/review?productId={}&id={}", id, bobs),
            Some(&bob),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["ratings"], 5.0);
    assert_eq!(body["resp_data"]["num_of_reviews"], 1);
}

fn order_body(product: &str, quantity: i32) -> Value {
    json!({
        "shipping_info": {
            "address": "221B Baker Street",
            "city": "London",
            "state": "LDN",
            "country": "UK",
            "pin_code": "NW16XE",
            "phone_no": "5550102"
        },
        "order_items": [{
            "product": product,
            "name": "Item",
            "price": 80.0,
            "quantity": quantity
        }],
        "payment_info": {"id": "pi_test", "status": "succeeded"},
        "items_price": 160.0,
        "tax_price": 0.0,
        "shipping_price": 0.0,
        "total_price": 160.0
    })
}

async fn stock_of(app: &TestApp, id: &str) -> i64 {
    let (_, body) = app.call("GET", &format!("/product/{}", id), None, None).await;
    body["resp_data"]["product"]["stock"].as_i64().unwrap()
}

#[tokio::test]
async fn order_lifecycle_moves_stock() {
    let app = TestApp::new();
    let (_, admin) = app.seed_user("admin@example.com", Role::Admin).await;
    let (_, buyer) = app.seed_user("buyer@example.com", Role::User).await;
    let (_, other) = app.seed_user("other@example.com", Role::User).await;
    let product = app.create_product(&admin, "Kettle", "kitchen", 10).await;

    let (status, body) = app
        .call("POST", "/order/new", Some(&buyer), Some(order_body(&product, 2)))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let order = body["resp_data"]["order"]["id"].as_str().unwrap().to_string();
    assert_eq!(stock_of(&app, &product).await, 8);

    let (status, body) = app
        .call("GET", &format!("/order/{}", order), Some(&buyer), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["owner"]["email"], "buyer@example.com");

    let (status, _) = app
        .call("GET", &format!("/order/{}", order), Some(&other), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = app.call("GET", "/orders/me", Some(&buyer), None).await;
    assert_eq!(body["resp_data"]["orders"].as_array().unwrap().len(), 1);

    let (status, _) = app
        .call("PUT", &format!("/order/cancel/{}", order), Some(&buyer), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stock_of(&app, &product).await, 10);

    let (_, body) = app
        .call("POST", "/order/new", Some(&buyer), Some(order_body(&product, 1)))
        .await;
    let second = body["resp_data"]["order"]["id"].as_str().unwrap().to_string();

    let (status, body) = app
        .call(
            "PUT",
            &format!("/admin/order/{}", second),
            Some(&admin),
            Some(json!({"status": "Delivered"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["resp_data"]["order"]["delivered_at"].is_string());

    let (status, body) = app
        .call(
            "PUT",
            &format!("/admin/order/{}", second),
            Some(&admin),
            Some(json!({"status": "Shipped"})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "You have already delivered this order");

    let (_, body) = app.call("GET", "/admin/orders", Some(&admin), None).await;
    assert_eq!(body["resp_data"]["orders_count"], 2);
    assert_eq!(body["resp_data"]["total_amount"], 320.0);

    let (status, _) = app
        .call("DELETE", &format!("/admin/order/{}", second), Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

fn two_item_order(first: (&str, i32), second: (&str, i32)) -> Value {
    let mut body = order_body(first.0, first.1);
    body["order_items"]
        .as_array_mut()
        .unwrap()
        .push(json!({"product": second.0, "name": "Item", "price": 80.0, "quantity": second.1}));
    body
}

#[tokio::test]
async fn oversized_quantities_are_rejected_before_touching_stock() {
    let app = TestApp::new();
    let (_, admin) = app.seed_user("admin@example.com", Role::Admin).await;
    let (_, buyer) = app.seed_user("buyer@example.com", Role::User).await;
    let product = app.create_product(&admin, "Kettle", "kitchen", 1).await;

    let (status, body) = app
        .call(
            "POST",
            "/order/new",
            Some(&buyer),
            Some(two_item_order((&product, i32::MAX), (&product, i32::MAX))),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], 1000);
    assert_eq!(stock_of(&app, &product).await, 1);
    let (_, body) = app.call("GET", "/orders/me", Some(&buyer), None).await;
    assert!(body["resp_data"]["orders"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn failed_stock_update_stores_no_order() {
    let app = TestApp::new();
    let (_, admin) = app.seed_user("admin@example.com", Role::Admin).await;
    let (_, buyer) = app.seed_user("buyer@example.com", Role::User).await;
    let kettle = app.create_product(&admin, "Kettle", "kitchen", 5).await;
    let toaster = app.create_product(&admin, "Toaster", "kitchen", 5).await;

    let toaster_id: Uuid = toaster.parse().unwrap();
    let mut stored = ProductRepository::find_by_id(app.store.as_ref(), toaster_id)
        .await
        .unwrap()
        .unwrap();
    stored.stock = i32::MIN + 1;
    assert!(ProductRepository::save(app.store.as_ref(), &stored).await.unwrap());

    let (status, body) = app
        .call(
            "POST",
            "/order/new",
            Some(&buyer),
            Some(two_item_order((&kettle, 2), (&toaster, 5))),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);
    assert_eq!(stock_of(&app, &kettle).await, 5);
    assert_eq!(stock_of(&app, &toaster).await, (i32::MIN + 1) as i64);
    let (_, body) = app.call("GET", "/orders/me", Some(&buyer), None).await;
    assert!(body["resp_data"]["orders"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn unfiltered_listing_matches_first_page() {
    let app = TestApp::new();
    let (_, admin) = app.seed_user("admin@example.com", Role::Admin).await;
    for i in 0..12 {
        app.create_product(&admin, &format!("Chair {}", i), "furniture", 1).await;
    }

    let (_, plain) = app.call("GET", "/products", None, None).await;
    let (_, first) = app.call("GET", "/products?page=1", None, None).await;

    assert_eq!(plain["resp_data"]["products"].as_array().unwrap().len(), 10);
    assert_eq!(plain["resp_data"]["products_count"], 12);
    assert_eq!(plain["resp_data"]["filtered_products_count"], 12);
    assert_eq!(plain["resp_data"]["result_per_page"], 10);
    assert_eq!(plain["resp_data"], first["resp_data"]);
    assert!(app.cache.has("all-products").await.unwrap());
}

#[tokio::test]
async fn coupons_apply_discount() {
    let app = TestApp::new();
    let (_, admin) = app.seed_user("admin@example.com", Role::Admin).await;
    let (_, buyer) = app.seed_user("buyer@example.com", Role::User).await;

    let (status, _) = app
        .call(
            "POST",
            "/admin/coupon/new",
            Some(&admin),
            Some(json!({"code": "save10", "discount_percent": 10})),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app
        .call(
            "POST",
            "/admin/coupon/new",
            Some(&admin),
            Some(json!({"code": "SAVE10", "discount_percent": 20})),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .call(
            "POST",
            "/coupon/apply",
            Some(&buyer),
            Some(json!({"code": "Save10", "amount": 250.0})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["code"], "SAVE10");
    assert_eq!(body["resp_data"]["discount"], 25.0);
    assert_eq!(body["resp_data"]["total"], 225.0);

    let (status, _) = app
        .call(
            "POST",
            "/coupon/apply",
            Some(&buyer),
            Some(json!({"code": "NOPE", "amount": 10.0})),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call(
            "POST",
            "/admin/coupon/new",
            Some(&admin),
            Some(json!({
                "code": "OLD",
                "discount_percent": 5,
                "expires_at": "2020-01-01T00:00:00Z"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .call(
            "POST",
            "/coupon/apply",
            Some(&buyer),
            Some(json!({"code": "OLD", "amount": 10.0})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn payment_intent_uses_minor_units() {
    let app = TestApp::new();
    let (_, buyer) = app.seed_user("buyer@example.com", Role::User).await;

    let (status, body) = app
        .call(
            "POST",
            "/payment/process",
            Some(&buyer),
            Some(json!({"amount": 12.5})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["resp_data"]["client_secret"], "pi_test_secret_1250");

    let (status, _) = app
        .call(
            "POST",
            "/payment/process",
            Some(&buyer),
            Some(json!({"amount": 0})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.call("GET", "/stripeapikey", Some(&buyer), None).await;
    assert_eq!(body["resp_data"]["stripe_api_key"], "pk_test");
}
