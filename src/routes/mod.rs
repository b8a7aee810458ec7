pub mod coupon;
pub mod order;
pub mod payment;
pub mod product;
pub mod user;

use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{delete, get, post, put},
};

use crate::{
    AppState,
    middleware::{auth_middleware, log_errors, require_admin},
};

/// Builds the full API under `config.api_base_uri`. CORS is left to the caller.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/products", get(product::list_products))
        .route("/products/categories", get(product::list_categories))
        .route("/product/{id}", get(product::product_details))
        .route("/reviews", get(product::list_reviews))
        .route("/register", post(user::register))
        .route("/login", post(user::login))
        .route("/logout", get(user::logout));

    let protected_routes = Router::new()
        .route(
            "/review",
            put(product::upsert_review).delete(product::delete_review),
        )
        .route("/me", get(user::me))
        .route("/me/update", put(user::update_profile))
        .route("/password/update", put(user::update_password))
        .route(
            "/wishlist",
            post(user::add_to_wishlist).delete(user::remove_from_wishlist),
        )
        .route("/order/new", post(order::new_order))
        .route("/order/{id}", get(order::order_details))
        .route("/order/cancel/{id}", put(order::cancel_order))
        .route("/orders/me", get(order::my_orders))
        .route("/coupon/apply", post(coupon::apply_coupon))
        .route("/payment/process", post(payment::process_payment))
        .route("/stripeapikey", get(payment::stripe_api_key))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let admin_routes = Router::new()
        .route("/admin/products", get(product::admin_products))
        .route("/admin/product/new", post(product::create_product))
        .route(
            "/admin/product/{id}",
            put(product::update_product).delete(product::delete_product),
        )
        .route("/admin/users", get(user::list_users))
        .route(
            "/admin/user/{id}",
            get(user::user_details).put(user::update_role),
        )
        .route("/admin/orders", get(order::all_orders))
        .route(
            "/admin/order/{id}",
            put(order::update_order_status).delete(order::delete_order),
        )
        .route("/admin/coupons", get(coupon::list_coupons))
        .route("/admin/coupon/new", post(coupon::create_coupon))
        .route("/admin/coupon/{id}", delete(coupon::delete_coupon))
        .route_layer(from_fn(require_admin))
        .route_layer(from_fn_with_state(state.clone(), auth_middleware));

    let api = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .merge(admin_routes);

    let base_uri = state.config.api_base_uri.clone();
    let router = if base_uri.is_empty() {
        api
    } else {
        Router::new().nest(&base_uri, api)
    };

    router
        .layer(from_fn(log_errors))
        .with_state(state)
}
