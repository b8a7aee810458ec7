mod handler;
mod model;

pub use handler::{
    admin_products, create_product, delete_product, delete_review, list_categories,
    list_products, list_reviews, product_details, update_product, upsert_review,
};
