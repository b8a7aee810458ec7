use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Product, Review};

#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub product: Product,
}

#[derive(Debug, Serialize)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct CategoriesResponse {
    pub categories: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReviewsQuery {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct ReviewsResponse {
    pub reviews: Vec<Review>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteReviewQuery {
    #[serde(rename = "productId")]
    pub product_id: Uuid,
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct RatingsResponse {
    pub ratings: f64,
    pub num_of_reviews: i32,
}

impl From<&Product> for RatingsResponse {
    fn from(product: &Product) -> Self {
        Self {
            ratings: product.ratings,
            num_of_reviews: product.num_of_reviews,
        }
    }
}
