use axum::{
    extract::{Extension, Json, Path, Query, State},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    catalog::{ReviewInput, SearchResult},
    database::models::{NewProduct, ProductPatch, ProductQuery},
    error::AppError,
    middleware::CurrentUser,
    result::{ApiResponse, ApiResult, Message},
    utils::success_to_api_response,
};

use super::model::{
    CategoriesResponse, DeleteReviewQuery, ProductResponse, ProductsResponse, RatingsResponse,
    ReviewsQuery, ReviewsResponse,
};

/// Unfiltered requests get the first page of the cached listing, anything
/// with a search criterion or page number goes to the store.
#[axum::debug_handler]
pub async fn list_products(
    State(state): State<AppState>,
    Query(query): Query<ProductQuery>,
) -> ApiResult<SearchResult> {
    let result = if query.is_unfiltered() {
        state.catalog.first_page().await?
    } else {
        state.catalog.search(&query).await?
    };
    Ok(success_to_api_response(result))
}

#[axum::debug_handler]
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<CategoriesResponse> {
    let categories = state.catalog.categories().await?;
    Ok(success_to_api_response(CategoriesResponse { categories }))
}

#[axum::debug_handler]
pub async fn product_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<ProductResponse> {
    let product = state
        .catalog
        .product(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
    Ok(success_to_api_response(ProductResponse { product }))
}

#[axum::debug_handler]
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(query): Query<ReviewsQuery>,
) -> ApiResult<ReviewsResponse> {
    let reviews = state
        .catalog
        .reviews(query.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
    Ok(success_to_api_response(ReviewsResponse { reviews }))
}

#[axum::debug_handler]
pub async fn upsert_review(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<ReviewInput>,
) -> ApiResult<RatingsResponse> {
    let product = state.catalog_mutations.upsert_review(&user, req).await?;
    Ok(success_to_api_response(RatingsResponse::from(&product)))
}

/// Authors may delete their own review; admins may delete any.
#[axum::debug_handler]
pub async fn delete_review(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(query): Query<DeleteReviewQuery>,
) -> ApiResult<RatingsResponse> {
    let product = state
        .catalog
        .product(query.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
    let review = product
        .reviews
        .iter()
        .find(|r| r.id == query.id)
        .ok_or_else(|| AppError::NotFound("Review not found".into()))?;
    if review.user != user.id && !user.is_admin() {
        return Err(AppError::Forbidden(
            "You can only delete your own review".into(),
        ));
    }

    let product = state
        .catalog_mutations
        .delete_review(query.product_id, query.id)
        .await?;
    Ok(success_to_api_response(RatingsResponse::from(&product)))
}

#[axum::debug_handler]
pub async fn admin_products(State(state): State<AppState>) -> ApiResult<ProductsResponse> {
    let products = state.catalog.admin_products().await?;
    Ok(success_to_api_response(ProductsResponse { products }))
}

#[axum::debug_handler]
pub async fn create_product(
    State(state): State<AppState>,
    Json(req): Json<NewProduct>,
) -> Result<(StatusCode, Json<ApiResponse<ProductResponse>>), AppError> {
    let product = state.catalog_mutations.create_product(req).await?;
    Ok((
        StatusCode::CREATED,
        success_to_api_response(ProductResponse { product }),
    ))
}

#[axum::debug_handler]
pub async fn update_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(patch): Json<ProductPatch>,
) -> ApiResult<ProductResponse> {
    let product = state.catalog_mutations.update_product(id, patch).await?;
    Ok(success_to_api_response(ProductResponse { product }))
}

#[axum::debug_handler]
pub async fn delete_product(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Message> {
    state.catalog_mutations.delete_product(id).await?;
    Ok(success_to_api_response(Message::new(
        "Product deleted successfully",
    )))
}
