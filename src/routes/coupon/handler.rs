use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    AppState,
    database::models::{Coupon, NewCoupon},
    error::AppError,
    result::{ApiResponse, ApiResult, Message},
    utils::success_to_api_response,
};

use super::model::{ApplyCouponRequest, ApplyCouponResponse, CouponResponse, CouponsResponse};

#[axum::debug_handler]
pub async fn create_coupon(
    State(state): State<AppState>,
    Json(req): Json<NewCoupon>,
) -> Result<(StatusCode, Json<ApiResponse<CouponResponse>>), AppError> {
    let coupon = Coupon::create(req).map_err(AppError::Validation)?;
    state.coupons.insert(&coupon).await?;
    Ok((
        StatusCode::CREATED,
        success_to_api_response(CouponResponse { coupon }),
    ))
}

#[axum::debug_handler]
pub async fn list_coupons(State(state): State<AppState>) -> ApiResult<CouponsResponse> {
    let coupons = state.coupons.list().await?;
    Ok(success_to_api_response(CouponsResponse { coupons }))
}

#[axum::debug_handler]
pub async fn delete_coupon(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Message> {
    if !state.coupons.delete(id).await? {
        return Err(AppError::NotFound("Coupon not found".into()));
    }
    Ok(success_to_api_response(Message::new("Coupon deleted successfully")))
}

#[axum::debug_handler]
pub async fn apply_coupon(
    State(state): State<AppState>,
    Json(req): Json<ApplyCouponRequest>,
) -> ApiResult<ApplyCouponResponse> {
    if !req.amount.is_finite() || req.amount < 0.0 {
        return Err(AppError::Validation("amount must be a non-negative number".into()));
    }
    let code = req.code.trim().to_uppercase();
    let coupon = state
        .coupons
        .find_by_code(&code)
        .await?
        .ok_or_else(|| AppError::NotFound("Invalid coupon code".into()))?;
    if coupon.is_expired_at(Utc::now()) {
        return Err(AppError::Validation("Coupon has expired".into()));
    }

    let discount = coupon.discount_for(req.amount);
    Ok(success_to_api_response(ApplyCouponResponse {
        code: coupon.code,
        discount,
        total: ((req.amount - discount) * 100.0).round() / 100.0,
    }))
}
