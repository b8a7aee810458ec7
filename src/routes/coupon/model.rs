use serde::{Deserialize, Serialize};

use crate::database::models::Coupon;

#[derive(Debug, Serialize)]
pub struct CouponResponse {
    pub coupon: Coupon,
}

#[derive(Debug, Serialize)]
pub struct CouponsResponse {
    pub coupons: Vec<Coupon>,
}

#[derive(Debug, Deserialize)]
pub struct ApplyCouponRequest {
    pub code: String,
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub struct ApplyCouponResponse {
    pub code: String,
    pub discount: f64,
    pub total: f64,
}
