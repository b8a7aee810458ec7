mod handler;
mod model;

pub use handler::{apply_coupon, create_coupon, delete_coupon, list_coupons};
