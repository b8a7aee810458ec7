// Domain entities stored by the backing store

pub mod coupon;
pub mod order;
pub mod product;
pub mod user;

pub use coupon::{Coupon, NewCoupon};
pub use order::{NewOrder, Order, OrderItem, OrderStatus, PaymentInfo, ShippingInfo};
pub use product::{ImageRef, NewProduct, Product, ProductPage, ProductPatch, ProductQuery, Review};
pub use user::{ProfilePatch, Role, User, WishlistItem};
