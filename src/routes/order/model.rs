use serde::{Deserialize, Serialize};

use crate::database::models::{Order, OrderStatus};

#[derive(Debug, Serialize)]
pub struct OrderResponse {
    pub order: Order,
}

#[derive(Debug, Serialize)]
pub struct OwnerInfo {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Serialize)]
pub struct OrderDetailsResponse {
    pub order: Order,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<OwnerInfo>,
}

#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub orders: Vec<Order>,
}

#[derive(Debug, Serialize)]
pub struct AdminOrdersResponse {
    pub orders_count: usize,
    pub total_amount: f64,
    pub orders: Vec<Order>,
}

impl AdminOrdersResponse {
    pub fn new(orders: Vec<Order>) -> Self {
        Self {
            orders_count: orders.len(),
            total_amount: orders.iter().map(|o| o.total_price).sum(),
            orders,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: OrderStatus,
}
