use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShippingInfo {
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub pin_code: String,
    pub phone_no: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub product: Uuid,
    pub name: String,
    pub price: f64,
    pub quantity: i32,
    #[serde(default)]
    pub image: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentInfo {
    pub id: String,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderStatus {
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Processing" => Ok(OrderStatus::Processing),
            "Shipped" => Ok(OrderStatus::Shipped),
            "Delivered" => Ok(OrderStatus::Delivered),
            "Cancelled" => Ok(OrderStatus::Cancelled),
            other => Err(format!("unknown order status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Order {
    pub id: Uuid,
    pub user: Uuid,
    pub shipping_info: ShippingInfo,
    pub order_items: Vec<OrderItem>,
    pub payment_info: PaymentInfo,
    pub items_price: f64,
    pub tax_price: f64,
    pub shipping_price: f64,
    pub total_price: f64,
    pub discount: f64,
    pub paid_at: DateTime<Utc>,
    pub order_status: OrderStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivered_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Largest quantity a single order line may ask for.
pub const MAX_ITEM_QUANTITY: i32 = 1000;

#[derive(Debug, Clone, Deserialize)]
pub struct NewOrder {
    pub shipping_info: ShippingInfo,
    pub order_items: Vec<OrderItem>,
    pub payment_info: PaymentInfo,
    pub items_price: f64,
    pub tax_price: f64,
    pub shipping_price: f64,
    pub total_price: f64,
    #[serde(default)]
    pub discount: f64,
}

impl NewOrder {
    pub fn validate(&self) -> Result<(), String> {
        if self.order_items.is_empty() {
            return Err("order must contain at least one item".to_string());
        }
        if self.order_items.iter().any(|item| item.quantity <= 0) {
            return Err("item quantity must be positive".to_string());
        }
        if self
            .order_items
            .iter()
            .any(|item| item.quantity > MAX_ITEM_QUANTITY)
        {
            return Err(format!(
                "item quantity must not exceed {}",
                MAX_ITEM_QUANTITY
            ));
        }
        let amounts = [
            self.items_price,
            self.tax_price,
            self.shipping_price,
            self.total_price,
            self.discount,
        ];
        if amounts.iter().any(|a| !a.is_finite() || *a < 0.0) {
            return Err("amounts must be non-negative numbers".to_string());
        }
        Ok(())
    }
}

impl Order {
    pub fn place(user: Uuid, new: NewOrder) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user,
            shipping_info: new.shipping_info,
            order_items: new.order_items,
            payment_info: new.payment_info,
            items_price: new.items_price,
            tax_price: new.tax_price,
            shipping_price: new.shipping_price,
            total_price: new.total_price,
            discount: new.discount,
            paid_at: now,
            order_status: OrderStatus::Processing,
            delivered_at: None,
            created_at: now,
        }
    }

    /// Moves the order to `status`. Delivered orders are final.
    pub fn transition(&mut self, status: OrderStatus) -> Result<(), String> {
        if self.order_status == OrderStatus::Delivered {
            return Err("You have already delivered this order".to_string());
        }
        self.order_status = status;
        if status == OrderStatus::Delivered {
            self.delivered_at = Some(Utc::now());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_order() -> NewOrder {
        NewOrder {
            shipping_info: ShippingInfo {
                address: "1 Main St".into(),
                city: "Pune".into(),
                state: "MH".into(),
                country: "IN".into(),
                pin_code: "411001".into(),
                phone_no: "999".into(),
            },
            order_items: vec![OrderItem {
                product: Uuid::new_v4(),
                name: "Ball".into(),
                price: 10.0,
                quantity: 2,
                image: String::new(),
            }],
            payment_info: PaymentInfo {
                id: "pi_1".into(),
                status: "succeeded".into(),
            },
            items_price: 20.0,
            tax_price: 1.0,
            shipping_price: 0.0,
            total_price: 21.0,
            discount: 0.0,
        }
    }

    #[test]
    fn validate_rejects_empty_and_zero_quantity() {
        let mut order = new_order();
        order.order_items[0].quantity = 0;
        assert!(order.validate().is_err());
        order.order_items.clear();
        assert!(order.validate().is_err());
        assert!(new_order().validate().is_ok());
    }

    #[test]
    fn validate_caps_item_quantity() {
        let mut order = new_order();
        order.order_items[0].quantity = MAX_ITEM_QUANTITY;
        assert!(order.validate().is_ok());
        order.order_items[0].quantity = i32::MAX;
        assert_eq!(
            order.validate().unwrap_err(),
            format!("item quantity must not exceed {}", MAX_ITEM_QUANTITY)
        );
    }

    #[test]
    fn delivered_orders_cannot_transition() {
        let mut order = Order::place(Uuid::new_v4(), new_order());
        assert_eq!(order.order_status, OrderStatus::Processing);
        order.transition(OrderStatus::Delivered).unwrap();
        assert!(order.delivered_at.is_some());
        assert!(order.transition(OrderStatus::Cancelled).is_err());
    }

    #[test]
    fn status_parses_from_display() {
        for status in [
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<OrderStatus>().unwrap(), status);
        }
    }
}
