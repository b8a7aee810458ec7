mod handler;
mod model;

pub use handler::{
    all_orders, cancel_order, delete_order, my_orders, new_order, order_details,
    update_order_status,
};
