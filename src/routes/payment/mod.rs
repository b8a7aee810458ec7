mod handler;
mod model;

pub use handler::{process_payment, stripe_api_key};
