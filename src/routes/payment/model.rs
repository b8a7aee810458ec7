use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ProcessPaymentRequest {
    /// Major units (rupees).
    pub amount: f64,
}

#[derive(Debug, Serialize)]
pub struct ProcessPaymentResponse {
    pub client_secret: String,
}

#[derive(Debug, Serialize)]
pub struct StripeKeyResponse {
    pub stripe_api_key: String,
}
