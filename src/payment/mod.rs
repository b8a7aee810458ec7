//! Payment-intent creation against the Stripe REST API.

use async_trait::async_trait;
use serde::Deserialize;

use crate::config::Config;

pub const CURRENCY: &str = "inr";

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("amount must be a positive number")]
    InvalidAmount,
    #[error("payment provider is not configured")]
    NotConfigured,
    #[error("payment provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("payment provider rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentIntent {
    pub id: String,
    pub client_secret: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Creates an intent for `amount_minor` (paise) in [`CURRENCY`].
    async fn create_intent(&self, amount_minor: i64) -> Result<PaymentIntent, PaymentError>;

    /// Publishable key handed to the storefront client.
    fn publishable_key(&self) -> &str;
}

/// Converts a rupee amount to paise, rejecting non-positive or non-finite input.
pub fn to_minor_units(amount: f64) -> Result<i64, PaymentError> {
    if !amount.is_finite() || amount <= 0.0 {
        return Err(PaymentError::InvalidAmount);
    }
    Ok((amount * 100.0).round() as i64)
}

pub struct StripeGateway {
    http_client: reqwest::Client,
    api_base: String,
    secret_key: String,
    publishable_key: String,
}

impl StripeGateway {
    pub fn new(config: &Config) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            api_base: config.stripe_api_base.trim_end_matches('/').to_string(),
            secret_key: config.stripe_secret_key.clone(),
            publishable_key: config.stripe_api_key.clone(),
        }
    }

    fn intents_url(&self) -> String {
        format!("{}/v1/payment_intents", self.api_base)
    }
}

#[async_trait]
impl PaymentGateway for StripeGateway {
    async fn create_intent(&self, amount_minor: i64) -> Result<PaymentIntent, PaymentError> {
        if self.secret_key.is_empty() {
            return Err(PaymentError::NotConfigured);
        }

        let amount = amount_minor.to_string();
        let response = self
            .http_client
            .post(self.intents_url())
            .header("Authorization", format!("Bearer {}", self.secret_key))
            .form(&[
                ("amount", amount.as_str()),
                ("currency", CURRENCY),
                ("metadata[company]", "storefront"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), error = %body, "payment intent creation failed");
            return Err(PaymentError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let intent: PaymentIntent = response.json().await?;
        tracing::info!(intent_id = %intent.id, amount_minor, "payment intent created");
        Ok(intent)
    }

    fn publishable_key(&self) -> &str {
        &self.publishable_key
    }
}
