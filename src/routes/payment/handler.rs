use axum::extract::{Json, State};

use crate::{
    AppState, payment::to_minor_units, result::ApiResult, utils::success_to_api_response,
};

use super::model::{ProcessPaymentRequest, ProcessPaymentResponse, StripeKeyResponse};

#[axum::debug_handler]
pub async fn process_payment(
    State(state): State<AppState>,
    Json(req): Json<ProcessPaymentRequest>,
) -> ApiResult<ProcessPaymentResponse> {
    let intent = state
        .payments
        .create_intent(to_minor_units(req.amount)?)
        .await?;
    Ok(success_to_api_response(ProcessPaymentResponse {
        client_secret: intent.client_secret,
    }))
}

#[axum::debug_handler]
pub async fn stripe_api_key(State(state): State<AppState>) -> ApiResult<StripeKeyResponse> {
    Ok(success_to_api_response(StripeKeyResponse {
        stripe_api_key: state.payments.publishable_key().to_string(),
    }))
}
