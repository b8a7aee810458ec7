use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::catalog::CatalogError;
use crate::database::StoreError;
use crate::payment::PaymentError;
use crate::utils::{error_codes, error_to_api_response};

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Payment(PaymentError),
    #[error(transparent)]
    Store(StoreError),
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    fn status_and_code(&self) -> (StatusCode, i32) {
        match self {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, error_codes::AUTH_FAILED),
            AppError::Forbidden(_) => (StatusCode::FORBIDDEN, error_codes::PERMISSION_DENIED),
            AppError::NotFound(_) => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND),
            AppError::Conflict(_) => (StatusCode::CONFLICT, error_codes::CONFLICT),
            AppError::Payment(_) => (StatusCode::BAD_GATEWAY, error_codes::PAYMENT_FAILED),
            AppError::Store(_) | AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
            ),
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(msg) => AppError::Conflict(msg),
            StoreError::StockOutOfRange(_) => AppError::Validation(err.to_string()),
            other => AppError::Store(other),
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::ProductNotFound | CatalogError::ReviewNotFound => {
                AppError::NotFound(err.to_string())
            }
            CatalogError::Invalid(msg) => AppError::Validation(msg),
            CatalogError::Store(e) => e.into(),
        }
    }
}

impl From<PaymentError> for AppError {
    fn from(err: PaymentError) -> Self {
        match err {
            PaymentError::InvalidAmount => AppError::Validation(err.to_string()),
            other => AppError::Payment(other),
        }
    }
}

impl From<bcrypt::BcryptError> for AppError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AppError::Internal(format!("password hashing failed: {}", err))
    }
}

impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AppError::Internal(format!("token signing failed: {}", err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        let msg = match &self {
            AppError::Store(e) => {
                tracing::error!(error = %e, "backing store failure");
                "Internal server error".to_string()
            }
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal error");
                "Internal server error".to_string()
            }
            other => other.to_string(),
        };

        (status, error_to_api_response::<()>(code, msg)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_conflict_maps_to_409() {
        let err: AppError = StoreError::Conflict("Email already registered".into()).into();
        assert_eq!(err.status_and_code().0, StatusCode::CONFLICT);
    }

    #[test]
    fn missing_product_maps_to_404() {
        let err: AppError = CatalogError::ProductNotFound.into();
        assert_eq!(err.status_and_code(), (StatusCode::NOT_FOUND, error_codes::NOT_FOUND));
    }

    #[test]
    fn stock_overflow_maps_to_400() {
        let err: AppError = StoreError::StockOutOfRange(uuid::Uuid::nil()).into();
        assert_eq!(
            err.status_and_code(),
            (StatusCode::BAD_REQUEST, error_codes::VALIDATION_ERROR)
        );
    }

    #[test]
    fn unavailable_store_maps_to_500() {
        let err: AppError = CatalogError::Store(StoreError::Unavailable("down".into())).into();
        assert_eq!(err.status_and_code().0, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
