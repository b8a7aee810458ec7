use serde::{Deserialize, Serialize};

/// Envelope wrapped around every response body.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// 0 on success, one of `utils::error_codes` otherwise.
    pub code: i32,
    pub msg: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resp_data: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            code: 0,
            msg: "success".into(),
            resp_data: Some(data),
        }
    }

    pub fn error(code: i32, msg: impl Into<String>) -> Self {
        Self {
            code,
            msg: msg.into(),
            resp_data: None,
        }
    }
}

/// What every handler returns.
pub type ApiResult<T> = Result<axum::Json<ApiResponse<T>>, crate::error::AppError>;

#[derive(Debug, Serialize)]
pub struct Message {
    pub message: String,
}

impl Message {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
