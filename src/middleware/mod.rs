mod auth;
mod error_handler;

pub use auth::{CurrentUser, TOKEN_COOKIE, auth_middleware, require_admin};
pub use error_handler::log_errors;
