use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};

use crate::{
    AppState,
    database::models::{Role, User},
    error::AppError,
    utils::verify_token,
};

/// Name of the cookie carrying the session token.
pub const TOKEN_COOKIE: &str = "token";

/// The authenticated caller, inserted into request extensions by [`auth_middleware`].
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

fn session_token(request: &Request) -> Option<String> {
    if let Some(Authorization(bearer)) = request.headers().typed_get::<Authorization<Bearer>>() {
        return Some(bearer.token().to_string());
    }
    CookieJar::from_headers(request.headers())
        .get(TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

/// Accepts a bearer token or the session cookie, then loads the user it names.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = session_token(&request)
        .ok_or_else(|| AppError::Unauthorized("Please login to access this resource".into()))?;

    let claims = verify_token(&token, &state.config).map_err(|e| {
        tracing::debug!(error = %e, "rejected session token");
        AppError::Unauthorized("Invalid or expired token".into())
    })?;
    let user_id = claims
        .user_id()
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".into()))?;

    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized("User no longer exists".into()))?;

    request.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(request).await)
}

/// Must run inside [`auth_middleware`].
pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let role = request
        .extensions()
        .get::<CurrentUser>()
        .map(|CurrentUser(user)| user.role);
    match role {
        Some(Role::Admin) => Ok(next.run(request).await),
        Some(role) => Err(AppError::Forbidden(format!(
            "Role: {} is not allowed to access this resource",
            role
        ))),
        None => Err(AppError::Unauthorized(
            "Please login to access this resource".into(),
        )),
    }
}
