use axum::{
    extract::{Extension, Json, Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use uuid::Uuid;

use crate::{
    AppState,
    database::models::{ProfilePatch, Role, User, WishlistItem},
    error::AppError,
    middleware::{CurrentUser, TOKEN_COOKIE},
    result::{ApiResponse, ApiResult, Message},
    utils::{generate_token, hash_password, success_to_api_response, verify_password},
};

use super::model::{
    AuthResponse, LoginRequest, RegisterRequest, UpdatePasswordRequest, UpdateRoleRequest,
    UserResponse, UsersResponse, WishlistRequest, WishlistResponse, check_new_password,
};

type AuthResult = Result<(StatusCode, CookieJar, Json<ApiResponse<AuthResponse>>), AppError>;

/// Signs a token for `user` and hands it back both in the body and as the session cookie.
fn issue_session(state: &AppState, jar: CookieJar, user: User, status: StatusCode) -> AuthResult {
    let (token, expires_at) = generate_token(user.id, &state.config)?;
    let cookie = Cookie::build((TOKEN_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .build();
    Ok((
        status,
        jar.add(cookie),
        success_to_api_response(AuthResponse {
            token,
            expires_at,
            user,
        }),
    ))
}

async fn wishlist_of(state: &AppState, user_id: Uuid) -> Result<Vec<WishlistItem>, AppError> {
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(user.wishlist)
}

#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<RegisterRequest>,
) -> AuthResult {
    req.validate().map_err(AppError::Validation)?;

    let password_hash = hash_password(&req.password)?;
    let user = User::new(req.full_name, req.email, req.phone_no, req.gender, password_hash);
    state.users.insert(&user).await?;

    tracing::info!(user_id = %user.id, "user registered");
    issue_session(&state, jar, user, StatusCode::CREATED)
}

#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> AuthResult {
    let invalid = || AppError::Unauthorized("Invalid email or password".into());

    let email = req.email.trim().to_lowercase();
    let user = state
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(invalid)?;
    if !verify_password(&req.password, &user.password_hash)? {
        return Err(invalid());
    }

    issue_session(&state, jar, user, StatusCode::OK)
}

#[axum::debug_handler]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<ApiResponse<Message>>) {
    (
        jar.remove(Cookie::build(TOKEN_COOKIE).path("/")),
        success_to_api_response(Message::new("Logged out")),
    )
}

#[axum::debug_handler]
pub async fn me(Extension(CurrentUser(user)): Extension<CurrentUser>) -> ApiResult<UserResponse> {
    Ok(success_to_api_response(UserResponse { user }))
}

#[axum::debug_handler]
pub async fn update_password(
    State(state): State<AppState>,
    Extension(CurrentUser(mut user)): Extension<CurrentUser>,
    jar: CookieJar,
    Json(req): Json<UpdatePasswordRequest>,
) -> AuthResult {
    if !verify_password(&req.old_password, &user.password_hash)? {
        return Err(AppError::Validation("Old password is incorrect".into()));
    }
    check_new_password(&req.new_password, &req.confirm_password).map_err(AppError::Validation)?;

    user.password_hash = hash_password(&req.new_password)?;
    if !state.users.save(&user).await? {
        return Err(AppError::NotFound("User not found".into()));
    }
    issue_session(&state, jar, user, StatusCode::OK)
}

#[axum::debug_handler]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(CurrentUser(mut user)): Extension<CurrentUser>,
    Json(patch): Json<ProfilePatch>,
) -> ApiResult<UserResponse> {
    user.apply(patch);
    if !state.users.save(&user).await? {
        return Err(AppError::NotFound("User not found".into()));
    }
    Ok(success_to_api_response(UserResponse { user }))
}

#[axum::debug_handler]
pub async fn add_to_wishlist(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<WishlistRequest>,
) -> ApiResult<WishlistResponse> {
    let product = state
        .catalog
        .product(req.id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;
    let item = WishlistItem {
        product: product.id,
        poster: product
            .images
            .first()
            .map(|image| image.url.clone())
            .unwrap_or_default(),
    };

    if !state.users.add_to_wishlist(user.id, item).await? {
        return Err(AppError::Conflict("Product is already in your wishlist".into()));
    }
    let wishlist = wishlist_of(&state, user.id).await?;
    Ok(success_to_api_response(WishlistResponse { wishlist }))
}

#[axum::debug_handler]
pub async fn remove_from_wishlist(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Query(req): Query<WishlistRequest>,
) -> ApiResult<WishlistResponse> {
    if !state.users.remove_from_wishlist(user.id, req.id).await? {
        return Err(AppError::NotFound("Product is not in your wishlist".into()));
    }
    let wishlist = wishlist_of(&state, user.id).await?;
    Ok(success_to_api_response(WishlistResponse { wishlist }))
}

#[axum::debug_handler]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<UsersResponse> {
    let users = state.users.list_by_role(Role::User).await?;
    Ok(success_to_api_response(UsersResponse {
        users_count: users.len(),
        users,
    }))
}

#[axum::debug_handler]
pub async fn user_details(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<UserResponse> {
    let user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User does not exist with id: {}", id)))?;
    Ok(success_to_api_response(UserResponse { user }))
}

#[axum::debug_handler]
pub async fn update_role(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateRoleRequest>,
) -> ApiResult<UserResponse> {
    let mut user = state
        .users
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User does not exist with id: {}", id)))?;
    user.role = req.role;
    if !state.users.save(&user).await? {
        return Err(AppError::NotFound(format!("User does not exist with id: {}", id)));
    }

    tracing::info!(user_id = %id, role = %user.role, "user role changed");
    Ok(success_to_api_response(UserResponse { user }))
}
