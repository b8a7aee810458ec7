use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::{Role, User, WishlistItem};

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub full_name: String,
    pub email: String,
    pub phone_no: String,
    pub gender: String,
    pub password: String,
    pub confirm_password: String,
}

pub const MIN_PASSWORD_LEN: usize = 8;

impl RegisterRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.full_name.trim().is_empty() {
            return Err("Please enter your name".to_string());
        }
        if !looks_like_email(&self.email) {
            return Err("Please enter a valid email".to_string());
        }
        if self.phone_no.trim().is_empty() {
            return Err("Please enter your phone number".to_string());
        }
        check_new_password(&self.password, &self.confirm_password)
    }
}

/// Shared by registration and password change.
pub fn check_new_password(password: &str, confirm: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(format!(
            "Password should be at least {} characters",
            MIN_PASSWORD_LEN
        ));
    }
    if password != confirm {
        return Err("Password does not match".to_string());
    }
    Ok(())
}

fn looks_like_email(raw: &str) -> bool {
    let raw = raw.trim();
    match raw.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !domain.starts_with('.'),
        None => false,
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub expires_at: i64,
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub user: User,
}

#[derive(Debug, Serialize)]
pub struct UsersResponse {
    pub users_count: usize,
    pub users: Vec<User>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePasswordRequest {
    pub old_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct WishlistRequest {
    pub id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct WishlistResponse {
    pub wishlist: Vec<WishlistItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(password: &str, confirm: &str) -> RegisterRequest {
        RegisterRequest {
            full_name: "Grace Hopper".into(),
            email: "grace@example.com".into(),
            phone_no: "5550100".into(),
            gender: "female".into(),
            password: password.into(),
            confirm_password: confirm.into(),
        }
    }

    #[test]
    fn mismatched_confirmation_is_rejected() {
        assert_eq!(
            request("longenough", "longenougH").validate().unwrap_err(),
            "Password does not match"
        );
    }

    #[test]
    fn short_password_is_rejected() {
        assert!(request("short", "short").validate().is_err());
    }

    #[test]
    fn email_shape_is_checked() {
        let mut req = request("longenough", "longenough");
        assert!(req.validate().is_ok());
        req.email = "grace.example.com".into();
        assert!(req.validate().is_err());
        req.email = "grace@localhost".into();
        assert!(req.validate().is_err());
    }
}
