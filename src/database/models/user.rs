use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::product::ImageRef;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WishlistItem {
    pub product: Uuid,
    pub poster: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: Uuid,
    pub full_name: String,
    pub email: String,
    pub phone_no: String,
    pub gender: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<ImageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub wishlist: Vec<WishlistItem>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        full_name: String,
        email: String,
        phone_no: String,
        gender: String,
        password_hash: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            full_name,
            email: email.trim().to_lowercase(),
            phone_no,
            gender,
            password_hash,
            role: Role::User,
            avatar: None,
            country: None,
            city: None,
            street: None,
            address: None,
            postal_code: None,
            phone: None,
            wishlist: Vec::new(),
            created_at: Utc::now(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn apply(&mut self, patch: ProfilePatch) {
        fn keep(target: &mut String, value: Option<String>) {
            if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
                *target = v;
            }
        }
        fn keep_opt(target: &mut Option<String>, value: Option<String>) {
            if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
                *target = Some(v);
            }
        }

        keep(&mut self.full_name, patch.full_name);
        keep(&mut self.email, patch.email.map(|e| e.trim().to_lowercase()));
        keep(&mut self.gender, patch.gender);
        keep_opt(&mut self.country, patch.country);
        keep_opt(&mut self.city, patch.city);
        keep_opt(&mut self.street, patch.street);
        keep_opt(&mut self.address, patch.address);
        keep_opt(&mut self.postal_code, patch.postal_code);
        keep_opt(&mut self.phone, patch.phone);
        if patch.avatar.is_some() {
            self.avatar = patch.avatar;
        }
    }
}

/// Profile fields a user may change. Blank values are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfilePatch {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub gender: Option<String>,
    pub country: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub phone: Option<String>,
    pub avatar: Option<ImageRef>,
}
