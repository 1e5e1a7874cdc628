use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Outward-facing user record. The stored password hash is deliberately
/// absent; `role_name` is resolved with an explicit join against the
/// roles table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct UserRecord {
    pub id: i32,
    pub login: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub role_id: i32,
    pub role_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Input for creating a user. Carries the raw password; the service
/// digests it before anything reaches the store.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateUser {
    pub login: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub role_id: i32,
    pub is_active: bool,
}

/// Row data handed to the store on insert, password already digested.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub login: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub role_id: i32,
    pub is_active: bool,
}

/// Full-record update. The store exposes no partial patch, so activation
/// and deactivation are expressed through this same rewrite. Login and
/// password are immutable here.
#[derive(Debug, Clone, Deserialize)]
pub struct UserUpdate {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub address: Option<String>,
    pub gender: Option<String>,
    pub role_id: i32,
    pub is_active: bool,
}

impl UserUpdate {
    /// Rewrite built from an existing record with only the active flag
    /// changed; every other field is preserved verbatim.
    pub fn with_active_flag(user: &UserRecord, is_active: bool) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            address: user.address.clone(),
            gender: user.gender.clone(),
            role_id: user.role_id,
            is_active,
        }
    }
}
