use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// The privileged role protected by the last-admin guard.
pub const ADMIN_ROLE: &str = "Admin";

/// Secondary role with read and limited write access.
pub const MANAGER_ROLE: &str = "Manager";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Role {
    pub id: i32,
    pub name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Role {
    pub fn is_admin(&self) -> bool {
        is_admin_role(&self.name)
    }
}

/// Role name comparison is case-insensitive for the admin guard, matching
/// how the panel treats "Admin"/"admin" as the same privilege level.
pub fn is_admin_role(name: &str) -> bool {
    name.eq_ignore_ascii_case(ADMIN_ROLE)
}

pub fn is_manager_role(name: &str) -> bool {
    name.eq_ignore_ascii_case(MANAGER_ROLE)
}
