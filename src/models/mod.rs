pub mod role;
pub mod user;

pub use role::{is_admin_role, is_manager_role, Role, ADMIN_ROLE, MANAGER_ROLE};
pub use user::{CreateUser, NewUser, UserRecord, UserUpdate};
