pub mod auth;
pub mod roles;
pub mod users;
pub mod validation;

pub use auth::AuthService;
pub use roles::RoleService;
pub use users::UserService;
