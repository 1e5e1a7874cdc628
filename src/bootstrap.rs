use crate::error::AppError;
use crate::models::{CreateUser, Role, ADMIN_ROLE, MANAGER_ROLE};
use crate::services::{RoleService, UserService};

const DEFAULT_ADMIN_LOGIN: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Makes a fresh deployment usable: the Admin and Manager roles exist and
/// at least one user holds the Admin role. Runs through the services so
/// the normal validation applies.
pub async fn ensure_defaults(
    roles: &RoleService,
    users: &UserService,
    admin_password: Option<&str>,
) -> Result<(), AppError> {
    let admin_role = ensure_role(roles, ADMIN_ROLE).await?;
    ensure_role(roles, MANAGER_ROLE).await?;

    if users.users_by_role(admin_role.id).await? > 0 {
        return Ok(());
    }

    let password = admin_password.unwrap_or(DEFAULT_ADMIN_PASSWORD);
    users
        .create_user(CreateUser {
            login: DEFAULT_ADMIN_LOGIN.to_string(),
            password: password.to_string(),
            first_name: "System".to_string(),
            last_name: "Administrator".to_string(),
            email: "admin@example.com".to_string(),
            phone_number: None,
            address: None,
            gender: None,
            role_id: admin_role.id,
            is_active: true,
        })
        .await?;
    log::warn!(
        "created default administrator '{}'; change its password immediately",
        DEFAULT_ADMIN_LOGIN
    );

    Ok(())
}

async fn ensure_role(roles: &RoleService, name: &str) -> Result<Role, AppError> {
    if let Some(existing) = roles
        .list_roles()
        .await?
        .into_iter()
        .find(|r| r.name == name)
    {
        return Ok(existing);
    }

    let role = roles.create_role(name).await?;
    log::info!("created role '{}'", role.name);
    Ok(role)
}
