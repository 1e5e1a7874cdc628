use crate::error::AppError;
use crate::models::Role;
use crate::repository::{RoleRepositoryState, UserRepositoryState};
use crate::services::validation;

/// Guards the role table's invariants: names are required, unique, capped
/// at 50 characters, and a role still held by users cannot be removed.
#[derive(Clone)]
pub struct RoleService {
    roles: RoleRepositoryState,
    users: UserRepositoryState,
}

impl RoleService {
    pub fn new(roles: RoleRepositoryState, users: UserRepositoryState) -> Self {
        Self { roles, users }
    }

    pub async fn list_roles(&self) -> Result<Vec<Role>, AppError> {
        self.roles.list().await
    }

    pub async fn get_role(&self, role_id: i32) -> Result<Option<Role>, AppError> {
        self.roles.find_by_id(role_id).await
    }

    pub async fn create_role(&self, name: &str) -> Result<Role, AppError> {
        let name = name.trim();
        validation::required(name, "role name is required")?;
        validation::max_length(name, 50, "role name must not exceed 50 characters")?;

        // Case-sensitive match: "Admin" and "admin" are distinct names.
        if self.roles.name_exists(name, None).await? {
            return Err(AppError::conflict("a role with this name already exists"));
        }

        self.roles.create(name).await
    }

    pub async fn update_role(&self, role_id: i32, name: &str) -> Result<Role, AppError> {
        let name = name.trim();
        validation::required(name, "role name is required")?;
        validation::max_length(name, 50, "role name must not exceed 50 characters")?;

        if !self.roles.exists(role_id).await? {
            return Err(AppError::not_found("role not found"));
        }

        // Renaming a role to its own current name must succeed.
        if self.roles.name_exists(name, Some(role_id)).await? {
            return Err(AppError::conflict("a role with this name already exists"));
        }

        self.roles.update(role_id, name).await
    }

    pub async fn delete_role(&self, role_id: i32) -> Result<bool, AppError> {
        if !self.roles.exists(role_id).await? {
            return Err(AppError::not_found("role not found"));
        }

        if self.users.count_by_role(role_id).await? > 0 {
            return Err(AppError::conflict(
                "role is assigned to users and cannot be deleted",
            ));
        }

        self.roles.delete(role_id).await
    }
}
