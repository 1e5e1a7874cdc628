use std::collections::BTreeMap;

use crate::error::AppError;
use crate::models::{is_admin_role, CreateUser, NewUser, UserRecord, UserUpdate};
use crate::repository::{RoleRepositoryState, UserRepositoryState};
use crate::services::validation;
use crate::utils::hash_password;

/// User management: required-field and uniqueness validation, role
/// existence, and the last-admin protection around delete, deactivate and
/// role changes. Holds no state of its own.
#[derive(Clone)]
pub struct UserService {
    users: UserRepositoryState,
    roles: RoleRepositoryState,
}

impl UserService {
    pub fn new(users: UserRepositoryState, roles: RoleRepositoryState) -> Self {
        Self { users, roles }
    }

    pub async fn list_users(&self) -> Result<Vec<UserRecord>, AppError> {
        self.users.list().await
    }

    pub async fn get_user(&self, user_id: i32) -> Result<Option<UserRecord>, AppError> {
        self.users.find_by_id(user_id).await
    }

    pub async fn get_user_by_login(&self, login: &str) -> Result<Option<UserRecord>, AppError> {
        self.users.find_by_login(login).await
    }

    pub async fn create_user(&self, input: CreateUser) -> Result<UserRecord, AppError> {
        validation::required(&input.login, "login is required")?;
        validation::required(&input.password, "password is required")?;
        validation::required(&input.email, "email is required")?;
        validation::required(&input.first_name, "first name is required")?;
        validation::required(&input.last_name, "last name is required")?;
        validation::login_shape(&input.login)?;
        validation::password_strength(&input.password)?;
        validation::email_shape(&input.email)?;

        if self.users.login_exists(&input.login).await? {
            return Err(AppError::conflict("a user with this login already exists"));
        }
        if self.users.email_exists(&input.email, None).await? {
            return Err(AppError::conflict("a user with this email already exists"));
        }
        if !self.roles.exists(input.role_id).await? {
            return Err(AppError::conflict("the specified role does not exist"));
        }

        let user = NewUser {
            login: input.login,
            password_hash: hash_password(&input.password),
            first_name: input.first_name,
            last_name: input.last_name,
            email: input.email,
            phone_number: input.phone_number,
            address: input.address,
            gender: input.gender,
            role_id: input.role_id,
            is_active: input.is_active,
        };
        self.users.create(user).await
    }

    pub async fn update_user(&self, update: UserUpdate) -> Result<UserRecord, AppError> {
        validation::required(&update.email, "email is required")?;
        validation::required(&update.first_name, "first name is required")?;
        validation::required(&update.last_name, "last name is required")?;
        validation::email_shape(&update.email)?;

        let existing = self
            .users
            .find_by_id(update.id)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))?;

        if self.users.email_exists(&update.email, Some(update.id)).await? {
            return Err(AppError::conflict("a user with this email already exists"));
        }

        let new_role = self
            .roles
            .find_by_id(update.role_id)
            .await?
            .ok_or_else(|| AppError::conflict("the specified role does not exist"))?;

        // Last-admin guard: the sole holder of the Admin role cannot be
        // moved to a non-admin role.
        if is_admin_role(&existing.role_name) && !new_role.is_admin() {
            let admin_count = self.users.count_by_role(existing.role_id).await?;
            if admin_count <= 1 {
                return Err(AppError::conflict(
                    "cannot change the role of the last administrator",
                ));
            }
        }

        self.users.update(update).await
    }

    pub async fn delete_user(&self, user_id: i32) -> Result<bool, AppError> {
        let existing = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))?;

        if is_admin_role(&existing.role_name) {
            let admin_count = self.users.count_by_role(existing.role_id).await?;
            if admin_count <= 1 {
                return Err(AppError::conflict("cannot delete the last administrator"));
            }
        }

        self.users.delete(user_id).await
    }

    pub async fn activate_user(&self, user_id: i32) -> Result<bool, AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))?;

        if user.is_active {
            return Ok(true); // already active
        }

        self.users
            .update(UserUpdate::with_active_flag(&user, true))
            .await?;
        Ok(true)
    }

    pub async fn deactivate_user(&self, user_id: i32) -> Result<bool, AppError> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))?;

        // Guard first: an inactive admin with no other active admin still
        // reports the conflict rather than silently no-opping.
        if is_admin_role(&user.role_name) {
            let active_admins = self
                .users
                .list()
                .await?
                .iter()
                .filter(|u| is_admin_role(&u.role_name) && u.is_active)
                .count();
            if active_admins <= 1 {
                return Err(AppError::conflict(
                    "cannot deactivate the last active administrator",
                ));
            }
        }

        if !user.is_active {
            return Ok(true); // already inactive
        }

        self.users
            .update(UserUpdate::with_active_flag(&user, false))
            .await?;
        Ok(true)
    }

    pub async fn total_users(&self) -> Result<i64, AppError> {
        Ok(self.users.list().await?.len() as i64)
    }

    pub async fn active_users(&self) -> Result<i64, AppError> {
        Ok(self
            .users
            .list()
            .await?
            .iter()
            .filter(|u| u.is_active)
            .count() as i64)
    }

    pub async fn users_by_role(&self, role_id: i32) -> Result<i64, AppError> {
        self.users.count_by_role(role_id).await
    }

    pub async fn users_count_grouped_by_role(&self) -> Result<BTreeMap<String, i64>, AppError> {
        let mut counts = BTreeMap::new();
        for user in self.users.list().await? {
            *counts.entry(user.role_name).or_insert(0) += 1;
        }
        Ok(counts)
    }
}
