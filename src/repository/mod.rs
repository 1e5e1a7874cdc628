pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::AppError;
use crate::models::{NewUser, Role, UserRecord, UserUpdate};

pub use memory::{InMemoryRoleRepository, InMemoryUserRepository, MemoryStore, SharedStore};
pub use postgres::{PostgresRoleRepository, PostgresUserRepository};

/// Data-access contract for users, owned by the credential store. The
/// services only ever see this trait, so the backing implementation can be
/// swapped (Postgres in production, in-memory in the test suite).
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<UserRecord>, AppError>;
    async fn find_by_id(&self, user_id: i32) -> Result<Option<UserRecord>, AppError>;
    async fn find_by_login(&self, login: &str) -> Result<Option<UserRecord>, AppError>;
    /// Single-call credential match: login and stored digest must both
    /// line up. Returns the record without distinguishing which part
    /// failed.
    async fn authenticate(
        &self,
        login: &str,
        password_hash: &str,
    ) -> Result<Option<UserRecord>, AppError>;
    async fn create(&self, user: NewUser) -> Result<UserRecord, AppError>;
    /// Full-record rewrite; there is no partial patch operation.
    async fn update(&self, user: UserUpdate) -> Result<UserRecord, AppError>;
    /// Physical removal. Returns false when the id was already gone.
    async fn delete(&self, user_id: i32) -> Result<bool, AppError>;
    async fn login_exists(&self, login: &str) -> Result<bool, AppError>;
    async fn email_exists(
        &self,
        email: &str,
        exclude_user_id: Option<i32>,
    ) -> Result<bool, AppError>;
    async fn count_by_role(&self, role_id: i32) -> Result<i64, AppError>;
}

/// Data-access contract for roles.
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<Role>, AppError>;
    async fn find_by_id(&self, role_id: i32) -> Result<Option<Role>, AppError>;
    async fn create(&self, name: &str) -> Result<Role, AppError>;
    async fn update(&self, role_id: i32, name: &str) -> Result<Role, AppError>;
    async fn delete(&self, role_id: i32) -> Result<bool, AppError>;
    async fn exists(&self, role_id: i32) -> Result<bool, AppError>;
    /// Case-sensitive name lookup, optionally ignoring one role so a
    /// record can keep its own name on update.
    async fn name_exists(&self, name: &str, exclude_role_id: Option<i32>)
        -> Result<bool, AppError>;
}

pub type UserRepositoryState = Arc<dyn UserRepository>;
pub type RoleRepositoryState = Arc<dyn RoleRepository>;
