#![allow(dead_code)]

use std::sync::Arc;

use backoffice::models::{CreateUser, Role};
use backoffice::repository::{
    InMemoryRoleRepository, InMemoryUserRepository, MemoryStore, RoleRepositoryState,
    UserRepositoryState,
};
use backoffice::services::{AuthService, RoleService, UserService};

pub struct TestServices {
    pub auth: AuthService,
    pub roles: RoleService,
    pub users: UserService,
}

/// Fresh service stack over a shared in-memory credential store.
pub fn services() -> TestServices {
    let store = MemoryStore::shared();
    let user_repo: UserRepositoryState = Arc::new(InMemoryUserRepository::new(store.clone()));
    let role_repo: RoleRepositoryState = Arc::new(InMemoryRoleRepository::new(store));

    TestServices {
        auth: AuthService::new(user_repo.clone()),
        roles: RoleService::new(role_repo.clone(), user_repo.clone()),
        users: UserService::new(user_repo, role_repo),
    }
}

pub async fn seed_role(svc: &TestServices, name: &str) -> Role {
    svc.roles.create_role(name).await.unwrap()
}

pub fn user_input(login: &str, email: &str, role_id: i32) -> CreateUser {
    CreateUser {
        login: login.to_string(),
        password: "secret123".to_string(),
        first_name: "Test".to_string(),
        last_name: "User".to_string(),
        email: email.to_string(),
        phone_number: None,
        address: None,
        gender: None,
        role_id,
        is_active: true,
    }
}
