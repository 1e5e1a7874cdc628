use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::models::{NewUser, Role, UserRecord, UserUpdate};
use crate::repository::{RoleRepository, UserRepository};

/// Stored row, credential store's private shape. Unlike `UserRecord` it
/// keeps the password hash and the bare role id.
#[derive(Debug, Clone)]
struct StoredUser {
    id: i32,
    login: String,
    password_hash: String,
    first_name: String,
    last_name: String,
    email: String,
    phone_number: Option<String>,
    address: Option<String>,
    gender: Option<String>,
    role_id: i32,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// In-memory credential store owning both tables, mirroring the relational
/// schema: unique login/email/name and restrict-on-delete for roles in
/// use. Backs the service test suites; no database required.
pub struct MemoryStore {
    users: Vec<StoredUser>,
    roles: Vec<Role>,
    next_user_id: i32,
    next_role_id: i32,
}

pub type SharedStore = Arc<Mutex<MemoryStore>>;

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            users: Vec::new(),
            roles: Vec::new(),
            next_user_id: 1,
            next_role_id: 1,
        }
    }

    pub fn shared() -> SharedStore {
        Arc::new(Mutex::new(Self::new()))
    }

    fn role_name(&self, role_id: i32) -> String {
        self.roles
            .iter()
            .find(|r| r.id == role_id)
            .map(|r| r.name.clone())
            .unwrap_or_default()
    }

    fn record(&self, user: &StoredUser) -> UserRecord {
        UserRecord {
            id: user.id,
            login: user.login.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            address: user.address.clone(),
            gender: user.gender.clone(),
            role_id: user.role_id,
            role_name: self.role_name(user.role_id),
            is_active: user.is_active,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

pub struct InMemoryUserRepository {
    store: SharedStore,
}

impl InMemoryUserRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn list(&self) -> Result<Vec<UserRecord>, AppError> {
        let store = self.store.lock().unwrap();
        let mut users: Vec<UserRecord> = store.users.iter().map(|u| store.record(u)).collect();
        users.sort_by(|a, b| {
            (a.first_name.as_str(), a.last_name.as_str())
                .cmp(&(b.first_name.as_str(), b.last_name.as_str()))
        });
        Ok(users)
    }

    async fn find_by_id(&self, user_id: i32) -> Result<Option<UserRecord>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .users
            .iter()
            .find(|u| u.id == user_id)
            .map(|u| store.record(u)))
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<UserRecord>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .users
            .iter()
            .find(|u| u.login == login)
            .map(|u| store.record(u)))
    }

    async fn authenticate(
        &self,
        login: &str,
        password_hash: &str,
    ) -> Result<Option<UserRecord>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .users
            .iter()
            .find(|u| u.login == login && u.password_hash == password_hash)
            .map(|u| store.record(u)))
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, AppError> {
        let mut store = self.store.lock().unwrap();
        // Unique indexes and the role foreign key, as the schema enforces.
        if store.users.iter().any(|u| u.login == user.login) {
            return Err(AppError::conflict("a record with this value already exists"));
        }
        if store.users.iter().any(|u| u.email == user.email) {
            return Err(AppError::conflict("a record with this value already exists"));
        }
        if !store.roles.iter().any(|r| r.id == user.role_id) {
            return Err(AppError::conflict("record is referenced by other records"));
        }

        let now = Utc::now();
        let stored = StoredUser {
            id: store.next_user_id,
            login: user.login,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone_number: user.phone_number,
            address: user.address,
            gender: user.gender,
            role_id: user.role_id,
            is_active: user.is_active,
            created_at: now,
            updated_at: now,
        };
        store.next_user_id += 1;
        let record = store.record(&stored);
        store.users.push(stored);
        Ok(record)
    }

    async fn update(&self, user: UserUpdate) -> Result<UserRecord, AppError> {
        let mut store = self.store.lock().unwrap();
        let position = store
            .users
            .iter()
            .position(|u| u.id == user.id)
            .ok_or_else(|| AppError::not_found("user not found"))?;

        if store
            .users
            .iter()
            .any(|u| u.email == user.email && u.id != user.id)
        {
            return Err(AppError::conflict("a record with this value already exists"));
        }
        if !store.roles.iter().any(|r| r.id == user.role_id) {
            return Err(AppError::conflict("record is referenced by other records"));
        }

        let now = Utc::now();
        {
            let stored = &mut store.users[position];
            stored.first_name = user.first_name;
            stored.last_name = user.last_name;
            stored.email = user.email;
            stored.phone_number = user.phone_number;
            stored.address = user.address;
            stored.gender = user.gender;
            stored.role_id = user.role_id;
            stored.is_active = user.is_active;
            stored.updated_at = now;
        }
        let stored = store.users[position].clone();
        Ok(store.record(&stored))
    }

    async fn delete(&self, user_id: i32) -> Result<bool, AppError> {
        let mut store = self.store.lock().unwrap();
        let before = store.users.len();
        store.users.retain(|u| u.id != user_id);
        Ok(store.users.len() < before)
    }

    async fn login_exists(&self, login: &str) -> Result<bool, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.users.iter().any(|u| u.login == login))
    }

    async fn email_exists(
        &self,
        email: &str,
        exclude_user_id: Option<i32>,
    ) -> Result<bool, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .users
            .iter()
            .any(|u| u.email == email && Some(u.id) != exclude_user_id))
    }

    async fn count_by_role(&self, role_id: i32) -> Result<i64, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.users.iter().filter(|u| u.role_id == role_id).count() as i64)
    }
}

pub struct InMemoryRoleRepository {
    store: SharedStore,
}

impl InMemoryRoleRepository {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl RoleRepository for InMemoryRoleRepository {
    async fn list(&self) -> Result<Vec<Role>, AppError> {
        let store = self.store.lock().unwrap();
        let mut roles = store.roles.clone();
        roles.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(roles)
    }

    async fn find_by_id(&self, role_id: i32) -> Result<Option<Role>, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.roles.iter().find(|r| r.id == role_id).cloned())
    }

    async fn create(&self, name: &str) -> Result<Role, AppError> {
        let mut store = self.store.lock().unwrap();
        if store.roles.iter().any(|r| r.name == name) {
            return Err(AppError::conflict("a record with this value already exists"));
        }

        let now = Utc::now();
        let role = Role {
            id: store.next_role_id,
            name: name.to_string(),
            created_at: now,
            updated_at: now,
        };
        store.next_role_id += 1;
        store.roles.push(role.clone());
        Ok(role)
    }

    async fn update(&self, role_id: i32, name: &str) -> Result<Role, AppError> {
        let mut store = self.store.lock().unwrap();
        if store
            .roles
            .iter()
            .any(|r| r.name == name && r.id != role_id)
        {
            return Err(AppError::conflict("a record with this value already exists"));
        }

        let role = store
            .roles
            .iter_mut()
            .find(|r| r.id == role_id)
            .ok_or_else(|| AppError::not_found("role not found"))?;
        role.name = name.to_string();
        role.updated_at = Utc::now();
        Ok(role.clone())
    }

    async fn delete(&self, role_id: i32) -> Result<bool, AppError> {
        let mut store = self.store.lock().unwrap();
        // Restrict-on-delete, same as the schema's foreign key.
        if store.users.iter().any(|u| u.role_id == role_id) {
            return Err(AppError::conflict("record is referenced by other records"));
        }
        let before = store.roles.len();
        store.roles.retain(|r| r.id != role_id);
        Ok(store.roles.len() < before)
    }

    async fn exists(&self, role_id: i32) -> Result<bool, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store.roles.iter().any(|r| r.id == role_id))
    }

    async fn name_exists(
        &self,
        name: &str,
        exclude_role_id: Option<i32>,
    ) -> Result<bool, AppError> {
        let store = self.store.lock().unwrap();
        Ok(store
            .roles
            .iter()
            .any(|r| r.name == name && Some(r.id) != exclude_role_id))
    }
}
