use crate::error::AppError;
use crate::models::UserRecord;
use crate::repository::UserRepositoryState;
use crate::utils::hash_password;

const INVALID_CREDENTIALS: &str = "invalid login or password";

/// Verifies credentials against the store. Stateless; the user repository
/// is injected at construction.
#[derive(Clone)]
pub struct AuthService {
    users: UserRepositoryState,
}

impl AuthService {
    pub fn new(users: UserRepositoryState) -> Self {
        Self { users }
    }

    /// Checks login and password in a single store call. Unknown login and
    /// wrong password produce the identical error so the response never
    /// reveals which part was wrong. A matching but deactivated account is
    /// rejected with its own message.
    pub async fn authenticate(
        &self,
        login: &str,
        password: &str,
    ) -> Result<UserRecord, AppError> {
        if login.trim().is_empty() || password.trim().is_empty() {
            return Err(AppError::unauthorized(INVALID_CREDENTIALS));
        }

        let password_hash = hash_password(password);
        let user = self
            .users
            .authenticate(login, &password_hash)
            .await?
            .ok_or_else(|| AppError::unauthorized(INVALID_CREDENTIALS))?;

        if !user.is_active {
            return Err(AppError::unauthorized("account deactivated"));
        }

        Ok(user)
    }

    pub async fn get_user_by_id(&self, user_id: i32) -> Result<Option<UserRecord>, AppError> {
        self.users.find_by_id(user_id).await
    }

    pub async fn get_user_by_login(&self, login: &str) -> Result<Option<UserRecord>, AppError> {
        self.users.find_by_login(login).await
    }

    pub async fn list_users(&self) -> Result<Vec<UserRecord>, AppError> {
        self.users.list().await
    }
}
