use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::{NewUser, Role, UserRecord, UserUpdate};
use crate::repository::{RoleRepository, UserRepository};

const USER_COLUMNS: &str = "u.id, u.login, u.first_name, u.last_name, u.email, \
     u.phone_number, u.address, u.gender, u.role_id, r.name AS role_name, \
     u.is_active, u.created_at, u.updated_at";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_record(&self, user_id: i32) -> Result<UserRecord, AppError> {
        let query = format!(
            "SELECT {} FROM users u JOIN roles r ON u.role_id = r.id WHERE u.id = $1",
            USER_COLUMNS
        );
        let record = sqlx::query_as::<_, UserRecord>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("user not found"))?;
        Ok(record)
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn list(&self) -> Result<Vec<UserRecord>, AppError> {
        let query = format!(
            "SELECT {} FROM users u JOIN roles r ON u.role_id = r.id \
             ORDER BY u.first_name, u.last_name",
            USER_COLUMNS
        );
        let users = sqlx::query_as::<_, UserRecord>(&query)
            .fetch_all(&self.pool)
            .await?;
        Ok(users)
    }

    async fn find_by_id(&self, user_id: i32) -> Result<Option<UserRecord>, AppError> {
        let query = format!(
            "SELECT {} FROM users u JOIN roles r ON u.role_id = r.id WHERE u.id = $1",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, UserRecord>(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<UserRecord>, AppError> {
        let query = format!(
            "SELECT {} FROM users u JOIN roles r ON u.role_id = r.id WHERE u.login = $1",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, UserRecord>(&query)
            .bind(login)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn authenticate(
        &self,
        login: &str,
        password_hash: &str,
    ) -> Result<Option<UserRecord>, AppError> {
        let query = format!(
            "SELECT {} FROM users u JOIN roles r ON u.role_id = r.id \
             WHERE u.login = $1 AND u.password_hash = $2",
            USER_COLUMNS
        );
        let user = sqlx::query_as::<_, UserRecord>(&query)
            .bind(login)
            .bind(password_hash)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, AppError> {
        let user_id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO users
                (login, password_hash, first_name, last_name, email,
                 phone_number, address, gender, role_id, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id
            "#,
        )
        .bind(&user.login)
        .bind(&user.password_hash)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.phone_number)
        .bind(&user.address)
        .bind(&user.gender)
        .bind(user.role_id)
        .bind(user.is_active)
        .fetch_one(&self.pool)
        .await?;

        // Re-read with the role join so the returned record carries the
        // resolved role name.
        self.fetch_record(user_id).await
    }

    async fn update(&self, user: UserUpdate) -> Result<UserRecord, AppError> {
        let updated = sqlx::query_scalar::<_, i32>(
            r#"
            UPDATE users SET
                first_name = $1, last_name = $2, email = $3,
                phone_number = $4, address = $5, gender = $6,
                role_id = $7, is_active = $8, updated_at = NOW()
            WHERE id = $9
            RETURNING id
            "#,
        )
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.email)
        .bind(&user.phone_number)
        .bind(&user.address)
        .bind(&user.gender)
        .bind(user.role_id)
        .bind(user.is_active)
        .bind(user.id)
        .fetch_optional(&self.pool)
        .await?;

        match updated {
            Some(user_id) => self.fetch_record(user_id).await,
            None => Err(AppError::not_found("user not found")),
        }
    }

    async fn delete(&self, user_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn login_exists(&self, login: &str) -> Result<bool, AppError> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM users WHERE login = $1)",
        )
        .bind(login)
        .fetch_one(&self.pool)
        .await?;
        Ok(exists)
    }

    async fn email_exists(
        &self,
        email: &str,
        exclude_user_id: Option<i32>,
    ) -> Result<bool, AppError> {
        let exists = match exclude_user_id {
            Some(user_id) => {
                sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1 AND id <> $2)",
                )
                .bind(email)
                .bind(user_id)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM users WHERE email = $1)",
                )
                .bind(email)
                .fetch_one(&self.pool)
                .await?
            }
        };
        Ok(exists)
    }

    async fn count_by_role(&self, role_id: i32) -> Result<i64, AppError> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users WHERE role_id = $1")
                .bind(role_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }
}

pub struct PostgresRoleRepository {
    pool: PgPool,
}

impl PostgresRoleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RoleRepository for PostgresRoleRepository {
    async fn list(&self) -> Result<Vec<Role>, AppError> {
        let roles = sqlx::query_as::<_, Role>(
            "SELECT id, name, created_at, updated_at FROM roles ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(roles)
    }

    async fn find_by_id(&self, role_id: i32) -> Result<Option<Role>, AppError> {
        let role = sqlx::query_as::<_, Role>(
            "SELECT id, name, created_at, updated_at FROM roles WHERE id = $1",
        )
        .bind(role_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(role)
    }

    async fn create(&self, name: &str) -> Result<Role, AppError> {
        let role = sqlx::query_as::<_, Role>(
            "INSERT INTO roles (name) VALUES ($1) \
             RETURNING id, name, created_at, updated_at",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;
        Ok(role)
    }

    async fn update(&self, role_id: i32, name: &str) -> Result<Role, AppError> {
        let role = sqlx::query_as::<_, Role>(
            "UPDATE roles SET name = $1, updated_at = NOW() WHERE id = $2 \
             RETURNING id, name, created_at, updated_at",
        )
        .bind(name)
        .bind(role_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::not_found("role not found"))?;
        Ok(role)
    }

    async fn delete(&self, role_id: i32) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM roles WHERE id = $1")
            .bind(role_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn exists(&self, role_id: i32) -> Result<bool, AppError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM roles WHERE id = $1)")
                .bind(role_id)
                .fetch_one(&self.pool)
                .await?;
        Ok(exists)
    }

    async fn name_exists(
        &self,
        name: &str,
        exclude_role_id: Option<i32>,
    ) -> Result<bool, AppError> {
        let exists = match exclude_role_id {
            Some(role_id) => {
                sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM roles WHERE name = $1 AND id <> $2)",
                )
                .bind(name)
                .bind(role_id)
                .fetch_one(&self.pool)
                .await?
            }
            None => {
                sqlx::query_scalar::<_, bool>(
                    "SELECT EXISTS(SELECT 1 FROM roles WHERE name = $1)",
                )
                .bind(name)
                .fetch_one(&self.pool)
                .await?
            }
        };
        Ok(exists)
    }
}
