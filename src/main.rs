use std::sync::Arc;

use dotenvy::dotenv;

use backoffice::repository::{
    PostgresRoleRepository, PostgresUserRepository, RoleRepositoryState, UserRepositoryState,
};
use backoffice::services::{AuthService, RoleService, UserService};
use backoffice::{bootstrap, create_database_pool, create_router, AppConfig, AppState};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    let config = AppConfig::load();

    let db = create_database_pool(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("./migrations")
        .run(&db)
        .await
        .expect("Failed to run database migrations");

    // Wire the repository implementations into the services.
    let user_repo: UserRepositoryState = Arc::new(PostgresUserRepository::new(db.clone()));
    let role_repo: RoleRepositoryState = Arc::new(PostgresRoleRepository::new(db));

    let auth = AuthService::new(user_repo.clone());
    let users = UserService::new(user_repo.clone(), role_repo.clone());
    let roles = RoleService::new(role_repo, user_repo);

    bootstrap::ensure_defaults(&roles, &users, config.admin_password.as_deref())
        .await
        .expect("Failed to seed default roles and administrator");

    let addr = format!("0.0.0.0:{}", config.port);
    let app = create_router(AppState {
        auth,
        users,
        roles,
        config,
    });

    log::info!("backoffice listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind address");
    axum::serve(listener, app).await.expect("Server error");
}
