pub mod bootstrap;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repository;
pub mod services;
pub mod utils;

use axum::{
    response::Redirect,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

pub use config::AppConfig;
pub use database::{create_database_pool, Database};

use services::{AuthService, RoleService, UserService};

/// Shared application state: the three stateless services plus the loaded
/// configuration. Everything inside is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub users: UserService,
    pub roles: RoleService,
    pub config: AppConfig,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Public routes (no authentication required)
        .route("/", get(|| async { Redirect::permanent("/login") }))
        .route("/login", get(handlers::auth::login_page))
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout))
        // Protected routes (authentication required)
        .route("/dashboard", get(handlers::dashboard))
        // Users
        .route("/users", get(handlers::users::users_list))
        .route("/users/new", get(handlers::users::user_form))
        .route("/users", post(handlers::users::create_user))
        .route("/users/:id", get(handlers::users::user_detail))
        .route("/users/:id/edit", get(handlers::users::user_edit_form))
        .route("/users/:id", post(handlers::users::update_user))
        .route("/users/:id/delete", get(handlers::users::delete_user))
        .route("/users/:id/activate", get(handlers::users::activate_user))
        .route("/users/:id/deactivate", get(handlers::users::deactivate_user))
        // Roles
        .route("/roles", get(handlers::roles::roles_list))
        .route("/roles/new", get(handlers::roles::role_form))
        .route("/roles", post(handlers::roles::create_role))
        .route("/roles/:id", get(handlers::roles::role_detail))
        .route("/roles/:id/edit", get(handlers::roles::role_edit_form))
        .route("/roles/:id", post(handlers::roles::update_role))
        .route("/roles/:id/delete", get(handlers::roles::delete_role))
        // Static files
        .nest_service("/static", ServeDir::new("static"))
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CookieManagerLayer::new())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}
