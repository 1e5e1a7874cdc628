use std::env;

/// Application configuration, loaded once at startup and passed down
/// explicitly. Fail-fast: a missing DATABASE_URL stops the process before
/// it can serve a single request.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub port: u16,
    pub jwt_secret: String,
    /// Password for the seeded admin account when the store has none.
    pub admin_password: Option<String>,
}

impl AppConfig {
    pub fn load() -> Self {
        let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

        let port = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(3000);

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            log::warn!("JWT_SECRET not set, using an insecure development secret");
            "insecure-dev-secret".to_string()
        });

        let admin_password = env::var("ADMIN_PASSWORD").ok();

        Self {
            database_url,
            port,
            jwt_secret,
            admin_password,
        }
    }
}
