use std::env;

/// AppConfig
///
/// Holds the application's entire configuration state. Loaded once at startup
/// and shared immutably across all services (store, auth, router) via the
/// application state, so every request sees the same values.
#[derive(Clone)]
pub struct AppConfig {
    // MongoDB connection string.
    pub db_url: String,
    // Name of the MongoDB database holding the wiki collections.
    pub db_name: String,
    // Static admin credentials checked by the login endpoint.
    pub admin_username: String,
    pub admin_password: String,
    // HTTP listen port.
    pub port: u16,
    // Runtime environment marker. Controls log formatting and fail-fast rules.
    pub env: Env,
    // Whether the corresponding environment variables were actually set.
    // Surfaced by the /test diagnostic endpoint.
    pub database_url_set: bool,
    pub database_name_set: bool,
}

/// Env
///
/// Defines the runtime context, used to switch between development conveniences
/// (pretty logs, default credentials) and hardened production behavior.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// Provides a safe, non-panicking AppConfig instance primarily used for test
    /// setup, without requiring any environment variables to be present.
    fn default() -> Self {
        Self {
            db_url: "mongodb://localhost:27017".to_string(),
            db_name: "worldmap_test".to_string(),
            admin_username: "admin".to_string(),
            admin_password: "changeme".to_string(),
            port: 8000,
            env: Env::Local,
            database_url_set: false,
            database_name_set: false,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// The canonical function for initializing the application configuration at
    /// startup. Reads all parameters from environment variables.
    ///
    /// Credentials fall back to well-known development defaults in `Env::Local`,
    /// and each fallback is loudly flagged in the logs rather than silently
    /// accepted.
    ///
    /// # Panics
    /// Panics in `Env::Production` if the admin credentials are not explicitly
    /// set, preventing the service from starting with guessable defaults.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let database_url_set = env::var("DATABASE_URL").is_ok();
        let database_name_set = env::var("DATABASE_NAME").is_ok();

        let db_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let db_name = env::var("DATABASE_NAME").unwrap_or_else(|_| "worldmap".to_string());

        let (admin_username, admin_password) = match env {
            Env::Production => (
                env::var("ADMIN_USERNAME")
                    .expect("FATAL: ADMIN_USERNAME must be set in production."),
                env::var("ADMIN_PASSWORD")
                    .expect("FATAL: ADMIN_PASSWORD must be set in production."),
            ),
            Env::Local => (
                env::var("ADMIN_USERNAME").unwrap_or_else(|_| {
                    tracing::warn!(
                        "ADMIN_USERNAME not set; falling back to the insecure default 'admin'"
                    );
                    "admin".to_string()
                }),
                env::var("ADMIN_PASSWORD").unwrap_or_else(|_| {
                    tracing::warn!(
                        "ADMIN_PASSWORD not set; falling back to the insecure default 'changeme'"
                    );
                    "changeme".to_string()
                }),
            ),
        };

        let port = env::var("PORT")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(8000);

        Self {
            db_url,
            db_name,
            admin_username,
            admin_password,
            port,
            env,
            database_url_set,
            database_name_set,
        }
    }
}
