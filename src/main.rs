use loremap_api::{AppState, AuthState, MongoStore, StoreState, config::AppConfig, create_router};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// The asynchronous entry point, responsible for initializing all core
/// components: configuration, logging, the MongoDB connection, the auth
/// state, and the HTTP server.
#[tokio::main]
async fn main() {
    // 1. Configuration & environment loading.
    dotenv::dotenv().ok();

    // 2. Logging filter setup: RUST_LOG wins, with sensible local defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "loremap_api=debug,tower_http=info,axum=trace".into());

    // Pretty output for local debugging, JSON for log aggregators in
    // production. The subscriber must be live before AppConfig::load() so
    // insecure-default warnings are not lost.
    let env_is_production =
        std::env::var("APP_ENV").map(|v| v == "production").unwrap_or(false);
    if env_is_production {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }

    // 3. Load configuration (fail-fast on missing production credentials).
    let config = AppConfig::load();
    tracing::info!("Application starting in {:?} mode", config.env);

    // 4. Document store initialization (MongoDB).
    let store = Arc::new(
        MongoStore::connect(&config.db_url, &config.db_name)
            .await
            .expect("FATAL: Failed to connect to MongoDB. Check DATABASE_URL."),
    ) as StoreState;

    // 5. Auth state: the empty set of valid tokens; filled by logins,
    // cleared by process restart.
    let auth = AuthState::new();

    // 6. Unified state assembly.
    let port = config.port;
    let app_state = AppState {
        store,
        auth,
        config,
    };

    // 7. Router and server startup.
    let app = create_router(app_state);

    let listener = TcpListener::bind(("0.0.0.0", port))
        .await
        .expect("FATAL: Failed to bind listen port");

    tracing::info!("Listening on 0.0.0.0:{}", port);
    tracing::info!(
        "API documentation (Swagger UI) available at: http://localhost:{}/swagger-ui",
        port
    );

    axum::serve(listener, app).await.unwrap();
}
