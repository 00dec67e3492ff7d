use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod store;

// Module for routing segregation (Public, Admin).
pub mod routes;
use auth::AdminToken; // The resolved proof of a live admin token.
use routes::{admin, public};

// --- Public Re-exports ---

// Makes core state types easily accessible to the main application entry point (main.rs).
pub use auth::AuthState;
pub use config::AppConfig;
pub use store::{DocumentStore, MemoryStore, MongoStore, StoreState};

/// ApiDoc
///
/// Auto-generates the OpenAPI documentation (Swagger JSON) for the
/// application from the `#[utoipa::path]` and `ToSchema` annotations.
/// Served at `/api-docs/openapi.json`, browsable at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::get_pois, handlers::get_lore_article, handlers::search_lore,
        handlers::get_map, handlers::admin_login, handlers::admin_get_map,
        handlers::admin_set_map, handlers::admin_list_pois, handlers::admin_create_poi,
        handlers::admin_update_poi, handlers::admin_delete_poi, handlers::admin_list_lore,
        handlers::admin_create_lore, handlers::admin_update_lore, handlers::admin_delete_lore,
        handlers::admin_list_categories, handlers::admin_create_category,
        handlers::admin_update_category, handlers::admin_delete_category,
    ),
    components(
        schemas(
            models::PoiPublic, models::CreatePoi, models::UpdatePoi,
            models::LoreArticlePublic, models::LoreArticleDetail, models::LoreSearchResult,
            models::CreateLoreArticle, models::UpdateLoreArticle,
            models::CategoryPublic, models::CreateCategory, models::UpdateCategory,
            models::MapAssetPublic, models::CreateMapAsset,
            models::AuthRequest, models::AuthResponse,
        )
    ),
    tags(
        (name = "loremap", description = "World Map & Lore Wiki API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, thread-safe container holding all application services and
/// configuration, shared across every incoming request. There is no other
/// cross-request mutable state: just the store connection and the token set
/// inside `AuthState`, both living for the whole process.
#[derive(Clone)]
pub struct AppState {
    /// Document store: all four wiki collections behind one trait object.
    pub store: StoreState,
    /// Auth guard: the in-memory set of live admin tokens.
    pub auth: AuthState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

// These allow extractors and handlers to pull individual components out of
// the shared AppState.

impl FromRef<AppState> for StoreState {
    fn from_ref(app_state: &AppState) -> StoreState {
        app_state.store.clone()
    }
}

impl FromRef<AppState> for AuthState {
    fn from_ref(app_state: &AppState) -> AuthState {
        app_state.auth.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// admin_guard
///
/// Middleware enforcing the admin token for the guarded admin routes. The
/// `AdminToken` extractor does the actual work: if the `token` query
/// parameter is missing or not in the live set, the request is rejected with
/// 401 before any handler runs. This is the centralized guard; handlers do
/// not re-validate.
async fn admin_guard(_token: AdminToken, request: Request, next: Next) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the application's entire routing structure, applies global and
/// scoped middleware, and registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration: fully open on every route, matching the
    // public-read nature of the API.
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    // Header name constant for request correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public routes: no middleware applied.
        .merge(public::public_routes())
        // Admin routes: login stays open, everything else sits behind the
        // token guard applied once here.
        .nest(
            "/api/admin",
            admin::login_routes().merge(
                admin::admin_routes()
                    .route_layer(middleware::from_fn_with_state(state.clone(), admin_guard)),
            ),
        )
        // Apply the unified state to all routes.
        .with_state(state);

    // 3. Observability and correlation layers (applied outermost).
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID generation: a unique UUID per incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request tracing: wraps the request/response lifecycle in a
                // span carrying the generated request id.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID propagation back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS layer.
        .layer(cors)
}

/// trace_span_logger
///
/// Customizes the `TraceLayer` span so every log line for a single request
/// is correlated by the `x-request-id` header alongside method and URI.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
