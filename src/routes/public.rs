use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Defines endpoints that are **unauthenticated** and accessible to any
/// client: the game client reads markers and lore from here, the website
/// loads the current map image. All of it is read-only; every write lives
/// behind the admin guard.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /
        // Liveness string used by uptime checks.
        .route("/", get(handlers::root))
        // GET /test
        // Diagnostic status: store reachability, configured env flags,
        // collection names. Never errors, even when the store is down.
        .route("/test", get(handlers::test_database))
        // GET /api/pois
        // All map markers, projected to the public field set.
        .route("/api/pois", get(handlers::get_pois))
        // GET /api/lore/search?q=...
        // Substring search over titles and teasers, capped at 20 results.
        // Registered before the {id} route; the router prefers the static
        // segment so "search" is never parsed as an article id.
        .route("/api/lore/search", get(handlers::search_lore))
        // GET /api/lore/{id}
        // One article by id; 400 on malformed ids, 404 when absent.
        .route("/api/lore/{id}", get(handlers::get_lore_article))
        // GET /api/map
        // Current (highest-version) map asset, or null before first upload.
        .route("/api/map", get(handlers::get_map))
}
