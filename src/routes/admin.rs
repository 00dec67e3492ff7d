use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post, put},
};

/// Admin Router Module
///
/// The token-gated write surface, nested under /api/admin. The caller in
/// lib.rs wraps this entire router in the AdminToken guard layer, which is
/// the single enforcement point: handlers here never re-validate the token.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // GET /api/admin/map + POST /api/admin/map
        // Read the current map asset / register the next map version.
        .route(
            "/map",
            get(handlers::admin_get_map).post(handlers::admin_set_map),
        )
        // POI CRUD: list/create, then merge-update/delete by id.
        .route(
            "/pois",
            get(handlers::admin_list_pois).post(handlers::admin_create_poi),
        )
        .route(
            "/pois/{id}",
            put(handlers::admin_update_poi).delete(handlers::admin_delete_poi),
        )
        // Lore article CRUD, same shape.
        .route(
            "/lore",
            get(handlers::admin_list_lore).post(handlers::admin_create_lore),
        )
        .route(
            "/lore/{id}",
            put(handlers::admin_update_lore).delete(handlers::admin_delete_lore),
        )
        // Category CRUD, same shape.
        .route(
            "/categories",
            get(handlers::admin_list_categories).post(handlers::admin_create_category),
        )
        .route(
            "/categories/{id}",
            put(handlers::admin_update_category).delete(handlers::admin_delete_category),
        )
}

/// Login Router Module
///
/// The one admin-prefixed route that must stay outside the guard layer:
/// it is how a token is obtained in the first place.
pub fn login_routes() -> Router<AppState> {
    Router::new().route("/login", post(handlers::admin_login))
}
