use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use bson::{doc, oid::ObjectId};
use serde_json::{Value, json};
use std::sync::Arc;

use loremap_api::{
    AppState, AuthState, MemoryStore,
    config::AppConfig,
    error::ApiError,
    handlers,
    models::{CreateLoreArticle, CreateMapAsset, CreatePoi, UpdatePoi},
    store::{Collection, DocumentStore},
};

// Handlers are exercised directly against a MemoryStore-backed AppState,
// bypassing routing and middleware. Router wiring is covered in api_tests.rs.

fn test_state() -> AppState {
    AppState {
        store: Arc::new(MemoryStore::new()),
        auth: AuthState::new(),
        config: AppConfig::default(),
    }
}

fn sample_poi() -> CreatePoi {
    CreatePoi {
        name: "Harbor of Kael".to_string(),
        x_coordinate: 0.42,
        y_coordinate: 0.58,
        icon_type: "city".to_string(),
        lore_article_id: None,
    }
}

fn sample_article(title: &str, teaser: &str) -> CreateLoreArticle {
    CreateLoreArticle {
        title: title.to_string(),
        short_description: teaser.to_string(),
        main_image_url: None,
        content_body: "<p>Lore.</p>".to_string(),
        category_ids: vec![],
        slug: None,
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_root_liveness_message() {
    let Json(body) = handlers::root().await;
    assert_eq!(body, json!({ "message": "Backend running" }));
}

#[tokio::test]
async fn test_database_diagnostics_with_working_store() {
    let state = test_state();
    state
        .store
        .insert_one(Collection::Poi, doc! { "name": "Harbor" })
        .await
        .unwrap();

    let Json(status) = handlers::test_database(State(state)).await;

    assert_eq!(status["backend"], "✅ Running");
    assert_eq!(status["database"], "✅ Connected");
    // AppConfig::default() marks both connection vars as unset.
    assert_eq!(status["database_url"], "❌ Not Set");
    assert_eq!(status["database_name"], "❌ Not Set");
    assert_eq!(status["collections"], json!(["poi"]));
}

#[tokio::test]
async fn test_create_poi_then_list_round_trip() {
    let state = test_state();

    let Json(created) = handlers::admin_create_poi(State(state.clone()), Json(sample_poi()))
        .await
        .unwrap();

    // The id is the 24-char hex rendering of the stored ObjectId.
    assert_eq!(created.id.len(), 24);
    assert!(ObjectId::parse_str(&created.id).is_ok());
    assert_eq!(created.name, "Harbor of Kael");
    assert_eq!(created.x_coordinate, 0.42);
    assert_eq!(created.icon_type, "city");

    let Json(listed) = handlers::get_pois(State(state)).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, created.id);
    assert_eq!(listed[0].y_coordinate, 0.58);
}

#[tokio::test]
async fn test_create_poi_rejects_out_of_range_coordinate() {
    let state = test_state();
    let mut payload = sample_poi();
    payload.x_coordinate = 1.5;

    let err = handlers::admin_create_poi(State(state.clone()), Json(payload))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));

    // Validation runs before the insert, so nothing persisted.
    assert!(state.store.list(Collection::Poi).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_get_lore_article_rejects_malformed_id() {
    let state = test_state();

    let err = handlers::get_lore_article(State(state), Path("not-an-objectid".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn test_get_lore_article_unknown_id_is_not_found() {
    let state = test_state();

    let err = handlers::get_lore_article(State(state), Path(ObjectId::new().to_hex()))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_get_lore_article_returns_detail_projection() {
    let state = test_state();
    let Json(created) = handlers::admin_create_lore(
        State(state.clone()),
        Json(sample_article("The Dark Forest", "Spooky trees")),
    )
    .await
    .unwrap();

    let Json(detail) = handlers::get_lore_article(State(state), Path(created.id.clone()))
        .await
        .unwrap();
    assert_eq!(detail.id, created.id);
    assert_eq!(detail.title, "The Dark Forest");
    assert_eq!(detail.content_body, "<p>Lore.</p>");
}

#[tokio::test]
async fn test_get_map_null_before_first_upload() {
    let state = test_state();
    let Json(map) = handlers::get_map(State(state)).await.unwrap();
    assert!(map.is_none());
}

#[tokio::test]
async fn test_set_map_versions_accumulate_and_latest_wins() {
    let state = test_state();

    let Json(v1) = handlers::admin_set_map(
        State(state.clone()),
        Json(CreateMapAsset {
            image_url: "https://cdn/map-v1.png".to_string(),
            width: Some(4096),
            height: Some(4096),
        }),
    )
    .await
    .unwrap();
    assert_eq!(v1.version, 1);

    let Json(v2) = handlers::admin_set_map(
        State(state.clone()),
        Json(CreateMapAsset {
            image_url: "https://cdn/map-v2.png".to_string(),
            width: None,
            height: None,
        }),
    )
    .await
    .unwrap();
    assert_eq!(v2.version, 2);

    // Both read surfaces serve the newest version.
    let Json(public) = handlers::get_map(State(state.clone())).await.unwrap();
    assert_eq!(public.unwrap().image_url, "https://cdn/map-v2.png");
    let Json(admin) = handlers::admin_get_map(State(state.clone())).await.unwrap();
    assert_eq!(admin.unwrap().version, 2);

    // Old versions are retained, never overwritten.
    let stored = state.store.list(Collection::MapAsset).await.unwrap();
    assert_eq!(stored.len(), 2);
}

#[tokio::test]
async fn test_update_poi_merges_provided_fields() {
    let state = test_state();
    let Json(created) = handlers::admin_create_poi(State(state.clone()), Json(sample_poi()))
        .await
        .unwrap();

    let patch = UpdatePoi {
        name: Some("Old Harbor".to_string()),
        ..Default::default()
    };
    let response = handlers::admin_update_poi(State(state), Path(created.id.clone()), Json(patch))
        .await
        .unwrap();
    let body = body_json(response).await;

    assert_eq!(body["name"], "Old Harbor");
    // Untouched fields are preserved by the merge.
    assert_eq!(body["x_coordinate"], 0.42);
    assert_eq!(body["icon_type"], "city");
}

#[tokio::test]
async fn test_update_poi_empty_payload_is_a_no_op() {
    let state = test_state();
    let Json(created) = handlers::admin_create_poi(State(state.clone()), Json(sample_poi()))
        .await
        .unwrap();

    let id = ObjectId::parse_str(&created.id).unwrap();
    let before = state
        .store
        .find_one(Collection::Poi, doc! { "_id": id }, None)
        .await
        .unwrap()
        .unwrap();

    let response = handlers::admin_update_poi(
        State(state.clone()),
        Path(created.id),
        Json(UpdatePoi::default()),
    )
    .await
    .unwrap();
    let body = body_json(response).await;
    assert_eq!(body, json!({ "updated": false }));

    let after = state
        .store
        .find_one(Collection::Poi, doc! { "_id": id }, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(before, after);
}

#[tokio::test]
async fn test_update_poi_unknown_id_is_not_found() {
    let state = test_state();

    let patch = UpdatePoi {
        name: Some("Ghost Town".to_string()),
        ..Default::default()
    };
    let err = handlers::admin_update_poi(State(state), Path(ObjectId::new().to_hex()), Json(patch))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

#[tokio::test]
async fn test_update_poi_rejects_out_of_range_coordinate() {
    let state = test_state();
    let Json(created) = handlers::admin_create_poi(State(state.clone()), Json(sample_poi()))
        .await
        .unwrap();

    let patch = UpdatePoi {
        y_coordinate: Some(-0.1),
        ..Default::default()
    };
    let err = handlers::admin_update_poi(State(state), Path(created.id), Json(patch))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn test_delete_poi_is_acknowledged_even_when_absent() {
    let state = test_state();

    let Json(body) = handlers::admin_delete_poi(State(state), Path(ObjectId::new().to_hex()))
        .await
        .unwrap();
    assert_eq!(body, json!({ "deleted": true }));
}

#[tokio::test]
async fn test_delete_poi_removes_the_marker() {
    let state = test_state();
    let Json(created) = handlers::admin_create_poi(State(state.clone()), Json(sample_poi()))
        .await
        .unwrap();

    handlers::admin_delete_poi(State(state.clone()), Path(created.id))
        .await
        .unwrap();

    let Json(listed) = handlers::get_pois(State(state)).await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_search_lore_matches_case_insensitively() {
    let state = test_state();
    handlers::admin_create_lore(
        State(state.clone()),
        Json(sample_article("The Dark Forest", "Spooky trees")),
    )
    .await
    .unwrap();
    handlers::admin_create_lore(
        State(state.clone()),
        Json(sample_article("Desert of Glass", "No trees")),
    )
    .await
    .unwrap();

    let Json(results) = handlers::search_lore(
        State(state),
        Query(handlers::SearchQuery {
            q: "FOREST".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].title, "The Dark Forest");
}

#[tokio::test]
async fn test_search_lore_caps_at_twenty_results() {
    let state = test_state();
    for i in 0..25 {
        handlers::admin_create_lore(
            State(state.clone()),
            Json(sample_article(&format!("Forest outpost {i}"), "...")),
        )
        .await
        .unwrap();
    }

    let Json(results) = handlers::search_lore(
        State(state),
        Query(handlers::SearchQuery {
            q: "forest".to_string(),
        }),
    )
    .await
    .unwrap();

    assert_eq!(results.len(), 20);
}

#[tokio::test]
async fn test_category_crud_round_trip() {
    let state = test_state();

    let Json(created) = handlers::admin_create_category(
        State(state.clone()),
        Json(loremap_api::models::CreateCategory {
            name: "Cities".to_string(),
            slug: "cities".to_string(),
            description: Some("Urban lore".to_string()),
        }),
    )
    .await
    .unwrap();
    assert_eq!(created.slug, "cities");

    let Json(listed) = handlers::admin_list_categories(State(state.clone()))
        .await
        .unwrap();
    assert_eq!(listed.len(), 1);

    let Json(body) = handlers::admin_delete_category(State(state.clone()), Path(created.id))
        .await
        .unwrap();
    assert_eq!(body, json!({ "deleted": true }));

    let Json(listed) = handlers::admin_list_categories(State(state)).await.unwrap();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn test_create_category_rejects_blank_name() {
    let state = test_state();

    let err = handlers::admin_create_category(
        State(state),
        Json(loremap_api::models::CreateCategory {
            name: "   ".to_string(),
            slug: "blank".to_string(),
            description: None,
        }),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
}

#[tokio::test]
async fn test_error_responses_use_detail_bodies() {
    let response = ApiError::NotFound("Article not found").into_response();
    assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body, json!({ "detail": "Article not found" }));

    let response = ApiError::Validation("x_coordinate must be between 0 and 1".to_string())
        .into_response();
    assert_eq!(response.status(), axum::http::StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["detail"], "x_coordinate must be between 0 and 1");
}
