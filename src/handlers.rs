use crate::{
    AppState,
    error::ApiError,
    models::{
        AuthRequest, AuthResponse, Category, CategoryPublic, CreateCategory, CreateLoreArticle,
        CreateMapAsset, CreatePoi, LoreArticle, LoreArticleDetail, LoreArticlePublic,
        LoreSearchResult, MapAsset, MapAssetPublic, Poi, PoiPublic, UpdateCategory,
        UpdateLoreArticle, UpdatePoi,
    },
    store::{Collection, StoreError, StoreState},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use bson::{Document, doc, oid::ObjectId};
use serde::Deserialize;
use serde_json::{Value, json};

// --- Filter Structs ---

/// SearchQuery
///
/// Accepted query parameters for the public lore search endpoint. A missing
/// `q` is rejected by the Query extractor before the handler runs.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct SearchQuery {
    /// Case-insensitive substring matched against title and short_description.
    pub q: String,
}

// --- Helpers ---

fn parse_id(raw: &str, detail: &'static str) -> Result<ObjectId, ApiError> {
    ObjectId::parse_str(raw).map_err(|_| ApiError::Validation(detail.to_string()))
}

fn decode<T: serde::de::DeserializeOwned>(document: Document) -> Result<T, ApiError> {
    bson::from_document(document)
        .map_err(|e| StoreError::Query(format!("malformed document: {e}")).into())
}

fn encode<T: serde::Serialize>(value: &T) -> Result<Document, ApiError> {
    bson::to_document(value)
        .map_err(|e| StoreError::Query(format!("document encoding failed: {e}")).into())
}

/// Re-fetches a freshly written document by id. Used by every create/update
/// path so the response reflects exactly what the store persisted.
async fn fetch_by_id(
    store: &StoreState,
    collection: Collection,
    id: ObjectId,
    missing: &'static str,
) -> Result<Document, ApiError> {
    store
        .find_one(collection, doc! { "_id": id }, None)
        .await?
        .ok_or(ApiError::NotFound(missing))
}

/// The current map is defined as the document with the maximum version.
/// Returns None when no map has been registered yet.
async fn current_map_asset(store: &StoreState) -> Result<Option<MapAsset>, ApiError> {
    store
        .find_one(MapAsset::COLLECTION, doc! {}, Some(doc! { "version": -1 }))
        .await?
        .map(decode)
        .transpose()
}

// --- Liveness & diagnostics ---

/// root
///
/// [Public Route] Liveness probe for uptime checks and load balancers.
pub async fn root() -> Json<Value> {
    Json(json!({ "message": "Backend running" }))
}

/// test_database
///
/// [Public Route] Diagnostic snapshot: store reachability, which connection
/// env vars were configured, and the collection names currently present.
/// A store failure is reported inside the body as a truncated warning
/// string; this endpoint never returns a 500.
pub async fn test_database(State(state): State<AppState>) -> Json<Value> {
    let mut status = json!({
        "backend": "✅ Running",
        "database": "❌ Not Connected",
        "database_url": if state.config.database_url_set { "✅ Set" } else { "❌ Not Set" },
        "database_name": if state.config.database_name_set { "✅ Set" } else { "❌ Not Set" },
        "collections": [],
    });

    match state.store.collection_names().await {
        Ok(collections) => {
            status["collections"] = json!(collections);
            status["database"] = json!("✅ Connected");
        }
        Err(e) => {
            let warning: String = format!("⚠️ {e}").chars().take(120).collect();
            status["database"] = json!(warning);
        }
    }

    Json(status)
}

// --- Public read endpoints ---

/// get_pois
///
/// [Public Route] Lists every map marker, projected to the fixed public
/// field set the map frontend renders from.
#[utoipa::path(
    get,
    path = "/api/pois",
    responses((status = 200, description = "All map markers", body = [PoiPublic]))
)]
pub async fn get_pois(State(state): State<AppState>) -> Result<Json<Vec<PoiPublic>>, ApiError> {
    let documents = state.store.list(Poi::COLLECTION).await?;
    let pois = documents
        .into_iter()
        .map(|d| decode::<Poi>(d).map(Poi::into_public))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(pois))
}

/// get_lore_article
///
/// [Public Route] Fetches one article by id: 400 on a malformed id,
/// 404 when no such article exists.
#[utoipa::path(
    get,
    path = "/api/lore/{id}",
    params(("id" = String, Path, description = "Article id")),
    responses(
        (status = 200, description = "Article", body = LoreArticleDetail),
        (status = 400, description = "Malformed id"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_lore_article(
    State(state): State<AppState>,
    Path(article_id): Path<String>,
) -> Result<Json<LoreArticleDetail>, ApiError> {
    let id = parse_id(&article_id, "Invalid article id")?;
    let document = state
        .store
        .find_one(LoreArticle::COLLECTION, doc! { "_id": id }, None)
        .await?
        .ok_or(ApiError::NotFound("Article not found"))?;
    Ok(Json(decode::<LoreArticle>(document)?.into_detail()))
}

/// search_lore
///
/// [Public Route] Case-insensitive substring search over article titles and
/// teasers, capped at 20 results in store order. No ranking.
#[utoipa::path(
    get,
    path = "/api/lore/search",
    params(SearchQuery),
    responses((status = 200, description = "Matches", body = [LoreSearchResult]))
)]
pub async fn search_lore(
    State(state): State<AppState>,
    Query(search): Query<SearchQuery>,
) -> Result<Json<Vec<LoreSearchResult>>, ApiError> {
    let documents = state
        .store
        .search(LoreArticle::COLLECTION, &LoreArticle::SEARCH_FIELDS, &search.q)
        .await?;
    let results = documents
        .into_iter()
        .map(|d| decode::<LoreArticle>(d).map(LoreArticle::into_search_result))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(results))
}

/// get_map
///
/// [Public Route] Returns the current map asset so the website can load the
/// map image without a token. `null` when no map has been registered yet.
#[utoipa::path(
    get,
    path = "/api/map",
    responses((status = 200, description = "Current map or null", body = Option<MapAssetPublic>))
)]
pub async fn get_map(
    State(state): State<AppState>,
) -> Result<Json<Option<MapAssetPublic>>, ApiError> {
    let current = current_map_asset(&state.store).await?;
    Ok(Json(current.map(MapAsset::into_public)))
}

// --- Admin: auth ---

/// admin_login
///
/// [Admin Route, unauthenticated] Exchanges the static admin credentials for
/// a fresh opaque token. The only admin-prefixed route outside the guard.
#[utoipa::path(
    post,
    path = "/api/admin/login",
    request_body = AuthRequest,
    responses(
        (status = 200, description = "Token issued", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn admin_login(
    State(state): State<AppState>,
    Json(payload): Json<AuthRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    state
        .auth
        .login(&payload.username, &payload.password, &state.config)
        .map(|token| Json(AuthResponse { token }))
        .ok_or(ApiError::Unauthorized("Invalid credentials"))
}

// --- Admin: map asset ---

/// admin_get_map
///
/// [Admin Route] Same projection as the public map endpoint, served inside
/// the admin surface for the editor UI.
#[utoipa::path(
    get,
    path = "/api/admin/map",
    responses((status = 200, description = "Current map or null", body = Option<MapAssetPublic>))
)]
pub async fn admin_get_map(
    State(state): State<AppState>,
) -> Result<Json<Option<MapAssetPublic>>, ApiError> {
    let current = current_map_asset(&state.store).await?;
    Ok(Json(current.map(MapAsset::into_public)))
}

/// admin_set_map
///
/// [Admin Route] Registers a new map image. This never overwrites: the new
/// document gets version = current max + 1 (1 when none exists) and all
/// previous versions stay in the store.
#[utoipa::path(
    post,
    path = "/api/admin/map",
    request_body = CreateMapAsset,
    responses((status = 200, description = "Created map version", body = MapAssetPublic))
)]
pub async fn admin_set_map(
    State(state): State<AppState>,
    Json(payload): Json<CreateMapAsset>,
) -> Result<Json<MapAssetPublic>, ApiError> {
    let version = current_map_asset(&state.store)
        .await?
        .map(|asset| asset.version)
        .unwrap_or(0)
        + 1;

    let asset = MapAsset {
        id: None,
        image_url: payload.image_url,
        width: payload.width,
        height: payload.height,
        version,
    };

    let id = state
        .store
        .insert_one(MapAsset::COLLECTION, encode(&asset)?)
        .await?;
    let created = fetch_by_id(&state.store, MapAsset::COLLECTION, id, "Map asset not found").await?;
    Ok(Json(decode::<MapAsset>(created)?.into_public()))
}

// --- Admin: POI CRUD ---

/// admin_list_pois
///
/// [Admin Route] Full listing of markers for the editor table.
#[utoipa::path(
    get,
    path = "/api/admin/pois",
    responses((status = 200, description = "All markers", body = [PoiPublic]))
)]
pub async fn admin_list_pois(
    State(state): State<AppState>,
) -> Result<Json<Vec<PoiPublic>>, ApiError> {
    let documents = state.store.list(Poi::COLLECTION).await?;
    let pois = documents
        .into_iter()
        .map(|d| decode::<Poi>(d).map(Poi::into_public))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(pois))
}

/// admin_create_poi
///
/// [Admin Route] Validates the payload (coordinates must fall in [0,1]),
/// inserts it, and returns the persisted record re-fetched from the store.
#[utoipa::path(
    post,
    path = "/api/admin/pois",
    request_body = CreatePoi,
    responses(
        (status = 200, description = "Created marker", body = PoiPublic),
        (status = 400, description = "Validation failure")
    )
)]
pub async fn admin_create_poi(
    State(state): State<AppState>,
    Json(payload): Json<CreatePoi>,
) -> Result<Json<PoiPublic>, ApiError> {
    payload.validate()?;
    let id = state
        .store
        .insert_one(Poi::COLLECTION, encode(&payload)?)
        .await?;
    let created = fetch_by_id(&state.store, Poi::COLLECTION, id, "POI not found").await?;
    Ok(Json(decode::<Poi>(created)?.into_public()))
}

/// admin_update_poi
///
/// [Admin Route] Merge-update: only fields present in the payload change.
/// An all-absent payload is a no-op answered with `{"updated": false}`
/// before the store is touched. Absent means "keep"; these endpoints cannot
/// clear an optional field back to empty.
#[utoipa::path(
    put,
    path = "/api/admin/pois/{id}",
    params(("id" = String, Path, description = "POI id")),
    request_body = UpdatePoi,
    responses(
        (status = 200, description = "Updated marker", body = PoiPublic),
        (status = 400, description = "Malformed id or validation failure")
    )
)]
pub async fn admin_update_poi(
    State(state): State<AppState>,
    Path(poi_id): Path<String>,
    Json(payload): Json<UpdatePoi>,
) -> Result<Response, ApiError> {
    let id = parse_id(&poi_id, "Invalid id")?;
    payload.validate()?;

    let fields = encode(&payload)?;
    if fields.is_empty() {
        return Ok(Json(json!({ "updated": false })).into_response());
    }

    state.store.update_one(Poi::COLLECTION, id, fields).await?;
    let updated = fetch_by_id(&state.store, Poi::COLLECTION, id, "POI not found").await?;
    Ok(Json(decode::<Poi>(updated)?.into_public()).into_response())
}

/// admin_delete_poi
///
/// [Admin Route] Idempotent delete: acknowledges even when the id was
/// already gone.
#[utoipa::path(
    delete,
    path = "/api/admin/pois/{id}",
    params(("id" = String, Path, description = "POI id")),
    responses(
        (status = 200, description = "Acknowledged"),
        (status = 400, description = "Malformed id")
    )
)]
pub async fn admin_delete_poi(
    State(state): State<AppState>,
    Path(poi_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&poi_id, "Invalid id")?;
    state.store.delete_one(Poi::COLLECTION, id).await?;
    Ok(Json(json!({ "deleted": true })))
}

// --- Admin: lore CRUD ---

/// admin_list_lore
///
/// [Admin Route] Full article listing including categorization metadata.
#[utoipa::path(
    get,
    path = "/api/admin/lore",
    responses((status = 200, description = "All articles", body = [LoreArticlePublic]))
)]
pub async fn admin_list_lore(
    State(state): State<AppState>,
) -> Result<Json<Vec<LoreArticlePublic>>, ApiError> {
    let documents = state.store.list(LoreArticle::COLLECTION).await?;
    let articles = documents
        .into_iter()
        .map(|d| decode::<LoreArticle>(d).map(LoreArticle::into_public))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(articles))
}

/// admin_create_lore
///
/// [Admin Route] Inserts a new article. `content_body` is stored verbatim;
/// sanitizing the HTML is out of scope for this backend.
#[utoipa::path(
    post,
    path = "/api/admin/lore",
    request_body = CreateLoreArticle,
    responses((status = 200, description = "Created article", body = LoreArticlePublic))
)]
pub async fn admin_create_lore(
    State(state): State<AppState>,
    Json(payload): Json<CreateLoreArticle>,
) -> Result<Json<LoreArticlePublic>, ApiError> {
    let id = state
        .store
        .insert_one(LoreArticle::COLLECTION, encode(&payload)?)
        .await?;
    let created =
        fetch_by_id(&state.store, LoreArticle::COLLECTION, id, "Article not found").await?;
    Ok(Json(decode::<LoreArticle>(created)?.into_public()))
}

/// admin_update_lore
///
/// [Admin Route] Merge-update with the same empty-payload short-circuit as
/// the POI endpoint.
#[utoipa::path(
    put,
    path = "/api/admin/lore/{id}",
    params(("id" = String, Path, description = "Article id")),
    request_body = UpdateLoreArticle,
    responses(
        (status = 200, description = "Updated article", body = LoreArticlePublic),
        (status = 400, description = "Malformed id")
    )
)]
pub async fn admin_update_lore(
    State(state): State<AppState>,
    Path(lore_id): Path<String>,
    Json(payload): Json<UpdateLoreArticle>,
) -> Result<Response, ApiError> {
    let id = parse_id(&lore_id, "Invalid id")?;

    let fields = encode(&payload)?;
    if fields.is_empty() {
        return Ok(Json(json!({ "updated": false })).into_response());
    }

    state
        .store
        .update_one(LoreArticle::COLLECTION, id, fields)
        .await?;
    let updated =
        fetch_by_id(&state.store, LoreArticle::COLLECTION, id, "Article not found").await?;
    Ok(Json(decode::<LoreArticle>(updated)?.into_public()).into_response())
}

/// admin_delete_lore
///
/// [Admin Route] Idempotent delete. POIs referencing the article keep their
/// dangling `lore_article_id`; references are unchecked by design.
#[utoipa::path(
    delete,
    path = "/api/admin/lore/{id}",
    params(("id" = String, Path, description = "Article id")),
    responses(
        (status = 200, description = "Acknowledged"),
        (status = 400, description = "Malformed id")
    )
)]
pub async fn admin_delete_lore(
    State(state): State<AppState>,
    Path(lore_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&lore_id, "Invalid id")?;
    state.store.delete_one(LoreArticle::COLLECTION, id).await?;
    Ok(Json(json!({ "deleted": true })))
}

// --- Admin: category CRUD ---

/// admin_list_categories
///
/// [Admin Route] Lists every category.
#[utoipa::path(
    get,
    path = "/api/admin/categories",
    responses((status = 200, description = "All categories", body = [CategoryPublic]))
)]
pub async fn admin_list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<CategoryPublic>>, ApiError> {
    let documents = state.store.list(Category::COLLECTION).await?;
    let categories = documents
        .into_iter()
        .map(|d| decode::<Category>(d).map(Category::into_public))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Json(categories))
}

/// admin_create_category
///
/// [Admin Route] Creates a category. Slug uniqueness is intended but not
/// enforced by the store.
#[utoipa::path(
    post,
    path = "/api/admin/categories",
    request_body = CreateCategory,
    responses(
        (status = 200, description = "Created category", body = CategoryPublic),
        (status = 400, description = "Validation failure")
    )
)]
pub async fn admin_create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategory>,
) -> Result<Json<CategoryPublic>, ApiError> {
    payload.validate()?;
    let id = state
        .store
        .insert_one(Category::COLLECTION, encode(&payload)?)
        .await?;
    let created =
        fetch_by_id(&state.store, Category::COLLECTION, id, "Category not found").await?;
    Ok(Json(decode::<Category>(created)?.into_public()))
}

/// admin_update_category
///
/// [Admin Route] Merge-update with the shared empty-payload short-circuit.
#[utoipa::path(
    put,
    path = "/api/admin/categories/{id}",
    params(("id" = String, Path, description = "Category id")),
    request_body = UpdateCategory,
    responses(
        (status = 200, description = "Updated category", body = CategoryPublic),
        (status = 400, description = "Malformed id or validation failure")
    )
)]
pub async fn admin_update_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
    Json(payload): Json<UpdateCategory>,
) -> Result<Response, ApiError> {
    let id = parse_id(&category_id, "Invalid id")?;
    payload.validate()?;

    let fields = encode(&payload)?;
    if fields.is_empty() {
        return Ok(Json(json!({ "updated": false })).into_response());
    }

    state
        .store
        .update_one(Category::COLLECTION, id, fields)
        .await?;
    let updated =
        fetch_by_id(&state.store, Category::COLLECTION, id, "Category not found").await?;
    Ok(Json(decode::<Category>(updated)?.into_public()).into_response())
}

/// admin_delete_category
///
/// [Admin Route] Idempotent delete. Articles referencing the category are
/// untouched; there is no cascade and no blocking.
#[utoipa::path(
    delete,
    path = "/api/admin/categories/{id}",
    params(("id" = String, Path, description = "Category id")),
    responses(
        (status = 200, description = "Acknowledged"),
        (status = 400, description = "Malformed id")
    )
)]
pub async fn admin_delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let id = parse_id(&category_id, "Invalid id")?;
    state.store.delete_one(Category::COLLECTION, id).await?;
    Ok(Json(json!({ "deleted": true })))
}
