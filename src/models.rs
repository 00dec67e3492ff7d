use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use utoipa::ToSchema;

use crate::error::ApiError;
use crate::store::Collection;

// --- Stored document shapes ---
//
// These structs mirror the documents exactly as they live in MongoDB. The
// internal `_id` never leaves the process under that name: every outbound
// projection renames it to a public `id` string via `into_public`.

fn default_icon_type() -> String {
    "marker".to_string()
}

/// Category
///
/// A lore category. Referenced by articles via id strings with no
/// referential-integrity enforcement: deleting a category neither cascades
/// nor blocks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Category {
    pub const COLLECTION: Collection = Collection::Category;

    pub fn into_public(self) -> CategoryPublic {
        CategoryPublic {
            id: self.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            name: self.name,
            slug: self.slug,
            description: self.description,
        }
    }
}

/// LoreArticle
///
/// A wiki article. `content_body` is rich HTML stored and returned verbatim.
/// `category_ids` preserves insertion order and tolerates duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoreArticle {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub title: String,
    pub short_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_image_url: Option<String>,
    pub content_body: String,
    #[serde(default)]
    pub category_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

impl LoreArticle {
    pub const COLLECTION: Collection = Collection::LoreArticle;

    /// Fields the public search endpoint matches against.
    pub const SEARCH_FIELDS: [&'static str; 2] = ["title", "short_description"];

    pub fn into_public(self) -> LoreArticlePublic {
        LoreArticlePublic {
            id: self.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            title: self.title,
            short_description: self.short_description,
            main_image_url: self.main_image_url,
            content_body: self.content_body,
            category_ids: self.category_ids,
            slug: self.slug,
        }
    }

    /// Projection served by the public article endpoint: the reading surface
    /// only, without the categorization metadata the admin shapes carry.
    pub fn into_detail(self) -> LoreArticleDetail {
        LoreArticleDetail {
            id: self.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            title: self.title,
            short_description: self.short_description,
            main_image_url: self.main_image_url,
            content_body: self.content_body,
        }
    }

    pub fn into_search_result(self) -> LoreSearchResult {
        LoreSearchResult {
            id: self.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            title: self.title,
            short_description: self.short_description,
        }
    }
}

/// Poi
///
/// A map marker. Coordinates are normalized to the closed interval [0,1]
/// relative to the map image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Poi {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub name: String,
    pub x_coordinate: f64,
    pub y_coordinate: f64,
    #[serde(default = "default_icon_type")]
    pub icon_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lore_article_id: Option<String>,
}

impl Poi {
    pub const COLLECTION: Collection = Collection::Poi;

    pub fn into_public(self) -> PoiPublic {
        PoiPublic {
            id: self.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            name: self.name,
            x_coordinate: self.x_coordinate,
            y_coordinate: self.y_coordinate,
            lore_article_id: self.lore_article_id,
            icon_type: self.icon_type,
        }
    }
}

/// MapAsset
///
/// One version of the map image. "Update" is really an insert of the next
/// version; old versions are retained forever, and the current map is the
/// document with the maximum `version`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapAsset {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
    pub version: i64,
}

impl MapAsset {
    pub const COLLECTION: Collection = Collection::MapAsset;

    pub fn into_public(self) -> MapAssetPublic {
        MapAssetPublic {
            id: self.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            image_url: self.image_url,
            width: self.width,
            height: self.height,
            version: self.version,
        }
    }
}

// --- Public shapes (API output) ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CategoryPublic {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoreArticlePublic {
    pub id: String,
    pub title: String,
    pub short_description: String,
    pub main_image_url: Option<String>,
    pub content_body: String,
    pub category_ids: Vec<String>,
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoreArticleDetail {
    pub id: String,
    pub title: String,
    pub short_description: String,
    pub main_image_url: Option<String>,
    pub content_body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct LoreSearchResult {
    pub id: String,
    pub title: String,
    pub short_description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PoiPublic {
    pub id: String,
    pub name: String,
    pub x_coordinate: f64,
    pub y_coordinate: f64,
    pub lore_article_id: Option<String>,
    pub icon_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct MapAssetPublic {
    pub id: String,
    pub image_url: String,
    pub width: Option<i64>,
    pub height: Option<i64>,
    pub version: i64,
}

// --- Request payloads (API input) ---
//
// Required fields are enforced by deserialization; everything beyond
// presence (ranges, non-empty strings) lives in the `validate` methods,
// which run before any store call so an invalid payload never persists.

fn validate_coordinate(field: &str, value: f64) -> Result<(), ApiError> {
    if !(0.0..=1.0).contains(&value) {
        return Err(ApiError::Validation(format!(
            "{field} must be between 0 and 1"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateCategory {
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CreateCategory {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation("name must not be empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCategory {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl UpdateCategory {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ApiError::Validation("name must not be empty".to_string()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateLoreArticle {
    pub title: String,
    pub short_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_image_url: Option<String>,
    pub content_body: String,
    #[serde(default)]
    pub category_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateLoreArticle {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_body: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreatePoi {
    pub name: String,
    pub x_coordinate: f64,
    pub y_coordinate: f64,
    #[serde(default = "default_icon_type")]
    pub icon_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lore_article_id: Option<String>,
}

impl CreatePoi {
    pub fn validate(&self) -> Result<(), ApiError> {
        validate_coordinate("x_coordinate", self.x_coordinate)?;
        validate_coordinate("y_coordinate", self.y_coordinate)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePoi {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x_coordinate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y_coordinate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lore_article_id: Option<String>,
}

impl UpdatePoi {
    pub fn validate(&self) -> Result<(), ApiError> {
        if let Some(x) = self.x_coordinate {
            validate_coordinate("x_coordinate", x)?;
        }
        if let Some(y) = self.y_coordinate {
            validate_coordinate("y_coordinate", y)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct CreateMapAsset {
    pub image_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
}

// --- Auth payloads ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct AuthResponse {
    pub token: String,
}
