use bson::oid::ObjectId;
use serde_json::json;

use loremap_api::error::ApiError;
use loremap_api::models::{
    CreateCategory, CreatePoi, Poi, PoiPublic, UpdateCategory, UpdatePoi,
};

// Payload validation and the serde attributes the storage layer relies on:
// skipped None fields, the "_id"/"id" boundary, and defaulted icon types.

fn poi_at(x: f64, y: f64) -> CreatePoi {
    CreatePoi {
        name: "Harbor".to_string(),
        x_coordinate: x,
        y_coordinate: y,
        icon_type: "marker".to_string(),
        lore_article_id: None,
    }
}

#[test]
fn test_create_poi_accepts_boundary_coordinates() {
    assert!(poi_at(0.0, 0.0).validate().is_ok());
    assert!(poi_at(1.0, 1.0).validate().is_ok());
    assert!(poi_at(0.5, 0.5).validate().is_ok());
}

#[test]
fn test_create_poi_rejects_out_of_range_coordinates() {
    assert!(matches!(
        poi_at(-0.01, 0.5).validate(),
        Err(ApiError::Validation(_))
    ));
    assert!(matches!(
        poi_at(0.5, 1.01).validate(),
        Err(ApiError::Validation(_))
    ));
}

#[test]
fn test_create_poi_rejects_nan_coordinates() {
    // NaN fails every range check and must not slip through.
    assert!(poi_at(f64::NAN, 0.5).validate().is_err());
    assert!(poi_at(0.5, f64::NAN).validate().is_err());
}

#[test]
fn test_validation_error_names_the_offending_field() {
    let err = poi_at(0.5, 2.0).validate().unwrap_err();
    match err {
        ApiError::Validation(detail) => assert!(detail.contains("y_coordinate")),
        other => panic!("expected validation error, got {other:?}"),
    }
}

#[test]
fn test_create_poi_icon_type_defaults_to_marker() {
    let poi: CreatePoi = serde_json::from_value(json!({
        "name": "Harbor",
        "x_coordinate": 0.1,
        "y_coordinate": 0.2
    }))
    .unwrap();
    assert_eq!(poi.icon_type, "marker");
}

#[test]
fn test_update_poi_validates_only_provided_coordinates() {
    let name_only = UpdatePoi {
        name: Some("Old Harbor".to_string()),
        ..Default::default()
    };
    assert!(name_only.validate().is_ok());

    let bad_x = UpdatePoi {
        x_coordinate: Some(7.0),
        ..Default::default()
    };
    assert!(matches!(bad_x.validate(), Err(ApiError::Validation(_))));
}

#[test]
fn test_update_poi_absent_fields_are_skipped_entirely() {
    let patch = UpdatePoi {
        name: Some("Old Harbor".to_string()),
        ..Default::default()
    };

    // JSON output carries only the provided field.
    let value = serde_json::to_value(&patch).unwrap();
    assert_eq!(value, json!({ "name": "Old Harbor" }));

    // The all-absent payload encodes to an empty document, which is what the
    // update handlers use to short-circuit into {"updated": false}.
    let empty = bson::to_document(&UpdatePoi::default()).unwrap();
    assert!(empty.is_empty());
}

#[test]
fn test_create_category_rejects_blank_name() {
    let blank = CreateCategory {
        name: "  ".to_string(),
        slug: "x".to_string(),
        description: None,
    };
    assert!(matches!(blank.validate(), Err(ApiError::Validation(_))));
}

#[test]
fn test_update_category_tolerates_absent_name_but_not_blank() {
    assert!(UpdateCategory::default().validate().is_ok());

    let blank = UpdateCategory {
        name: Some(String::new()),
        ..Default::default()
    };
    assert!(blank.validate().is_err());
}

#[test]
fn test_stored_poi_serializes_underscore_id() {
    let id = ObjectId::new();
    let poi = Poi {
        id: Some(id),
        name: "Harbor".to_string(),
        x_coordinate: 0.1,
        y_coordinate: 0.2,
        icon_type: "marker".to_string(),
        lore_article_id: None,
    };

    let doc = bson::to_document(&poi).unwrap();
    assert_eq!(doc.get_object_id("_id").unwrap(), id);
    assert!(!doc.contains_key("id"));
    // Absent optionals are stored as missing keys, not nulls.
    assert!(!doc.contains_key("lore_article_id"));
}

#[test]
fn test_stored_poi_omits_id_before_insert() {
    let poi = Poi {
        id: None,
        name: "Harbor".to_string(),
        x_coordinate: 0.1,
        y_coordinate: 0.2,
        icon_type: "marker".to_string(),
        lore_article_id: None,
    };

    let doc = bson::to_document(&poi).unwrap();
    assert!(!doc.contains_key("_id"));
}

#[test]
fn test_public_poi_uses_plain_id_field() {
    let id = ObjectId::new();
    let poi = Poi {
        id: Some(id),
        name: "Harbor".to_string(),
        x_coordinate: 0.1,
        y_coordinate: 0.2,
        icon_type: "marker".to_string(),
        lore_article_id: Some("abc".to_string()),
    };

    let value = serde_json::to_value(poi.into_public()).unwrap();
    assert_eq!(value["id"], id.to_hex());
    assert!(value.get("_id").is_none());
    assert_eq!(value["lore_article_id"], "abc");
}

#[test]
fn test_public_poi_round_trips_through_json() {
    let public = PoiPublic {
        id: ObjectId::new().to_hex(),
        name: "Harbor".to_string(),
        x_coordinate: 0.42,
        y_coordinate: 0.58,
        lore_article_id: None,
        icon_type: "city".to_string(),
    };

    let parsed: PoiPublic =
        serde_json::from_str(&serde_json::to_string(&public).unwrap()).unwrap();
    assert_eq!(parsed.id, public.id);
    assert_eq!(parsed.x_coordinate, 0.42);
}
