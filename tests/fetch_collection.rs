//! Fetching Collection Tests
//!
//! Collection reads through the full HTTP stack:
//! - document structure and links
//! - subtypes and beforeRender
//! - sorting, pagination and totals
//! - filtering

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::*;

// =============================================================================
// Document Structure
// =============================================================================

#[tokio::test]
async fn test_organizations_document_structure() {
    let res = get_json(app(), "/organizations").await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.header("content-type"), Some(JSON_API));
    assert_eq!(res.header("vary"), Some("Accept"));
    assert!(res.body.is_object());
    assert_eq!(res.body["links"]["self"], format!("{}/organizations", BASE_URL));

    let data = res.body["data"].as_array().unwrap();
    let allowed = ["type", "id", "attributes", "relationships", "links", "meta"];
    for resource in data {
        assert!(resource.as_object().unwrap().keys().all(|k| allowed.contains(&k.as_str())));
    }
}

#[tokio::test]
async fn test_relationships_carry_links_and_data() {
    let res = get_json(app(), "/organizations").await;

    for resource in res.body["data"].as_array().unwrap() {
        let liaisons = &resource["relationships"]["liaisons"];
        assert!(liaisons["links"].is_object());
        assert!(liaisons.get("self").is_none());
        assert!(liaisons.get("related").is_none());
        assert!(liaisons["links"]["self"].is_string());
        assert!(liaisons.get("data").is_some());
    }
}

#[tokio::test]
async fn test_subtypes_are_transformed_and_removals_respected() {
    let res = get_json(app(), "/organizations").await;
    let data = res.body["data"].as_array().unwrap();

    assert!(data.iter().any(|r| r["type"] == "schools"));
    assert!(data.iter().any(|r| r["type"] == "organizations"));
    assert!(data.iter().all(|r| r["attributes"]["addedBeforeRender"] == true));
    assert!(data.iter().all(|r| r["id"] != HIDDEN_ORG_ID));
}

// =============================================================================
// Sorting and Pagination
// =============================================================================

#[tokio::test]
async fn test_ascending_gender_sort() {
    let res = get_json(app(), "/people?sort=gender").await;
    let names: Vec<_> = res
        .names()
        .into_iter()
        .filter(|n| n == "John Smith" || n == "Jane Doe")
        .collect();
    assert_eq!(names, vec!["Jane Doe", "John Smith"]);
}

#[tokio::test]
async fn test_descending_name_sort() {
    let res = get_json(app(), "/people?sort=-name").await;
    let names: Vec<_> = res
        .names()
        .into_iter()
        .filter(|n| n.starts_with("John") || n.starts_with("Jane"))
        .collect();
    assert_eq!(names, vec!["John Smith", "Jane Doe"]);
}

#[tokio::test]
async fn test_multi_key_sort() {
    let res = get_json(app(), "/people?sort=-gender,name").await;
    let names: Vec<_> = res
        .names()
        .into_iter()
        .filter(|n| ["John", "Jane", "Doug"].iter().any(|p| n.starts_with(p)))
        .collect();
    assert_eq!(names, vec!["Doug Wilson", "John Smith", "Jane Doe"]);
}

#[tokio::test]
async fn test_offset_limit_and_total() {
    let res = get_json(app(), "/people?sort=-name&page%5Boffset%5D=1&page%5Blimit%5D=3").await;

    assert_eq!(res.names(), vec!["John Smith", "Jane Doe", "Doug Wilson"]);
    assert_eq!(res.body["meta"], json!({"total": 5}));
}

#[tokio::test]
async fn test_invalid_page_parameter() {
    let res = get_json(app(), "/people?page%5Blimit%5D=lots").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["errors"][0]["source"]["parameter"], "page[limit]");
}

// =============================================================================
// Filtering
// =============================================================================

#[tokio::test]
async fn test_simple_equality_filter() {
    let res = get_json(app(), "/people?filter=(name,eq,Doug%20Wilson)").await;
    assert_eq!(res.names(), vec!["Doug Wilson"]);
}

#[tokio::test]
async fn test_custom_filter_endpoint() {
    let res = get_json(app(), "/people/custom-filter-test?customNameFilter=Doug%20Wilson").await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.names(), vec!["Doug Wilson"]);
}

#[tokio::test]
async fn test_single_id_filter_still_returns_array() {
    let res = get_json(app(), &format!("/organizations?filter=(id,{})", ORG_ID)).await;

    let data = res.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], ORG_ID);
}

#[tokio::test]
async fn test_numeric_looking_id_filters() {
    let app = app();
    for (id, name) in [("1", "One"), ("2", "Two"), ("007", "Bond")] {
        let res = send_json(
            app.clone(),
            "POST",
            "/people",
            JSON_API,
            json!({"data": {"type": "people", "id": id, "attributes": {"name": name}}}),
        )
        .await;
        assert_eq!(res.status, StatusCode::CREATED);
    }

    let res = get_json(app.clone(), "/people?filter=(id,1)").await;
    assert_eq!(res.names(), vec!["One"]);

    let res = get_json(app.clone(), "/people?filter=(id,in,%5B1,2%5D)").await;
    assert_eq!(res.names(), vec!["One", "Two"]);

    let res = get_json(app, "/people?filter=(id,007)").await;
    assert_eq!(res.names(), vec!["Bond"]);
}

#[tokio::test]
async fn test_malformed_filter() {
    let res = get_json(app(), "/people?filter=(name,between,a)").await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert_eq!(res.body["errors"][0]["source"]["parameter"], "filter");
}

// =============================================================================
// Includes, Fields, Labels
// =============================================================================

#[tokio::test]
async fn test_include_and_sparse_fields() {
    let res = get_json(
        app(),
        &format!("/schools/{}?include=liaisons&fields%5Bpeople%5D=name", SCHOOL_ID),
    )
    .await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["id"], SCHOOL_ID);
    let included = res.body["included"].as_array().unwrap();
    assert_eq!(included.len(), 2);
    assert!(included.iter().all(|r| r["attributes"].get("gender").is_none()));
    assert!(included.iter().all(|r| r["attributes"]["name"].is_string()));
}

#[tokio::test]
async fn test_label_resolves_to_ids() {
    let res = get_json(app(), "/people/non-binary-label").await;
    let data = res.body["data"].as_array().unwrap();
    assert_eq!(data.len(), 1);
    assert_eq!(data[0]["id"], NON_BINARY_ID);

    let res = get_json(app(), "/people/nobody").await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body["data"].is_null());
}

#[tokio::test]
async fn test_unknown_type_and_id() {
    let res = get_json(app(), "/martians").await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["errors"][0]["title"], "martians is not a valid type.");

    let res = get_json(app(), "/people/does-not-exist").await;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
}
