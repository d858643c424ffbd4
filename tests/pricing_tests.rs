mod common;

use http::StatusCode;
use serde_json::json;

use common::{assert_amount, TestApp};

/// Masonry 25% con 5 unidades de un material de 10
async fn masonry_wall(app: &TestApp) -> (String, String, String) {
    let masonry = app.category("Masonry", 25.0).await;
    let cement = app.resource("Cement", "material", 10.0).await;
    let item = app
        .create(
            "/api/composite-items",
            json!({
                "name": "Wall m2",
                "unit": "m2",
                "categoryId": masonry,
                "composition": [{ "resourceId": cement, "quantity": 5 }]
            }),
        )
        .await;
    (masonry, cement, item)
}

#[tokio::test]
async fn test_composite_price_is_cost_plus_category_margin() {
    let app = TestApp::new();
    let (_, _, item) = masonry_wall(&app).await;

    let (status, body) = app.get(&format!("/api/composite-items/{}", item)).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_amount(&data["costBreakdown"]["materials"], 50.0);
    assert_amount(&data["costBreakdown"]["labor"], 0.0);
    assert_amount(&data["costBreakdown"]["total"], 50.0);
    assert_amount(&data["margin"], 25.0);
    assert_amount(&data["finalPrice"], 62.5);
    assert_eq!(data["category"]["name"], "Masonry");
    assert_eq!(data["composition"][0]["resource"]["name"], "Cement");
}

#[tokio::test]
async fn test_breakdown_buckets_by_resource_type() {
    let app = TestApp::new();
    let category = app.category("Roofing", 10.0).await;
    let tile = app.resource("Tile", "material", 4.0).await;
    let roofer = app.resource("Roofer", "labor", 15.0).await;
    let crane = app.resource("Crane", "equipment", 30.0).await;

    let (status, body) = app
        .post(
            "/api/composite-items",
            json!({
                "name": "Roof m2",
                "unit": "m2",
                "categoryId": category,
                "composition": [
                    { "resourceId": tile, "quantity": 10 },
                    { "resourceId": roofer, "quantity": 2 },
                    { "resourceId": crane, "quantity": 0.5 },
                    { "resourceId": tile, "quantity": 1 }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let breakdown = &body["data"]["costBreakdown"];
    assert_amount(&breakdown["materials"], 44.0);
    assert_amount(&breakdown["labor"], 30.0);
    assert_amount(&breakdown["equipment"], 15.0);
    assert_amount(&breakdown["total"], 89.0);
    assert_amount(&body["data"]["finalPrice"], 97.9);
}

#[tokio::test]
async fn test_live_price_follows_resource_and_category_changes() {
    let app = TestApp::new();
    let (masonry, cement, item) = masonry_wall(&app).await;
    let custom = app
        .create(
            "/api/composite-items",
            json!({
                "name": "Wall premium",
                "unit": "m2",
                "categoryId": masonry,
                "customMargin": 40,
                "composition": [{ "resourceId": cement, "quantity": 5 }]
            }),
        )
        .await;

    let (_, body) = app.get(&format!("/api/composite-items/{}", custom)).await;
    assert_amount(&body["data"]["finalPrice"], 70.0);

    app.put(&format!("/api/resources/{}", cement), json!({ "price": 12 }))
        .await;
    let (_, body) = app.get(&format!("/api/composite-items/{}", item)).await;
    assert_amount(&body["data"]["finalPrice"], 75.0);

    app.put(&format!("/api/categories/{}", masonry), json!({ "defaultMargin": 50 }))
        .await;
    let (_, body) = app.get(&format!("/api/composite-items/{}", item)).await;
    assert_amount(&body["data"]["finalPrice"], 90.0);
    let (_, body) = app.get(&format!("/api/composite-items/{}", custom)).await;
    assert_amount(&body["data"]["margin"], 40.0);
    assert_amount(&body["data"]["finalPrice"], 84.0);
}

#[tokio::test]
async fn test_final_price_rounds_to_cents() {
    let app = TestApp::new();
    let category = app.category("Painting", 25.0).await;
    let paint = app.resource("Paint", "material", 49.7).await;

    let (_, body) = app
        .post(
            "/api/composite-items",
            json!({
                "name": "Paint m2",
                "unit": "m2",
                "categoryId": category,
                "composition": [{ "resourceId": paint, "quantity": 1 }]
            }),
        )
        .await;
    assert_amount(&body["data"]["finalPrice"], 62.13);
}

#[tokio::test]
async fn test_unknown_resource_rejects_item_without_persisting() {
    let app = TestApp::new();
    let category = app.category("Masonry", 25.0).await;

    let (status, body) = app
        .post(
            "/api/composite-items",
            json!({
                "name": "Ghost wall",
                "unit": "m2",
                "categoryId": category,
                "composition": [{ "resourceId": uuid::Uuid::new_v4(), "quantity": 1 }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "RESOURCE_NOT_FOUND");

    let (_, body) = app.get("/api/composite-items").await;
    assert!(body["data"]["items"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_category_and_empty_composition_are_rejected() {
    let app = TestApp::new();
    let cement = app.resource("Cement", "material", 10.0).await;

    let (status, body) = app
        .post(
            "/api/composite-items",
            json!({
                "name": "Wall",
                "unit": "m2",
                "categoryId": uuid::Uuid::new_v4(),
                "composition": [{ "resourceId": cement, "quantity": 1 }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "CATEGORY_NOT_FOUND");

    let category = app.category("Masonry", 25.0).await;
    let (status, body) = app
        .post(
            "/api/composite-items",
            json!({ "name": "Wall", "unit": "m2", "categoryId": category, "composition": [] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = app
        .post(
            "/api/composite-items",
            json!({
                "name": "Wall",
                "unit": "m2",
                "categoryId": category,
                "composition": [{ "resourceId": cement, "quantity": 0 }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_search_duplicate_and_price_summary() {
    let app = TestApp::new();
    let (masonry, _, item) = masonry_wall(&app).await;

    let (status, body) = app
        .post(&format!("/api/composite-items/{}/duplicate", item), json!({}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["name"], "Wall m2 (Copy)");
    assert_ne!(body["data"]["id"].as_str().unwrap(), item);
    assert_amount(&body["data"]["finalPrice"], 62.5);

    let (_, body) = app
        .get(&format!("/api/composite-items?categoryId={}", masonry))
        .await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 2);
    assert!(body["data"]["skipped"].as_array().unwrap().is_empty());

    let (_, body) = app.get("/api/composite-items/search?q=copy").await;
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);

    let (status, body) = app
        .get(&format!("/api/composite-items/{}/price-history", item))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_amount(&body["data"]["currentPrice"], 62.5);
    assert_amount(&body["data"]["currentCost"], 50.0);
    assert_amount(&body["data"]["margin"], 25.0);
}

#[tokio::test]
async fn test_missing_composite_item_returns_not_found() {
    let app = TestApp::new();
    let (status, body) = app
        .get(&format!("/api/composite-items/{}", uuid::Uuid::new_v4()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "COMPOSITE_ITEM_NOT_FOUND");
}
