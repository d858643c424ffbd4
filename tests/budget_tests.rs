mod common;

use std::collections::HashSet;

use chrono::{Datelike, Utc};
use http::StatusCode;
use serde_json::{json, Value};

use common::{assert_amount, TestApp};

struct Catalog {
    client: String,
    cement: String,
    wall: String,
}

/// Cemento a 10 y un muro de 5 cementos con 25% (62.50)
async fn catalog(app: &TestApp) -> Catalog {
    let client = app.client("Constructora Sur").await;
    let masonry = app.category("Masonry", 25.0).await;
    let cement = app.resource("Cement", "material", 10.0).await;
    let wall = app
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
    Catalog {
        client,
        cement,
        wall,
    }
}

fn budget_body(catalog: &Catalog) -> Value {
    json!({
        "clientId": catalog.client,
        "projectName": "Casa Lambaré",
        "items": [
            { "itemType": "composite", "compositeItemId": catalog.wall, "quantity": 2 },
            { "itemType": "resource", "resourceId": catalog.cement, "quantity": 3 }
        ]
    })
}

#[tokio::test]
async fn test_create_budget_freezes_prices_and_computes_totals() {
    let app = TestApp::new();
    let catalog = catalog(&app).await;

    let (status, body) = app.post("/api/budgets", budget_body(&catalog)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    let data = &body["data"];

    let expected_number = format!("BUD-{}-001", Utc::now().year());
    assert_eq!(data["budgetNumber"], expected_number.as_str());
    assert_eq!(data["status"], "draft");
    assert_eq!(data["client"]["name"], "Constructora Sur");

    let items = data["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["itemType"], "composite");
    assert_eq!(items[0]["description"], "Wall m2");
    assert_eq!(items[0]["unit"], "m2");
    assert_amount(&items[0]["unitPrice"], 62.5);
    assert_amount(&items[0]["subtotal"], 125.0);
    assert_eq!(items[1]["itemType"], "resource");
    assert_amount(&items[1]["unitPrice"], 10.0);
    assert_amount(&items[1]["subtotal"], 30.0);

    assert_amount(&data["subtotal"], 155.0);
    assert_amount(&data["iva"], 15.5);
    assert_amount(&data["total"], 170.5);
}

#[tokio::test]
async fn test_budget_lines_ignore_later_price_changes() {
    let app = TestApp::new();
    let catalog = catalog(&app).await;
    let budget = app.create("/api/budgets", budget_body(&catalog)).await;

    let (status, _) = app
        .put(&format!("/api/resources/{}", catalog.cement), json!({ "price": 20 }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = app.get(&format!("/api/composite-items/{}", catalog.wall)).await;
    assert_amount(&body["data"]["finalPrice"], 125.0);

    let (_, body) = app.get(&format!("/api/budgets/{}", budget)).await;
    assert_amount(&body["data"]["items"][0]["unitPrice"], 62.5);
    assert_amount(&body["data"]["items"][1]["unitPrice"], 10.0);
    assert_amount(&body["data"]["total"], 170.5);
}

#[tokio::test]
async fn test_replacing_items_takes_current_prices() {
    let app = TestApp::new();
    let catalog = catalog(&app).await;
    let budget = app.create("/api/budgets", budget_body(&catalog)).await;

    app.put(&format!("/api/resources/{}", catalog.cement), json!({ "price": 20 }))
        .await;

    let (status, body) = app
        .put(
            &format!("/api/budgets/{}", budget),
            json!({ "items": [
                {
                    "itemType": "resource",
                    "resourceId": catalog.cement,
                    "quantity": 1,
                    "description": "Cemento extra"
                }
            ]}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["items"].as_array().unwrap().len(), 1);
    assert_eq!(data["items"][0]["description"], "Cemento extra");
    assert_amount(&data["subtotal"], 20.0);
    assert_amount(&data["iva"], 2.0);
    assert_amount(&data["total"], 22.0);
    assert_eq!(data["projectName"], "Casa Lambaré");
}

#[tokio::test]
async fn test_invalid_item_type_is_rejected() {
    let app = TestApp::new();
    let catalog = catalog(&app).await;

    let (status, body) = app
        .post(
            "/api/budgets",
            json!({
                "clientId": catalog.client,
                "items": [{ "itemType": "service", "resourceId": catalog.cement, "quantity": 1 }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_ITEM_TYPE");

    let (_, body) = app.get("/api/budgets").await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_unresolvable_references_abort_creation() {
    let app = TestApp::new();
    let catalog = catalog(&app).await;

    let (status, body) = app
        .post(
            "/api/budgets",
            json!({
                "clientId": uuid::Uuid::new_v4(),
                "items": [{ "itemType": "resource", "resourceId": catalog.cement, "quantity": 1 }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "CLIENT_NOT_FOUND");

    let (status, body) = app
        .post(
            "/api/budgets",
            json!({
                "clientId": catalog.client,
                "items": [
                    { "itemType": "resource", "resourceId": catalog.cement, "quantity": 1 },
                    {
                        "itemType": "composite",
                        "compositeItemId": uuid::Uuid::new_v4(),
                        "quantity": 1
                    }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "COMPOSITE_ITEM_NOT_FOUND");

    let (status, _) = app
        .post(
            "/api/budgets",
            json!({ "clientId": catalog.client, "items": [] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = app.get("/api/budgets").await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_budget_numbers_are_sequential_per_year() {
    let app = TestApp::new();
    let catalog = catalog(&app).await;
    let year = Utc::now().year();

    for seq in 1..=3 {
        let (_, body) = app.post("/api/budgets", budget_body(&catalog)).await;
        assert_eq!(
            body["data"]["budgetNumber"],
            format!("BUD-{}-{:03}", year, seq).as_str()
        );
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_get_distinct_numbers() {
    let app = TestApp::new();
    let catalog = catalog(&app).await;
    let body = budget_body(&catalog);

    let mut handles = Vec::new();
    for _ in 0..4 {
        let app = TestApp {
            router: app.router.clone(),
            token: app.token.clone(),
        };
        let body = body.clone();
        handles.push(tokio::spawn(async move { app.post("/api/budgets", body).await }));
    }

    let mut numbers = HashSet::new();
    for handle in handles {
        let (status, body) = handle.await.unwrap();
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        numbers.insert(body["data"]["budgetNumber"].as_str().unwrap().to_string());
    }
    assert_eq!(numbers.len(), 4);
}

#[tokio::test]
async fn test_duplicate_budget_keeps_frozen_lines() {
    let app = TestApp::new();
    let catalog = catalog(&app).await;
    let original = app.create("/api/budgets", budget_body(&catalog)).await;
    app.patch(
        &format!("/api/budgets/{}/status", original),
        json!({ "status": "sent" }),
    )
    .await;
    app.put(&format!("/api/resources/{}", catalog.cement), json!({ "price": 99 }))
        .await;

    let (status, body) = app
        .post(&format!("/api/budgets/{}/duplicate", original), json!({}))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let copy = &body["data"];

    let (_, source) = app.get(&format!("/api/budgets/{}", original)).await;
    let source = &source["data"];

    assert_ne!(copy["id"], source["id"]);
    assert_ne!(copy["budgetNumber"], source["budgetNumber"]);
    assert_eq!(copy["status"], "draft");
    assert_eq!(copy["projectName"], "Casa Lambaré (Copy)");
    assert_eq!(copy["items"], source["items"]);
    assert_eq!(copy["total"], source["total"]);
}

#[tokio::test]
async fn test_status_transitions_and_filters() {
    let app = TestApp::new();
    let catalog = catalog(&app).await;
    let budget = app.create("/api/budgets", budget_body(&catalog)).await;
    app.create("/api/budgets", budget_body(&catalog)).await;

    let (status, body) = app
        .patch(&format!("/api/budgets/{}/status", budget), json!({ "status": "approved" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "approved");

    let (status, _) = app
        .patch(&format!("/api/budgets/{}/status", budget), json!({ "status": "archived" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // cualquier estado puede volver a borrador
    let (status, body) = app
        .patch(&format!("/api/budgets/{}/status", budget), json!({ "status": "draft" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "draft");

    app.patch(&format!("/api/budgets/{}/status", budget), json!({ "status": "approved" }))
        .await;
    let (_, body) = app.get("/api/budgets?status=approved").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    let (_, body) = app
        .get(&format!("/api/budgets?clientId={}", catalog.client))
        .await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, _) = app.get("/api/budgets?status=archived").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats_sum_approved_revenue() {
    let app = TestApp::new();
    let catalog = catalog(&app).await;
    let first = app.create("/api/budgets", budget_body(&catalog)).await;
    let second = app.create("/api/budgets", budget_body(&catalog)).await;
    app.create("/api/budgets", budget_body(&catalog)).await;

    for id in [&first, &second] {
        app.patch(&format!("/api/budgets/{}/status", id), json!({ "status": "approved" }))
            .await;
    }

    let (status, body) = app.get("/api/budgets/stats").await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["total"], 3);
    assert_amount(&data["approvedRevenue"], 341.0);

    let approved = data["byStatus"]
        .as_array()
        .unwrap()
        .iter()
        .find(|group| group["status"] == "approved")
        .unwrap();
    assert_eq!(approved["count"], 2);
}

#[tokio::test]
async fn test_deleted_client_leaves_budget_without_summary() {
    let app = TestApp::new();
    let catalog = catalog(&app).await;
    let budget = app.create("/api/budgets", budget_body(&catalog)).await;

    app.delete(&format!("/api/clients/{}", catalog.client)).await;

    let (status, body) = app.get(&format!("/api/budgets/{}", budget)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["client"].is_null());

    let (status, _) = app.delete(&format!("/api/budgets/{}", budget)).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = app.get(&format!("/api/budgets/{}", budget)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "BUDGET_NOT_FOUND");
}

#[tokio::test]
async fn test_numbering_recovers_after_deleting_oldest_budgets() {
    let app = TestApp::new();
    let catalog = catalog(&app).await;
    let year = Utc::now().year();

    let mut ids = Vec::new();
    for _ in 0..10 {
        ids.push(app.create("/api/budgets", budget_body(&catalog)).await);
    }
    for id in &ids[..5] {
        let (status, _) = app.delete(&format!("/api/budgets/{}", id)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = app.post("/api/budgets", budget_body(&catalog)).await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(
        body["data"]["budgetNumber"],
        format!("BUD-{}-011", year).as_str()
    );

    let (status, body) = app
        .post(&format!("/api/budgets/{}/duplicate", ids[9]), json!({}))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(
        body["data"]["budgetNumber"],
        format!("BUD-{}-012", year).as_str()
    );
}

#[tokio::test]
async fn test_malformed_status_body_uses_error_envelope() {
    let app = TestApp::new();
    let catalog = catalog(&app).await;
    let budget = app.create("/api/budgets", budget_body(&catalog)).await;

    let (status, body) = app
        .patch(&format!("/api/budgets/{}/status", budget), json!({ "estado": "sent" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "BAD_REQUEST");
}
