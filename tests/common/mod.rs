#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    Router,
};
use http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use contractor_quotes::build_router;
use contractor_quotes::config::EnvironmentConfig;
use contractor_quotes::state::AppState;
use contractor_quotes::utils::jwt::{generate_token, JwtConfig};

/// Router sobre el almacén en memoria con un token válido ya emitido
pub struct TestApp {
    pub router: Router,
    pub token: String,
}

impl TestApp {
    pub fn new() -> Self {
        let config = EnvironmentConfig::default();
        let token = generate_token(Uuid::new_v4(), "tester@obra.com", &JwtConfig::from(&config))
            .expect("token");
        Self {
            router: build_router(AppState::in_memory(config)),
            token,
        }
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = self.router.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, None, Some(&self.token)).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(body), Some(&self.token)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(body), Some(&self.token)).await
    }

    pub async fn patch(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PATCH, uri, Some(body), Some(&self.token)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, None, Some(&self.token)).await
    }

    /// Crea y devuelve el id, fallando el test si el status no es 201
    pub async fn create(&self, uri: &str, body: Value) -> String {
        let (status, body) = self.post(uri, body).await;
        assert_eq!(status, StatusCode::CREATED, "POST {} -> {}", uri, body);
        body["data"]["id"].as_str().expect("id").to_string()
    }

    pub async fn category(&self, name: &str, margin: f64) -> String {
        self.create("/api/categories", json!({ "name": name, "defaultMargin": margin }))
            .await
    }

    pub async fn resource(&self, name: &str, resource_type: &str, price: f64) -> String {
        self.create(
            "/api/resources",
            json!({ "name": name, "type": resource_type, "unit": "u", "price": price }),
        )
        .await
    }

    pub async fn client(&self, name: &str) -> String {
        self.create("/api/clients", json!({ "name": name })).await
    }
}

/// Compara importes JSON sin depender de la representación decimal
pub fn amount(value: &Value) -> f64 {
    value.as_f64().expect("numeric amount")
}

pub fn assert_amount(value: &Value, expected: f64) {
    let actual = amount(value);
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {}, got {}",
        expected,
        actual
    );
}
