//! Backend de cotizaciones para obras: catálogo de recursos, ítems
//! compuestos valorizados por margen y presupuestos de precio congelado.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::{middleware as axum_middleware, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;

use crate::middleware::{cors_middleware, require_auth};
use crate::routes::{
    auth_routes, budget_routes, category_routes, client_routes, composite_item_routes,
    resource_routes,
};
use crate::state::AppState;

/// Router completo de la API.
///
/// Todas las colecciones de negocio pasan por `require_auth`; sólo
/// `/health`, `/api/auth/register` y `/api/auth/login` son públicas.
pub fn build_router(state: AppState) -> Router {
    let auth_layer = || axum_middleware::from_fn_with_state(state.clone(), require_auth);

    let api = Router::new()
        .nest("/auth", auth_routes::create_auth_router(state.clone()))
        .nest(
            "/clients",
            client_routes::create_client_router().route_layer(auth_layer()),
        )
        .nest(
            "/categories",
            category_routes::create_category_router().route_layer(auth_layer()),
        )
        .nest(
            "/resources",
            resource_routes::create_resource_router().route_layer(auth_layer()),
        )
        .nest(
            "/composite-items",
            composite_item_routes::create_composite_item_router().route_layer(auth_layer()),
        )
        .nest(
            "/budgets",
            budget_routes::create_budget_router().route_layer(auth_layer()),
        );

    let cors = cors_middleware(&state.config.cors_origins);

    Router::new()
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
