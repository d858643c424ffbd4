use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::controllers::client_controller::ClientController;
use crate::dto::ApiResponse;
use crate::models::client::{Client, CreateClientRequest, UpdateClientRequest};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::{PathParam, QueryParams, ValidatedJson};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

pub fn create_client_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_clients).post(create_client))
        .route("/search", get(search_clients))
        .route("/:id", get(get_client).put(update_client).delete(delete_client))
}

async fn create_client(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateClientRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Client>>), AppError> {
    let response = ClientController::new(&state).create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_clients(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<Vec<Client>>>, AppError> {
    Ok(Json(ClientController::new(&state).list().await?))
}

async fn search_clients(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> Result<Json<ApiResponse<Vec<Client>>>, AppError> {
    Ok(Json(ClientController::new(&state).search(query.q).await?))
}

async fn get_client(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<ApiResponse<Client>>, AppError> {
    Ok(Json(ClientController::new(&state).get(id).await?))
}

async fn update_client(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateClientRequest>,
) -> Result<Json<ApiResponse<Client>>, AppError> {
    Ok(Json(ClientController::new(&state).update(id, request).await?))
}

async fn delete_client(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    Ok(Json(ClientController::new(&state).delete(id).await?))
}
