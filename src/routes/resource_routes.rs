use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::controllers::resource_controller::{parse_resource_type, ResourceController};
use crate::dto::resource_dto::{BulkPriceUpdateResult, OutdatedResource};
use crate::dto::ApiResponse;
use crate::models::resource::{
    BulkPriceUpdateRequest, CreateResourceRequest, Resource, ResourceFilters, UpdateResourceRequest,
};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::{PathParam, QueryParams, ValidatedJson};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResourcesQuery {
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    pub category_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct SearchResourcesQuery {
    pub q: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OutdatedQuery {
    pub days: Option<i64>,
}

pub fn create_resource_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_resources).post(create_resource))
        .route("/search", get(search_resources))
        .route("/outdated", get(outdated_resources))
        .route("/bulk-update-prices", post(bulk_update_prices))
        .route("/category/:category_id", get(list_by_category))
        .route("/type/:resource_type", get(list_by_type))
        .route(
            "/:id",
            get(get_resource).put(update_resource).delete(delete_resource),
        )
}

async fn create_resource(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateResourceRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Resource>>), AppError> {
    let response = ResourceController::new(&state).create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_resources(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListResourcesQuery>,
) -> Result<Json<ApiResponse<Vec<Resource>>>, AppError> {
    let filters = ResourceFilters {
        resource_type: query
            .resource_type
            .as_deref()
            .map(parse_resource_type)
            .transpose()?,
        category_id: query.category_id,
    };
    Ok(Json(ResourceController::new(&state).list(filters).await?))
}

async fn search_resources(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchResourcesQuery>,
) -> Result<Json<ApiResponse<Vec<Resource>>>, AppError> {
    Ok(Json(
        ResourceController::new(&state)
            .search(query.q, query.resource_type)
            .await?,
    ))
}

async fn outdated_resources(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<OutdatedQuery>,
) -> Result<Json<ApiResponse<Vec<OutdatedResource>>>, AppError> {
    Ok(Json(ResourceController::new(&state).outdated(query.days).await?))
}

async fn bulk_update_prices(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<BulkPriceUpdateRequest>,
) -> Result<Json<ApiResponse<BulkPriceUpdateResult>>, AppError> {
    Ok(Json(
        ResourceController::new(&state)
            .bulk_update_prices(request.updates)
            .await?,
    ))
}

async fn list_by_category(
    State(state): State<AppState>,
    PathParam(category_id): PathParam<Uuid>,
) -> Result<Json<ApiResponse<Vec<Resource>>>, AppError> {
    Ok(Json(
        ResourceController::new(&state)
            .list_by_category(category_id)
            .await?,
    ))
}

async fn list_by_type(
    State(state): State<AppState>,
    PathParam(resource_type): PathParam<String>,
) -> Result<Json<ApiResponse<Vec<Resource>>>, AppError> {
    Ok(Json(
        ResourceController::new(&state)
            .list_by_type(&resource_type)
            .await?,
    ))
}

async fn get_resource(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<ApiResponse<Resource>>, AppError> {
    Ok(Json(ResourceController::new(&state).get(id).await?))
}

async fn update_resource(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateResourceRequest>,
) -> Result<Json<ApiResponse<Resource>>, AppError> {
    Ok(Json(ResourceController::new(&state).update(id, request).await?))
}

async fn delete_resource(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    Ok(Json(ResourceController::new(&state).delete(id).await?))
}
