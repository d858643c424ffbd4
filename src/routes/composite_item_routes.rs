use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::controllers::composite_item_controller::CompositeItemController;
use crate::dto::pricing_dto::{PartialList, PriceSummary, PricedCompositeItem};
use crate::dto::ApiResponse;
use crate::models::composite_item::{
    CompositeItemFilters, CreateCompositeItemRequest, UpdateCompositeItemRequest,
};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::{PathParam, QueryParams, ValidatedJson};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCompositeItemsQuery {
    pub category_id: Option<Uuid>,
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

pub fn create_composite_item_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/search", get(search_items))
        .route("/:id", get(get_item).put(update_item).delete(delete_item))
        .route("/:id/price-history", get(price_summary))
        .route("/:id/duplicate", post(duplicate_item))
}

async fn create_item(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateCompositeItemRequest>,
) -> Result<(StatusCode, Json<ApiResponse<PricedCompositeItem>>), AppError> {
    let response = CompositeItemController::new(&state).create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_items(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListCompositeItemsQuery>,
) -> Result<Json<ApiResponse<PartialList<PricedCompositeItem>>>, AppError> {
    let filters = CompositeItemFilters {
        category_id: query.category_id,
        active: query.active,
    };
    Ok(Json(CompositeItemController::new(&state).list(filters).await?))
}

async fn search_items(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> Result<Json<ApiResponse<PartialList<PricedCompositeItem>>>, AppError> {
    Ok(Json(CompositeItemController::new(&state).search(query.q).await?))
}

async fn get_item(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<ApiResponse<PricedCompositeItem>>, AppError> {
    Ok(Json(CompositeItemController::new(&state).get(id).await?))
}

async fn update_item(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateCompositeItemRequest>,
) -> Result<Json<ApiResponse<PricedCompositeItem>>, AppError> {
    Ok(Json(CompositeItemController::new(&state).update(id, request).await?))
}

async fn delete_item(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    Ok(Json(CompositeItemController::new(&state).delete(id).await?))
}

async fn duplicate_item(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<(StatusCode, Json<ApiResponse<PricedCompositeItem>>), AppError> {
    let response = CompositeItemController::new(&state).duplicate(id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn price_summary(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<ApiResponse<PriceSummary>>, AppError> {
    Ok(Json(CompositeItemController::new(&state).price_summary(id).await?))
}
