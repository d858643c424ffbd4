use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::controllers::category_controller::CategoryController;
use crate::dto::ApiResponse;
use crate::models::category::{
    Category, CreateCategoryRequest, ReorderCategoriesRequest, UpdateCategoryRequest,
};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::{PathParam, QueryParams, ValidatedJson};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListCategoriesQuery {
    pub include_inactive: Option<bool>,
}

pub fn create_category_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_categories).post(create_category))
        .route("/reorder", post(reorder_categories))
        .route(
            "/:id",
            get(get_category).put(update_category).delete(delete_category),
        )
}

async fn create_category(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateCategoryRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Category>>), AppError> {
    let response = CategoryController::new(&state).create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_categories(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListCategoriesQuery>,
) -> Result<Json<ApiResponse<Vec<Category>>>, AppError> {
    let include_inactive = query.include_inactive.unwrap_or(false);
    Ok(Json(CategoryController::new(&state).list(include_inactive).await?))
}

async fn get_category(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<ApiResponse<Category>>, AppError> {
    Ok(Json(CategoryController::new(&state).get(id).await?))
}

async fn update_category(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateCategoryRequest>,
) -> Result<Json<ApiResponse<Category>>, AppError> {
    Ok(Json(CategoryController::new(&state).update(id, request).await?))
}

async fn delete_category(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    Ok(Json(CategoryController::new(&state).delete(id).await?))
}

async fn reorder_categories(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<ReorderCategoriesRequest>,
) -> Result<Json<ApiResponse<Vec<Category>>>, AppError> {
    Ok(Json(CategoryController::new(&state).reorder(request.orders).await?))
}
