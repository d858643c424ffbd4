use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::controllers::budget_controller::BudgetController;
use crate::dto::budget_dto::BudgetResponse;
use crate::dto::ApiResponse;
use crate::models::budget::{
    BudgetStats, CreateBudgetRequest, UpdateBudgetRequest, UpdateBudgetStatusRequest,
};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::validation::{PathParam, QueryParams, ValidatedJson};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListBudgetsQuery {
    pub status: Option<String>,
    pub client_id: Option<Uuid>,
}

pub fn create_budget_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_budgets).post(create_budget))
        .route("/stats", get(budget_stats))
        .route(
            "/:id",
            get(get_budget).put(update_budget).delete(delete_budget),
        )
        .route("/:id/status", patch(update_budget_status))
        .route("/:id/duplicate", post(duplicate_budget))
}

async fn create_budget(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<CreateBudgetRequest>,
) -> Result<(StatusCode, Json<ApiResponse<BudgetResponse>>), AppError> {
    let response = BudgetController::new(&state).create(request).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

async fn list_budgets(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<ListBudgetsQuery>,
) -> Result<Json<ApiResponse<Vec<BudgetResponse>>>, AppError> {
    Ok(Json(
        BudgetController::new(&state)
            .list(query.status, query.client_id)
            .await?,
    ))
}

async fn budget_stats(
    State(state): State<AppState>,
) -> Result<Json<ApiResponse<BudgetStats>>, AppError> {
    Ok(Json(BudgetController::new(&state).stats().await?))
}

async fn get_budget(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<ApiResponse<BudgetResponse>>, AppError> {
    Ok(Json(BudgetController::new(&state).get(id).await?))
}

async fn update_budget(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateBudgetRequest>,
) -> Result<Json<ApiResponse<BudgetResponse>>, AppError> {
    Ok(Json(BudgetController::new(&state).update(id, request).await?))
}

async fn update_budget_status(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
    ValidatedJson(request): ValidatedJson<UpdateBudgetStatusRequest>,
) -> Result<Json<ApiResponse<BudgetResponse>>, AppError> {
    Ok(Json(
        BudgetController::new(&state)
            .update_status(id, &request.status)
            .await?,
    ))
}

async fn delete_budget(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    Ok(Json(BudgetController::new(&state).delete(id).await?))
}

async fn duplicate_budget(
    State(state): State<AppState>,
    PathParam(id): PathParam<Uuid>,
) -> Result<(StatusCode, Json<ApiResponse<BudgetResponse>>), AppError> {
    let response = BudgetController::new(&state).duplicate(id).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
