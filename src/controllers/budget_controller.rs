use uuid::Uuid;

use crate::dto::budget_dto::BudgetResponse;
use crate::dto::ApiResponse;
use crate::models::budget::{
    BudgetFilters, BudgetStats, BudgetStatus, CreateBudgetRequest, UpdateBudgetRequest,
};
use crate::services::BudgetService;
use crate::state::AppState;
use crate::utils::errors::{AppError, AppResult};

/// Parsea el estado recibido por body o query
pub fn parse_budget_status(value: &str) -> AppResult<BudgetStatus> {
    value.parse::<BudgetStatus>().map_err(AppError::BadRequest)
}

pub struct BudgetController {
    service: BudgetService,
}

impl BudgetController {
    pub fn new(state: &AppState) -> Self {
        Self {
            service: BudgetService::new(&state.repos),
        }
    }

    pub async fn create(
        &self,
        request: CreateBudgetRequest,
    ) -> AppResult<ApiResponse<BudgetResponse>> {
        let budget = self.service.create(request).await?;
        Ok(ApiResponse::success_with_message(budget, "Presupuesto creado exitosamente"))
    }

    pub async fn list(
        &self,
        status: Option<String>,
        client_id: Option<Uuid>,
    ) -> AppResult<ApiResponse<Vec<BudgetResponse>>> {
        let filters = BudgetFilters {
            status: status.as_deref().map(parse_budget_status).transpose()?,
            client_id,
        };
        Ok(ApiResponse::success(self.service.list(&filters).await?))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<ApiResponse<BudgetResponse>> {
        Ok(ApiResponse::success(self.service.get(id).await?))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateBudgetRequest,
    ) -> AppResult<ApiResponse<BudgetResponse>> {
        let budget = self.service.update(id, request).await?;
        Ok(ApiResponse::success_with_message(budget, "Presupuesto actualizado exitosamente"))
    }

    pub async fn update_status(
        &self,
        id: Uuid,
        status: &str,
    ) -> AppResult<ApiResponse<BudgetResponse>> {
        let status = parse_budget_status(status)?;
        let budget = self.service.update_status(id, status).await?;
        Ok(ApiResponse::success_with_message(budget, "Estado actualizado exitosamente"))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<ApiResponse<()>> {
        self.service.delete(id).await?;
        Ok(ApiResponse::message("Presupuesto eliminado exitosamente"))
    }

    pub async fn duplicate(&self, id: Uuid) -> AppResult<ApiResponse<BudgetResponse>> {
        let copy = self.service.duplicate(id).await?;
        Ok(ApiResponse::success_with_message(copy, "Presupuesto duplicado exitosamente"))
    }

    pub async fn stats(&self) -> AppResult<ApiResponse<BudgetStats>> {
        Ok(ApiResponse::success(self.service.stats().await?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_budget_status_rejects_unknown_values() {
        assert_eq!(parse_budget_status("approved").unwrap(), BudgetStatus::Approved);
        assert_eq!(parse_budget_status("archived").unwrap_err().code(), "BAD_REQUEST");
    }
}
