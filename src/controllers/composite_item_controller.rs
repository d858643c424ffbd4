use uuid::Uuid;

use crate::dto::pricing_dto::{PartialList, PriceSummary, PricedCompositeItem};
use crate::dto::ApiResponse;
use crate::models::composite_item::{
    CompositeItemFilters, CreateCompositeItemRequest, UpdateCompositeItemRequest,
};
use crate::services::CompositeItemService;
use crate::state::AppState;
use crate::utils::errors::{bad_request_error, AppResult};

pub struct CompositeItemController {
    service: CompositeItemService,
}

impl CompositeItemController {
    pub fn new(state: &AppState) -> Self {
        Self {
            service: CompositeItemService::new(&state.repos),
        }
    }

    pub async fn create(
        &self,
        request: CreateCompositeItemRequest,
    ) -> AppResult<ApiResponse<PricedCompositeItem>> {
        let item = self.service.create(request).await?;
        Ok(ApiResponse::success_with_message(item, "Ítem compuesto creado exitosamente"))
    }

    pub async fn list(
        &self,
        filters: CompositeItemFilters,
    ) -> AppResult<ApiResponse<PartialList<PricedCompositeItem>>> {
        Ok(ApiResponse::success(self.service.list(&filters).await?))
    }

    pub async fn search(
        &self,
        query: Option<String>,
    ) -> AppResult<ApiResponse<PartialList<PricedCompositeItem>>> {
        let query = query
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| bad_request_error("El parámetro de búsqueda 'q' es requerido"))?;

        Ok(ApiResponse::success(self.service.search(&query).await?))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<ApiResponse<PricedCompositeItem>> {
        Ok(ApiResponse::success(self.service.get(id).await?))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateCompositeItemRequest,
    ) -> AppResult<ApiResponse<PricedCompositeItem>> {
        let item = self.service.update(id, request).await?;
        Ok(ApiResponse::success_with_message(item, "Ítem compuesto actualizado exitosamente"))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<ApiResponse<()>> {
        self.service.delete(id).await?;
        Ok(ApiResponse::message("Ítem compuesto eliminado exitosamente"))
    }

    pub async fn duplicate(&self, id: Uuid) -> AppResult<ApiResponse<PricedCompositeItem>> {
        let copy = self.service.duplicate(id).await?;
        Ok(ApiResponse::success_with_message(copy, "Ítem compuesto duplicado exitosamente"))
    }

    pub async fn price_summary(&self, id: Uuid) -> AppResult<ApiResponse<PriceSummary>> {
        Ok(ApiResponse::success(self.service.price_summary(id).await?))
    }
}
