use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::resource_dto::{BulkPriceUpdateResult, OutdatedResource};
use crate::dto::ApiResponse;
use crate::models::resource::{
    CreateResourceRequest, PriceUpdate, Resource, ResourceFilters, ResourceType,
    UpdateResourceRequest,
};
use crate::repositories::Repositories;
use crate::state::AppState;
use crate::utils::errors::{bad_request_error, not_found_error, AppError, AppResult, Entity};

/// Antigüedad por defecto para considerar un precio desactualizado
pub const DEFAULT_OUTDATED_DAYS: i64 = 30;

/// Parsea el tipo de recurso recibido por query o path
pub fn parse_resource_type(value: &str) -> AppResult<ResourceType> {
    value.parse::<ResourceType>().map_err(AppError::BadRequest)
}

pub struct ResourceController {
    repos: Repositories,
}

impl ResourceController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repos: state.repos.clone(),
        }
    }

    async fn find(&self, id: Uuid) -> AppResult<Resource> {
        self.repos
            .resources
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error(Entity::Resource, id))
    }

    async fn ensure_category(&self, category_id: Option<Uuid>) -> AppResult<()> {
        if let Some(category_id) = category_id {
            if self.repos.categories.find_by_id(category_id).await?.is_none() {
                return Err(not_found_error(Entity::Category, category_id));
            }
        }
        Ok(())
    }

    pub async fn create(&self, request: CreateResourceRequest) -> AppResult<ApiResponse<Resource>> {
        self.ensure_category(request.category_id).await?;

        let resource = Resource::new(request);
        self.repos.resources.insert(&resource).await?;
        info!("✅ Recurso creado: {} ({})", resource.name, resource.id);

        Ok(ApiResponse::success_with_message(resource, "Recurso creado exitosamente"))
    }

    pub async fn list(&self, filters: ResourceFilters) -> AppResult<ApiResponse<Vec<Resource>>> {
        Ok(ApiResponse::success(self.repos.resources.list(&filters).await?))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<ApiResponse<Resource>> {
        Ok(ApiResponse::success(self.find(id).await?))
    }

    pub async fn list_by_category(
        &self,
        category_id: Uuid,
    ) -> AppResult<ApiResponse<Vec<Resource>>> {
        self.list(ResourceFilters {
            category_id: Some(category_id),
            ..Default::default()
        })
        .await
    }

    pub async fn list_by_type(&self, resource_type: &str) -> AppResult<ApiResponse<Vec<Resource>>> {
        let resource_type = parse_resource_type(resource_type)?;
        self.list(ResourceFilters {
            resource_type: Some(resource_type),
            ..Default::default()
        })
        .await
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateResourceRequest,
    ) -> AppResult<ApiResponse<Resource>> {
        let mut resource = self.find(id).await?;
        self.ensure_category(request.category_id).await?;

        resource.apply(request);
        self.repos.resources.update(&resource).await?;

        Ok(ApiResponse::success_with_message(resource, "Recurso actualizado exitosamente"))
    }

    /// Bloqueada mientras algún ítem compuesto lo use en su composición
    pub async fn delete(&self, id: Uuid) -> AppResult<ApiResponse<()>> {
        self.find(id).await?;

        if self.repos.composite_items.references_resource(id).await? {
            return Err(AppError::Conflict(
                "El recurso está en uso por ítems compuestos".to_string(),
            ));
        }

        self.repos.resources.delete(id).await?;
        info!("🗑️ Recurso eliminado: {}", id);

        Ok(ApiResponse::message("Recurso eliminado exitosamente"))
    }

    pub async fn search(
        &self,
        query: Option<String>,
        resource_type: Option<String>,
    ) -> AppResult<ApiResponse<Vec<Resource>>> {
        let query = query
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| bad_request_error("El parámetro de búsqueda 'q' es requerido"))?;
        let resource_type = resource_type.as_deref().map(parse_resource_type).transpose()?;

        Ok(ApiResponse::success(
            self.repos.resources.search(&query, resource_type).await?,
        ))
    }

    pub async fn outdated(
        &self,
        days: Option<i64>,
    ) -> AppResult<ApiResponse<Vec<OutdatedResource>>> {
        let days = days.unwrap_or(DEFAULT_OUTDATED_DAYS);
        if days < 0 {
            return Err(bad_request_error("'days' no puede ser negativo"));
        }

        let now = Utc::now();
        let resources = self
            .repos
            .resources
            .updated_before(now - Duration::days(days))
            .await?;

        Ok(ApiResponse::success(
            resources
                .into_iter()
                .map(|resource| OutdatedResource::new(resource, now))
                .collect(),
        ))
    }

    /// Una escritura por entrada; las que fallan se reportan en `failed`
    pub async fn bulk_update_prices(
        &self,
        updates: Vec<PriceUpdate>,
    ) -> AppResult<ApiResponse<BulkPriceUpdateResult>> {
        let mut result = BulkPriceUpdateResult::default();

        for update in updates {
            if update.price < Decimal::ZERO {
                result.failed.push(update.id);
                continue;
            }
            match self
                .repos
                .resources
                .update_price(update.id, update.price, Utc::now())
                .await
            {
                Ok(true) => result.updated += 1,
                Ok(false) => result.failed.push(update.id),
                Err(e) => {
                    warn!("No se pudo actualizar el precio de {}: {}", update.id, e);
                    result.failed.push(update.id);
                }
            }
        }

        info!(
            "💲 Actualización masiva: {} actualizados, {} fallidos",
            result.updated,
            result.failed.len()
        );
        let message = format!("{} precios actualizados", result.updated);
        Ok(ApiResponse::success_with_message(result, message))
    }
}
