use uuid::Uuid;

use crate::dto::ApiResponse;
use crate::models::category::{
    Category, CategoryOrder, CreateCategoryRequest, UpdateCategoryRequest,
};
use crate::repositories::Repositories;
use crate::state::AppState;
use crate::utils::errors::{conflict_error, not_found_error, AppError, AppResult, Entity};
use tracing::{info, warn};

pub struct CategoryController {
    repos: Repositories,
}

impl CategoryController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repos: state.repos.clone(),
        }
    }

    async fn find(&self, id: Uuid) -> AppResult<Category> {
        self.repos
            .categories
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error(Entity::Category, id))
    }

    pub async fn create(&self, request: CreateCategoryRequest) -> AppResult<ApiResponse<Category>> {
        if self.repos.categories.find_by_name(&request.name).await?.is_some() {
            return Err(conflict_error("Categoría", "nombre", request.name.trim()));
        }

        // Sin orden explícito va al final
        let order = match request.order {
            Some(order) => order,
            None => self.repos.categories.max_order().await?.unwrap_or(0) + 1,
        };

        let category = Category::new(request, order);
        self.repos.categories.insert(&category).await?;
        info!("✅ Categoría creada: {} (orden {})", category.name, category.order);

        Ok(ApiResponse::success_with_message(category, "Categoría creada exitosamente"))
    }

    pub async fn list(&self, include_inactive: bool) -> AppResult<ApiResponse<Vec<Category>>> {
        Ok(ApiResponse::success(
            self.repos.categories.list(include_inactive).await?,
        ))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<ApiResponse<Category>> {
        Ok(ApiResponse::success(self.find(id).await?))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateCategoryRequest,
    ) -> AppResult<ApiResponse<Category>> {
        let mut category = self.find(id).await?;

        if let Some(name) = &request.name {
            if let Some(existing) = self.repos.categories.find_by_name(name).await? {
                if existing.id != id {
                    return Err(conflict_error("Categoría", "nombre", name.trim()));
                }
            }
        }

        category.apply(request);
        self.repos.categories.update(&category).await?;

        Ok(ApiResponse::success_with_message(category, "Categoría actualizada exitosamente"))
    }

    /// Bloqueada mientras algún ítem compuesto o recurso la referencie
    pub async fn delete(&self, id: Uuid) -> AppResult<ApiResponse<()>> {
        self.find(id).await?;

        if self.repos.composite_items.references_category(id).await? {
            return Err(AppError::Conflict(
                "La categoría está en uso por ítems compuestos".to_string(),
            ));
        }
        if self.repos.resources.count_by_category(id).await? > 0 {
            return Err(AppError::Conflict(
                "La categoría está en uso por recursos".to_string(),
            ));
        }

        self.repos.categories.delete(id).await?;
        info!("🗑️ Categoría eliminada: {}", id);

        Ok(ApiResponse::message("Categoría eliminada exitosamente"))
    }

    /// Una escritura por entrada, sin transacción; ids inexistentes se ignoran
    pub async fn reorder(
        &self,
        orders: Vec<CategoryOrder>,
    ) -> AppResult<ApiResponse<Vec<Category>>> {
        for entry in &orders {
            if !self.repos.categories.set_order(entry.id, entry.order).await? {
                warn!("Reordenamiento: categoría {} no existe", entry.id);
            }
        }

        let categories = self.repos.categories.list(true).await?;
        Ok(ApiResponse::success_with_message(categories, "Categorías reordenadas exitosamente"))
    }
}
