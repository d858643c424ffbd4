//! Servicio de ítems compuestos
//!
//! Resuelve categoría y recursos contra los repositorios y delega el
//! cálculo en `pricing::compute_price`. El precio nunca se persiste.

use std::collections::HashMap;

use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::pricing_dto::{PartialList, PriceSummary, PricedCompositeItem};
use crate::models::composite_item::{
    CompositeItem, CompositeItemFilters, CompositionEntry, CreateCompositeItemRequest,
    UpdateCompositeItemRequest,
};
use crate::repositories::Repositories;
use crate::services::pricing::compute_price;
use crate::utils::errors::{not_found_error, AppResult, Entity};

pub struct CompositeItemService {
    repos: Repositories,
}

impl CompositeItemService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            repos: repos.clone(),
        }
    }

    /// Valoriza un ítem con los precios vigentes de sus recursos
    pub async fn price_of(&self, item: &CompositeItem) -> AppResult<PricedCompositeItem> {
        let category = self
            .repos
            .categories
            .find_by_id(item.category_id)
            .await?
            .ok_or_else(|| not_found_error(Entity::Category, item.category_id))?;

        let mut resources = HashMap::with_capacity(item.composition.len());
        for entry in &item.composition {
            if resources.contains_key(&entry.resource_id) {
                continue;
            }
            let resource = self
                .repos
                .resources
                .find_by_id(entry.resource_id)
                .await?
                .ok_or_else(|| not_found_error(Entity::Resource, entry.resource_id))?;
            resources.insert(resource.id, resource);
        }

        compute_price(item, &category, &resources)
    }

    /// Verifica que la categoría y todos los recursos existan
    async fn ensure_references(
        &self,
        category_id: Uuid,
        composition: &[CompositionEntry],
    ) -> AppResult<()> {
        if self.repos.categories.find_by_id(category_id).await?.is_none() {
            return Err(not_found_error(Entity::Category, category_id));
        }
        for entry in composition {
            if self.repos.resources.find_by_id(entry.resource_id).await?.is_none() {
                return Err(not_found_error(Entity::Resource, entry.resource_id));
            }
        }
        Ok(())
    }

    async fn find(&self, id: Uuid) -> AppResult<CompositeItem> {
        self.repos
            .composite_items
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error(Entity::CompositeItem, id))
    }

    /// Valoriza un lote omitiendo los ítems cuyo cálculo falla
    async fn price_all(&self, items: Vec<CompositeItem>) -> PartialList<PricedCompositeItem> {
        let mut result = PartialList::default();
        for item in items {
            match self.price_of(&item).await {
                Ok(priced) => result.items.push(priced),
                Err(e) => {
                    warn!("Ítem compuesto {} omitido del listado: {}", item.id, e);
                    result.skipped.push(item.id);
                }
            }
        }
        result
    }

    pub async fn create(
        &self,
        request: CreateCompositeItemRequest,
    ) -> AppResult<PricedCompositeItem> {
        self.ensure_references(request.category_id, &request.composition)
            .await?;

        let item = CompositeItem::new(request);
        self.repos.composite_items.insert(&item).await?;
        info!("✅ Ítem compuesto creado: {} ({})", item.name, item.id);

        self.price_of(&item).await
    }

    pub async fn list(
        &self,
        filters: &CompositeItemFilters,
    ) -> AppResult<PartialList<PricedCompositeItem>> {
        let items = self.repos.composite_items.list(filters).await?;
        Ok(self.price_all(items).await)
    }

    pub async fn search(&self, query: &str) -> AppResult<PartialList<PricedCompositeItem>> {
        let items = self.repos.composite_items.search(query).await?;
        Ok(self.price_all(items).await)
    }

    /// A diferencia de los listados, cualquier falla de cálculo se propaga
    pub async fn get(&self, id: Uuid) -> AppResult<PricedCompositeItem> {
        let item = self.find(id).await?;
        self.price_of(&item).await
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateCompositeItemRequest,
    ) -> AppResult<PricedCompositeItem> {
        let mut item = self.find(id).await?;

        if let Some(category_id) = request.category_id {
            if self.repos.categories.find_by_id(category_id).await?.is_none() {
                return Err(not_found_error(Entity::Category, category_id));
            }
        }
        if let Some(composition) = &request.composition {
            for entry in composition {
                if self.repos.resources.find_by_id(entry.resource_id).await?.is_none() {
                    return Err(not_found_error(Entity::Resource, entry.resource_id));
                }
            }
        }

        item.apply(request);
        self.repos.composite_items.update(&item).await?;
        info!("✏️ Ítem compuesto actualizado: {}", item.id);

        self.price_of(&item).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.repos.composite_items.delete(id).await? {
            return Err(not_found_error(Entity::CompositeItem, id));
        }
        info!("🗑️ Ítem compuesto eliminado: {}", id);
        Ok(())
    }

    pub async fn duplicate(&self, id: Uuid) -> AppResult<PricedCompositeItem> {
        let original = self.find(id).await?;
        self.ensure_references(original.category_id, &original.composition)
            .await?;

        let copy = original.duplicate();
        self.repos.composite_items.insert(&copy).await?;
        info!("📄 Ítem compuesto {} duplicado como {}", id, copy.id);

        self.price_of(&copy).await
    }

    pub async fn price_summary(&self, id: Uuid) -> AppResult<PriceSummary> {
        let priced = self.get(id).await?;
        Ok(PriceSummary::from(&priced))
    }
}
