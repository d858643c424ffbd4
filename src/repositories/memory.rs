//! Almacén en memoria
//!
//! Implementa todos los traits de repositorio sobre mapas protegidos por
//! `RwLock`, con las mismas reglas de unicidad y orden que Postgres.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::budget::{Budget, BudgetFilters, BudgetStatus, StatusStats};
use crate::models::category::Category;
use crate::models::client::Client;
use crate::models::composite_item::{CompositeItem, CompositeItemFilters};
use crate::models::resource::{Resource, ResourceFilters, ResourceType};
use crate::models::user::User;
use crate::repositories::{
    contains_ignore_case, BudgetRepository, CategoryRepository, ClientRepository,
    CompositeItemRepository, ResourceRepository, UserRepository,
};
use crate::utils::errors::{AppError, AppResult};

#[derive(Default)]
pub struct InMemoryStore {
    clients: RwLock<HashMap<Uuid, Client>>,
    categories: RwLock<HashMap<Uuid, Category>>,
    resources: RwLock<HashMap<Uuid, Resource>>,
    composite_items: RwLock<HashMap<Uuid, CompositeItem>>,
    budgets: RwLock<HashMap<Uuid, Budget>>,
    users: RwLock<HashMap<Uuid, User>>,
}

#[async_trait]
impl ClientRepository for InMemoryStore {
    async fn insert(&self, client: &Client) -> AppResult<()> {
        self.clients.write().await.insert(client.id, client.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Client>> {
        Ok(self.clients.read().await.get(&id).cloned())
    }

    async fn list(&self) -> AppResult<Vec<Client>> {
        let mut clients: Vec<Client> = self.clients.read().await.values().cloned().collect();
        clients.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(clients)
    }

    async fn search(&self, query: &str) -> AppResult<Vec<Client>> {
        let mut clients: Vec<Client> = self
            .clients
            .read()
            .await
            .values()
            .filter(|c| {
                contains_ignore_case(Some(&c.name), query)
                    || contains_ignore_case(c.email.as_deref(), query)
                    || contains_ignore_case(c.ruc.as_deref(), query)
            })
            .cloned()
            .collect();
        clients.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clients)
    }

    async fn update(&self, client: &Client) -> AppResult<()> {
        if let Some(existing) = self.clients.write().await.get_mut(&client.id) {
            *existing = client.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.clients.write().await.remove(&id).is_some())
    }
}

fn duplicate_category_name(name: &str) -> AppError {
    AppError::Conflict(format!("Ya existe una categoría con el nombre '{}'", name))
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn insert(&self, category: &Category) -> AppResult<()> {
        let mut categories = self.categories.write().await;
        if categories.values().any(|c| c.name == category.name) {
            return Err(duplicate_category_name(&category.name));
        }
        categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Category>> {
        let name = name.trim();
        Ok(self
            .categories
            .read()
            .await
            .values()
            .find(|c| c.name == name)
            .cloned())
    }

    async fn list(&self, include_inactive: bool) -> AppResult<Vec<Category>> {
        let mut categories: Vec<Category> = self
            .categories
            .read()
            .await
            .values()
            .filter(|c| include_inactive || c.active)
            .cloned()
            .collect();
        categories.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
        Ok(categories)
    }

    async fn max_order(&self) -> AppResult<Option<i32>> {
        Ok(self.categories.read().await.values().map(|c| c.order).max())
    }

    async fn update(&self, category: &Category) -> AppResult<()> {
        let mut categories = self.categories.write().await;
        if categories
            .values()
            .any(|c| c.id != category.id && c.name == category.name)
        {
            return Err(duplicate_category_name(&category.name));
        }
        if let Some(existing) = categories.get_mut(&category.id) {
            *existing = category.clone();
        }
        Ok(())
    }

    async fn set_order(&self, id: Uuid, order: i32) -> AppResult<bool> {
        match self.categories.write().await.get_mut(&id) {
            Some(category) => {
                category.order = order;
                category.updated_at = Utc::now();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.categories.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl ResourceRepository for InMemoryStore {
    async fn insert(&self, resource: &Resource) -> AppResult<()> {
        self.resources.write().await.insert(resource.id, resource.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Resource>> {
        Ok(self.resources.read().await.get(&id).cloned())
    }

    async fn list(&self, filters: &ResourceFilters) -> AppResult<Vec<Resource>> {
        let mut resources: Vec<Resource> = self
            .resources
            .read()
            .await
            .values()
            .filter(|r| filters.resource_type.map_or(true, |t| r.resource_type == t))
            .filter(|r| filters.category_id.map_or(true, |c| r.category_id == Some(c)))
            .cloned()
            .collect();
        resources.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(resources)
    }

    async fn search(
        &self,
        query: &str,
        resource_type: Option<ResourceType>,
    ) -> AppResult<Vec<Resource>> {
        let mut resources: Vec<Resource> = self
            .resources
            .read()
            .await
            .values()
            .filter(|r| {
                contains_ignore_case(Some(&r.name), query)
                    || contains_ignore_case(r.description.as_deref(), query)
            })
            .filter(|r| resource_type.map_or(true, |t| r.resource_type == t))
            .cloned()
            .collect();
        resources.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(resources)
    }

    async fn updated_before(&self, before: DateTime<Utc>) -> AppResult<Vec<Resource>> {
        let mut resources: Vec<Resource> = self
            .resources
            .read()
            .await
            .values()
            .filter(|r| r.last_updated < before)
            .cloned()
            .collect();
        resources.sort_by(|a, b| a.last_updated.cmp(&b.last_updated));
        Ok(resources)
    }

    async fn update(&self, resource: &Resource) -> AppResult<()> {
        if let Some(existing) = self.resources.write().await.get_mut(&resource.id) {
            *existing = resource.clone();
        }
        Ok(())
    }

    async fn update_price(&self, id: Uuid, price: Decimal, at: DateTime<Utc>) -> AppResult<bool> {
        match self.resources.write().await.get_mut(&id) {
            Some(resource) => {
                resource.price = price;
                resource.last_updated = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.resources.write().await.remove(&id).is_some())
    }

    async fn count_by_category(&self, category_id: Uuid) -> AppResult<i64> {
        let count = self
            .resources
            .read()
            .await
            .values()
            .filter(|r| r.category_id == Some(category_id))
            .count();
        Ok(count as i64)
    }
}

#[async_trait]
impl CompositeItemRepository for InMemoryStore {
    async fn insert(&self, item: &CompositeItem) -> AppResult<()> {
        self.composite_items.write().await.insert(item.id, item.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<CompositeItem>> {
        Ok(self.composite_items.read().await.get(&id).cloned())
    }

    async fn list(&self, filters: &CompositeItemFilters) -> AppResult<Vec<CompositeItem>> {
        let mut items: Vec<CompositeItem> = self
            .composite_items
            .read()
            .await
            .values()
            .filter(|i| filters.category_id.map_or(true, |c| i.category_id == c))
            .filter(|i| filters.active.map_or(true, |a| i.active == a))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn search(&self, query: &str) -> AppResult<Vec<CompositeItem>> {
        let mut items: Vec<CompositeItem> = self
            .composite_items
            .read()
            .await
            .values()
            .filter(|i| i.active)
            .filter(|i| {
                contains_ignore_case(Some(&i.name), query)
                    || contains_ignore_case(i.description.as_deref(), query)
            })
            .cloned()
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    async fn update(&self, item: &CompositeItem) -> AppResult<()> {
        if let Some(existing) = self.composite_items.write().await.get_mut(&item.id) {
            *existing = item.clone();
        }
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.composite_items.write().await.remove(&id).is_some())
    }

    async fn references_resource(&self, resource_id: Uuid) -> AppResult<bool> {
        Ok(self
            .composite_items
            .read()
            .await
            .values()
            .any(|i| i.composition.iter().any(|e| e.resource_id == resource_id)))
    }

    async fn references_category(&self, category_id: Uuid) -> AppResult<bool> {
        Ok(self
            .composite_items
            .read()
            .await
            .values()
            .any(|i| i.category_id == category_id))
    }
}

#[async_trait]
impl BudgetRepository for InMemoryStore {
    async fn insert(&self, budget: &Budget) -> AppResult<()> {
        let mut budgets = self.budgets.write().await;
        if budgets
            .values()
            .any(|b| b.budget_number == budget.budget_number)
        {
            return Err(AppError::Conflict(format!(
                "El número de presupuesto '{}' ya existe",
                budget.budget_number
            )));
        }
        budgets.insert(budget.id, budget.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Budget>> {
        Ok(self.budgets.read().await.get(&id).cloned())
    }

    async fn list(&self, filters: &BudgetFilters) -> AppResult<Vec<Budget>> {
        let mut budgets: Vec<Budget> = self
            .budgets
            .read()
            .await
            .values()
            .filter(|b| filters.status.map_or(true, |s| b.status == s))
            .filter(|b| filters.client_id.map_or(true, |c| b.client_id == c))
            .cloned()
            .collect();
        budgets.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(budgets)
    }

    async fn update(&self, budget: &Budget) -> AppResult<()> {
        if let Some(existing) = self.budgets.write().await.get_mut(&budget.id) {
            *existing = budget.clone();
        }
        Ok(())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: BudgetStatus,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        match self.budgets.write().await.get_mut(&id) {
            Some(budget) => {
                budget.status = status;
                budget.updated_at = at;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.budgets.write().await.remove(&id).is_some())
    }

    async fn count_by_number_prefix(&self, prefix: &str) -> AppResult<i64> {
        let count = self
            .budgets
            .read()
            .await
            .values()
            .filter(|b| b.budget_number.starts_with(prefix))
            .count();
        Ok(count as i64)
    }

    async fn max_sequence_by_prefix(&self, prefix: &str) -> AppResult<Option<i64>> {
        Ok(self
            .budgets
            .read()
            .await
            .values()
            .filter_map(|b| b.budget_number.strip_prefix(prefix))
            .filter_map(|seq| seq.parse::<i64>().ok())
            .max())
    }

    async fn totals_by_status(&self) -> AppResult<Vec<StatusStats>> {
        let mut groups: HashMap<BudgetStatus, StatusStats> = HashMap::new();
        for budget in self.budgets.read().await.values() {
            let group = groups.entry(budget.status).or_insert(StatusStats {
                status: budget.status,
                count: 0,
                total_amount: Decimal::ZERO,
            });
            group.count += 1;
            group.total_amount += budget.total;
        }
        Ok(groups.into_values().collect())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: &User) -> AppResult<()> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(AppError::Conflict("El email ya está registrado".to_string()));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let email = email.trim().to_lowercase();
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }
}
