//! Acceso a datos
//!
//! Un trait por colección con dos implementaciones: Postgres (`Pg*`) y
//! un almacén en memoria (`InMemoryStore`) con las mismas reglas de
//! unicidad, usado en desarrollo y en los tests.

use std::sync::Arc;

use sqlx::PgPool;

pub mod budget_repository;
pub mod category_repository;
pub mod client_repository;
pub mod composite_item_repository;
pub mod memory;
pub mod resource_repository;
pub mod user_repository;

pub use budget_repository::{BudgetRepository, PgBudgetRepository};
pub use category_repository::{CategoryRepository, PgCategoryRepository};
pub use client_repository::{ClientRepository, PgClientRepository};
pub use composite_item_repository::{CompositeItemRepository, PgCompositeItemRepository};
pub use memory::InMemoryStore;
pub use resource_repository::{PgResourceRepository, ResourceRepository};
pub use user_repository::{PgUserRepository, UserRepository};

/// Conjunto de repositorios compartido por los handlers
#[derive(Clone)]
pub struct Repositories {
    pub clients: Arc<dyn ClientRepository>,
    pub categories: Arc<dyn CategoryRepository>,
    pub resources: Arc<dyn ResourceRepository>,
    pub composite_items: Arc<dyn CompositeItemRepository>,
    pub budgets: Arc<dyn BudgetRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            clients: Arc::new(PgClientRepository::new(pool.clone())),
            categories: Arc::new(PgCategoryRepository::new(pool.clone())),
            resources: Arc::new(PgResourceRepository::new(pool.clone())),
            composite_items: Arc::new(PgCompositeItemRepository::new(pool.clone())),
            budgets: Arc::new(PgBudgetRepository::new(pool.clone())),
            users: Arc::new(PgUserRepository::new(pool)),
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::default());
        Self {
            clients: store.clone(),
            categories: store.clone(),
            resources: store.clone(),
            composite_items: store.clone(),
            budgets: store.clone(),
            users: store,
        }
    }
}

/// Patrón `%texto%` para búsquedas ILIKE, escapando comodines
pub(crate) fn like_pattern(query: &str) -> String {
    let escaped = query
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

/// Búsqueda case-insensitive por subcadena, equivalente en memoria de ILIKE
pub(crate) fn contains_ignore_case(haystack: Option<&str>, needle: &str) -> bool {
    haystack
        .map(|h| h.to_lowercase().contains(&needle.trim().to_lowercase()))
        .unwrap_or(false)
}
