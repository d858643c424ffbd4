//! Services module
//!
//! Lógica de negocio que cruza más de un repositorio: el motor de precios
//! de ítems compuestos, el ensamblador de presupuestos y la autenticación.

pub mod auth_service;
pub mod budget_number;
pub mod budget_service;
pub mod composite_item_service;
pub mod pricing;

pub use auth_service::AuthService;
pub use budget_service::BudgetService;
pub use composite_item_service::CompositeItemService;
