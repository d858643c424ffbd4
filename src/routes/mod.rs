//! Routers por colección, montados bajo `/api/<colección>`

pub mod auth_routes;
pub mod budget_routes;
pub mod category_routes;
pub mod client_routes;
pub mod composite_item_routes;
pub mod resource_routes;
