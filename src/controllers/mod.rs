//! Controllers
//!
//! Capa entre las rutas y los servicios/repositorios: aplica las reglas
//! de cada colección y arma el sobre de respuesta.

pub mod auth_controller;
pub mod budget_controller;
pub mod category_controller;
pub mod client_controller;
pub mod composite_item_controller;
pub mod resource_controller;
