//! Modelos del sistema
//!
//! Entidades del catálogo (clientes, categorías, recursos, ítems
//! compuestos), presupuestos y usuarios, junto con sus requests.

pub mod budget;
pub mod category;
pub mod client;
pub mod composite_item;
pub mod resource;
pub mod user;
