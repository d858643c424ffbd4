//! Read models del motor de precios
//!
//! Nada de esto se persiste: se arma en cada lectura a partir de la
//! composición vigente y los precios actuales de los recursos.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use crate::models::category::CategorySummary;
use crate::models::resource::{Resource, ResourceType};

/// Costo agrupado por tipo de recurso
#[derive(Debug, Clone, Copy, Default, Serialize, PartialEq)]
pub struct CostBreakdown {
    pub materials: Decimal,
    pub labor: Decimal,
    pub equipment: Decimal,
    pub total: Decimal,
}

impl CostBreakdown {
    pub fn add(&mut self, resource_type: ResourceType, amount: Decimal) {
        match resource_type {
            ResourceType::Material => self.materials += amount,
            ResourceType::Labor => self.labor += amount,
            ResourceType::Equipment => self.equipment += amount,
        }
        self.total = self.materials + self.labor + self.equipment;
    }
}

/// Detalle del recurso dentro de una línea de composición
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentResource {
    pub id: Uuid,
    pub name: String,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub unit: String,
    pub price: Decimal,
}

impl From<&Resource> for ComponentResource {
    fn from(resource: &Resource) -> Self {
        Self {
            id: resource.id,
            name: resource.name.clone(),
            resource_type: resource.resource_type,
            unit: resource.unit.clone(),
            price: resource.price,
        }
    }
}

/// Línea de composición con su recurso resuelto
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedComponent {
    pub resource: ComponentResource,
    pub quantity: Decimal,
    pub subtotal: Decimal,
}

/// Ítem compuesto valorizado
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricedCompositeItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub unit: String,
    pub category: CategorySummary,
    pub composition: Vec<PricedComponent>,
    pub cost_breakdown: CostBreakdown,
    pub custom_margin: Option<Decimal>,
    pub margin: Decimal,
    pub final_price: Decimal,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Precio vigente de un ítem compuesto
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSummary {
    pub item_id: Uuid,
    pub name: String,
    pub current_price: Decimal,
    pub current_cost: Decimal,
    pub margin: Decimal,
    pub last_updated: DateTime<Utc>,
}

impl From<&PricedCompositeItem> for PriceSummary {
    fn from(item: &PricedCompositeItem) -> Self {
        Self {
            item_id: item.id,
            name: item.name.clone(),
            current_price: item.final_price,
            current_cost: item.cost_breakdown.total,
            margin: item.margin,
            last_updated: item.updated_at,
        }
    }
}

/// Listado parcial: los ítems que no se pudieron valorizar van a `skipped`
#[derive(Debug, Clone, Serialize)]
pub struct PartialList<T> {
    pub items: Vec<T>,
    pub skipped: Vec<Uuid>,
}

impl<T> Default for PartialList<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            skipped: Vec::new(),
        }
    }
}
