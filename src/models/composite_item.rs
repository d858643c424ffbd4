//! Modelo de CompositeItem
//!
//! Ítem "de precio vivo": se persiste sólo su composición (lista de
//! recursos y cantidades); el costo y el precio de venta se calculan en
//! cada lectura y nunca se guardan.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::utils::validation::{validate_margin, validate_quantity, validate_required_text};

/// Línea de composición: un recurso y la cantidad usada por unidad del ítem.
/// Un mismo recurso puede aparecer más de una vez; las líneas se suman.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CompositionEntry {
    pub resource_id: Uuid,
    pub quantity: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeItem {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub unit: String,
    pub category_id: Uuid,
    pub composition: Vec<CompositionEntry>,
    pub custom_margin: Option<Decimal>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CompositeItem {
    pub fn new(request: CreateCompositeItemRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            description: request.description,
            unit: request.unit.trim().to_string(),
            category_id: request.category_id,
            composition: request.composition,
            custom_margin: request.custom_margin,
            active: request.active.unwrap_or(true),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, request: UpdateCompositeItemRequest) {
        if let Some(name) = request.name {
            self.name = name.trim().to_string();
        }
        if request.description.is_some() {
            self.description = request.description;
        }
        if let Some(unit) = request.unit {
            self.unit = unit.trim().to_string();
        }
        if let Some(category_id) = request.category_id {
            self.category_id = category_id;
        }
        if let Some(composition) = request.composition {
            self.composition = composition;
        }
        if request.custom_margin.is_some() {
            self.custom_margin = request.custom_margin;
        }
        if let Some(active) = request.active {
            self.active = active;
        }
        self.updated_at = Utc::now();
    }

    /// Copia con id y fechas nuevos; la composición se copia tal cual
    pub fn duplicate(&self) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: format!("{} (Copy)", self.name),
            description: self.description.clone(),
            unit: self.unit.clone(),
            category_id: self.category_id,
            composition: self.composition.clone(),
            custom_margin: self.custom_margin,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Composición no vacía y cantidades positivas
pub fn validate_composition(composition: &Vec<CompositionEntry>) -> Result<(), ValidationError> {
    if composition.is_empty() {
        let mut error = ValidationError::new("composition");
        error.message = Some("La composición debe tener al menos un recurso".into());
        return Err(error);
    }
    for entry in composition {
        validate_quantity(&entry.quantity)?;
    }
    Ok(())
}

/// Request para crear un ítem compuesto
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCompositeItemRequest {
    #[validate(custom = "validate_required_text", length(max = 200))]
    pub name: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[validate(custom = "validate_required_text", length(max = 30))]
    pub unit: String,

    pub category_id: Uuid,

    #[validate(custom = "validate_composition")]
    pub composition: Vec<CompositionEntry>,

    #[validate(custom = "validate_margin")]
    pub custom_margin: Option<Decimal>,

    pub active: Option<bool>,
}

/// Request para actualizar un ítem compuesto
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCompositeItemRequest {
    #[validate(custom = "validate_required_text", length(max = 200))]
    pub name: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[validate(custom = "validate_required_text", length(max = 30))]
    pub unit: Option<String>,

    pub category_id: Option<Uuid>,

    #[validate(custom = "validate_composition")]
    pub composition: Option<Vec<CompositionEntry>>,

    #[validate(custom = "validate_margin")]
    pub custom_margin: Option<Decimal>,

    pub active: Option<bool>,
}

/// Filtros para listado de ítems compuestos
#[derive(Debug, Clone, Default)]
pub struct CompositeItemFilters {
    pub category_id: Option<Uuid>,
    pub active: Option<bool>,
}
