//! Modelo de Resource
//!
//! Unidad valorizable del catálogo: material, mano de obra o equipo.
//! Tiene un único precio vigente; `last_updated` se renueva en cada
//! escritura que puede afectar el precio.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::{validate_price, validate_required_text};

/// Tipo de recurso - mapea al ENUM resource_type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash)]
#[sqlx(type_name = "resource_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Material,
    Labor,
    Equipment,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceType::Material => "material",
            ResourceType::Labor => "labor",
            ResourceType::Equipment => "equipment",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "material" => Ok(ResourceType::Material),
            "labor" => Ok(ResourceType::Labor),
            "equipment" => Ok(ResourceType::Equipment),
            other => Err(format!("Tipo de recurso inválido: {}", other)),
        }
    }
}

/// Resource principal - mapea a la tabla resources
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: ResourceType,
    pub unit: String,
    pub price: Decimal,
    pub category_id: Option<Uuid>,
    pub last_updated: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Resource {
    pub fn new(request: CreateResourceRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            description: request.description,
            resource_type: request.resource_type,
            unit: request.unit.trim().to_string(),
            price: request.price,
            category_id: request.category_id,
            last_updated: now,
            created_at: now,
        }
    }

    pub fn apply(&mut self, request: UpdateResourceRequest) {
        if let Some(name) = request.name {
            self.name = name.trim().to_string();
        }
        if request.description.is_some() {
            self.description = request.description;
        }
        if let Some(resource_type) = request.resource_type {
            self.resource_type = resource_type;
        }
        if let Some(unit) = request.unit {
            self.unit = unit.trim().to_string();
        }
        if let Some(price) = request.price {
            self.price = price;
        }
        if request.category_id.is_some() {
            self.category_id = request.category_id;
        }
        self.last_updated = Utc::now();
    }

    /// Días transcurridos desde la última actualización de precio
    pub fn days_since_update(&self, now: DateTime<Utc>) -> i64 {
        (now - self.last_updated).num_days()
    }
}

/// Request para crear un recurso
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateResourceRequest {
    #[validate(custom = "validate_required_text", length(max = 200))]
    pub name: String,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[serde(rename = "type")]
    pub resource_type: ResourceType,

    #[validate(custom = "validate_required_text", length(max = 30))]
    pub unit: String,

    #[validate(custom = "validate_price")]
    pub price: Decimal,

    pub category_id: Option<Uuid>,
}

/// Request para actualizar un recurso
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResourceRequest {
    #[validate(custom = "validate_required_text", length(max = 200))]
    pub name: Option<String>,

    #[validate(length(max = 1000))]
    pub description: Option<String>,

    #[serde(rename = "type")]
    pub resource_type: Option<ResourceType>,

    #[validate(custom = "validate_required_text", length(max = 30))]
    pub unit: Option<String>,

    #[validate(custom = "validate_price")]
    pub price: Option<Decimal>,

    pub category_id: Option<Uuid>,
}

/// Entrada de actualización masiva de precios
#[derive(Debug, Clone, Deserialize)]
pub struct PriceUpdate {
    pub id: Uuid,
    pub price: Decimal,
}

#[derive(Debug, Deserialize, Validate)]
pub struct BulkPriceUpdateRequest {
    pub updates: Vec<PriceUpdate>,
}

/// Filtros para listado de recursos
#[derive(Debug, Clone, Default)]
pub struct ResourceFilters {
    pub resource_type: Option<ResourceType>,
    pub category_id: Option<Uuid>,
}
