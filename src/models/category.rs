//! Modelo de Category
//!
//! Agrupación de recursos e ítems compuestos con un margen por defecto.
//! `order` sólo define la secuencia de presentación.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::{validate_margin, validate_required_text, HEX_COLOR_REGEX};

pub const DEFAULT_CATEGORY_COLOR: &str = "#6B7280";

/// Category principal - mapea a la tabla categories
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub default_margin: Decimal,
    pub color: Option<String>,
    #[sqlx(rename = "sort_order")]
    pub order: i32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Category {
    /// `order` ya resuelto por el llamador (máximo actual + 1 si no vino)
    pub fn new(request: CreateCategoryRequest, order: i32) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            description: request.description,
            default_margin: request.default_margin,
            color: Some(request.color.unwrap_or_else(|| DEFAULT_CATEGORY_COLOR.to_string())),
            order,
            active: true,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, request: UpdateCategoryRequest) {
        if let Some(name) = request.name {
            self.name = name.trim().to_string();
        }
        if request.description.is_some() {
            self.description = request.description;
        }
        if let Some(margin) = request.default_margin {
            self.default_margin = margin;
        }
        if request.color.is_some() {
            self.color = request.color;
        }
        if let Some(order) = request.order {
            self.order = order;
        }
        if let Some(active) = request.active {
            self.active = active;
        }
        self.updated_at = Utc::now();
    }
}

/// Resumen de la categoría dentro de un ítem compuesto valorizado
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySummary {
    pub id: Uuid,
    pub name: String,
    pub default_margin: Decimal,
    pub color: Option<String>,
}

impl From<&Category> for CategorySummary {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
            default_margin: category.default_margin,
            color: category.color.clone(),
        }
    }
}

/// Request para crear una categoría
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[validate(custom = "validate_required_text", length(max = 100))]
    pub name: String,

    #[validate(length(max = 500))]
    pub description: Option<String>,

    #[validate(custom = "validate_margin")]
    pub default_margin: Decimal,

    #[validate(regex = "HEX_COLOR_REGEX")]
    pub color: Option<String>,

    pub order: Option<i32>,
}

/// Request para actualizar una categoría
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    #[validate(custom = "validate_required_text", length(max = 100))]
    pub name: Option<String>,

    #[validate(length(max = 500))]
    pub description: Option<String>,

    #[validate(custom = "validate_margin")]
    pub default_margin: Option<Decimal>,

    #[validate(regex = "HEX_COLOR_REGEX")]
    pub color: Option<String>,

    pub order: Option<i32>,

    pub active: Option<bool>,
}

/// Entrada de reordenamiento
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryOrder {
    pub id: Uuid,
    pub order: i32,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReorderCategoriesRequest {
    pub orders: Vec<CategoryOrder>,
}
