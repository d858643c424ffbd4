//! Modelo de Budget
//!
//! Presupuesto emitido a un cliente. Sus líneas son de "precio congelado":
//! `unit_price` se copia del recurso o del ítem compuesto al crear o
//! reemplazar las líneas y no se vuelve a calcular nunca.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::Type;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::utils::money::iva_of;
use crate::utils::validation::validate_quantity;

/// Estado del presupuesto - mapea al ENUM budget_status.
/// Cualquier estado puede pasar a cualquier otro.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq, Hash, Default)]
#[sqlx(type_name = "budget_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    #[default]
    Draft,
    Sent,
    Approved,
    Rejected,
}

impl BudgetStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BudgetStatus::Draft => "draft",
            BudgetStatus::Sent => "sent",
            BudgetStatus::Approved => "approved",
            BudgetStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BudgetStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(BudgetStatus::Draft),
            "sent" => Ok(BudgetStatus::Sent),
            "approved" => Ok(BudgetStatus::Approved),
            "rejected" => Ok(BudgetStatus::Rejected),
            other => Err(format!("Estado inválido: {}", other)),
        }
    }
}

/// Origen de una línea - mapea al ENUM budget_item_type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Type, PartialEq, Eq)]
#[sqlx(type_name = "budget_item_type", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BudgetItemType {
    Resource,
    Composite,
}

/// Referencia ya validada a la fuente de precio de una línea
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceSource {
    Resource(Uuid),
    Composite(Uuid),
}

/// Línea de presupuesto con precio congelado
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItem {
    pub item_type: BudgetItemType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composite_item_id: Option<Uuid>,
    pub description: String,
    pub quantity: Decimal,
    pub unit_price: Decimal,
    pub unit: String,
    pub subtotal: Decimal,
}

impl BudgetItem {
    /// Congela el precio unitario vigente de la fuente en una línea nueva
    pub fn snapshot(
        source: PriceSource,
        description: String,
        quantity: Decimal,
        unit_price: Decimal,
        unit: String,
    ) -> Self {
        let (item_type, resource_id, composite_item_id) = match source {
            PriceSource::Resource(id) => (BudgetItemType::Resource, Some(id), None),
            PriceSource::Composite(id) => (BudgetItemType::Composite, None, Some(id)),
        };
        Self {
            item_type,
            resource_id,
            composite_item_id,
            description,
            quantity,
            unit_price,
            unit,
            subtotal: quantity * unit_price,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: Uuid,
    pub budget_number: String,
    pub client_id: Uuid,
    pub project_name: Option<String>,
    pub project_description: Option<String>,
    pub items: Vec<BudgetItem>,
    pub subtotal: Decimal,
    pub iva: Decimal,
    pub total: Decimal,
    pub status: BudgetStatus,
    pub valid_until: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Presupuesto en borrador; el número se asigna al persistir
    pub fn draft(client_id: Uuid, items: Vec<BudgetItem>, details: BudgetDetails) -> Self {
        let now = Utc::now();
        let mut budget = Self {
            id: Uuid::new_v4(),
            budget_number: String::new(),
            client_id,
            project_name: details.project_name,
            project_description: details.project_description,
            items,
            subtotal: Decimal::ZERO,
            iva: Decimal::ZERO,
            total: Decimal::ZERO,
            status: BudgetStatus::Draft,
            valid_until: details.valid_until,
            notes: details.notes,
            created_at: now,
            updated_at: now,
        };
        budget.recalculate_totals();
        budget
    }

    /// subtotal = Σ líneas, iva = subtotal * 0.10, total = subtotal + iva
    pub fn recalculate_totals(&mut self) {
        self.subtotal = self.items.iter().map(|item| item.subtotal).sum();
        self.iva = iva_of(self.subtotal);
        self.total = self.subtotal + self.iva;
    }

    /// Copia profunda en borrador: las líneas conservan sus precios congelados
    pub fn duplicate(&self) -> Self {
        let mut copy = Self::draft(
            self.client_id,
            self.items.clone(),
            BudgetDetails {
                project_name: self.project_name.as_ref().map(|name| format!("{} (Copy)", name)),
                project_description: self.project_description.clone(),
                valid_until: self.valid_until,
                notes: self.notes.clone(),
            },
        );
        copy.status = BudgetStatus::Draft;
        copy
    }
}

/// Campos descriptivos de un presupuesto
#[derive(Debug, Clone, Default)]
pub struct BudgetDetails {
    pub project_name: Option<String>,
    pub project_description: Option<String>,
    pub valid_until: Option<DateTime<Utc>>,
    pub notes: Option<String>,
}

/// Línea solicitada por el cliente de la API, antes de resolver su precio
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetItemInput {
    pub item_type: String,
    pub resource_id: Option<Uuid>,
    pub composite_item_id: Option<Uuid>,
    pub description: Option<String>,
    pub quantity: Decimal,
}

/// Al menos una línea y cantidades positivas
pub fn validate_item_inputs(items: &Vec<BudgetItemInput>) -> Result<(), ValidationError> {
    if items.is_empty() {
        let mut error = ValidationError::new("items");
        error.message = Some("El presupuesto debe tener al menos un ítem".into());
        return Err(error);
    }
    for item in items {
        validate_quantity(&item.quantity)?;
    }
    Ok(())
}

/// Request para crear un presupuesto
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBudgetRequest {
    pub client_id: Uuid,

    #[validate(length(max = 200))]
    pub project_name: Option<String>,

    #[validate(length(max = 2000))]
    pub project_description: Option<String>,

    #[validate(custom = "validate_item_inputs")]
    pub items: Vec<BudgetItemInput>,

    pub valid_until: Option<DateTime<Utc>>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// Request para actualizar un presupuesto; `items` reemplaza la lista completa
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBudgetRequest {
    pub client_id: Option<Uuid>,

    #[validate(length(max = 200))]
    pub project_name: Option<String>,

    #[validate(length(max = 2000))]
    pub project_description: Option<String>,

    #[validate(custom = "validate_item_inputs")]
    pub items: Option<Vec<BudgetItemInput>>,

    pub valid_until: Option<DateTime<Utc>>,

    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateBudgetStatusRequest {
    pub status: String,
}

/// Filtros para listado de presupuestos
#[derive(Debug, Clone, Default)]
pub struct BudgetFilters {
    pub status: Option<BudgetStatus>,
    pub client_id: Option<Uuid>,
}

/// Agregado por estado
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StatusStats {
    pub status: BudgetStatus,
    pub count: i64,
    pub total_amount: Decimal,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStats {
    pub total: i64,
    pub by_status: Vec<StatusStats>,
    pub approved_revenue: Decimal,
}

impl BudgetStats {
    /// Arma las estadísticas a partir de los agregados por estado
    pub fn from_groups(mut by_status: Vec<StatusStats>) -> Self {
        by_status.sort_by_key(|group| group.status.as_str());
        let total = by_status.iter().map(|group| group.count).sum();
        let approved_revenue = by_status
            .iter()
            .find(|group| group.status == BudgetStatus::Approved)
            .map(|group| group.total_amount)
            .unwrap_or(Decimal::ZERO);
        Self {
            total,
            by_status,
            approved_revenue,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(quantity: Decimal, unit_price: Decimal) -> BudgetItem {
        BudgetItem::snapshot(
            PriceSource::Resource(Uuid::new_v4()),
            "Cemento".to_string(),
            quantity,
            unit_price,
            "bolsa".to_string(),
        )
    }

    #[test]
    fn test_snapshot_computes_line_subtotal() {
        let item = line(dec!(3), dec!(12.5));
        assert_eq!(item.subtotal, dec!(37.5));
        assert_eq!(item.item_type, BudgetItemType::Resource);
        assert!(item.composite_item_id.is_none());
    }

    #[test]
    fn test_totals_invariant() {
        let budget = Budget::draft(
            Uuid::new_v4(),
            vec![line(dec!(2), dec!(100)), line(dec!(1), dec!(62.5))],
            BudgetDetails::default(),
        );
        assert_eq!(budget.subtotal, dec!(262.5));
        assert_eq!(budget.iva, dec!(26.25));
        assert_eq!(budget.total, budget.subtotal + budget.iva);
        assert_eq!(budget.status, BudgetStatus::Draft);
    }

    #[test]
    fn test_duplicate_keeps_frozen_prices() {
        let mut original = Budget::draft(
            Uuid::new_v4(),
            vec![line(dec!(2), dec!(100))],
            BudgetDetails {
                project_name: Some("Casa Lopez".to_string()),
                ..Default::default()
            },
        );
        original.status = BudgetStatus::Approved;
        original.budget_number = "BUD-2026-001".to_string();

        let copy = original.duplicate();
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.status, BudgetStatus::Draft);
        assert_eq!(copy.items, original.items);
        assert_eq!(copy.total, original.total);
        assert_eq!(copy.project_name.as_deref(), Some("Casa Lopez (Copy)"));
        assert!(copy.budget_number.is_empty());
    }

    #[test]
    fn test_stats_from_groups() {
        let stats = BudgetStats::from_groups(vec![
            StatusStats {
                status: BudgetStatus::Draft,
                count: 2,
                total_amount: dec!(300),
            },
            StatusStats {
                status: BudgetStatus::Approved,
                count: 1,
                total_amount: dec!(110),
            },
        ]);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.approved_revenue, dec!(110));
    }

    fn input(quantity: Decimal) -> BudgetItemInput {
        BudgetItemInput {
            item_type: "resource".to_string(),
            resource_id: Some(Uuid::new_v4()),
            composite_item_id: None,
            description: None,
            quantity,
        }
    }

    #[test]
    fn test_create_request_validates_items() {
        let request = |items: Vec<BudgetItemInput>| CreateBudgetRequest {
            client_id: Uuid::new_v4(),
            project_name: None,
            project_description: None,
            items,
            valid_until: None,
            notes: None,
        };
        assert!(request(vec![input(dec!(3))]).validate().is_ok());
        assert!(request(vec![]).validate().is_err());
        assert!(request(vec![input(dec!(1)), input(dec!(0))]).validate().is_err());

        let update = UpdateBudgetRequest {
            items: Some(vec![input(dec!(-1))]),
            ..Default::default()
        };
        assert!(update.validate().is_err());
        assert!(UpdateBudgetRequest::default().validate().is_ok());
    }

    #[test]
    fn test_status_parsing() {
        assert_eq!("sent".parse::<BudgetStatus>().unwrap(), BudgetStatus::Sent);
        assert!("archived".parse::<BudgetStatus>().is_err());
    }
}
