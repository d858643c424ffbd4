use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::models::resource::Resource;

// Resultado de la actualización masiva de precios
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct BulkPriceUpdateResult {
    pub updated: usize,
    pub failed: Vec<Uuid>,
}

// Recurso con precio desactualizado
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutdatedResource {
    #[serde(flatten)]
    pub resource: Resource,
    pub days_old: i64,
}

impl OutdatedResource {
    pub fn new(resource: Resource, now: DateTime<Utc>) -> Self {
        let days_old = resource.days_since_update(now);
        Self { resource, days_old }
    }
}
