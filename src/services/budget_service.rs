//! Ensamblador de presupuestos
//!
//! Convierte las líneas pedidas en líneas de precio congelado, calcula
//! totales y asigna el número de presupuesto.

use std::collections::HashMap;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::budget_dto::BudgetResponse;
use crate::models::budget::{
    Budget, BudgetDetails, BudgetFilters, BudgetItem, BudgetItemInput, BudgetStats, BudgetStatus,
    CreateBudgetRequest, PriceSource, UpdateBudgetRequest,
};
use crate::models::client::ClientSummary;
use crate::repositories::Repositories;
use crate::services::budget_number::{next_budget_number, MAX_NUMBER_ATTEMPTS};
use crate::services::composite_item_service::CompositeItemService;
use crate::utils::errors::{bad_request_error, not_found_error, AppError, AppResult, Entity};

/// Valida la forma de cada línea antes de tocar el almacenamiento.
///
/// `itemType` desconocido falla con `INVALID_ITEM_TYPE`; un id faltante
/// para el tipo indicado es un `BadRequest`.
pub fn parse_item_sources(inputs: &[BudgetItemInput]) -> AppResult<Vec<PriceSource>> {
    inputs
        .iter()
        .map(|input| match input.item_type.as_str() {
            "resource" => input
                .resource_id
                .map(PriceSource::Resource)
                .ok_or_else(|| {
                    bad_request_error("resourceId es requerido para ítems de tipo resource")
                }),
            "composite" => input
                .composite_item_id
                .map(PriceSource::Composite)
                .ok_or_else(|| {
                    bad_request_error("compositeItemId es requerido para ítems de tipo composite")
                }),
            other => Err(AppError::InvalidItemType(other.to_string())),
        })
        .collect()
}

fn describe(input: &BudgetItemInput, fallback: &str) -> String {
    input
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

pub struct BudgetService {
    repos: Repositories,
    composite_items: CompositeItemService,
}

impl BudgetService {
    pub fn new(repos: &Repositories) -> Self {
        Self {
            repos: repos.clone(),
            composite_items: CompositeItemService::new(repos),
        }
    }

    /// Resuelve y congela cada línea en orden; la primera falla aborta todo
    pub async fn process_items(&self, inputs: &[BudgetItemInput]) -> AppResult<Vec<BudgetItem>> {
        let sources = parse_item_sources(inputs)?;
        let mut items = Vec::with_capacity(inputs.len());

        for (input, source) in inputs.iter().zip(sources) {
            let item = match source {
                PriceSource::Resource(id) => {
                    let resource = self
                        .repos
                        .resources
                        .find_by_id(id)
                        .await?
                        .ok_or_else(|| not_found_error(Entity::Resource, id))?;
                    BudgetItem::snapshot(
                        source,
                        describe(input, &resource.name),
                        input.quantity,
                        resource.price,
                        resource.unit,
                    )
                }
                PriceSource::Composite(id) => {
                    let composite = self
                        .repos
                        .composite_items
                        .find_by_id(id)
                        .await?
                        .ok_or_else(|| not_found_error(Entity::CompositeItem, id))?;
                    let priced = self.composite_items.price_of(&composite).await.map_err(|e| {
                        if e.is_not_found() {
                            not_found_error(Entity::CompositeItem, id)
                        } else {
                            e
                        }
                    })?;
                    BudgetItem::snapshot(
                        source,
                        describe(input, &priced.name),
                        input.quantity,
                        priced.final_price,
                        priced.unit,
                    )
                }
            };
            items.push(item);
        }

        Ok(items)
    }

    async fn ensure_client(&self, client_id: Uuid) -> AppResult<()> {
        if self.repos.clients.find_by_id(client_id).await?.is_none() {
            return Err(not_found_error(Entity::Client, client_id));
        }
        Ok(())
    }

    async fn find(&self, id: Uuid) -> AppResult<Budget> {
        self.repos
            .budgets
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error(Entity::Budget, id))
    }

    async fn with_client(&self, budget: Budget) -> AppResult<BudgetResponse> {
        let client = self
            .repos
            .clients
            .find_by_id(budget.client_id)
            .await?
            .map(ClientSummary::from);
        Ok(BudgetResponse { budget, client })
    }

    /// Asigna número y persiste, reintentando ante colisiones de número
    async fn insert_numbered(&self, budget: &mut Budget) -> AppResult<()> {
        let mut attempt = 0;
        loop {
            budget.budget_number = next_budget_number(self.repos.budgets.as_ref(), attempt).await?;
            match self.repos.budgets.insert(budget).await {
                Ok(()) => return Ok(()),
                Err(AppError::Conflict(msg)) if attempt + 1 < MAX_NUMBER_ATTEMPTS => {
                    warn!("Colisión de número de presupuesto, reintentando: {}", msg);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub async fn create(&self, request: CreateBudgetRequest) -> AppResult<BudgetResponse> {
        self.ensure_client(request.client_id).await?;
        let items = self.process_items(&request.items).await?;

        let mut budget = Budget::draft(
            request.client_id,
            items,
            BudgetDetails {
                project_name: request.project_name,
                project_description: request.project_description,
                valid_until: request.valid_until,
                notes: request.notes,
            },
        );
        self.insert_numbered(&mut budget).await?;
        info!(
            "✅ Presupuesto {} creado: total {}",
            budget.budget_number, budget.total
        );

        self.with_client(budget).await
    }

    pub async fn list(&self, filters: &BudgetFilters) -> AppResult<Vec<BudgetResponse>> {
        let budgets = self.repos.budgets.list(filters).await?;

        let mut clients: HashMap<Uuid, Option<ClientSummary>> = HashMap::new();
        let mut responses = Vec::with_capacity(budgets.len());
        for budget in budgets {
            if !clients.contains_key(&budget.client_id) {
                let client = self
                    .repos
                    .clients
                    .find_by_id(budget.client_id)
                    .await?
                    .map(ClientSummary::from);
                clients.insert(budget.client_id, client);
            }
            let client = clients.get(&budget.client_id).cloned().flatten();
            responses.push(BudgetResponse { budget, client });
        }

        Ok(responses)
    }

    pub async fn get(&self, id: Uuid) -> AppResult<BudgetResponse> {
        let budget = self.find(id).await?;
        self.with_client(budget).await
    }

    /// `items`, si viene, reemplaza la lista completa con precios actuales
    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateBudgetRequest,
    ) -> AppResult<BudgetResponse> {
        let mut budget = self.find(id).await?;

        if let Some(client_id) = request.client_id {
            if client_id != budget.client_id {
                self.ensure_client(client_id).await?;
                budget.client_id = client_id;
            }
        }
        if let Some(inputs) = &request.items {
            budget.items = self.process_items(inputs).await?;
        }
        if request.project_name.is_some() {
            budget.project_name = request.project_name;
        }
        if request.project_description.is_some() {
            budget.project_description = request.project_description;
        }
        if request.valid_until.is_some() {
            budget.valid_until = request.valid_until;
        }
        if request.notes.is_some() {
            budget.notes = request.notes;
        }

        budget.recalculate_totals();
        budget.updated_at = Utc::now();
        self.repos.budgets.update(&budget).await?;
        info!("✏️ Presupuesto {} actualizado", budget.budget_number);

        self.with_client(budget).await
    }

    /// Cualquier estado puede pasar a cualquier otro
    pub async fn update_status(&self, id: Uuid, status: BudgetStatus) -> AppResult<BudgetResponse> {
        if !self.repos.budgets.update_status(id, status, Utc::now()).await? {
            return Err(not_found_error(Entity::Budget, id));
        }
        info!("🔄 Presupuesto {} pasa a estado {}", id, status);
        self.get(id).await
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<()> {
        if !self.repos.budgets.delete(id).await? {
            return Err(not_found_error(Entity::Budget, id));
        }
        info!("🗑️ Presupuesto eliminado: {}", id);
        Ok(())
    }

    /// Copia en borrador con número nuevo; las líneas no se revalorizan
    pub async fn duplicate(&self, id: Uuid) -> AppResult<BudgetResponse> {
        let original = self.find(id).await?;
        let mut copy = original.duplicate();
        self.insert_numbered(&mut copy).await?;
        info!(
            "📄 Presupuesto {} duplicado como {}",
            original.budget_number, copy.budget_number
        );

        self.with_client(copy).await
    }

    pub async fn stats(&self) -> AppResult<BudgetStats> {
        let groups = self.repos.budgets.totals_by_status().await?;
        Ok(BudgetStats::from_groups(groups))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn input(
        item_type: &str,
        resource_id: Option<Uuid>,
        composite_item_id: Option<Uuid>,
    ) -> BudgetItemInput {
        BudgetItemInput {
            item_type: item_type.to_string(),
            resource_id,
            composite_item_id,
            description: None,
            quantity: dec!(1),
        }
    }

    #[test]
    fn test_parse_rejects_unknown_item_type() {
        let err = parse_item_sources(&[input("service", None, None)]).unwrap_err();
        assert_eq!(err.code(), "INVALID_ITEM_TYPE");
    }

    #[test]
    fn test_parse_requires_matching_id() {
        let err = parse_item_sources(&[input("resource", None, Some(Uuid::new_v4()))]).unwrap_err();
        assert_eq!(err.code(), "BAD_REQUEST");
    }

    #[test]
    fn test_shape_errors_win_over_missing_references() {
        // la segunda línea es inválida aunque la primera apunte a un recurso inexistente
        let items = [
            input("resource", Some(Uuid::new_v4()), None),
            input("bundle", None, None),
        ];
        let err = parse_item_sources(&items).unwrap_err();
        assert_eq!(err.code(), "INVALID_ITEM_TYPE");
    }

    #[test]
    fn test_describe_falls_back_to_source_name() {
        let mut line = input("resource", Some(Uuid::new_v4()), None);
        assert_eq!(describe(&line, "Cemento"), "Cemento");
        line.description = Some("  ".to_string());
        assert_eq!(describe(&line, "Cemento"), "Cemento");
        line.description = Some("Cemento para losa".to_string());
        assert_eq!(describe(&line, "Cemento"), "Cemento para losa");
    }

    #[tokio::test]
    async fn test_process_items_fails_fast_on_missing_resource() {
        let repos = Repositories::in_memory();
        let service = BudgetService::new(&repos);
        let ghost = Uuid::new_v4();

        let err = service
            .process_items(&[input("resource", Some(ghost), None)])
            .await
            .unwrap_err();
        assert_eq!(err.code(), "RESOURCE_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_missing_composite_reports_composite_not_found() {
        let repos = Repositories::in_memory();
        let service = BudgetService::new(&repos);

        let err = service
            .process_items(&[input("composite", None, Some(Uuid::new_v4()))])
            .await
            .unwrap_err();
        assert_eq!(err.code(), "COMPOSITE_ITEM_NOT_FOUND");
    }
}
