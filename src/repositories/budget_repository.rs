//! Repositorio de presupuestos
//!
//! Las líneas viven en `budget_items`; se escriben en la misma
//! transacción que el encabezado y sólo se reemplazan completas.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::budget::{
    Budget, BudgetFilters, BudgetItem, BudgetItemType, BudgetStatus, StatusStats,
};
use crate::utils::errors::{map_unique_violation, AppResult};

#[async_trait]
pub trait BudgetRepository: Send + Sync {
    /// `Conflict` si el número de presupuesto ya existe
    async fn insert(&self, budget: &Budget) -> AppResult<()>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Budget>>;
    /// Más recientes primero
    async fn list(&self, filters: &BudgetFilters) -> AppResult<Vec<Budget>>;
    async fn update(&self, budget: &Budget) -> AppResult<()>;
    async fn update_status(
        &self,
        id: Uuid,
        status: BudgetStatus,
        at: DateTime<Utc>,
    ) -> AppResult<bool>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
    async fn count_by_number_prefix(&self, prefix: &str) -> AppResult<i64>;
    /// Mayor secuencia numérica en uso tras el prefijo, si hay alguna
    async fn max_sequence_by_prefix(&self, prefix: &str) -> AppResult<Option<i64>>;
    /// Cantidad y suma de `total` por estado
    async fn totals_by_status(&self) -> AppResult<Vec<StatusStats>>;
}

#[derive(FromRow)]
struct BudgetRow {
    id: Uuid,
    budget_number: String,
    client_id: Uuid,
    project_name: Option<String>,
    project_description: Option<String>,
    subtotal: Decimal,
    iva: Decimal,
    total: Decimal,
    status: BudgetStatus,
    valid_until: Option<DateTime<Utc>>,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BudgetRow {
    fn into_budget(self, items: Vec<BudgetItem>) -> Budget {
        Budget {
            id: self.id,
            budget_number: self.budget_number,
            client_id: self.client_id,
            project_name: self.project_name,
            project_description: self.project_description,
            items,
            subtotal: self.subtotal,
            iva: self.iva,
            total: self.total,
            status: self.status,
            valid_until: self.valid_until,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct BudgetItemRow {
    budget_id: Uuid,
    item_type: BudgetItemType,
    resource_id: Option<Uuid>,
    composite_item_id: Option<Uuid>,
    description: String,
    quantity: Decimal,
    unit_price: Decimal,
    unit: String,
    subtotal: Decimal,
}

impl From<BudgetItemRow> for BudgetItem {
    fn from(row: BudgetItemRow) -> Self {
        Self {
            item_type: row.item_type,
            resource_id: row.resource_id,
            composite_item_id: row.composite_item_id,
            description: row.description,
            quantity: row.quantity,
            unit_price: row.unit_price,
            unit: row.unit,
            subtotal: row.subtotal,
        }
    }
}

pub struct PgBudgetRepository {
    pool: PgPool,
}

impl PgBudgetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn hydrate(&self, rows: Vec<BudgetRow>) -> AppResult<Vec<Budget>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let items = sqlx::query_as::<_, BudgetItemRow>(
            r#"
            SELECT budget_id, item_type, resource_id, composite_item_id, description,
                   quantity, unit_price, unit, subtotal
            FROM budget_items
            WHERE budget_id = ANY($1)
            ORDER BY budget_id, position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_budget: HashMap<Uuid, Vec<BudgetItem>> = HashMap::new();
        for item in items {
            by_budget.entry(item.budget_id).or_default().push(item.into());
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let items = by_budget.remove(&row.id).unwrap_or_default();
                row.into_budget(items)
            })
            .collect())
    }

    async fn write_items(tx: &mut Transaction<'_, Postgres>, budget: &Budget) -> AppResult<()> {
        sqlx::query("DELETE FROM budget_items WHERE budget_id = $1")
            .bind(budget.id)
            .execute(&mut **tx)
            .await?;

        for (position, item) in budget.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO budget_items (
                    budget_id, position, item_type, resource_id, composite_item_id,
                    description, quantity, unit_price, unit, subtotal
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
                "#,
            )
            .bind(budget.id)
            .bind(position as i32)
            .bind(item.item_type)
            .bind(item.resource_id)
            .bind(item.composite_item_id)
            .bind(&item.description)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(&item.unit)
            .bind(item.subtotal)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl BudgetRepository for PgBudgetRepository {
    async fn insert(&self, budget: &Budget) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO budgets (
                id, budget_number, client_id, project_name, project_description,
                subtotal, iva, total, status, valid_until, notes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(budget.id)
        .bind(&budget.budget_number)
        .bind(budget.client_id)
        .bind(&budget.project_name)
        .bind(&budget.project_description)
        .bind(budget.subtotal)
        .bind(budget.iva)
        .bind(budget.total)
        .bind(budget.status)
        .bind(budget.valid_until)
        .bind(&budget.notes)
        .bind(budget.created_at)
        .bind(budget.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                format!("El número de presupuesto '{}' ya existe", budget.budget_number)
            })
        })?;

        Self::write_items(&mut tx, budget).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Budget>> {
        let row = sqlx::query_as::<_, BudgetRow>("SELECT * FROM budgets WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list(&self, filters: &BudgetFilters) -> AppResult<Vec<Budget>> {
        let rows = sqlx::query_as::<_, BudgetRow>(
            r#"
            SELECT * FROM budgets
            WHERE ($1::budget_status IS NULL OR status = $1)
              AND ($2::uuid IS NULL OR client_id = $2)
            ORDER BY created_at DESC
            "#,
        )
        .bind(filters.status)
        .bind(filters.client_id)
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    async fn update(&self, budget: &Budget) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE budgets
            SET client_id = $2, project_name = $3, project_description = $4,
                subtotal = $5, iva = $6, total = $7, status = $8,
                valid_until = $9, notes = $10, updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(budget.id)
        .bind(budget.client_id)
        .bind(&budget.project_name)
        .bind(&budget.project_description)
        .bind(budget.subtotal)
        .bind(budget.iva)
        .bind(budget.total)
        .bind(budget.status)
        .bind(budget.valid_until)
        .bind(&budget.notes)
        .bind(budget.updated_at)
        .execute(&mut *tx)
        .await?;

        Self::write_items(&mut tx, budget).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn update_status(
        &self,
        id: Uuid,
        status: BudgetStatus,
        at: DateTime<Utc>,
    ) -> AppResult<bool> {
        let result = sqlx::query("UPDATE budgets SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status)
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM budgets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_by_number_prefix(&self, prefix: &str) -> AppResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM budgets WHERE starts_with(budget_number, $1)")
                .bind(prefix)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }

    async fn max_sequence_by_prefix(&self, prefix: &str) -> AppResult<Option<i64>> {
        let (max,): (Option<i64>,) = sqlx::query_as(
            r#"
            SELECT MAX(substring(budget_number from length($1) + 1)::bigint)
            FROM budgets
            WHERE starts_with(budget_number, $1)
              AND substring(budget_number from length($1) + 1) ~ '^[0-9]+$'
            "#,
        )
        .bind(prefix)
        .fetch_one(&self.pool)
        .await?;

        Ok(max)
    }

    async fn totals_by_status(&self) -> AppResult<Vec<StatusStats>> {
        let rows: Vec<(BudgetStatus, i64, Decimal)> = sqlx::query_as(
            r#"
            SELECT status, COUNT(*), COALESCE(SUM(total), 0)
            FROM budgets
            GROUP BY status
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(status, count, total_amount)| StatusStats {
                status,
                count,
                total_amount,
            })
            .collect())
    }
}
