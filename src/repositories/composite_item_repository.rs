//! Repositorio de ítems compuestos
//!
//! La composición vive en `composite_item_components` y se reescribe
//! completa, en la misma transacción que la fila del ítem.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::models::composite_item::{CompositeItem, CompositeItemFilters, CompositionEntry};
use crate::repositories::like_pattern;
use crate::utils::errors::AppResult;

#[async_trait]
pub trait CompositeItemRepository: Send + Sync {
    async fn insert(&self, item: &CompositeItem) -> AppResult<()>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<CompositeItem>>;
    /// Ordenados por nombre
    async fn list(&self, filters: &CompositeItemFilters) -> AppResult<Vec<CompositeItem>>;
    /// Sólo activos; subcadena case-insensitive sobre nombre y descripción
    async fn search(&self, query: &str) -> AppResult<Vec<CompositeItem>>;
    async fn update(&self, item: &CompositeItem) -> AppResult<()>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
    async fn references_resource(&self, resource_id: Uuid) -> AppResult<bool>;
    async fn references_category(&self, category_id: Uuid) -> AppResult<bool>;
}

#[derive(FromRow)]
struct CompositeItemRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    unit: String,
    category_id: Uuid,
    custom_margin: Option<Decimal>,
    active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CompositeItemRow {
    fn into_item(self, composition: Vec<CompositionEntry>) -> CompositeItem {
        CompositeItem {
            id: self.id,
            name: self.name,
            description: self.description,
            unit: self.unit,
            category_id: self.category_id,
            composition,
            custom_margin: self.custom_margin,
            active: self.active,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(FromRow)]
struct ComponentRow {
    composite_item_id: Uuid,
    resource_id: Uuid,
    quantity: Decimal,
}

pub struct PgCompositeItemRepository {
    pool: PgPool,
}

impl PgCompositeItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Carga las composiciones de un lote de filas
    async fn hydrate(&self, rows: Vec<CompositeItemRow>) -> AppResult<Vec<CompositeItem>> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();
        let components = sqlx::query_as::<_, ComponentRow>(
            r#"
            SELECT composite_item_id, resource_id, quantity
            FROM composite_item_components
            WHERE composite_item_id = ANY($1)
            ORDER BY composite_item_id, position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_item: HashMap<Uuid, Vec<CompositionEntry>> = HashMap::new();
        for component in components {
            by_item
                .entry(component.composite_item_id)
                .or_default()
                .push(CompositionEntry {
                    resource_id: component.resource_id,
                    quantity: component.quantity,
                });
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let composition = by_item.remove(&row.id).unwrap_or_default();
                row.into_item(composition)
            })
            .collect())
    }

    async fn write_components(
        tx: &mut Transaction<'_, Postgres>,
        item: &CompositeItem,
    ) -> AppResult<()> {
        sqlx::query("DELETE FROM composite_item_components WHERE composite_item_id = $1")
            .bind(item.id)
            .execute(&mut **tx)
            .await?;

        for (position, entry) in item.composition.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO composite_item_components
                    (composite_item_id, position, resource_id, quantity)
                VALUES ($1, $2, $3, $4)
                "#,
            )
            .bind(item.id)
            .bind(position as i32)
            .bind(entry.resource_id)
            .bind(entry.quantity)
            .execute(&mut **tx)
            .await?;
        }

        Ok(())
    }
}

#[async_trait]
impl CompositeItemRepository for PgCompositeItemRepository {
    async fn insert(&self, item: &CompositeItem) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO composite_items (
                id, name, description, unit, category_id, custom_margin,
                active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.unit)
        .bind(item.category_id)
        .bind(item.custom_margin)
        .bind(item.active)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut *tx)
        .await?;

        Self::write_components(&mut tx, item).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<CompositeItem>> {
        let row = sqlx::query_as::<_, CompositeItemRow>(
            "SELECT * FROM composite_items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn list(&self, filters: &CompositeItemFilters) -> AppResult<Vec<CompositeItem>> {
        let rows = sqlx::query_as::<_, CompositeItemRow>(
            r#"
            SELECT * FROM composite_items
            WHERE ($1::uuid IS NULL OR category_id = $1)
              AND ($2::boolean IS NULL OR active = $2)
            ORDER BY name
            "#,
        )
        .bind(filters.category_id)
        .bind(filters.active)
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    async fn search(&self, query: &str) -> AppResult<Vec<CompositeItem>> {
        let rows = sqlx::query_as::<_, CompositeItemRow>(
            r#"
            SELECT * FROM composite_items
            WHERE active AND (name ILIKE $1 OR description ILIKE $1)
            ORDER BY name
            "#,
        )
        .bind(like_pattern(query))
        .fetch_all(&self.pool)
        .await?;

        self.hydrate(rows).await
    }

    async fn update(&self, item: &CompositeItem) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE composite_items
            SET name = $2, description = $3, unit = $4, category_id = $5,
                custom_margin = $6, active = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(&item.unit)
        .bind(item.category_id)
        .bind(item.custom_margin)
        .bind(item.active)
        .bind(item.updated_at)
        .execute(&mut *tx)
        .await?;

        Self::write_components(&mut tx, item).await?;
        tx.commit().await?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM composite_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn references_resource(&self, resource_id: Uuid) -> AppResult<bool> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM composite_item_components WHERE resource_id = $1)",
        )
        .bind(resource_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn references_category(&self, category_id: Uuid) -> AppResult<bool> {
        let (exists,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM composite_items WHERE category_id = $1)")
                .bind(category_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }
}
