use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::resource::{Resource, ResourceFilters, ResourceType};
use crate::repositories::like_pattern;
use crate::utils::errors::AppResult;

#[async_trait]
pub trait ResourceRepository: Send + Sync {
    async fn insert(&self, resource: &Resource) -> AppResult<()>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Resource>>;
    /// Ordenados por nombre
    async fn list(&self, filters: &ResourceFilters) -> AppResult<Vec<Resource>>;
    /// Subcadena case-insensitive sobre nombre y descripción
    async fn search(
        &self,
        query: &str,
        resource_type: Option<ResourceType>,
    ) -> AppResult<Vec<Resource>>;
    /// Recursos con `last_updated` anterior a `before`, los más viejos primero
    async fn updated_before(&self, before: DateTime<Utc>) -> AppResult<Vec<Resource>>;
    async fn update(&self, resource: &Resource) -> AppResult<()>;
    async fn update_price(&self, id: Uuid, price: Decimal, at: DateTime<Utc>) -> AppResult<bool>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
    async fn count_by_category(&self, category_id: Uuid) -> AppResult<i64>;
}

pub struct PgResourceRepository {
    pool: PgPool,
}

impl PgResourceRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ResourceRepository for PgResourceRepository {
    async fn insert(&self, resource: &Resource) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO resources (
                id, name, description, resource_type, unit, price,
                category_id, last_updated, created_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(resource.id)
        .bind(&resource.name)
        .bind(&resource.description)
        .bind(resource.resource_type)
        .bind(&resource.unit)
        .bind(resource.price)
        .bind(resource.category_id)
        .bind(resource.last_updated)
        .bind(resource.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Resource>> {
        let resource = sqlx::query_as::<_, Resource>("SELECT * FROM resources WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(resource)
    }

    async fn list(&self, filters: &ResourceFilters) -> AppResult<Vec<Resource>> {
        let resources = sqlx::query_as::<_, Resource>(
            r#"
            SELECT * FROM resources
            WHERE ($1::resource_type IS NULL OR resource_type = $1)
              AND ($2::uuid IS NULL OR category_id = $2)
            ORDER BY name
            "#,
        )
        .bind(filters.resource_type)
        .bind(filters.category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(resources)
    }

    async fn search(
        &self,
        query: &str,
        resource_type: Option<ResourceType>,
    ) -> AppResult<Vec<Resource>> {
        let resources = sqlx::query_as::<_, Resource>(
            r#"
            SELECT * FROM resources
            WHERE (name ILIKE $1 OR description ILIKE $1)
              AND ($2::resource_type IS NULL OR resource_type = $2)
            ORDER BY name
            "#,
        )
        .bind(like_pattern(query))
        .bind(resource_type)
        .fetch_all(&self.pool)
        .await?;

        Ok(resources)
    }

    async fn updated_before(&self, before: DateTime<Utc>) -> AppResult<Vec<Resource>> {
        let resources = sqlx::query_as::<_, Resource>(
            "SELECT * FROM resources WHERE last_updated < $1 ORDER BY last_updated",
        )
        .bind(before)
        .fetch_all(&self.pool)
        .await?;

        Ok(resources)
    }

    async fn update(&self, resource: &Resource) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE resources
            SET name = $2, description = $3, resource_type = $4, unit = $5,
                price = $6, category_id = $7, last_updated = $8
            WHERE id = $1
            "#,
        )
        .bind(resource.id)
        .bind(&resource.name)
        .bind(&resource.description)
        .bind(resource.resource_type)
        .bind(&resource.unit)
        .bind(resource.price)
        .bind(resource.category_id)
        .bind(resource.last_updated)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update_price(&self, id: Uuid, price: Decimal, at: DateTime<Utc>) -> AppResult<bool> {
        let result = sqlx::query("UPDATE resources SET price = $2, last_updated = $3 WHERE id = $1")
            .bind(id)
            .bind(price)
            .bind(at)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM resources WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_by_category(&self, category_id: Uuid) -> AppResult<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM resources WHERE category_id = $1")
                .bind(category_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}
