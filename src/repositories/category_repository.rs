use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::category::Category;
use crate::utils::errors::{map_unique_violation, AppResult};

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    /// `Conflict` si el nombre ya existe
    async fn insert(&self, category: &Category) -> AppResult<()>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>>;
    async fn find_by_name(&self, name: &str) -> AppResult<Option<Category>>;
    /// Ordenadas por `order`; sólo activas salvo que se pidan todas
    async fn list(&self, include_inactive: bool) -> AppResult<Vec<Category>>;
    async fn max_order(&self) -> AppResult<Option<i32>>;
    /// `Conflict` si el nombre nuevo ya existe
    async fn update(&self, category: &Category) -> AppResult<()>;
    async fn set_order(&self, id: Uuid, order: i32) -> AppResult<bool>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn duplicate_name(name: &str) -> String {
    format!("Ya existe una categoría con el nombre '{}'", name)
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn insert(&self, category: &Category) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO categories (
                id, name, description, default_margin, color, sort_order,
                active, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.default_margin)
        .bind(&category.color)
        .bind(category.order)
        .bind(category.active)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || duplicate_name(&category.name)))?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(category)
    }

    async fn find_by_name(&self, name: &str) -> AppResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE name = $1")
            .bind(name.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(category)
    }

    async fn list(&self, include_inactive: bool) -> AppResult<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT * FROM categories
            WHERE $1 OR active
            ORDER BY sort_order, name
            "#,
        )
        .bind(include_inactive)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn max_order(&self) -> AppResult<Option<i32>> {
        let (max,): (Option<i32>,) = sqlx::query_as("SELECT MAX(sort_order) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(max)
    }

    async fn update(&self, category: &Category) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE categories
            SET name = $2, description = $3, default_margin = $4, color = $5,
                sort_order = $6, active = $7, updated_at = $8
            WHERE id = $1
            "#,
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.default_margin)
        .bind(&category.color)
        .bind(category.order)
        .bind(category.active)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || duplicate_name(&category.name)))?;

        Ok(())
    }

    async fn set_order(&self, id: Uuid, order: i32) -> AppResult<bool> {
        let result = sqlx::query(
            "UPDATE categories SET sort_order = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(id)
        .bind(order)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
