use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::client::Client;
use crate::repositories::like_pattern;
use crate::utils::errors::AppResult;

#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn insert(&self, client: &Client) -> AppResult<()>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Client>>;
    /// Más recientes primero
    async fn list(&self) -> AppResult<Vec<Client>>;
    /// Subcadena case-insensitive sobre nombre, email y RUC
    async fn search(&self, query: &str) -> AppResult<Vec<Client>>;
    async fn update(&self, client: &Client) -> AppResult<()>;
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

pub struct PgClientRepository {
    pool: PgPool,
}

impl PgClientRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ClientRepository for PgClientRepository {
    async fn insert(&self, client: &Client) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO clients (id, name, email, phone, address, ruc, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(client.id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address)
        .bind(&client.ruc)
        .bind(client.created_at)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Client>> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(client)
    }

    async fn list(&self) -> AppResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>("SELECT * FROM clients ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await?;

        Ok(clients)
    }

    async fn search(&self, query: &str) -> AppResult<Vec<Client>> {
        let clients = sqlx::query_as::<_, Client>(
            r#"
            SELECT * FROM clients
            WHERE name ILIKE $1 OR email ILIKE $1 OR ruc ILIKE $1
            ORDER BY name
            "#,
        )
        .bind(like_pattern(query))
        .fetch_all(&self.pool)
        .await?;

        Ok(clients)
    }

    async fn update(&self, client: &Client) -> AppResult<()> {
        sqlx::query(
            r#"
            UPDATE clients
            SET name = $2, email = $3, phone = $4, address = $5, ruc = $6, updated_at = $7
            WHERE id = $1
            "#,
        )
        .bind(client.id)
        .bind(&client.name)
        .bind(&client.email)
        .bind(&client.phone)
        .bind(&client.address)
        .bind(&client.ruc)
        .bind(client.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
