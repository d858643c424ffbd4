use uuid::Uuid;

use crate::dto::ApiResponse;
use crate::models::client::{Client, CreateClientRequest, UpdateClientRequest};
use crate::repositories::ClientRepository;
use crate::state::AppState;
use crate::utils::errors::{bad_request_error, not_found_error, AppResult, Entity};
use std::sync::Arc;
use tracing::info;

pub struct ClientController {
    repository: Arc<dyn ClientRepository>,
}

impl ClientController {
    pub fn new(state: &AppState) -> Self {
        Self {
            repository: state.repos.clients.clone(),
        }
    }

    async fn find(&self, id: Uuid) -> AppResult<Client> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| not_found_error(Entity::Client, id))
    }

    pub async fn create(&self, request: CreateClientRequest) -> AppResult<ApiResponse<Client>> {
        let client = Client::new(request);
        self.repository.insert(&client).await?;
        info!("✅ Cliente creado: {} ({})", client.name, client.id);

        Ok(ApiResponse::success_with_message(client, "Cliente creado exitosamente"))
    }

    pub async fn list(&self) -> AppResult<ApiResponse<Vec<Client>>> {
        Ok(ApiResponse::success(self.repository.list().await?))
    }

    pub async fn search(&self, query: Option<String>) -> AppResult<ApiResponse<Vec<Client>>> {
        let query = query
            .filter(|q| !q.trim().is_empty())
            .ok_or_else(|| bad_request_error("El parámetro de búsqueda 'q' es requerido"))?;

        Ok(ApiResponse::success(self.repository.search(&query).await?))
    }

    pub async fn get(&self, id: Uuid) -> AppResult<ApiResponse<Client>> {
        Ok(ApiResponse::success(self.find(id).await?))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateClientRequest,
    ) -> AppResult<ApiResponse<Client>> {
        let mut client = self.find(id).await?;
        client.apply(request);
        self.repository.update(&client).await?;

        Ok(ApiResponse::success_with_message(client, "Cliente actualizado exitosamente"))
    }

    pub async fn delete(&self, id: Uuid) -> AppResult<ApiResponse<()>> {
        if !self.repository.delete(id).await? {
            return Err(not_found_error(Entity::Client, id));
        }
        info!("🗑️ Cliente eliminado: {}", id);

        Ok(ApiResponse::message("Cliente eliminado exitosamente"))
    }
}
