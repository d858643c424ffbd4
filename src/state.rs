//! Shared application state
//!
//! Estado compartido que se pasa a través del router de Axum.

use sqlx::PgPool;

use crate::config::environment::EnvironmentConfig;
use crate::repositories::Repositories;

#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub config: EnvironmentConfig,
}

impl AppState {
    pub fn new(repos: Repositories, config: EnvironmentConfig) -> Self {
        Self { repos, config }
    }

    /// Estado respaldado por Postgres
    pub fn postgres(pool: PgPool, config: EnvironmentConfig) -> Self {
        Self::new(Repositories::postgres(pool), config)
    }

    /// Estado respaldado por el almacén en memoria
    pub fn in_memory(config: EnvironmentConfig) -> Self {
        Self::new(Repositories::in_memory(), config)
    }
}
