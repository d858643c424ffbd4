//! Sistema de manejo de errores
//!
//! Este módulo define todos los tipos de errores del sistema
//! y su conversión a respuestas HTTP apropiadas.

use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Entidades que pueden no existir al resolver una referencia
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Client,
    Category,
    Resource,
    CompositeItem,
    Budget,
    User,
}

impl Entity {
    /// Código estable expuesto en el sobre de error
    pub fn not_found_code(&self) -> &'static str {
        match self {
            Entity::Client => "CLIENT_NOT_FOUND",
            Entity::Category => "CATEGORY_NOT_FOUND",
            Entity::Resource => "RESOURCE_NOT_FOUND",
            Entity::CompositeItem => "COMPOSITE_ITEM_NOT_FOUND",
            Entity::Budget => "BUDGET_NOT_FOUND",
            Entity::User => "USER_NOT_FOUND",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Entity::Client => "Cliente",
            Entity::Category => "Categoría",
            Entity::Resource => "Recurso",
            Entity::CompositeItem => "Ítem compuesto",
            Entity::Budget => "Presupuesto",
            Entity::User => "Usuario",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errores principales de la aplicación
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("{entity} with id '{id}' not found")]
    NotFound { entity: Entity, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Invalid item type: {0}")]
    InvalidItemType(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Código estable de la falla, pensado para clientes de la API
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Database(_) => "DB_ERROR",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotFound { entity, .. } => entity.not_found_code(),
            AppError::Conflict(_) => "CONFLICT",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::InvalidItemType(_) => "INVALID_ITEM_TYPE",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Validation(_) | AppError::BadRequest(_) | AppError::InvalidItemType(_) => {
                StatusCode::BAD_REQUEST
            }
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound { .. })
    }
}

/// Respuesta de error para la API
#[derive(Debug, serde::Serialize)]
struct ErrorResponse {
    success: bool,
    message: String,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();

        let (message, details) = match &self {
            AppError::Database(e) => {
                error!("❌ Database error: {}", e);
                ("Error al acceder a la base de datos".to_string(), None)
            }
            AppError::Internal(msg) => {
                error!("❌ Internal error: {}", msg);
                ("Ocurrió un error inesperado".to_string(), None)
            }
            AppError::Validation(e) => {
                warn!("Validation error: {}", e);
                ("Los datos enviados son inválidos".to_string(), Some(json!(e)))
            }
            AppError::NotFound { entity, id } => (
                format!("{} no encontrado", entity.label()),
                Some(json!({ "id": id })),
            ),
            AppError::InvalidItemType(value) => (
                "Cada ítem debe tener un itemType válido (resource o composite)".to_string(),
                Some(json!({ "itemType": value })),
            ),
            AppError::Conflict(msg) | AppError::BadRequest(msg) | AppError::Unauthorized(msg) => {
                (msg.clone(), None)
            }
        };

        let body = ErrorResponse {
            success: false,
            message,
            code,
            details,
        };

        (status, Json(body)).into_response()
    }
}

/// Resultado tipado para operaciones que pueden fallar
pub type AppResult<T> = Result<T, AppError>;

/// Función helper para crear errores de validación
pub fn validation_error(field: &'static str, message: &'static str) -> AppError {
    use validator::ValidationError;

    let mut error = ValidationError::new("custom");
    error.message = Some(message.into());

    let mut errors = validator::ValidationErrors::new();
    errors.add(field, error);

    AppError::Validation(errors)
}

/// Función helper para crear errores de recurso no encontrado
pub fn not_found_error(entity: Entity, id: impl ToString) -> AppError {
    AppError::NotFound {
        entity,
        id: id.to_string(),
    }
}

/// Función helper para crear errores de conflicto
pub fn conflict_error(resource: &str, field: &str, value: &str) -> AppError {
    AppError::Conflict(format!("{} con {} '{}' ya existe", resource, field, value))
}

/// Función helper para crear errores de solicitud incorrecta
pub fn bad_request_error(message: &str) -> AppError {
    AppError::BadRequest(message.to_string())
}

/// Traduce violaciones de unicidad de Postgres (SQLSTATE 23505) a `Conflict`
pub fn map_unique_violation(e: sqlx::Error, message: impl FnOnce() -> String) -> AppError {
    match &e {
        sqlx::Error::Database(db) if db.code().as_deref() == Some("23505") => {
            AppError::Conflict(message())
        }
        _ => AppError::Database(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_carries_entity_code() {
        let err = not_found_error(Entity::Resource, "abc");
        assert_eq!(err.code(), "RESOURCE_NOT_FOUND");
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn test_status_categories() {
        assert_eq!(AppError::Conflict("x".into()).status(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::InvalidItemType("foo".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Unauthorized("x".into()).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Internal("x".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_validation_error_helper() {
        let err = validation_error("price", "El precio no puede ser negativo");
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }
}
