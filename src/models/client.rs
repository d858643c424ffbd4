//! Modelo de Client
//!
//! Registro de contacto al que se le emiten presupuestos.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

use crate::utils::validation::validate_required_text;

/// Client principal - mapea a la tabla clients
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub ruc: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Client {
    pub fn new(request: CreateClientRequest) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name: request.name.trim().to_string(),
            email: normalize_email(request.email),
            phone: trim_optional(request.phone),
            address: trim_optional(request.address),
            ruc: trim_optional(request.ruc),
            created_at: now,
            updated_at: now,
        }
    }

    /// Aplica una actualización parcial
    pub fn apply(&mut self, request: UpdateClientRequest) {
        if let Some(name) = request.name {
            self.name = name.trim().to_string();
        }
        if request.email.is_some() {
            self.email = normalize_email(request.email);
        }
        if request.phone.is_some() {
            self.phone = trim_optional(request.phone);
        }
        if request.address.is_some() {
            self.address = trim_optional(request.address);
        }
        if request.ruc.is_some() {
            self.ruc = trim_optional(request.ruc);
        }
        self.updated_at = Utc::now();
    }
}

/// Resumen embebido en las respuestas de presupuestos
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientSummary {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub ruc: Option<String>,
}

impl From<Client> for ClientSummary {
    fn from(client: Client) -> Self {
        Self {
            id: client.id,
            name: client.name,
            email: client.email,
            phone: client.phone,
            address: client.address,
            ruc: client.ruc,
        }
    }
}

/// Request para crear un nuevo cliente
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateClientRequest {
    #[validate(custom = "validate_required_text", length(max = 200))]
    pub name: String,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(max = 50))]
    pub phone: Option<String>,

    #[validate(length(max = 500))]
    pub address: Option<String>,

    #[validate(length(max = 50))]
    pub ruc: Option<String>,
}

/// Request para actualizar un cliente existente
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateClientRequest {
    #[validate(custom = "validate_required_text", length(max = 200))]
    pub name: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(max = 50))]
    pub phone: Option<String>,

    #[validate(length(max = 500))]
    pub address: Option<String>,

    #[validate(length(max = 50))]
    pub ruc: Option<String>,
}

fn trim_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn normalize_email(value: Option<String>) -> Option<String> {
    trim_optional(value).map(|v| v.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_client_normalizes_fields() {
        let client = Client::new(CreateClientRequest {
            name: "  Constructora Sur ".to_string(),
            email: Some(" Ventas@Sur.COM ".to_string()),
            phone: Some("".to_string()),
            address: None,
            ruc: Some("80012345-6".to_string()),
        });
        assert_eq!(client.name, "Constructora Sur");
        assert_eq!(client.email.as_deref(), Some("ventas@sur.com"));
        assert_eq!(client.phone, None);
        assert_eq!(client.ruc.as_deref(), Some("80012345-6"));
    }

    #[test]
    fn test_create_request_requires_name() {
        let request = CreateClientRequest {
            name: "   ".to_string(),
            email: None,
            phone: None,
            address: None,
            ruc: None,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_apply_partial_update_keeps_untouched_fields() {
        let mut client = Client::new(CreateClientRequest {
            name: "Obra Norte".to_string(),
            email: Some("a@b.com".to_string()),
            phone: Some("0981".to_string()),
            address: None,
            ruc: None,
        });
        client.apply(UpdateClientRequest {
            phone: Some("0991".to_string()),
            ..Default::default()
        });
        assert_eq!(client.name, "Obra Norte");
        assert_eq!(client.email.as_deref(), Some("a@b.com"));
        assert_eq!(client.phone.as_deref(), Some("0991"));
    }
}
