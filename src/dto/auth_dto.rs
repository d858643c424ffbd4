use serde::Serialize;

use crate::models::user::UserResponse;

// Respuesta de registro y login
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserResponse,
}
