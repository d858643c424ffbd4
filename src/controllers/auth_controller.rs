use uuid::Uuid;

use crate::dto::auth_dto::AuthResponse;
use crate::dto::ApiResponse;
use crate::models::user::{LoginRequest, RegisterRequest, UserResponse};
use crate::services::AuthService;
use crate::state::AppState;
use crate::utils::errors::AppResult;
use crate::utils::jwt::JwtConfig;

pub struct AuthController {
    service: AuthService,
}

impl AuthController {
    pub fn new(state: &AppState) -> Self {
        Self {
            service: AuthService::new(&state.repos, JwtConfig::from(&state.config)),
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<ApiResponse<AuthResponse>> {
        let response = self.service.register(request).await?;
        Ok(ApiResponse::success_with_message(response, "Usuario registrado exitosamente"))
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<ApiResponse<AuthResponse>> {
        let response = self.service.login(request).await?;
        Ok(ApiResponse::success_with_message(response, "Login exitoso"))
    }

    pub async fn me(&self, user_id: Uuid) -> AppResult<ApiResponse<UserResponse>> {
        Ok(ApiResponse::success(self.service.me(user_id).await?))
    }
}
