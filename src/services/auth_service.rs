use bcrypt::{hash, verify, DEFAULT_COST};
use tracing::{info, warn};
use uuid::Uuid;

use crate::dto::auth_dto::AuthResponse;
use crate::models::user::{LoginRequest, RegisterRequest, User, UserResponse};
use crate::repositories::Repositories;
use crate::utils::errors::{not_found_error, AppError, AppResult, Entity};
use crate::utils::jwt::{generate_token, JwtConfig};

const INVALID_CREDENTIALS: &str = "Email o contraseña incorrectos";

/// Servicio de autenticación
pub struct AuthService {
    repos: Repositories,
    jwt: JwtConfig,
}

impl AuthService {
    pub fn new(repos: &Repositories, jwt: JwtConfig) -> Self {
        Self {
            repos: repos.clone(),
            jwt,
        }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        if self.repos.users.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::Conflict("El email ya está registrado".to_string()));
        }

        let password_hash = hash(&request.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Error hashing password: {}", e)))?;
        let user = User::new(&request.email, &request.name, password_hash);
        self.repos.users.insert(&user).await?;
        info!("👤 Usuario registrado: {}", user.email);

        self.issue(user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let user = match self.repos.users.find_by_email(&request.email).await? {
            Some(user) => user,
            None => {
                warn!("Login fallido para email desconocido");
                return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
            }
        };

        let valid = verify(&request.password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Error verifying password: {}", e)))?;
        if !valid {
            warn!("Login fallido para {}", user.email);
            return Err(AppError::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        info!("🔐 Login exitoso: {}", user.email);
        self.issue(user)
    }

    pub async fn me(&self, user_id: Uuid) -> AppResult<UserResponse> {
        self.repos
            .users
            .find_by_id(user_id)
            .await?
            .map(UserResponse::from)
            .ok_or_else(|| not_found_error(Entity::User, user_id))
    }

    fn issue(&self, user: User) -> AppResult<AuthResponse> {
        let token = generate_token(user.id, &user.email, &self.jwt)?;
        Ok(AuthResponse {
            token,
            user: UserResponse::from(user),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EnvironmentConfig;
    use crate::utils::jwt::verify_token;

    fn service(repos: &Repositories) -> AuthService {
        AuthService::new(repos, JwtConfig::from(&EnvironmentConfig::default()))
    }

    fn register_request(email: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: "secreto123".to_string(),
            name: "Ana".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let repos = Repositories::in_memory();
        let auth = service(&repos);

        let registered = auth.register(register_request("ana@obra.com")).await.unwrap();
        let jwt = JwtConfig::from(&EnvironmentConfig::default());
        let claims = verify_token(&registered.token, &jwt).unwrap();
        assert_eq!(claims.email, "ana@obra.com");

        let logged = auth
            .login(LoginRequest {
                email: "ANA@obra.com".to_string(),
                password: "secreto123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(logged.user.id, registered.user.id);
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repos = Repositories::in_memory();
        let auth = service(&repos);
        auth.register(register_request("ana@obra.com")).await.unwrap();
        let err = auth.register(register_request("ana@obra.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let repos = Repositories::in_memory();
        let auth = service(&repos);
        auth.register(register_request("ana@obra.com")).await.unwrap();
        let err = auth
            .login(LoginRequest {
                email: "ana@obra.com".to_string(),
                password: "otra-clave".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }
}
