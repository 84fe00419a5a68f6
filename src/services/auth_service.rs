use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::models::*;
use crate::utils::*;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthService {
    pool: Arc<DatabaseConnection>,
    jwt_service: JwtService,
}

impl AuthService {
    pub fn new(pool: Arc<DatabaseConnection>, jwt_service: JwtService) -> Self {
        Self { pool, jwt_service }
    }

    pub async fn register(&self, request: RegisterRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email);
        validate_email(&email)?;
        validate_password(&request.password)?;

        let name = request.name.trim();
        if name.is_empty() || name.chars().count() > 100 {
            return Err(AppError::ValidationError(
                "Name must be between 1 and 100 characters".to_string(),
            ));
        }

        let existing = users::Entity::find()
            .filter(users::Column::Email.eq(email.clone()))
            .one(self.pool.as_ref())
            .await?;
        if existing.is_some() {
            return Err(AppError::ValidationError(
                "Email is already registered".to_string(),
            ));
        }

        let password_hash = hash_password(&request.password)?;

        let user = users::ActiveModel {
            email: Set(email),
            name: Set(name.to_string()),
            password_hash: Set(password_hash),
            ..Default::default()
        }
        .insert(self.pool.as_ref())
        .await
        .map_err(|e| AppError::from_insert(e, "Email is already registered"))?;

        log::info!("User registered: id={}", user.id);

        self.issue_tokens(user)
    }

    pub async fn login(&self, request: LoginRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&request.email);

        let user = users::Entity::find()
            .filter(users::Column::Email.eq(email))
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::AuthError("Invalid email or password".to_string()))?;

        if !verify_password(&request.password, &user.password_hash)? {
            return Err(AppError::AuthError("Invalid email or password".to_string()));
        }

        self.issue_tokens(user)
    }

    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthResponse> {
        let claims = self.jwt_service.verify_refresh_token(refresh_token)?;
        let user_id = claims.user_id()?;

        let user = users::Entity::find_by_id(user_id)
            .one(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::AuthError("User no longer exists".to_string()))?;

        self.issue_tokens(user)
    }

    fn issue_tokens(&self, user: users::Model) -> AppResult<AuthResponse> {
        let access_token = self.jwt_service.generate_access_token(user.id, &user.email)?;
        let refresh_token = self.jwt_service.generate_refresh_token(user.id, &user.email)?;

        Ok(AuthResponse {
            user: UserResponse::from(user),
            access_token,
            refresh_token,
            expires_in: self.jwt_service.get_access_token_expires_in(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn user(password_hash: String) -> users::Model {
        users::Model {
            id: 1,
            email: "ada@example.com".to_string(),
            name: "Ada".to_string(),
            password_hash,
            image: None,
            created_at: None,
            updated_at: None,
        }
    }

    fn service(db: DatabaseConnection) -> AuthService {
        AuthService::new(Arc::new(db), JwtService::new("test-secret", 60, 120))
    }

    #[actix_web::test]
    async fn test_register_rejects_taken_email() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user("x".to_string())]])
            .into_connection();

        let result = service(db)
            .register(RegisterRequest {
                email: "Ada@Example.com".to_string(),
                name: "Ada".to_string(),
                password: "Password123".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }

    #[actix_web::test]
    async fn test_login_with_wrong_password_is_unauthorized() {
        let hash = hash_password("Password123").unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(hash)]])
            .into_connection();

        let result = service(db)
            .login(LoginRequest {
                email: "ada@example.com".to_string(),
                password: "Wrong12345".to_string(),
            })
            .await;

        assert!(matches!(result, Err(AppError::AuthError(_))));
    }

    #[actix_web::test]
    async fn test_login_issues_tokens() {
        let hash = hash_password("Password123").unwrap();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(hash)]])
            .into_connection();

        let auth = service(db)
            .login(LoginRequest {
                email: "ada@example.com".to_string(),
                password: "Password123".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(auth.user.id, 1);
        assert_eq!(auth.expires_in, 60);
        assert!(!auth.access_token.is_empty());
    }
}
