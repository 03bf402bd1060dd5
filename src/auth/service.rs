// Authentication service - business logic layer

use std::sync::Arc;

use chrono::Utc;
use validator::Validate;

use crate::auth::{
    error::AuthError,
    models::{
        LoginRequest, LoginResponse, NewUser, RegisterRequest, RegisterResponse,
        UpdateProfileRequest, UpdateProfileResponse,
    },
    password::PasswordService,
    repository::UserRepository,
    token::TokenService,
};

/// Authentication service coordinating registration, login and profile updates
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    token_service: TokenService,
}

impl AuthService {
    pub fn new(user_repo: Arc<dyn UserRepository>, token_service: TokenService) -> Self {
        Self {
            user_repo,
            token_service,
        }
    }

    /// Register a new user and issue a token for the new record
    pub async fn register(&self, request: RegisterRequest) -> Result<RegisterResponse, AuthError> {
        request.validate()?;

        if self.user_repo.find_by_email(&request.email).await?.is_some() {
            return Err(AuthError::EmailAlreadyExists);
        }

        let password_hash = PasswordService::hash_password_async(request.password).await?;

        // A concurrent registration can still win the race; the unique
        // index turns that into EmailAlreadyExists as well.
        let user = self
            .user_repo
            .create_user(NewUser {
                email: request.email,
                first_name: request.first_name,
                last_name: request.last_name,
                password_hash,
            })
            .await?;

        let authtoken = self.token_service.issue(&user.id.to_string())?;

        tracing::info!("User registered successfully");
        Ok(RegisterResponse {
            authtoken,
            email: user.email,
        })
    }

    /// Check credentials and issue a token for the existing record
    pub async fn login(&self, request: LoginRequest) -> Result<LoginResponse, AuthError> {
        let user = self
            .user_repo
            .find_by_email(&request.email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let matches =
            PasswordService::verify_password_async(request.password, user.password_hash.clone())
                .await?;
        if !matches {
            return Err(AuthError::WrongPassword);
        }

        let authtoken = self.token_service.issue(&user.id.to_string())?;

        tracing::info!("User logged in successfully");
        Ok(LoginResponse {
            authtoken,
            user_name: user.first_name,
            user_email: user.email,
        })
    }

    /// Merge a profile patch onto the user identified by `email`
    pub async fn update_profile(
        &self,
        email: &str,
        patch: UpdateProfileRequest,
    ) -> Result<UpdateProfileResponse, AuthError> {
        let mut user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        user.apply_profile(patch, Utc::now());

        let updated = self
            .user_repo
            .update_user(&user)
            .await?
            .ok_or(AuthError::UserNotFound)?;

        let authtoken = self.token_service.issue(&updated.id.to_string())?;

        tracing::info!("User profile updated successfully");
        Ok(UpdateProfileResponse { authtoken })
    }

    #[cfg(test)]
    pub fn tokens(&self) -> &TokenService {
        &self.token_service
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repository::InMemoryUserRepository;

    fn service() -> (AuthService, Arc<InMemoryUserRepository>) {
        let repo = Arc::new(InMemoryUserRepository::new());
        let service = AuthService::new(
            repo.clone(),
            TokenService::new("service_test_secret".to_string(), 3600),
        );
        (service, repo)
    }

    fn registration(email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
            first_name: "A".to_string(),
            last_name: "B".to_string(),
        }
    }

    fn login(email: &str, password: &str) -> LoginRequest {
        LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_stores_digest_not_plaintext() {
        let (service, repo) = service();
        let response = service.register(registration("a@x.com", "pw")).await.unwrap();
        assert_eq!(response.email, "a@x.com");

        let stored = repo.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "pw");
        assert!(PasswordService::verify_password("pw", &stored.password_hash).unwrap());

        let claims = service.tokens().decode(&response.authtoken).unwrap();
        assert_eq!(claims.user.id, stored.id.to_string());
    }

    #[tokio::test]
    async fn test_register_twice_conflicts() {
        let (service, _) = service();
        service.register(registration("a@x.com", "pw")).await.unwrap();

        let err = service.register(registration("a@x.com", "pw2")).await.unwrap_err();
        assert!(matches!(err, AuthError::EmailAlreadyExists));
    }

    #[tokio::test]
    async fn test_login_outcomes() {
        let (service, _) = service();
        service.register(registration("a@x.com", "pw")).await.unwrap();

        let ok = service.login(login("a@x.com", "pw")).await.unwrap();
        assert_eq!(ok.user_email, "a@x.com");
        assert_eq!(ok.user_name, "A");
        assert!(!ok.authtoken.is_empty());

        assert!(matches!(
            service.login(login("a@x.com", "nope")).await,
            Err(AuthError::WrongPassword)
        ));
        assert!(matches!(
            service.login(login("b@x.com", "pw")).await,
            Err(AuthError::UserNotFound)
        ));
    }

    #[tokio::test]
    async fn test_login_with_blank_credentials_is_not_found() {
        let (service, _) = service();
        service.register(registration("a@x.com", "pw")).await.unwrap();

        assert!(matches!(
            service.login(login("", "pw")).await,
            Err(AuthError::UserNotFound)
        ));
        assert!(matches!(
            service.login(login("x@x.com", "")).await,
            Err(AuthError::UserNotFound)
        ));
        // Known account, empty password: a plain mismatch
        assert!(matches!(
            service.login(login("a@x.com", "")).await,
            Err(AuthError::WrongPassword)
        ));
    }

    #[tokio::test]
    async fn test_update_profile_merges_patch() {
        let (service, repo) = service();
        service.register(registration("a@x.com", "pw")).await.unwrap();
        let before = repo.find_by_email("a@x.com").await.unwrap().unwrap();

        let response = service
            .update_profile(
                "a@x.com",
                UpdateProfileRequest {
                    first_name: None,
                    last_name: Some("Lovelace".to_string()),
                },
            )
            .await
            .unwrap();

        let after = repo.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(after.first_name, "A");
        assert_eq!(after.last_name, "Lovelace");
        assert_eq!(after.password_hash, before.password_hash);
        assert!(after.updated_at.is_some());

        let claims = service.tokens().decode(&response.authtoken).unwrap();
        assert_eq!(claims.user.id, before.id.to_string());
    }

    #[tokio::test]
    async fn test_update_profile_unknown_user() {
        let (service, _) = service();
        let err = service
            .update_profile("ghost@x.com", UpdateProfileRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::UserNotFound));
    }
}
