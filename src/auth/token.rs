// JWT issuing service

use crate::auth::error::AuthError;
use chrono::Utc;
#[cfg(test)]
use jsonwebtoken::{decode, DecodingKey, Validation};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};

/// Identity carried inside a token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenUser {
    pub id: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user: TokenUser,
    pub iat: i64, // issued at timestamp
    pub exp: i64, // expiration timestamp
}

/// Signs bearer tokens with the process-wide secret
pub struct TokenService {
    secret: String,
    token_duration: i64, // in seconds
}

impl TokenService {
    pub fn new(secret: String, token_duration: i64) -> Self {
        Self {
            secret,
            token_duration,
        }
    }

    /// Issue a token whose payload names the given user record
    pub fn issue(&self, user_id: &str) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();

        let claims = Claims {
            user: TokenUser {
                id: user_id.to_string(),
            },
            iat: now,
            exp: now + self.token_duration,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AuthError::TokenGenerationError(e.to_string()))
    }

    /// Check signature and expiry, returning the claims.
    /// No route accepts tokens yet, so only tests read them back.
    #[cfg(test)]
    pub fn decode(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )
        .map(|data| data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn test_token_service() -> TokenService {
        TokenService::new("test_secret_key_for_testing_purposes".to_string(), 3600)
    }

    #[test]
    fn test_token_carries_user_id() {
        let service = test_token_service();
        let token = service.issue("65a1f0c2").unwrap();
        let claims = service.decode(&token).unwrap();

        assert_eq!(claims.user.id, "65a1f0c2");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_malformed_tokens_are_rejected() {
        let service = test_token_service();

        assert!(service.decode("").is_err());
        assert!(service.decode("not.a.token").is_err());
        assert!(service
            .decode("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9.invalid.signature")
            .is_err());
    }

    #[test]
    fn test_token_signature_verification() {
        let service1 = TokenService::new("secret1".to_string(), 3600);
        let service2 = TokenService::new("secret2".to_string(), 3600);

        let token = service1.issue("1").unwrap();

        assert!(service1.decode(&token).is_ok());
        assert!(service2.decode(&token).is_err());
    }

    #[test]
    fn test_expired_token_is_rejected() {
        // Well past the default 60s leeway
        let service = TokenService::new("secret".to_string(), -3600);
        let token = service.issue("1").unwrap();
        assert!(service.decode(&token).is_err());
    }

    proptest! {
        #[test]
        fn prop_token_claims_contain_identity(user_id in "[a-f0-9]{24}") {
            let service = test_token_service();
            let token = service.issue(&user_id)?;
            let claims = service.decode(&token)?;
            prop_assert_eq!(claims.user.id, user_id);
        }
    }
}
