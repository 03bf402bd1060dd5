// Authentication error types

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;
use tracing::{error, warn};

use crate::db::StoreError;
use crate::error::internal_server_error;

/// Authentication error types
#[derive(Debug)]
pub enum AuthError {
    ValidationError(validator::ValidationErrors),
    EmailAlreadyExists,
    UserNotFound,
    /// Reported with 404 like `UserNotFound`
    WrongPassword,
    MissingEmailHeader,
    DatabaseError(StoreError),
    PasswordHashError(String),
    TokenGenerationError(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::ValidationError(errors) => write!(f, "Validation error: {}", errors),
            AuthError::EmailAlreadyExists => write!(f, "Email id already exists"),
            AuthError::UserNotFound => write!(f, "User not found"),
            AuthError::WrongPassword => write!(f, "Wrong pasword"),
            AuthError::MissingEmailHeader => write!(f, "Email not found in the request headers"),
            AuthError::DatabaseError(e) => write!(f, "Database error: {}", e),
            AuthError::PasswordHashError(msg) => write!(f, "Password hashing error: {}", msg),
            AuthError::TokenGenerationError(msg) => write!(f, "Token generation error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            AuthError::ValidationError(errors) => {
                warn!("Validation errors in auth request: {}", errors);
                (status, Json(json!({ "errors": errors }))).into_response()
            }
            AuthError::DatabaseError(e) => {
                error!("Database error in auth: {}", e);
                internal_server_error()
            }
            AuthError::PasswordHashError(msg) => {
                error!("Password hashing error: {}", msg);
                internal_server_error()
            }
            AuthError::TokenGenerationError(msg) => {
                error!("Token generation error: {}", msg);
                internal_server_error()
            }
            other => {
                error!("{}", other);
                (status, Json(json!({ "error": other.to_string() }))).into_response()
            }
        }
    }
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AuthError::EmailAlreadyExists => StatusCode::BAD_REQUEST,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::WrongPassword => StatusCode::NOT_FOUND,
            AuthError::MissingEmailHeader => StatusCode::BAD_REQUEST,
            AuthError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::PasswordHashError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AuthError::TokenGenerationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Duplicate(_) => AuthError::EmailAlreadyExists,
            other => AuthError::DatabaseError(other),
        }
    }
}

impl From<validator::ValidationErrors> for AuthError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AuthError::ValidationError(errors)
    }
}
