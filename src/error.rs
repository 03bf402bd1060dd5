// Error handling for the item routes
// Every item handler returns Result<T, ApiError>; the IntoResponse impl below
// is the one place failures are turned into HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::{debug, error};

use crate::db::StoreError;

/// Main error type for the item API
#[derive(Debug)]
pub enum ApiError {
    /// Field-level validation failures
    /// Maps to HTTP 400 with an `errors` object
    ValidationError(validator::ValidationErrors),

    /// Malformed request that never reached field validation
    /// (bad multipart stream, non-object JSON, bad filename)
    /// Maps to HTTP 400
    BadRequest(String),

    /// No record matched the requested id
    /// Maps to HTTP 404
    NotFound { resource: String, id: String },

    /// Store failures
    /// Maps to HTTP 500; details only go to the log
    StoreError(StoreError),

    /// Writing an uploaded file failed
    /// Maps to HTTP 500; details only go to the log
    UploadError(std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        match self {
            ApiError::ValidationError(errors) => {
                debug!("Validation error: {:?}", errors);
                (status, Json(json!({ "errors": errors }))).into_response()
            }
            ApiError::BadRequest(message) => {
                debug!("Bad request: {}", message);
                (status, Json(json!({ "error": message }))).into_response()
            }
            ApiError::NotFound { resource, id } => {
                debug!("Resource not found: {} with id {}", resource, id);
                (
                    status,
                    Json(json!({ "error": format!("{} not found", resource) })),
                )
                    .into_response()
            }
            ApiError::StoreError(err) => {
                error!("Store error: {:?}", err);
                internal_server_error()
            }
            ApiError::UploadError(err) => {
                error!("Upload error: {}", err);
                internal_server_error()
            }
        }
    }
}

/// The 500 body is plain text so nothing internal leaks to the client.
pub(crate) fn internal_server_error() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
}

impl ApiError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::StoreError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UploadError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(error: StoreError) -> Self {
        ApiError::StoreError(error)
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(errors)
    }
}
