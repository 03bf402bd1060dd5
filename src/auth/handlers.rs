// HTTP handlers for authentication endpoints

use axum::{
    body::Bytes,
    extract::State,
    http::HeaderMap,
    Json,
};
use validator::Validate;

use crate::auth::{
    error::AuthError,
    models::{
        LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UpdateProfileRequest,
        UpdateProfileResponse,
    },
};
use crate::AppState;

/// Header naming the account a profile update applies to
pub const EMAIL_HEADER: &str = "email";

/// Register a new user
/// POST /register
#[utoipa::path(
    post,
    path = "/register",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Email already registered or invalid fields", body = String, example = json!({"error": "Email id already exists"})),
        (status = 500, description = "Internal server error", body = String)
    ),
    tag = "auth"
)]
pub async fn register_handler(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AuthError> {
    tracing::debug!("Registration request for {}", request.email);
    Ok(Json(state.auth.register(request).await?))
}

/// Login a user
/// POST /login
#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = LoginResponse),
        (status = 404, description = "Unknown email or wrong password", body = String, example = json!({"error": "Wrong pasword"})),
        (status = 500, description = "Internal server error", body = String)
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    tracing::debug!("Login request for {}", request.email);
    Ok(Json(state.auth.login(request).await?))
}

/// Update the profile of the user named in the `email` header
/// PUT /update
///
/// The body is optional; an empty body only refreshes `updatedAt`.
#[utoipa::path(
    put,
    path = "/update",
    request_body = UpdateProfileRequest,
    params(("email" = String, Header, description = "Email of the account to update")),
    responses(
        (status = 200, description = "Profile updated", body = UpdateProfileResponse),
        (status = 400, description = "Missing email header or invalid fields", body = String, example = json!({"error": "Email not found in the request headers"})),
        (status = 404, description = "User not found", body = String, example = json!({"error": "User not found"})),
        (status = 500, description = "Internal server error", body = String)
    ),
    tag = "auth"
)]
pub async fn update_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UpdateProfileResponse>, AuthError> {
    let patch = parse_profile_patch(&body)?;
    patch.validate()?;

    let email = headers
        .get(EMAIL_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::MissingEmailHeader)?;

    tracing::debug!("Profile update request for {}", email);
    Ok(Json(state.auth.update_profile(email, patch).await?))
}

fn parse_profile_patch(body: &[u8]) -> Result<UpdateProfileRequest, AuthError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(UpdateProfileRequest::default());
    }

    serde_json::from_slice(body).map_err(|e| {
        let mut errors = validator::ValidationErrors::new();
        let mut error = validator::ValidationError::new("invalid_json");
        error.message = Some(e.to_string().into());
        errors.add("body", error);
        AuthError::ValidationError(errors)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_is_an_empty_patch() {
        let patch = parse_profile_patch(b"").unwrap();
        assert!(patch.first_name.is_none());
        assert!(patch.last_name.is_none());
        assert!(parse_profile_patch(b"  \n").is_ok());
    }

    #[test]
    fn test_patch_body_parsed() {
        let patch = parse_profile_patch(br#"{"firstName":"Ada"}"#).unwrap();
        assert_eq!(patch.first_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn test_malformed_body_is_a_validation_error() {
        assert!(matches!(
            parse_profile_patch(b"{not json"),
            Err(AuthError::ValidationError(_))
        ));
    }
}
