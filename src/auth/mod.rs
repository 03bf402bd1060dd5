// Authentication module
// Registration, login and profile update over bcrypt digests and JWTs

pub mod error;
pub mod handlers;
pub mod models;
pub mod password;
pub mod repository;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use error::AuthError;
pub use handlers::{login_handler, register_handler, update_handler};
pub use models::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UpdateProfileRequest,
    UpdateProfileResponse, User,
};
pub use repository::{InMemoryUserRepository, PgUserRepository, UserRepository};
pub use service::AuthService;
pub use token::TokenService;
