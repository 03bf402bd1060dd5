pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod items;
pub mod validation;

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post, put},
    Router,
};
use thiserror::Error;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use auth::{AuthService, InMemoryUserRepository, PgUserRepository, TokenService, UserRepository};
use config::Config;
use items::{InMemoryItemRepository, ItemRepository, PgItemRepository, UploadStore};

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    paths(
        auth::handlers::register_handler,
        auth::handlers::login_handler,
        auth::handlers::update_handler,
        items::handlers::list_items,
        items::handlers::create_item,
        items::handlers::get_item,
        items::handlers::update_item,
        items::handlers::delete_item,
    ),
    components(
        schemas(
            auth::RegisterRequest,
            auth::RegisterResponse,
            auth::LoginRequest,
            auth::LoginResponse,
            auth::UpdateProfileRequest,
            auth::UpdateProfileResponse,
            items::UpdateItemRequest,
            items::UpdateItemResponse,
            items::DeleteItemResponse,
        )
    ),
    tags(
        (name = "auth", description = "Registration, login and profile updates"),
        (name = "items", description = "Secondhand item listings")
    ),
    info(
        title = "Second Chance API",
        version = "1.0.0",
        description = "REST backend for a secondhand-goods marketplace"
    )
)]
pub struct ApiDoc;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub items: Arc<dyn ItemRepository>,
    pub uploads: UploadStore,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
    #[error("upload directory unavailable: {0}")]
    UploadDir(#[from] std::io::Error),
}

/// Connects the stores named by the configuration and assembles the state.
/// Without a database URL both stores live in memory.
pub async fn build_state(config: &Config) -> Result<AppState, StartupError> {
    let (users, items): (Arc<dyn UserRepository>, Arc<dyn ItemRepository>) =
        match &config.database_url {
            Some(url) => {
                tracing::info!("Connecting to database...");
                let pool = db::create_pool(url, config.db_max_connections).await?;
                db::run_migrations(&pool).await?;
                (
                    Arc::new(PgUserRepository::new(pool.clone())),
                    Arc::new(PgItemRepository::new(pool)),
                )
            }
            None => {
                tracing::warn!("DATABASE_URL not set; using in-memory stores");
                (
                    Arc::new(InMemoryUserRepository::new()),
                    Arc::new(InMemoryItemRepository::new()),
                )
            }
        };

    let uploads = UploadStore::new(&config.upload_dir);
    uploads.ensure_dir().await?;

    let token_service = TokenService::new(config.jwt_secret.clone(), config.token_ttl_secs);

    Ok(AppState {
        auth: Arc::new(AuthService::new(users, token_service)),
        items,
        uploads,
    })
}

/// Creates and configures the application router
pub fn create_router(state: AppState, max_upload_bytes: usize) -> Router {
    let images = ServeDir::new(state.uploads.dir());

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/register", post(auth::register_handler))
        .route("/login", post(auth::login_handler))
        .route("/update", put(auth::update_handler))
        .route(
            "/items",
            get(items::list_items)
                .post(items::create_item)
                .layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route(
            "/items/:id",
            get(items::get_item)
                .put(items::update_item)
                .delete(items::delete_item),
        )
        .nest_service(items::upload::PUBLIC_PREFIX, images)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
