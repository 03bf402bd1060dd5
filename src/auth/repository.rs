// Credential store adapters

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::models::{NewUser, User};
use crate::db::StoreError;

/// User records keyed by email
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Exact-match lookup
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Inserts a user; an existing email yields `StoreError::Duplicate`
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// Writes the whole record back, matched by email. `None` when no
    /// record has that email any more.
    async fn update_user(&self, user: &User) -> Result<Option<User>, StoreError>;
}

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, password_hash, created_at, updated_at";

/// User repository for PostgreSQL
#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    /// Create a new PgUserRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let created = sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (id, email, first_name, last_name, password_hash) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| StoreError::from_write(e, &user.email))?;

        Ok(created)
    }

    async fn update_user(&self, user: &User) -> Result<Option<User>, StoreError> {
        let updated = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET first_name = $2, last_name = $3, password_hash = $4, updated_at = $5 \
             WHERE email = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(&user.email)
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(&user.password_hash)
        .bind(user.updated_at)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }
}

/// In-process user store
#[derive(Default)]
pub struct InMemoryUserRepository {
    users: RwLock<HashMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.email) {
            return Err(StoreError::Duplicate(user.email));
        }

        let created = User {
            id: Uuid::new_v4(),
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
            password_hash: user.password_hash,
            created_at: Utc::now(),
            updated_at: None,
        };
        users.insert(created.email.clone(), created.clone());
        Ok(created)
    }

    async fn update_user(&self, user: &User) -> Result<Option<User>, StoreError> {
        let mut users = self.users.write().await;
        match users.get_mut(&user.email) {
            Some(stored) => {
                *stored = user.clone();
                Ok(Some(stored.clone()))
            }
            None => Ok(None),
        }
    }
}
