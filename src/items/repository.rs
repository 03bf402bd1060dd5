// Item store adapters

use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use tokio::sync::RwLock;

use crate::db::StoreError;
use crate::items::models::{parse_item_id, Item, NewItem};

/// Access to the item collection.
///
/// Lookups go through the application-level `id`. An id that is not a
/// canonical decimal simply matches nothing.
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Every item, ordered by id
    async fn list(&self) -> Result<Vec<Item>, StoreError>;

    async fn find_by_id(&self, id: &str) -> Result<Option<Item>, StoreError>;

    /// Inserts the draft under `max(id) + 1` (or 1 when empty).
    /// Id assignment and insert happen atomically.
    async fn insert_next(&self, draft: NewItem, date_added: i64) -> Result<Item, StoreError>;

    /// Writes the whole document back; returns the stored document, or
    /// `None` if the item vanished in the meantime.
    async fn replace(&self, item: &Item) -> Result<Option<Item>, StoreError>;

    /// Returns whether a record was removed
    async fn delete(&self, id: &str) -> Result<bool, StoreError>;
}

/// PostgreSQL-backed store: one JSONB document per row
#[derive(Clone)]
pub struct PgItemRepository {
    pool: PgPool,
}

impl PgItemRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ItemRepository for PgItemRepository {
    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        let rows: Vec<(Json<Item>,)> = sqlx::query_as("SELECT doc FROM items ORDER BY id")
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(|(doc,)| doc.0).collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Item>, StoreError> {
        let Some(key) = parse_item_id(id) else {
            return Ok(None);
        };

        let row: Option<(Json<Item>,)> = sqlx::query_as("SELECT doc FROM items WHERE id = $1")
            .bind(key)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|(doc,)| doc.0))
    }

    async fn insert_next(&self, draft: NewItem, date_added: i64) -> Result<Item, StoreError> {
        let mut tx = self.pool.begin().await?;

        // Blocks other creators until commit; readers are unaffected.
        sqlx::query("LOCK TABLE items IN SHARE ROW EXCLUSIVE MODE")
            .execute(&mut *tx)
            .await?;

        let next_id: i64 = sqlx::query_scalar("SELECT COALESCE(MAX(id), 0) + 1 FROM items")
            .fetch_one(&mut *tx)
            .await?;

        let item = draft.into_item(next_id, date_added);

        sqlx::query("INSERT INTO items (id, doc) VALUES ($1, $2)")
            .bind(next_id)
            .bind(Json(&item))
            .execute(&mut *tx)
            .await
            .map_err(|e| StoreError::from_write(e, &item.id))?;

        tx.commit().await?;

        tracing::debug!("Inserted item document {}", item.id);
        Ok(item)
    }

    async fn replace(&self, item: &Item) -> Result<Option<Item>, StoreError> {
        let Some(key) = item.numeric_id() else {
            return Ok(None);
        };

        let row: Option<(Json<Item>,)> =
            sqlx::query_as("UPDATE items SET doc = $1 WHERE id = $2 RETURNING doc")
                .bind(Json(item))
                .bind(key)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|(doc,)| doc.0))
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let Some(key) = parse_item_id(id) else {
            return Ok(false);
        };

        let result = sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// In-process store with the same semantics as the PostgreSQL one
#[derive(Default)]
pub struct InMemoryItemRepository {
    items: RwLock<BTreeMap<i64, Item>>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        Ok(self.items.read().await.values().cloned().collect())
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Item>, StoreError> {
        let Some(key) = parse_item_id(id) else {
            return Ok(None);
        };
        Ok(self.items.read().await.get(&key).cloned())
    }

    async fn insert_next(&self, draft: NewItem, date_added: i64) -> Result<Item, StoreError> {
        let mut items = self.items.write().await;
        let next_id = items.keys().next_back().map_or(1, |max| max + 1);
        let item = draft.into_item(next_id, date_added);
        items.insert(next_id, item.clone());
        Ok(item)
    }

    async fn replace(&self, item: &Item) -> Result<Option<Item>, StoreError> {
        let Some(key) = item.numeric_id() else {
            return Ok(None);
        };

        let mut items = self.items.write().await;
        match items.get_mut(&key) {
            Some(stored) => {
                *stored = item.clone();
                Ok(Some(stored.clone()))
            }
            None => Ok(None),
        }
    }

    async fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let Some(key) = parse_item_id(id) else {
            return Ok(false);
        };
        Ok(self.items.write().await.remove(&key).is_some())
    }
}
