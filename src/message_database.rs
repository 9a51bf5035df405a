use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use thiserror::Error;

use crate::config::DatabaseSettings;

#[derive(Debug, Clone)]
#[derive(Serialize, Deserialize)]
#[derive(sqlx::FromRow)]
pub struct Message {
    pub id: i64,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

pub type Messages = Vec<Message>;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence boundary for messages. Handlers only see this trait, so the
/// concrete backend can be swapped for an in-memory double in tests.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn list(&self) -> Result<Messages, StoreError>;
    async fn get(&self, id: i64) -> Result<Option<Message>, StoreError>;
    async fn insert(&self, text: &str) -> Result<(), StoreError>;
    /// Silent no-op when `id` does not exist.
    async fn update(&self, id: i64, text: &str) -> Result<(), StoreError>;
    /// Silent no-op when `id` does not exist.
    async fn delete(&self, id: i64) -> Result<(), StoreError>;
    async fn now(&self) -> Result<DateTime<Utc>, StoreError>;
    async fn close(&self);
}

pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self, StoreError> {
        let options = PgConnectOptions::new()
            .host(&settings.host)
            .port(settings.port)
            .username(&settings.user)
            .password(&settings.password)
            .database(&settings.database);

        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS messages (
                id BIGSERIAL PRIMARY KEY,
                text TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )",
        )
        .execute(&pool)
        .await?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn list(&self) -> Result<Messages, StoreError> {
        let messages = sqlx::query_as::<_, Message>(
            "SELECT id, text, created_at FROM messages ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(messages)
    }

    async fn get(&self, id: i64) -> Result<Option<Message>, StoreError> {
        let message = sqlx::query_as::<_, Message>(
            "SELECT id, text, created_at FROM messages WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(message)
    }

    async fn insert(&self, text: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO messages(text) VALUES($1)")
            .bind(text)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update(&self, id: i64, text: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE messages SET text = $1 WHERE id = $2")
            .bind(text)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM messages WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn now(&self) -> Result<DateTime<Utc>, StoreError> {
        let now: DateTime<Utc> = sqlx::query_scalar("SELECT NOW()")
            .fetch_one(&self.pool)
            .await?;
        Ok(now)
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}


#[cfg(test)]
mod tests {
    use super::mem::MemStore;
    use super::*;

    #[actix_web::test]
    async fn insert_then_list_roundtrips() {
        let store = MemStore::new();
        store.insert("hello").await.unwrap();

        let messages = store.list().await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "hello");
        assert!(messages[0].id > 0);
    }

    #[actix_web::test]
    async fn list_orders_by_id_descending() {
        let store = MemStore::new();
        store.insert("A").await.unwrap();
        store.insert("B").await.unwrap();
        store.insert("C").await.unwrap();

        let texts: Vec<String> = store
            .list()
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(texts, vec!["C", "B", "A"]);
    }

    #[actix_web::test]
    async fn delete_of_missing_id_is_a_noop() {
        let store = MemStore::new();
        store.insert("keep me").await.unwrap();

        store.delete(999999).await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[actix_web::test]
    async fn update_of_missing_id_leaves_store_unchanged() {
        let store = MemStore::new();
        store.insert("original").await.unwrap();

        store.update(5, "new").await.unwrap();

        let messages = store.list().await.unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "original");
    }

    #[actix_web::test]
    async fn update_changes_text_but_not_id_or_created_at() {
        let store = MemStore::new();
        store.insert("before").await.unwrap();

        let original = store.list().await.unwrap().remove(0);
        store.update(original.id, "after").await.unwrap();

        let updated = store.get(original.id).await.unwrap().unwrap();
        assert_eq!(updated.text, "after");
        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
    }
}
