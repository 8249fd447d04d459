// src/database.rs
use std::collections::HashMap;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::RwLock;

use crate::error::AppError;

pub const KEY_USERS: &str = "babyboss_users";
pub const KEY_CUSTOMERS: &str = "babyboss_customers";
pub const KEY_ORDERS: &str = "babyboss_orders";

pub async fn create_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}

/// Key-value persistence of whole collections. Each key holds one JSON array
/// that is overwritten on every mutation.
#[derive(Clone)]
pub enum LocalStore {
    Postgres(PgPool),
    Memory(Arc<RwLock<HashMap<String, String>>>),
}

impl LocalStore {
    pub fn in_memory() -> Self {
        LocalStore::Memory(Arc::new(RwLock::new(HashMap::new())))
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, AppError> {
        match self {
            LocalStore::Postgres(pool) => {
                let row: Option<(String,)> = sqlx::query_as("SELECT value FROM kv_store WHERE key = $1")
                    .bind(key)
                    .fetch_optional(pool)
                    .await?;
                Ok(row.map(|(value,)| value))
            }
            LocalStore::Memory(map) => Ok(map.read().await.get(key).cloned()),
        }
    }

    pub async fn set(&self, key: &str, value: String) -> Result<(), AppError> {
        match self {
            LocalStore::Postgres(pool) => {
                sqlx::query(
                    r#"INSERT INTO kv_store (key, value, updated_at)
                    VALUES ($1, $2, NOW())
                    ON CONFLICT (key) DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()"#,
                )
                .bind(key)
                .bind(value)
                .execute(pool)
                .await?;
                Ok(())
            }
            LocalStore::Memory(map) => {
                map.write().await.insert(key.to_string(), value);
                Ok(())
            }
        }
    }
}
