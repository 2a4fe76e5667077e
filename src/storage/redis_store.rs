// src/storage/redis_store.rs
use async_trait::async_trait;
use redis::Client;
use thiserror::Error;

use crate::errors::{RidelineError as AppError, RidelineResult};
use crate::storage::{DocumentWrite, StoreBackend};

#[derive(Debug, Error)]
pub enum RedisStoreError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Operation error: {0}")]
    Operation(String),
}

impl From<RedisStoreError> for AppError {
    fn from(error: RedisStoreError) -> Self {
        match error {
            RedisStoreError::Connection(msg) => AppError::StoreConnection(msg),
            RedisStoreError::Operation(msg) => AppError::StoreQuery(msg),
        }
    }
}

/// Redis-backed document store. Documents are JSON strings; batch writes go
/// through an atomic MULTI/EXEC pipeline.
pub struct RedisBackend {
    client: Client,
}

impl RedisBackend {
    pub fn new(redis_url: &str) -> RidelineResult<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| RedisStoreError::Connection(e.to_string()))?;
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<redis::aio::Connection, RedisStoreError> {
        self.client
            .get_async_connection()
            .await
            .map_err(|e| RedisStoreError::Connection(e.to_string()))
    }
}

#[async_trait]
impl StoreBackend for RedisBackend {
    async fn get(&self, key: &str) -> RidelineResult<Option<String>> {
        let mut conn = self.connection().await?;

        let value: Option<String> = redis::cmd("GET")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| RedisStoreError::Operation(e.to_string()))?;

        Ok(value)
    }

    async fn put(&self, key: &str, value: String) -> RidelineResult<()> {
        let mut conn = self.connection().await?;

        let _: () = redis::cmd("SET")
            .arg(key)
            .arg(value)
            .query_async(&mut conn)
            .await
            .map_err(|e| RedisStoreError::Operation(e.to_string()))?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> RidelineResult<()> {
        let mut conn = self.connection().await?;

        let _: () = redis::cmd("DEL")
            .arg(key)
            .query_async(&mut conn)
            .await
            .map_err(|e| RedisStoreError::Operation(e.to_string()))?;

        Ok(())
    }

    async fn scan(&self, prefix: &str) -> RidelineResult<Vec<String>> {
        let mut conn = self.connection().await?;

        let keys: Vec<String> = redis::cmd("KEYS")
            .arg(format!("{}*", prefix))
            .query_async(&mut conn)
            .await
            .map_err(|e| RedisStoreError::Operation(e.to_string()))?;

        if keys.is_empty() {
            return Ok(vec![]);
        }

        let mut sorted_keys = keys;
        sorted_keys.sort();

        let mut cmd = redis::cmd("MGET");
        for key in &sorted_keys {
            cmd.arg(key);
        }

        let values: Vec<Option<String>> = cmd
            .query_async(&mut conn)
            .await
            .map_err(|e| RedisStoreError::Operation(e.to_string()))?;

        Ok(values.into_iter().flatten().collect())
    }

    async fn put_many(&self, writes: Vec<DocumentWrite>) -> RidelineResult<()> {
        let mut conn = self.connection().await?;

        let mut pipe = redis::pipe();
        pipe.atomic();
        for write in &writes {
            pipe.cmd("SET").arg(&write.key).arg(&write.value).ignore();
        }

        let _: () = pipe
            .query_async(&mut conn)
            .await
            .map_err(|e| RedisStoreError::Operation(e.to_string()))?;

        Ok(())
    }
}
