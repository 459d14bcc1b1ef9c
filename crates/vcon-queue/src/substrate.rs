use std::time::Duration;

use async_trait::async_trait;
use deadpool_redis::Pool;
use redis::AsyncCommands;
use vcon_core::{CoreError, CoreResult, Popped, QueueSubstrate, VconDocument};

/// Redis-backed implementation of the §6.3 queue substrate contract. Built on
/// `deadpool-redis` so the pool sizing rule in §5 (`total_workers * (1 +
/// storage_parallelism)`) is a constructor argument, not hardcoded.
pub struct RedisQueueSubstrate {
    pool: Pool,
}

impl RedisQueueSubstrate {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> CoreResult<deadpool_redis::Connection> {
        self.pool
            .get()
            .await
            .map_err(|e| CoreError::substrate(format!("pool checkout failed: {e}")))
    }
}

#[async_trait]
impl QueueSubstrate for RedisQueueSubstrate {
    async fn push_right(&self, list: &str, value: &str) -> CoreResult<()> {
        let mut conn = self.conn().await?;
        conn.rpush::<_, _, ()>(list, value)
            .await
            .map_err(|e| CoreError::substrate(format!("RPUSH {list} failed: {e}")))
    }

    async fn push_left(&self, list: &str, value: &str) -> CoreResult<()> {
        let mut conn = self.conn().await?;
        conn.lpush::<_, _, ()>(list, value)
            .await
            .map_err(|e| CoreError::substrate(format!("LPUSH {list} failed: {e}")))
    }

    async fn blocking_pop_left(
        &self,
        lists: &[String],
        timeout: Duration,
    ) -> CoreResult<Option<Popped>> {
        let mut conn = self.conn().await?;
        let result: Option<(String, String)> = conn
            .blpop(lists, timeout.as_secs_f64())
            .await
            .map_err(|e| CoreError::substrate(format!("BLPOP {lists:?} failed: {e}")))?;
        Ok(result.map(|(list, value)| Popped { list, value }))
    }

    async fn llen(&self, list: &str) -> CoreResult<u64> {
        let mut conn = self.conn().await?;
        conn.llen(list)
            .await
            .map_err(|e| CoreError::substrate(format!("LLEN {list} failed: {e}")))
    }

    async fn atomic_move(&self, src_list: &str, dst_list: &str) -> CoreResult<Option<String>> {
        let mut conn = self.conn().await?;
        conn.rpoplpush(src_list, dst_list)
            .await
            .map_err(|e| CoreError::substrate(format!("RPOPLPUSH {src_list}->{dst_list} failed: {e}")))
    }

    async fn json_put(&self, key: &str, doc: &VconDocument) -> CoreResult<()> {
        let mut conn = self.conn().await?;
        let payload = serde_json::to_string(doc)
            .map_err(|e| CoreError::substrate(format!("serialize {key} failed: {e}")))?;
        conn.set::<_, _, ()>(key, payload)
            .await
            .map_err(|e| CoreError::substrate(format!("SET {key} failed: {e}")))
    }

    async fn json_get(&self, key: &str) -> CoreResult<Option<VconDocument>> {
        let mut conn = self.conn().await?;
        let payload: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| CoreError::substrate(format!("GET {key} failed: {e}")))?;
        match payload {
            None => Ok(None),
            Some(raw) => serde_json::from_str(&raw)
                .map(Some)
                .map_err(|e| CoreError::substrate(format!("deserialize {key} failed: {e}"))),
        }
    }

    async fn delete(&self, key: &str) -> CoreResult<()> {
        let mut conn = self.conn().await?;
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| CoreError::substrate(format!("DEL {key} failed: {e}")))
    }

    async fn expire(&self, key: &str, ttl_seconds: u64) -> CoreResult<()> {
        let mut conn = self.conn().await?;
        conn.expire::<_, ()>(key, ttl_seconds as i64)
            .await
            .map_err(|e| CoreError::substrate(format!("EXPIRE {key} failed: {e}")))
    }

    async fn string_set(&self, key: &str, value: &str) -> CoreResult<()> {
        let mut conn = self.conn().await?;
        conn.set::<_, _, ()>(key, value)
            .await
            .map_err(|e| CoreError::substrate(format!("SET {key} failed: {e}")))
    }

    async fn string_get(&self, key: &str) -> CoreResult<Option<String>> {
        let mut conn = self.conn().await?;
        conn.get(key)
            .await
            .map_err(|e| CoreError::substrate(format!("GET {key} failed: {e}")))
    }

    async fn list_range(&self, list: &str) -> CoreResult<Vec<String>> {
        let mut conn = self.conn().await?;
        conn.lrange(list, 0, -1)
            .await
            .map_err(|e| CoreError::substrate(format!("LRANGE {list} failed: {e}")))
    }

    async fn list_remove(&self, list: &str, value: &str) -> CoreResult<u64> {
        let mut conn = self.conn().await?;
        conn.lrem(list, 0, value)
            .await
            .map_err(|e| CoreError::substrate(format!("LREM {list} failed: {e}")))
    }
}
