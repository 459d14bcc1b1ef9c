use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use vcon_core::{CoreResult, Popped, QueueSubstrate, VconDocument};

/// A trivial in-memory substrate for integration tests, implementing the same
/// contract `RedisQueueSubstrate` does (§6.3) without a real Redis.
#[derive(Default)]
pub struct InMemorySubstrate {
    lists: Mutex<HashMap<String, VecDeque<String>>>,
    docs: Mutex<HashMap<String, VconDocument>>,
    strings: Mutex<HashMap<String, String>>,
}

impl InMemorySubstrate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn list_contents(&self, list: &str) -> Vec<String> {
        self.lists
            .lock()
            .unwrap()
            .get(list)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .collect()
    }
}

#[async_trait]
impl QueueSubstrate for InMemorySubstrate {
    async fn push_right(&self, list: &str, value: &str) -> CoreResult<()> {
        self.lists
            .lock()
            .unwrap()
            .entry(list.to_string())
            .or_default()
            .push_back(value.to_string());
        Ok(())
    }

    async fn push_left(&self, list: &str, value: &str) -> CoreResult<()> {
        self.lists
            .lock()
            .unwrap()
            .entry(list.to_string())
            .or_default()
            .push_front(value.to_string());
        Ok(())
    }

    async fn blocking_pop_left(
        &self,
        lists: &[String],
        timeout: Duration,
    ) -> CoreResult<Option<Popped>> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            {
                let mut guard = self.lists.lock().unwrap();
                for list in lists {
                    if let Some(value) = guard.entry(list.clone()).or_default().pop_front() {
                        return Ok(Some(Popped {
                            list: list.clone(),
                            value,
                        }));
                    }
                }
            }
            if tokio::time::Instant::now() >= deadline {
                return Ok(None);
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    async fn llen(&self, list: &str) -> CoreResult<u64> {
        Ok(self
            .lists
            .lock()
            .unwrap()
            .get(list)
            .map(|l| l.len() as u64)
            .unwrap_or(0))
    }

    async fn atomic_move(&self, src_list: &str, dst_list: &str) -> CoreResult<Option<String>> {
        let mut guard = self.lists.lock().unwrap();
        let popped = guard.entry(src_list.to_string()).or_default().pop_back();
        if let Some(ref value) = popped {
            guard
                .entry(dst_list.to_string())
                .or_default()
                .push_front(value.clone());
        }
        Ok(popped)
    }

    async fn json_put(&self, key: &str, doc: &VconDocument) -> CoreResult<()> {
        self.docs.lock().unwrap().insert(key.to_string(), doc.clone());
        Ok(())
    }

    async fn json_get(&self, key: &str) -> CoreResult<Option<VconDocument>> {
        Ok(self.docs.lock().unwrap().get(key).cloned())
    }

    async fn delete(&self, key: &str) -> CoreResult<()> {
        self.docs.lock().unwrap().remove(key);
        self.strings.lock().unwrap().remove(key);
        Ok(())
    }

    async fn expire(&self, _key: &str, _ttl_seconds: u64) -> CoreResult<()> {
        Ok(())
    }

    async fn string_set(&self, key: &str, value: &str) -> CoreResult<()> {
        self.strings
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn string_get(&self, key: &str) -> CoreResult<Option<String>> {
        Ok(self.strings.lock().unwrap().get(key).cloned())
    }

    async fn list_range(&self, list: &str) -> CoreResult<Vec<String>> {
        Ok(self.list_contents(list))
    }

    async fn list_remove(&self, list: &str, value: &str) -> CoreResult<u64> {
        let mut guard = self.lists.lock().unwrap();
        let entry = guard.entry(list.to_string()).or_default();
        let before = entry.len();
        entry.retain(|v| v != value);
        Ok((before - entry.len()) as u64)
    }
}
