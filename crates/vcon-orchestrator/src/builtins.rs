//! In-memory `Link`/`Storage`/`Tracer` implementations for tests and as registry
//! defaults, mirroring the teacher's in-memory fixtures for examples and testing.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use tracing::info;
use uuid::Uuid;
use vcon_core::{CoreError, CoreResult, Link, LinkOutcome, Options, Storage, TraceEvent, Tracer, VconDocument};

/// Always succeeds, leaving the vcon untouched.
pub struct NoopLink;

#[async_trait]
impl Link for NoopLink {
    async fn run(&self, uuid: Uuid, _link_name: &str, _options: &Options) -> LinkOutcome {
        LinkOutcome::Continue(uuid)
    }
}

/// Always fails, for S2-style failure-path tests.
pub struct FailingLink {
    pub reason: String,
}

#[async_trait]
impl Link for FailingLink {
    async fn run(&self, _uuid: Uuid, link_name: &str, _options: &Options) -> LinkOutcome {
        LinkOutcome::Fail(CoreError::link_failure(link_name, self.reason.clone()))
    }
}

/// Always filters, for S3-style tests.
pub struct FilterLink;

#[async_trait]
impl Link for FilterLink {
    async fn run(&self, _uuid: Uuid, _link_name: &str, _options: &Options) -> LinkOutcome {
        LinkOutcome::Filter
    }
}

/// In-process map keyed by uuid. `save` reads the vcon store is not wired here on
/// purpose — these fixtures stand in for a real backend and just track which uuids
/// were "written", matching what the test scenarios in §8 assert against.
#[derive(Default)]
pub struct InMemoryStorage {
    written: Mutex<HashMap<Uuid, VconDocument>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, uuid: Uuid) -> bool {
        self.written.lock().expect("lock poisoned").contains_key(&uuid)
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn save(&self, uuid: Uuid, _options: &Options) -> CoreResult<()> {
        self.written
            .lock()
            .expect("lock poisoned")
            .insert(uuid, VconDocument::new(uuid));
        Ok(())
    }

    async fn get(&self, uuid: Uuid, _options: &Options) -> CoreResult<Option<VconDocument>> {
        Ok(self.written.lock().expect("lock poisoned").get(&uuid).cloned())
    }

    async fn delete(&self, uuid: Uuid, _options: &Options) -> CoreResult<()> {
        self.written.lock().expect("lock poisoned").remove(&uuid);
        Ok(())
    }
}

/// Always fails `save`, for S4-style partial-failure tests.
pub struct FailingStorage {
    pub reason: String,
}

#[async_trait]
impl Storage for FailingStorage {
    async fn save(&self, _uuid: Uuid, _options: &Options) -> CoreResult<()> {
        Err(CoreError::substrate(self.reason.clone()))
    }

    async fn get(&self, _uuid: Uuid, _options: &Options) -> CoreResult<Option<VconDocument>> {
        Ok(None)
    }

    async fn delete(&self, _uuid: Uuid, _options: &Options) -> CoreResult<()> {
        Ok(())
    }
}

/// Logs every trace event at info level via `tracing`, the teacher's default audit
/// sink for local runs.
pub struct LogTracer;

#[async_trait]
impl Tracer for LogTracer {
    async fn notify(&self, event: &TraceEvent) {
        info!(
            chain = event.chain,
            uuid = %event.uuid,
            links_run = ?event.links_run,
            duration_ms = event.duration_ms,
            outcome = ?event.outcome,
            "chain run complete"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn noop_link_continues() {
        let uuid = Uuid::new_v4();
        match NoopLink.run(uuid, "noop", &Options::new()).await {
            LinkOutcome::Continue(u) => assert_eq!(u, uuid),
            _ => panic!("expected continue"),
        }
    }

    #[tokio::test]
    async fn in_memory_storage_roundtrips() {
        let storage = InMemoryStorage::new();
        let uuid = Uuid::new_v4();
        storage.save(uuid, &Options::new()).await.unwrap();
        assert!(storage.contains(uuid));
        assert!(storage.get(uuid, &Options::new()).await.unwrap().is_some());
        storage.delete(uuid, &Options::new()).await.unwrap();
        assert!(!storage.contains(uuid));
    }
}
