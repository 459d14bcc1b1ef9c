use async_trait::async_trait;
use uuid::Uuid;

use crate::error::CoreResult;
use crate::options::Options;
use crate::outcome::LinkOutcome;
use crate::vcon::VconDocument;

/// §4.3 link contract. Object-safe so the registry can hold `Box<dyn Link>`, matching
/// the teacher's `Box<dyn Workflow>` pattern.
#[async_trait]
pub trait Link: Send + Sync {
    /// `run(uuid, link_name, options) -> string | FILTER_OUT | raises`. The link may
    /// mutate the vcon in the store; it returns the outcome tag, never the document
    /// itself (§4.3).
    async fn run(&self, uuid: Uuid, link_name: &str, options: &Options) -> LinkOutcome;
}

/// §4.5 storage contract.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn save(&self, uuid: Uuid, options: &Options) -> CoreResult<()>;
    async fn get(&self, uuid: Uuid, options: &Options) -> CoreResult<Option<VconDocument>>;
    async fn delete(&self, uuid: Uuid, options: &Options) -> CoreResult<()>;
}

/// A compact audit event a chain run hands to every tracer (§4.2 step 6, §4.6).
#[derive(Debug, Clone, serde::Serialize)]
pub struct TraceEvent {
    pub chain: String,
    pub uuid: Uuid,
    pub links_run: Vec<String>,
    pub duration_ms: u64,
    pub outcome: crate::outcome::FinalOutcome,
}

/// §4.6 tracer contract: best-effort, no error propagation to the worker.
#[async_trait]
pub trait Tracer: Send + Sync {
    async fn notify(&self, event: &TraceEvent);
}

/// One selected (list, value) pair from a multi-list blocking pop (§6.3).
#[derive(Debug, Clone)]
pub struct Popped {
    pub list: String,
    pub value: String,
}

/// §6.3 queue substrate contract. `vcon-queue` is the Redis-backed implementation;
/// `vcon-core` only owns the contract so the orchestrator stays substrate-agnostic.
#[async_trait]
pub trait QueueSubstrate: Send + Sync {
    async fn push_right(&self, list: &str, value: &str) -> CoreResult<()>;
    async fn push_left(&self, list: &str, value: &str) -> CoreResult<()>;

    /// Blocking pop across multiple lists with a timeout; selects the first
    /// non-empty list in declared order (§6.3, §4.2 ingress fairness).
    async fn blocking_pop_left(
        &self,
        lists: &[String],
        timeout: std::time::Duration,
    ) -> CoreResult<Option<Popped>>;

    async fn llen(&self, list: &str) -> CoreResult<u64>;

    /// Pops the tail of `src_list` and pushes it to the head of `dst_list`
    /// atomically (Redis `RPOPLPUSH` semantics); returns `None` if `src_list` was
    /// empty. Repeated calls move items one at a time while preserving their
    /// original relative order at the head of `dst_list` (§6.3, §4.8 DLQ reprocess,
    /// S6: `DLQ:in1=[u4,u5]` reprocesses to `in1` head `u4`, next `u5`).
    async fn atomic_move(&self, src_list: &str, dst_list: &str) -> CoreResult<Option<String>>;

    async fn json_put(&self, key: &str, doc: &VconDocument) -> CoreResult<()>;
    async fn json_get(&self, key: &str) -> CoreResult<Option<VconDocument>>;
    async fn delete(&self, key: &str) -> CoreResult<()>;
    async fn expire(&self, key: &str, ttl_seconds: u64) -> CoreResult<()>;

    /// Raw string kv, used for out-of-band metadata blobs that aren't vcon-shaped
    /// (§3 DLQ entry metadata record at `DLQ:<ingress>:<uuid>`).
    async fn string_set(&self, key: &str, value: &str) -> CoreResult<()>;
    async fn string_get(&self, key: &str) -> CoreResult<Option<String>>;

    /// Lists all entries currently in `list`, head to tail, without removing them.
    /// Used by the DLQ manager's `list` operation (§4.8) and not part of the
    /// minimal §6.3 contract, but every substrate backing a list naturally supports
    /// a non-destructive range read.
    async fn list_range(&self, list: &str) -> CoreResult<Vec<String>>;

    /// Removes a specific value from `list` wherever it occurs. Used by DLQ purge
    /// of a single uuid (§4.8).
    async fn list_remove(&self, list: &str, value: &str) -> CoreResult<u64>;
}
