//! Chain runtime: the supervisor, per-chain worker pools, storage fan-out, and the
//! DLQ manager. Built-in link/storage/tracer fixtures live in `builtins` for tests
//! and as registry defaults.

pub mod builtins;
pub mod chain;
pub mod dlq;
pub mod storage_fanout;
pub mod supervisor;

pub use dlq::{dlq_push, DlqManager};
pub use supervisor::Supervisor;
