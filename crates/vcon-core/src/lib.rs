//! Core pipeline abstractions: the vCon model, chain configuration, and the
//! Link/Storage/Tracer/QueueSubstrate trait contracts. No I/O lives here; `vcon-queue`
//! and `vcon-orchestrator` provide the concrete implementations this crate only
//! declares the shape of.

pub mod config;
pub mod error;
pub mod observability;
pub mod options;
pub mod outcome;
pub mod registry;
pub mod traits;
pub mod vcon;

pub use config::{ChainConfig, LinkBinding, RootConfig, WorkItem};
pub use error::{CoreError, CoreResult, StorageFailureDetail};
pub use observability::{Metrics, NoopMetrics};
pub use options::Options;
pub use outcome::{FinalOutcome, LinkOutcome};
pub use registry::{LinkRegistry, Registries, StorageRegistry, TracerRegistry};
pub use traits::{Link, Popped, QueueSubstrate, Storage, Tracer, TraceEvent};
pub use vcon::{Tag, VconDocument};
