use uuid::Uuid;

use crate::error::CoreError;

/// Tagged outcome of a single link invocation (§9 Design Notes: prefer a tagged
/// variant over the source's null-return sentinel for FILTER_OUT).
#[derive(Debug, Clone)]
pub enum LinkOutcome {
    /// The link ran to completion; the vcon (possibly mutated in the store) keeps
    /// this uuid and the chain continues to the next link.
    Continue(Uuid),
    /// FILTER_OUT: stop processing immediately. No further links, no storage, no
    /// egress, no DLQ. This is a successful terminal outcome, not an error.
    Filter,
    /// The link raised or timed out; the worker stops the chain and DLQs.
    Fail(CoreError),
}

/// Final disposition of one chain run, reported to tracers (§4.6).
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalOutcome {
    Success,
    Filtered,
    Failed,
}
