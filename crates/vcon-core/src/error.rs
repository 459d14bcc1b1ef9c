use thiserror::Error;

/// Error taxonomy (§7). `FilterOut` is deliberately absent here — it is a successful
/// terminal outcome, not an error, and is modeled as `LinkOutcome::Filter` instead.
#[derive(Debug, Error, Clone)]
pub enum CoreError {
    #[error("vcon {uuid} popped from {ingress} but not found in the vcon store")]
    VconMissing { uuid: String, ingress: String },

    #[error("link {link} failed: {reason}")]
    LinkFailure { link: String, reason: String },

    #[error("storage failure under fail_chain policy: {0:?}")]
    StorageFailure(Vec<StorageFailureDetail>),

    #[error("egress push to {list} exhausted {attempts} retries: {reason}")]
    EgressFailure {
        list: String,
        attempts: u32,
        reason: String,
    },

    #[error("admission rejected: {0}")]
    AdmissionRejected(String),

    #[error("queue substrate error: {0}")]
    SubstrateError(String),

    #[error("fatal configuration error: {0}")]
    Fatal(String),
}

#[derive(Debug, Clone)]
pub struct StorageFailureDetail {
    pub storage: String,
    pub reason: String,
}

impl CoreError {
    pub fn link_failure(link: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::LinkFailure {
            link: link.into(),
            reason: reason.into(),
        }
    }

    pub fn substrate(reason: impl Into<String>) -> Self {
        CoreError::SubstrateError(reason.into())
    }

    pub fn fatal(reason: impl Into<String>) -> Self {
        CoreError::Fatal(reason.into())
    }

    /// The DLQ metadata reason string for this error, matching the literal reasons
    /// named in §4.2 and the S1-S6 test scenarios (`vcon_not_found`, `link_failure`,
    /// `storage_failure`).
    pub fn dlq_reason(&self) -> String {
        match self {
            CoreError::VconMissing { .. } => "vcon_not_found".to_string(),
            CoreError::LinkFailure { .. } => "link_failure".to_string(),
            CoreError::StorageFailure(_) => "storage_failure".to_string(),
            CoreError::EgressFailure { .. } => "egress_failure".to_string(),
            CoreError::AdmissionRejected(_) => "admission_rejected".to_string(),
            CoreError::SubstrateError(_) => "substrate_error".to_string(),
            CoreError::Fatal(_) => "fatal".to_string(),
        }
    }

    pub fn failing_link(&self) -> Option<String> {
        match self {
            CoreError::LinkFailure { link, .. } => Some(link.clone()),
            _ => None,
        }
    }
}

pub type CoreResult<T> = Result<T, CoreError>;
