//! Wire types shared between the admission API and the orchestrator.
//!
//! Nothing in this crate does I/O or holds behavior; it exists so `vcon-api` and
//! `vcon-orchestrator` agree on one definition of the config/DLQ/admission shapes
//! without either depending on the other.

mod admission;
mod chain_config;
mod dlq;

pub use admission::*;
pub use chain_config::*;
pub use dlq::*;
