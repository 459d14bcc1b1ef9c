//! Redis-backed implementation of the queue substrate contract (`vcon_core::QueueSubstrate`)
//! plus the vCon store view built on top of it.

pub mod keys;
pub mod pool;
pub mod store;
pub mod substrate;

pub use pool::build_pool;
pub use store::VconStore;
pub use substrate::RedisQueueSubstrate;
