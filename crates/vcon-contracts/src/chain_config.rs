use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A single link reference inside a chain: either a bare registry name, or a name
/// plus an inline option overlay (§3 LinkBinding, §9 option merging).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum LinkRefDto {
    Bare(String),
    WithOptions {
        name: String,
        #[serde(default)]
        options: BTreeMap<String, serde_json::Value>,
    },
}

impl LinkRefDto {
    pub fn name(&self) -> &str {
        match self {
            LinkRefDto::Bare(name) => name,
            LinkRefDto::WithOptions { name, .. } => name,
        }
    }

    pub fn inline_options(&self) -> BTreeMap<String, serde_json::Value> {
        match self {
            LinkRefDto::Bare(_) => BTreeMap::new(),
            LinkRefDto::WithOptions { options, .. } => options.clone(),
        }
    }
}

/// `storage_failure_policy` (§6.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StorageFailurePolicy {
    FailChain,
    BestEffort,
}

impl Default for StorageFailurePolicy {
    fn default() -> Self {
        StorageFailurePolicy::FailChain
    }
}

/// `egress_failure_policy` (§6.2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum EgressFailurePolicy {
    FailChain,
    LogAndContinue,
}

impl Default for EgressFailurePolicy {
    fn default() -> Self {
        EgressFailurePolicy::LogAndContinue
    }
}

/// The as-deserialized chain record (§3 ChainConfig). Unvalidated: names haven't been
/// resolved against any registry yet and ingress-list uniqueness hasn't been checked.
/// `vcon_core::config::ChainConfig::resolve` turns this into the validated form the
/// supervisor actually runs.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ChainConfigDto {
    pub name: String,
    #[serde(default)]
    pub links: Vec<LinkRefDto>,
    #[serde(default)]
    pub storages: BTreeSet<String>,
    pub ingress_lists: BTreeSet<String>,
    #[serde(default)]
    pub egress_lists: BTreeSet<String>,
    #[serde(default)]
    pub tracers: BTreeSet<String>,
    pub timeout_seconds: u64,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub workers: Option<u32>,
    #[serde(default)]
    pub max_workers: Option<u32>,
    #[serde(default)]
    pub parallel_storage: Option<bool>,
    #[serde(default)]
    pub storage_failure_policy: Option<StorageFailurePolicy>,
    #[serde(default)]
    pub egress_failure_policy: Option<EgressFailurePolicy>,
}

fn default_true() -> bool {
    true
}

/// The top-level validated record §6.2 describes as "consumed, not parsed" by the
/// core. An external loader produces this from a config file; the core only validates
/// and resolves it (`vcon_core::config::RootConfig::resolve`).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RootConfigDto {
    pub chains: Vec<ChainConfigDto>,
    #[serde(default)]
    pub global_api_keys: BTreeSet<String>,
    #[serde(default)]
    pub ingress_auth: BTreeMap<String, BTreeSet<String>>,
    #[serde(default)]
    pub parallel_storage: bool,
    #[serde(default = "default_workers_per_chain")]
    pub workers_per_chain: u32,
    #[serde(default = "default_shutdown_grace")]
    pub shutdown_grace_seconds: u64,
    #[serde(default = "default_storage_timeout")]
    pub storage_timeout_seconds: u64,
    #[serde(default = "default_link_timeout")]
    pub link_timeout_seconds: u64,
    #[serde(default = "default_tracer_timeout")]
    pub tracer_timeout_seconds: u64,
    #[serde(default)]
    pub storage_failure_policy: StorageFailurePolicy,
    #[serde(default = "default_egress_retries")]
    pub egress_retries: u32,
    #[serde(default)]
    pub egress_failure_policy: EgressFailurePolicy,
    #[serde(default = "default_api_header_name")]
    pub api_header_name: String,
}

fn default_workers_per_chain() -> u32 {
    1
}
fn default_shutdown_grace() -> u64 {
    30
}
fn default_storage_timeout() -> u64 {
    10
}
fn default_link_timeout() -> u64 {
    30
}
fn default_tracer_timeout() -> u64 {
    5
}
fn default_egress_retries() -> u32 {
    3
}
fn default_api_header_name() -> String {
    "x-conserver-api-token".to_string()
}
