use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;
use vcon_contracts::{ChainConfigDto, EgressFailurePolicy, RootConfigDto, StorageFailurePolicy};

use crate::error::{CoreError, CoreResult};
use crate::options::Options;
use crate::registry::Registries;
use crate::traits::{Link, Storage, Tracer};

/// §3 LinkBinding: a resolved link reference, options already merged per-binding
/// except for the per-WorkItem chain-inline overlay (kept separate so it can be
/// re-merged defensively without re-walking the registry).
#[derive(Clone)]
pub struct LinkBinding {
    pub name: String,
    pub callable: Arc<dyn Link>,
    pub merged_options: Options,
}

/// The validated, registry-resolved chain record the supervisor actually runs
/// (§3 ChainConfig, §9 "startup-time registry... ChainConfig holds resolved
/// bindings, not names, after validation").
pub struct ChainConfig {
    pub name: String,
    pub links: Vec<LinkBinding>,
    pub storages: Vec<(String, Arc<dyn Storage>, Options)>,
    pub ingress_lists: BTreeSet<String>,
    pub egress_lists: BTreeSet<String>,
    pub tracers: Vec<(String, Arc<dyn Tracer>)>,
    pub timeout: Duration,
    pub enabled: bool,
    pub workers: u32,
    pub max_workers: u32,
    pub parallel_storage: bool,
    pub storage_failure_policy: StorageFailurePolicy,
    pub egress_failure_policy: EgressFailurePolicy,
}

impl ChainConfig {
    /// Resolves one DTO against the process registries. Fails fast on any unknown
    /// name (§4.1 "resolves all link/storage/tracer names against their registries
    /// (fail fast on unknown names)").
    fn resolve(
        dto: &ChainConfigDto,
        registries: &Registries,
        root: &RootConfigDto,
    ) -> CoreResult<Self> {
        if dto.ingress_lists.is_empty() {
            return Err(CoreError::fatal(format!(
                "chain {}: ingress_lists must be non-empty",
                dto.name
            )));
        }

        let mut links = Vec::with_capacity(dto.links.len());
        for link_ref in &dto.links {
            let name = link_ref.name();
            let (callable, registry_options) = registries.links.get(name).ok_or_else(|| {
                CoreError::fatal(format!(
                    "chain {}: unknown link '{name}'",
                    dto.name
                ))
            })?;
            let inline = Options::from_map(link_ref.inline_options());
            let merged = Options::merge(&[registry_options, &inline]);
            links.push(LinkBinding {
                name: name.to_string(),
                callable,
                merged_options: merged,
            });
        }

        let mut storages = Vec::with_capacity(dto.storages.len());
        for name in &dto.storages {
            let (callable, options) = registries.storages.get(name).ok_or_else(|| {
                CoreError::fatal(format!("chain {}: unknown storage '{name}'", dto.name))
            })?;
            storages.push((name.clone(), callable, options.clone()));
        }

        let mut tracers = Vec::with_capacity(dto.tracers.len());
        for name in &dto.tracers {
            let (callable, _options) = registries.tracers.get(name).ok_or_else(|| {
                CoreError::fatal(format!("chain {}: unknown tracer '{name}'", dto.name))
            })?;
            tracers.push((name.clone(), callable));
        }

        let workers = dto.workers.unwrap_or(root.workers_per_chain);
        let max_workers = dto.max_workers.unwrap_or(workers);

        Ok(ChainConfig {
            name: dto.name.clone(),
            links,
            storages,
            ingress_lists: dto.ingress_lists.clone(),
            egress_lists: dto.egress_lists.clone(),
            tracers,
            timeout: Duration::from_secs(dto.timeout_seconds),
            enabled: dto.enabled,
            workers: workers.min(max_workers),
            max_workers,
            parallel_storage: dto.parallel_storage.unwrap_or(root.parallel_storage),
            storage_failure_policy: dto
                .storage_failure_policy
                .unwrap_or(root.storage_failure_policy),
            egress_failure_policy: dto
                .egress_failure_policy
                .unwrap_or(root.egress_failure_policy),
        })
    }
}

/// The validated, process-wide configuration the supervisor starts from.
pub struct RootConfig {
    pub chains: Vec<ChainConfig>,
    pub global_api_keys: HashSet<String>,
    pub ingress_auth: HashMap<String, HashSet<String>>,
    pub shutdown_grace: Duration,
    pub storage_timeout: Duration,
    pub link_timeout: Duration,
    pub tracer_timeout: Duration,
    pub egress_retries: u32,
    pub api_header_name: String,
}

impl RootConfig {
    /// Validates and resolves a `RootConfigDto`: name uniqueness, ingress-ownership
    /// uniqueness (§3 invariant: "a single ingress list belongs to at most one
    /// enabled chain at any time... duplicates raise a startup error"), and registry
    /// lookups. All failures here are fatal per §4.1.
    pub fn resolve(dto: &RootConfigDto, registries: &Registries) -> CoreResult<Self> {
        let mut seen_names = HashSet::new();
        let mut claimed_ingress: HashMap<String, String> = HashMap::new();
        let mut chains = Vec::with_capacity(dto.chains.len());

        for chain_dto in &dto.chains {
            if !seen_names.insert(chain_dto.name.clone()) {
                return Err(CoreError::fatal(format!(
                    "duplicate chain name '{}'",
                    chain_dto.name
                )));
            }

            let resolved = ChainConfig::resolve(chain_dto, registries, dto)?;

            if resolved.enabled {
                for ingress in &resolved.ingress_lists {
                    if let Some(owner) = claimed_ingress.get(ingress) {
                        return Err(CoreError::fatal(format!(
                            "ingress list '{ingress}' claimed by both '{owner}' and '{}'",
                            resolved.name
                        )));
                    }
                    claimed_ingress.insert(ingress.clone(), resolved.name.clone());
                }
            }

            chains.push(resolved);
        }

        Ok(RootConfig {
            chains,
            global_api_keys: dto.global_api_keys.iter().cloned().collect(),
            ingress_auth: dto
                .ingress_auth
                .iter()
                .map(|(k, v)| (k.clone(), v.iter().cloned().collect()))
                .collect(),
            shutdown_grace: Duration::from_secs(dto.shutdown_grace_seconds),
            storage_timeout: Duration::from_secs(dto.storage_timeout_seconds),
            link_timeout: Duration::from_secs(dto.link_timeout_seconds),
            tracer_timeout: Duration::from_secs(dto.tracer_timeout_seconds),
            egress_retries: dto.egress_retries,
            api_header_name: dto.api_header_name.clone(),
        })
    }
}

/// §3 WorkItem: transient record a worker holds while owning one uuid.
#[derive(Debug, Clone)]
pub struct WorkItem {
    pub chain_name: String,
    pub ingress_name: String,
    pub uuid: Uuid,
    pub dequeue_time: chrono::DateTime<chrono::Utc>,
    pub attempt_count: u32,
}
