use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use vcon_contracts::RootConfigDto;
use vcon_core::{CoreResult, QueueSubstrate, Registries, RootConfig};
use vcon_queue::VconStore;

use crate::chain::run_worker;

/// §4.1 Supervisor. Owns the lifecycle of every chain runtime: startup validation,
/// spawning worker pools, routing shutdown, and draining in flight work.
pub struct Supervisor {
    config: Arc<RootConfig>,
    workers: Vec<JoinHandle<()>>,
    shutdown_tx: watch::Sender<bool>,
}

impl Supervisor {
    /// `start(config)`: validates and resolves the config, asserts ingress
    /// uniqueness, spawns per-chain worker pools, and returns only after every
    /// runtime has been spawned (§4.1). Startup errors are fatal and returned, not
    /// logged-and-continued.
    pub async fn start(
        config_dto: &RootConfigDto,
        registries: Registries,
        substrate: Arc<dyn QueueSubstrate>,
    ) -> CoreResult<Self> {
        // `registries` is only needed to resolve names into callables; the resolved
        // config holds `Arc<dyn Link/Storage/Tracer>` clones directly, so the
        // registry itself can be dropped once resolution completes.
        let config = Arc::new(RootConfig::resolve(config_dto, &registries)?);
        let store = VconStore::new(substrate.clone());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut workers = Vec::new();

        for chain in &config.chains {
            if !chain.enabled {
                info!(chain = %chain.name, "chain disabled, not starting workers");
                continue;
            }
            // §9 open question resolution: workers_per_chain=0 means the chain is
            // passive; no pops occur, but the chain is still considered "started".
            if chain.workers == 0 {
                info!(chain = %chain.name, "chain configured with 0 workers, passive");
                continue;
            }

            for slot in 0..chain.workers {
                let chain_name = chain.name.clone();
                let substrate = substrate.clone();
                let store = store.clone();
                let config = config.clone();
                let mut shutdown_rx = shutdown_rx.clone();

                let handle = tokio::spawn(async move {
                    let chain_cfg = config
                        .chains
                        .iter()
                        .find(|c| c.name == chain_name)
                        .expect("chain present in resolved config");
                    run_worker(slot, chain_cfg, &config, store, substrate, &mut shutdown_rx).await;
                });
                workers.push(handle);
            }
            info!(chain = %chain.name, workers = chain.workers, "chain runtime started");
        }

        Ok(Self {
            config,
            workers,
            shutdown_tx,
        })
    }

    /// `stop()`: signals workers to stop accepting new work, waits up to
    /// `shutdown_grace` for in-flight WorkItems, then forces termination. Any
    /// WorkItem still in flight at force-termination is returned to its ingress
    /// list head by `InFlightGuard::drop`, not DLQ'd (§4.1, §5).
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        let grace = self.config.shutdown_grace;
        let abort_handles: Vec<_> = self.workers.iter().map(JoinHandle::abort_handle).collect();

        if tokio::time::timeout(grace, join_all(self.workers))
            .await
            .is_ok()
        {
            info!("all chain workers drained cleanly");
        } else {
            warn!(
                grace_seconds = grace.as_secs(),
                "shutdown grace elapsed, forcing worker termination"
            );
            for handle in abort_handles {
                handle.abort();
            }
        }
    }

    pub fn config(&self) -> &RootConfig {
        &self.config
    }

    /// Clones the shared handle to the resolved config, for callers (the HTTP
    /// surface) that need to hold it independently of the supervisor's lifetime.
    pub fn config_arc(&self) -> Arc<RootConfig> {
        self.config.clone()
    }
}

async fn join_all(handles: Vec<JoinHandle<()>>) {
    for handle in handles {
        let _ = handle.await;
    }
}

/// A short poll timeout on the ingress blocking pop so shutdown stays responsive
/// (§5: "(a) observes a short poll timeout so shutdown is responsive (<= 1 s)").
pub const INGRESS_POLL_TIMEOUT: Duration = Duration::from_millis(900);
