use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use tokio::sync::watch;
use tracing::{debug, error, warn};
use uuid::Uuid;
use vcon_contracts::{EgressFailurePolicy, StorageFailurePolicy};
use vcon_core::{
    ChainConfig, CoreError, FinalOutcome, LinkOutcome, QueueSubstrate, RootConfig, TraceEvent,
    WorkItem,
};
use vcon_queue::VconStore;

use crate::dlq::dlq_push;
use crate::storage_fanout::fan_out;
use crate::supervisor::INGRESS_POLL_TIMEOUT;

/// Returns a value to its ingress list head if dropped without being marked done —
/// covers both graceful cancellation at an `.await` point and forced task abort
/// (§5 "Cancelled WorkItems are returned to the head of their originating ingress
/// list").
struct InFlightGuard {
    substrate: Arc<dyn QueueSubstrate>,
    list: String,
    value: String,
    done: bool,
}

impl InFlightGuard {
    fn mark_done(&mut self) {
        self.done = true;
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        if self.done {
            return;
        }
        let substrate = self.substrate.clone();
        let list = self.list.clone();
        let value = self.value.clone();
        tokio::spawn(async move {
            if let Err(e) = substrate.push_left(&list, &value).await {
                error!(list, "failed to return cancelled work item to ingress: {e}");
            }
        });
    }
}

/// One worker slot's loop (§4.2). `slot` is only used for log correlation.
pub async fn run_worker(
    slot: u32,
    chain_cfg: &ChainConfig,
    root_config: &RootConfig,
    store: VconStore,
    substrate: Arc<dyn QueueSubstrate>,
    shutdown_rx: &mut watch::Receiver<bool>,
) {
    let ingress_lists: Vec<String> = chain_cfg.ingress_lists.iter().cloned().collect();

    loop {
        if *shutdown_rx.borrow() {
            debug!(chain = %chain_cfg.name, slot, "shutdown observed, worker exiting");
            break;
        }

        let popped = match substrate
            .blocking_pop_left(&ingress_lists, INGRESS_POLL_TIMEOUT)
            .await
        {
            Ok(Some(p)) => p,
            Ok(None) => continue,
            Err(e) => {
                warn!(chain = %chain_cfg.name, slot, "substrate error on pop: {e}");
                tokio::time::sleep(jittered_backoff()).await;
                continue;
            }
        };

        let uuid = match Uuid::parse_str(&popped.value) {
            Ok(u) => u,
            Err(_) => {
                warn!(
                    chain = %chain_cfg.name,
                    list = popped.list,
                    value = popped.value,
                    "non-uuid value in ingress list, dropping"
                );
                continue;
            }
        };

        let mut guard = InFlightGuard {
            substrate: substrate.clone(),
            list: popped.list.clone(),
            value: popped.value.clone(),
            done: false,
        };

        let work_item = WorkItem {
            chain_name: chain_cfg.name.clone(),
            ingress_name: popped.list.clone(),
            uuid,
            dequeue_time: Utc::now(),
            attempt_count: 0,
        };

        process_work_item(chain_cfg, root_config, &store, substrate.as_ref(), &work_item).await;
        guard.mark_done();
    }
}

fn jittered_backoff() -> Duration {
    let jitter_ms = rand::thread_rng().gen_range(100..500);
    Duration::from_millis(jitter_ms)
}

/// Runs one vcon end-to-end through the chain (§4.2 steps 2-6) and handles its
/// terminal disposition (DLQ write on failure, tracer notification always). Never
/// propagates an error to the worker loop — every failure path here ends in a DLQ
/// write or a log.
async fn process_work_item(
    chain_cfg: &ChainConfig,
    root_config: &RootConfig,
    store: &VconStore,
    substrate: &dyn QueueSubstrate,
    work_item: &WorkItem,
) {
    let started = std::time::Instant::now();
    let (links_run, result) = match tokio::time::timeout(
        chain_cfg.timeout,
        run_chain(chain_cfg, root_config, store, substrate, work_item),
    )
    .await
    {
        Ok(outcome) => outcome,
        Err(_) => (
            Vec::new(),
            Err(CoreError::link_failure("<chain>", "timeout")),
        ),
    };

    let duration_ms = started.elapsed().as_millis() as u64;
    let final_outcome = match &result {
        Ok(true) => FinalOutcome::Success,
        Ok(false) => FinalOutcome::Filtered,
        Err(_) => FinalOutcome::Failed,
    };

    if let Err(ref err) = result {
        if let Err(e) = dlq_push(
            substrate,
            &work_item.ingress_name,
            work_item.uuid,
            &err.dlq_reason(),
            err.failing_link(),
            work_item.attempt_count + 1,
        )
        .await
        {
            error!(
                chain = %chain_cfg.name,
                uuid = %work_item.uuid,
                "failed to write DLQ entry: {e}"
            );
        }
    }

    notify_tracers(
        chain_cfg,
        root_config,
        TraceEvent {
            chain: chain_cfg.name.clone(),
            uuid: work_item.uuid,
            links_run,
            duration_ms,
            outcome: final_outcome,
        },
    )
    .await;
}

/// `Ok(true)` on success, `Ok(false)` on filter (§8 "FILTER_OUT at the first link: no
/// storage, no egress, no DLQ, vcon remains in V"), `Err(_)` on failure. The returned
/// `Vec<String>` always reflects exactly the links invoked, for the tracer event.
async fn run_chain(
    chain_cfg: &ChainConfig,
    root_config: &RootConfig,
    store: &VconStore,
    substrate: &dyn QueueSubstrate,
    work_item: &WorkItem,
) -> (Vec<String>, Result<bool, CoreError>) {
    let mut links_run = Vec::new();

    // §4.2 step 2: fetch the vcon; missing is vcon_not_found.
    match store.get(work_item.uuid).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            return (
                links_run,
                Err(CoreError::VconMissing {
                    uuid: work_item.uuid.to_string(),
                    ingress: work_item.ingress_name.clone(),
                }),
            )
        }
        Err(e) => return (links_run, Err(e)),
    }

    // §4.2 step 3: run links in declared order.
    for link in &chain_cfg.links {
        links_run.push(link.name.clone());

        // §9 open question resolution: per-link timeout <= chain timeout; the chain
        // timeout (enforced by the outer tokio::time::timeout in process_work_item)
        // is the hard deadline and always wins.
        let link_timeout = link
            .merged_options
            .get_u64("timeout")
            .map(Duration::from_secs)
            .unwrap_or(root_config.link_timeout)
            .min(chain_cfg.timeout);

        let outcome = tokio::time::timeout(
            link_timeout,
            link.callable
                .run(work_item.uuid, &link.name, &link.merged_options),
        )
        .await;

        match outcome {
            Ok(LinkOutcome::Continue(_)) => continue,
            Ok(LinkOutcome::Filter) => return (links_run, Ok(false)),
            Ok(LinkOutcome::Fail(e)) => return (links_run, Err(e)),
            Err(_) => {
                return (
                    links_run,
                    Err(CoreError::link_failure(link.name.clone(), "timeout")),
                )
            }
        }
    }

    // §4.4 storage fan-out.
    if !chain_cfg.storages.is_empty() {
        if let Err(failures) = fan_out(
            &chain_cfg.storages,
            work_item.uuid,
            chain_cfg.parallel_storage,
            root_config.storage_timeout,
        )
        .await
        {
            match chain_cfg.storage_failure_policy {
                StorageFailurePolicy::FailChain => {
                    return (links_run, Err(CoreError::StorageFailure(failures)))
                }
                StorageFailurePolicy::BestEffort => {
                    warn!(
                        chain = %chain_cfg.name,
                        uuid = %work_item.uuid,
                        ?failures,
                        "storage failures under best_effort policy, continuing"
                    );
                }
            }
        }
    }

    // §4.2 step 5: egress push with bounded linear-backoff retry.
    for list in &chain_cfg.egress_lists {
        if let Err(e) = push_egress_with_retry(substrate, list, root_config, work_item.uuid).await
        {
            match chain_cfg.egress_failure_policy {
                EgressFailurePolicy::FailChain => return (links_run, Err(e)),
                EgressFailurePolicy::LogAndContinue => {
                    warn!(chain = %chain_cfg.name, uuid = %work_item.uuid, list, "egress push exhausted retries, continuing: {e}");
                }
            }
        }
    }

    (links_run, Ok(true))
}

async fn push_egress_with_retry(
    substrate: &dyn QueueSubstrate,
    list: &str,
    root_config: &RootConfig,
    uuid: Uuid,
) -> Result<(), CoreError> {
    let mut last_err = String::new();
    for attempt in 0..=root_config.egress_retries {
        match substrate.push_right(list, &uuid.to_string()).await {
            Ok(()) => return Ok(()),
            Err(e) => {
                last_err = e.to_string();
                if attempt < root_config.egress_retries {
                    // linear backoff per §4.2
                    tokio::time::sleep(Duration::from_millis(200 * (attempt as u64 + 1))).await;
                }
            }
        }
    }
    Err(CoreError::EgressFailure {
        list: list.to_string(),
        attempts: root_config.egress_retries,
        reason: last_err,
    })
}

async fn notify_tracers(chain_cfg: &ChainConfig, root_config: &RootConfig, event: TraceEvent) {
    for (name, tracer) in &chain_cfg.tracers {
        let result =
            tokio::time::timeout(root_config.tracer_timeout, tracer.notify(&event)).await;
        if result.is_err() {
            warn!(chain = %chain_cfg.name, tracer = name, "tracer exceeded timeout, cancelled");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jittered_backoff_within_bounds() {
        for _ in 0..50 {
            let d = jittered_backoff();
            assert!(d.as_millis() >= 100 && d.as_millis() < 500);
        }
    }
}
