use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};
use uuid::Uuid;
use vcon_contracts::DlqEntryDto;
use vcon_core::{CoreError, CoreResult, QueueSubstrate};
use vcon_queue::keys::{dlq_list_key, dlq_meta_key};

/// Moves a failed uuid into its ingress's DLQ with metadata (§3 DLQ entry, §4.2 step
/// 3/4). Called from the worker loop on any chain failure; never called for
/// `FilterOut`, which is a successful terminal outcome.
pub async fn dlq_push(
    substrate: &dyn QueueSubstrate,
    ingress_name: &str,
    uuid: Uuid,
    reason: &str,
    failing_link: Option<String>,
    attempt_count: u32,
) -> CoreResult<()> {
    let entry = DlqEntryDto {
        uuid,
        reason: reason.to_string(),
        failing_link,
        attempt_count,
        failed_at: Utc::now(),
    };
    let payload = serde_json::to_string(&entry)
        .map_err(|e| CoreError::substrate(format!("serialize dlq entry failed: {e}")))?;

    substrate
        .push_right(&dlq_list_key(ingress_name), &uuid.to_string())
        .await?;
    substrate
        .string_set(&dlq_meta_key(ingress_name, &uuid.to_string()), &payload)
        .await?;

    warn!(ingress = ingress_name, %uuid, reason, "vcon moved to DLQ");
    Ok(())
}

/// §4.8 DLQ manager: list, reprocess, purge.
pub struct DlqManager {
    substrate: Arc<dyn QueueSubstrate>,
}

impl DlqManager {
    pub fn new(substrate: Arc<dyn QueueSubstrate>) -> Self {
        Self { substrate }
    }

    /// `list(ingress_name)` -> ordered UUIDs plus per-UUID metadata.
    pub async fn list(&self, ingress_name: &str) -> CoreResult<Vec<DlqEntryDto>> {
        let uuids = self.substrate.list_range(&dlq_list_key(ingress_name)).await?;
        let mut entries = Vec::with_capacity(uuids.len());
        for uuid in uuids {
            let meta_key = dlq_meta_key(ingress_name, &uuid);
            if let Some(payload) = self.substrate.string_get(&meta_key).await? {
                if let Ok(entry) = serde_json::from_str::<DlqEntryDto>(&payload) {
                    entries.push(entry);
                    continue;
                }
            }
            // Metadata missing or unparsable: still surface the uuid so operators
            // can see it, with a best-effort placeholder.
            if let Ok(parsed) = Uuid::parse_str(&uuid) {
                entries.push(DlqEntryDto {
                    uuid: parsed,
                    reason: "unknown".to_string(),
                    failing_link: None,
                    attempt_count: 0,
                    failed_at: Utc::now(),
                });
            }
        }
        Ok(entries)
    }

    /// `reprocess(ingress_name, max_items?)`: atomically pops up to `max_items`
    /// UUIDs from `DLQ:<ingress_name>` and pushes them to the head of
    /// `ingress_name`, preserving original relative order (§4.8, S6). Uses
    /// `atomic_move`'s `RPOPLPUSH` semantics repeatedly.
    pub async fn reprocess(&self, ingress_name: &str, max_items: Option<u32>) -> CoreResult<Vec<Uuid>> {
        let dlq_list = dlq_list_key(ingress_name);
        let total = self.substrate.llen(&dlq_list).await?;
        let to_move = max_items.map(|n| n as u64).unwrap_or(total).min(total);

        let mut moved = Vec::new();
        for _ in 0..to_move {
            match self.substrate.atomic_move(&dlq_list, ingress_name).await? {
                Some(raw) => {
                    if let Ok(uuid) = Uuid::parse_str(&raw) {
                        // bump attempt_count in the metadata record, best-effort
                        self.bump_attempt(ingress_name, &raw).await.ok();
                        moved.push(uuid);
                    }
                }
                None => break,
            }
        }
        info!(ingress = ingress_name, count = moved.len(), "dlq reprocessed");
        Ok(moved)
    }

    async fn bump_attempt(&self, ingress_name: &str, uuid: &str) -> CoreResult<()> {
        let meta_key = dlq_meta_key(ingress_name, uuid);
        if let Some(payload) = self.substrate.string_get(&meta_key).await? {
            if let Ok(mut entry) = serde_json::from_str::<DlqEntryDto>(&payload) {
                entry.attempt_count += 1;
                let updated = serde_json::to_string(&entry)
                    .map_err(|e| CoreError::substrate(format!("serialize dlq entry failed: {e}")))?;
                self.substrate.string_set(&meta_key, &updated).await?;
            }
        }
        Ok(())
    }

    /// `purge(ingress_name, uuid?)`: removes one or all entries; never touches V.
    pub async fn purge(&self, ingress_name: &str, uuid: Option<Uuid>) -> CoreResult<u64> {
        let dlq_list = dlq_list_key(ingress_name);
        match uuid {
            Some(uuid) => {
                let removed = self
                    .substrate
                    .list_remove(&dlq_list, &uuid.to_string())
                    .await?;
                self.substrate
                    .delete(&dlq_meta_key(ingress_name, &uuid.to_string()))
                    .await
                    .ok();
                Ok(removed)
            }
            None => {
                let uuids = self.substrate.list_range(&dlq_list).await?;
                for uuid in &uuids {
                    self.substrate.delete(&dlq_meta_key(ingress_name, uuid)).await.ok();
                }
                let count = uuids.len() as u64;
                for uuid in uuids {
                    self.substrate.list_remove(&dlq_list, &uuid).await.ok();
                }
                Ok(count)
            }
        }
    }
}
