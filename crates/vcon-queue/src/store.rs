use std::sync::Arc;

use uuid::Uuid;
use vcon_core::{CoreResult, QueueSubstrate, VconDocument};

use crate::keys::vcon_key;

/// The logical vCon store view of the substrate (§2 V: `get(uuid)`, `put(uuid, doc)`,
/// `expire(uuid, ttl)`). Thin on purpose — the core never caches storage results
/// (§4.5), and V itself is just the substrate's json_* ops under the `vcon:<uuid>`
/// key (§6.4).
#[derive(Clone)]
pub struct VconStore {
    substrate: Arc<dyn QueueSubstrate>,
}

impl VconStore {
    pub fn new(substrate: Arc<dyn QueueSubstrate>) -> Self {
        Self { substrate }
    }

    pub async fn get(&self, uuid: Uuid) -> CoreResult<Option<VconDocument>> {
        self.substrate.json_get(&vcon_key(&uuid.to_string())).await
    }

    pub async fn put(&self, doc: &VconDocument) -> CoreResult<()> {
        self.substrate
            .json_put(&vcon_key(&doc.uuid.to_string()), doc)
            .await
    }

    pub async fn delete(&self, uuid: Uuid) -> CoreResult<()> {
        self.substrate.delete(&vcon_key(&uuid.to_string())).await
    }

    pub async fn expire(&self, uuid: Uuid, ttl_seconds: u64) -> CoreResult<()> {
        self.substrate
            .expire(&vcon_key(&uuid.to_string()), ttl_seconds)
            .await
    }
}
