use std::sync::Arc;

use vcon_core::{QueueSubstrate, RootConfig};
use vcon_orchestrator::DlqManager;
use vcon_queue::VconStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<RootConfig>,
    pub substrate: Arc<dyn QueueSubstrate>,
    pub store: VconStore,
    pub dlq: Arc<DlqManager>,
}

impl AppState {
    pub fn new(config: Arc<RootConfig>, substrate: Arc<dyn QueueSubstrate>) -> Self {
        let store = VconStore::new(substrate.clone());
        let dlq = Arc::new(DlqManager::new(substrate.clone()));
        Self {
            config,
            substrate,
            store,
            dlq,
        }
    }
}
