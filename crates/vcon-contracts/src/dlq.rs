use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Per-entry metadata stored at `DLQ:<ingress>:<uuid>` (§3 DLQ entry, §6.4).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DlqEntryDto {
    pub uuid: Uuid,
    pub reason: String,
    pub failing_link: Option<String>,
    pub attempt_count: u32,
    pub failed_at: chrono::DateTime<chrono::Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DlqListResponse {
    pub ingress_list: String,
    pub entries: Vec<DlqEntryDto>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DlqReprocessRequest {
    pub max_items: Option<u32>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DlqReprocessResponse {
    pub ingress_list: String,
    pub reprocessed: Vec<Uuid>,
}
