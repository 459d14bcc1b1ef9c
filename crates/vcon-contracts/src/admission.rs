use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Body of `POST /vcon` and `POST /vcon/external-ingress` (§6.1). The core only reads
/// `uuid` and `tags`; everything else is opaque passthrough (§3 vCon document).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VconDocumentDto {
    pub uuid: Uuid,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub tags: Vec<TagDto>,
    #[serde(flatten)]
    pub body: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TagDto {
    pub name: String,
    pub value: String,
}

/// Query params for `POST /vcon/external-ingress` and the DLQ routes.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct IngressListQuery {
    pub ingress_list: String,
}

/// Body of `POST /vcon`, which (unlike `/vcon/external-ingress`) takes its target
/// ingress list from the body rather than a query param (§6.1).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdmitRequestDto {
    pub ingress_list: String,
    pub vcon: VconDocumentDto,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AdmissionResponse {
    pub uuid: Uuid,
    pub ingress_list: String,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}
