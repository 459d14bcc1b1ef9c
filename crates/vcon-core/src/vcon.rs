use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// The opaque vCon document (§3). The core reads `uuid`, `created_at`, and `tags`;
/// everything else is opaque passthrough a link may mutate but the core never
/// interprets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VconDocument {
    pub uuid: Uuid,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(flatten)]
    pub body: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub value: String,
}

impl VconDocument {
    pub fn new(uuid: Uuid) -> Self {
        Self {
            uuid,
            created_at: Some(Utc::now()),
            tags: Vec::new(),
            body: Map::new(),
        }
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.name == name)
            .map(|t| t.value.as_str())
    }
}
