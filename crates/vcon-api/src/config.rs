use std::path::Path;

use anyhow::{Context, Result};
use vcon_contracts::RootConfigDto;

/// Process-level settings read from the environment, matching the teacher's
/// `std::env::var("DATABASE_URL")` pattern in `main.rs` (§10.4).
pub struct AppConfig {
    pub redis_url: String,
    pub bind_addr: String,
    pub chain_config_path: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            redis_url: std::env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            chain_config_path: std::env::var("CHAIN_CONFIG_PATH")
                .unwrap_or_else(|_| "chains.json".to_string()),
        })
    }
}

/// Loads the already-validated configuration record (§6.2: "the core consumes an
/// already-validated configuration record; the parser is external"). This is that
/// external parser — a thin JSON file reader, not a feature the core depends on.
pub fn load_root_config(path: impl AsRef<Path>) -> Result<RootConfigDto> {
    let path = path.as_ref();
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading chain config at {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("parsing chain config at {}", path.display()))
}
