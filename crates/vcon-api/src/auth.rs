use axum::http::HeaderMap;
use vcon_core::RootConfig;

/// Pulls the API key out of the configurable admission header (§6.1, `api_header_name`).
pub fn extract_key(headers: &HeaderMap, header_name: &str) -> Option<String> {
    headers
        .get(header_name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// §4.7 ingress admission authentication & authorization.
///
/// - A global admin key may enqueue into any ingress list.
/// - Otherwise the (ingress_list, key) pair must match the `ingress_auth` policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    GlobalAdmin,
    ScopedToList,
    Forbidden,
}

pub fn authorize(root_config: &RootConfig, key: &str, ingress_list: &str) -> AuthDecision {
    if root_config.global_api_keys.contains(key) {
        return AuthDecision::GlobalAdmin;
    }
    match root_config.ingress_auth.get(ingress_list) {
        Some(keys) if keys.contains(key) => AuthDecision::ScopedToList,
        _ => AuthDecision::Forbidden,
    }
}

/// Admission routes that are "global-key-only" per §6.1 (`POST /vcon`,
/// `GET /dlq`, `POST /dlq/reprocess`) use this narrower check.
pub fn authorize_global_only(root_config: &RootConfig, key: &str) -> AuthDecision {
    if root_config.global_api_keys.contains(key) {
        AuthDecision::GlobalAdmin
    } else {
        AuthDecision::Forbidden
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::time::Duration;

    fn test_config(global: &[&str], scoped: &[(&str, &str)]) -> RootConfig {
        let mut ingress_auth: HashMap<String, HashSet<String>> = HashMap::new();
        for (list, key) in scoped {
            ingress_auth
                .entry(list.to_string())
                .or_default()
                .insert(key.to_string());
        }
        RootConfig {
            chains: Vec::new(),
            global_api_keys: global.iter().map(|s| s.to_string()).collect(),
            ingress_auth,
            shutdown_grace: Duration::from_secs(1),
            storage_timeout: Duration::from_secs(1),
            link_timeout: Duration::from_secs(1),
            tracer_timeout: Duration::from_secs(1),
            egress_retries: 1,
            api_header_name: "x-conserver-api-token".to_string(),
        }
    }

    #[test]
    fn global_key_admits_any_list() {
        let cfg = test_config(&["admin-key"], &[]);
        assert_eq!(authorize(&cfg, "admin-key", "any-list"), AuthDecision::GlobalAdmin);
    }

    #[test]
    fn scoped_key_only_admits_its_list() {
        let cfg = test_config(&[], &[("in1", "scoped-key")]);
        assert_eq!(authorize(&cfg, "scoped-key", "in1"), AuthDecision::ScopedToList);
        assert_eq!(authorize(&cfg, "scoped-key", "in2"), AuthDecision::Forbidden);
    }

    #[test]
    fn wrong_key_is_forbidden() {
        let cfg = test_config(&[], &[("in1", "scoped-key")]);
        assert_eq!(authorize(&cfg, "wrong-key", "in1"), AuthDecision::Forbidden);
    }
}
