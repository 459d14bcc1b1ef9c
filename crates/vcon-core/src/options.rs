use std::collections::BTreeMap;

use serde_json::Value;

/// Explicit shallow-merge option record (§9 "Option merging"): right wins at the top
/// level, no deep merge of nested objects.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Options(BTreeMap<String, Value>);

impl Options {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    pub fn from_map(map: BTreeMap<String, Value>) -> Self {
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.0.get(key).and_then(Value::as_u64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.0.get(key).and_then(Value::as_bool)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// `merged = defaults ⊕ registry_options ⊕ chain_inline_overlay`, right wins,
    /// applied top-level key by key (§3 LinkBinding).
    pub fn merge(layers: &[&Options]) -> Options {
        let mut merged = BTreeMap::new();
        for layer in layers {
            for (k, v) in layer.0.iter() {
                merged.insert(k.clone(), v.clone());
            }
        }
        Options(merged)
    }

    pub fn as_map(&self) -> &BTreeMap<String, Value> {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn right_wins_shallow_merge() {
        let defaults = Options::from_map(BTreeMap::from([
            ("timeout".to_string(), json!(30)),
            ("retries".to_string(), json!(1)),
        ]));
        let registry = Options::from_map(BTreeMap::from([("timeout".to_string(), json!(10))]));
        let inline = Options::from_map(BTreeMap::from([("retries".to_string(), json!(5))]));

        let merged = Options::merge(&[&defaults, &registry, &inline]);
        assert_eq!(merged.get_u64("timeout"), Some(10));
        assert_eq!(merged.get_u64("retries"), Some(5));
    }

    #[test]
    fn no_deep_merge_nested_object_replaced_wholesale() {
        let a = Options::from_map(BTreeMap::from([(
            "nested".to_string(),
            json!({"a": 1, "b": 2}),
        )]));
        let b = Options::from_map(BTreeMap::from([(
            "nested".to_string(),
            json!({"b": 3}),
        )]));
        let merged = Options::merge(&[&a, &b]);
        assert_eq!(merged.get("nested"), Some(&json!({"b": 3})));
    }
}
