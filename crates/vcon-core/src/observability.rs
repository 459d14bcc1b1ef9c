use std::collections::BTreeMap;

/// An opaque metrics sink (§10.6): the core only needs a call site, not a concrete
/// backend, matching the same "consumed interface" shape the spec gives links and
/// storages.
pub trait Metrics: Send + Sync {
    fn counter(&self, name: &str, tags: &BTreeMap<String, String>);
    fn histogram(&self, name: &str, value: f64, tags: &BTreeMap<String, String>);
}

/// Default sink when no concrete metrics backend is wired in.
pub struct NoopMetrics;

impl Metrics for NoopMetrics {
    fn counter(&self, _name: &str, _tags: &BTreeMap<String, String>) {}
    fn histogram(&self, _name: &str, _value: f64, _tags: &BTreeMap<String, String>) {}
}
