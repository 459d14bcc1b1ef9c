use std::collections::HashMap;
use std::sync::Arc;

use crate::options::Options;
use crate::traits::{Link, Storage, Tracer};

/// A registry entry pairs a callable with its preconfigured default options
/// (§3 LinkBinding: `merged_options = defaults ⊕ registry_options ⊕ inline`).
struct Entry<T: ?Sized> {
    value: Arc<T>,
    options: Options,
}

/// Process-wide, read-mostly name → capability mapping (§2 L/S/T, §9 "Global state":
/// immutable after `start`, no hot-reload in the core).
pub struct Registry<T: ?Sized> {
    entries: HashMap<String, Entry<T>>,
}

impl<T: ?Sized> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T: ?Sized> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: impl Into<String>, value: Arc<T>, options: Options) {
        self.entries.insert(name.into(), Entry { value, options });
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<(Arc<T>, &Options)> {
        self.entries
            .get(name)
            .map(|entry| (entry.value.clone(), &entry.options))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

pub type LinkRegistry = Registry<dyn Link>;
pub type StorageRegistry = Registry<dyn Storage>;
pub type TracerRegistry = Registry<dyn Tracer>;

/// The three process-wide registries bundled together, matching the teacher's
/// `WorkflowRegistry` role of a single handle the supervisor hands to every chain
/// runtime it spawns.
#[derive(Default)]
pub struct Registries {
    pub links: LinkRegistry,
    pub storages: StorageRegistry,
    pub tracers: TracerRegistry,
}
