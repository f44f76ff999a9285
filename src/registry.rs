//! Registry storage for mapping rules
//!
//! Thin wrapper over `DashMap` keyed by [`RequestKey`]. Rules are held as
//! `Arc<InjectionConfig>` so the same rule object can live in several
//! containers' registries at once (inheritance by reference). Entries are
//! never removed, only their results cleared; this keeps key presence stable
//! for descendant propagation.

use crate::config::InjectionConfig;
use crate::key::RequestKey;
use ahash::RandomState;
use dashmap::DashMap;
use std::sync::Arc;

/// Map from request key to mapping rule.
///
/// Uses `DashMap` with `ahash` so queries and resolution never block each
/// other. 8 shards: DI registries hold tens of rules, the DashMap default of
/// num_cpus * 4 shards only slows creation down.
pub(crate) struct MappingRegistry {
    configs: DashMap<RequestKey, Arc<InjectionConfig>, RandomState>,
}

impl MappingRegistry {
    /// Create an empty registry.
    #[inline]
    pub fn new() -> Self {
        Self {
            configs: DashMap::with_capacity_and_hasher_and_shard_amount(
                0,
                RandomState::new(),
                8,
            ),
        }
    }

    /// Insert or replace the rule for a key.
    #[inline]
    pub fn insert(&self, key: RequestKey, config: Arc<InjectionConfig>) {
        self.configs.insert(key, config);
    }

    /// Get the rule for a key, if any.
    #[inline]
    pub fn get(&self, key: &RequestKey) -> Option<Arc<InjectionConfig>> {
        self.configs.get(key).map(|entry| Arc::clone(&entry))
    }

    /// Whether any rule (including an empty shell) exists for the key.
    #[inline]
    pub fn contains(&self, key: &RequestKey) -> bool {
        self.configs.contains_key(key)
    }

    /// Number of rules in this registry.
    #[inline]
    pub fn len(&self) -> usize {
        self.configs.len()
    }

    /// Whether this registry holds no rules.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }

    /// Snapshot of all entries, for bulk-copy into a fresh child registry.
    pub fn entries(&self) -> Vec<(RequestKey, Arc<InjectionConfig>)> {
        self.configs
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect()
    }
}

impl Default for MappingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MappingRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MappingRegistry")
            .field("count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Service {
        value: i32,
    }

    #[test]
    fn insert_and_get() {
        let registry = MappingRegistry::new();
        let key = RequestKey::of::<Service>();

        assert!(registry.get(&key).is_none());

        let config = InjectionConfig::new(key.clone(), 1);
        registry.insert(key.clone(), Arc::clone(&config));

        let found = registry.get(&key).unwrap();
        assert!(Arc::ptr_eq(&found, &config));
    }

    #[test]
    fn named_and_unnamed_entries_are_distinct() {
        let registry = MappingRegistry::new();
        let unnamed = RequestKey::of::<Service>();
        let named = RequestKey::named::<Service>("x");

        registry.insert(unnamed.clone(), InjectionConfig::new(unnamed.clone(), 1));
        assert!(registry.contains(&unnamed));
        assert!(!registry.contains(&named));
    }

    #[test]
    fn entries_snapshot_shares_the_rule_objects() {
        let registry = MappingRegistry::new();
        let key = RequestKey::of::<Service>();
        let config = InjectionConfig::new(key.clone(), 1);
        registry.insert(key, Arc::clone(&config));

        let entries = registry.entries();
        assert_eq!(entries.len(), 1);
        assert!(Arc::ptr_eq(&entries[0].1, &config));
        let _ = Service { value: 0 };
    }
}
