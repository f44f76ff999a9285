//! Mapping rules
//!
//! An [`InjectionConfig`] is one mapping rule: it ties a [`RequestKey`] to a
//! result strategy. Rules are shared across a container hierarchy by `Arc`;
//! replacing a rule's result is therefore immediately visible to every
//! container inheriting it. A rule whose result has been cleared stays in the
//! registry as an empty shell so key presence survives for inheritance
//! bookkeeping.

use crate::error::{InjectorError, Result};
use crate::injector::Injector;
use crate::key::RequestKey;
use crate::result::AnyResult;
use crate::target::SharedValue;
use std::sync::{Arc, RwLock};

/// Unique id of the container a rule was authored on.
pub(crate) type InjectorId = u64;

/// One mapping rule: a request key plus the strategy producing its value.
///
/// At most one rule exists per key per container; re-mapping swaps the result
/// in place. A rule with no result is an explicitly unmapped shell: it
/// resolves nothing but still marks the key as present for `has_config` and
/// for inheritance propagation.
pub struct InjectionConfig {
    key: RequestKey,
    owner: InjectorId,
    result: RwLock<Option<Arc<AnyResult>>>,
}

impl InjectionConfig {
    /// Create an empty rule authored on the container identified by `owner`.
    pub(crate) fn new(key: RequestKey, owner: InjectorId) -> Arc<Self> {
        Arc::new(Self {
            key,
            owner,
            result: RwLock::new(None),
        })
    }

    /// The request this rule answers.
    #[inline]
    pub fn key(&self) -> &RequestKey {
        &self.key
    }

    /// The requested type's name (diagnostics).
    #[inline]
    pub fn for_type(&self) -> &'static str {
        self.key.type_name()
    }

    /// The qualifier name; empty for unnamed rules.
    #[inline]
    pub fn name(&self) -> &str {
        self.key.name()
    }

    /// Whether this rule currently carries a resolvable result.
    #[inline]
    pub fn has_result(&self) -> bool {
        self.result.read().unwrap().is_some()
    }

    /// Whether this rule was authored on the container identified by `id`.
    #[inline]
    pub(crate) fn is_owned_by(&self, id: InjectorId) -> bool {
        self.owner == id
    }

    /// Replace the result strategy.
    pub(crate) fn set_result(&self, result: AnyResult) {
        *self.result.write().unwrap() = Some(Arc::new(result));
    }

    /// Clear the result, leaving an empty shell.
    pub(crate) fn clear_result(&self) {
        *self.result.write().unwrap() = None;
    }

    /// Snapshot the current result without holding the lock during resolution.
    ///
    /// Resolution may recurse back into this rule (aliases, nested class
    /// mappings), so the lock must not be held across the `resolve` call.
    #[inline]
    pub(crate) fn snapshot(&self) -> Option<Arc<AnyResult>> {
        self.result.read().unwrap().clone()
    }

    /// Produce the value for this rule, resolved through `injector`.
    pub(crate) fn resolve(&self, injector: &Injector) -> Result<SharedValue> {
        match self.snapshot() {
            Some(result) => result.resolve(injector),
            None => Err(InjectorError::missing_mapping(&self.key)),
        }
    }
}

impl std::fmt::Debug for InjectionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = self.snapshot().map(|r| r.kind());
        f.debug_struct("InjectionConfig")
            .field("type", &self.key.type_name())
            .field("name", &self.key.name())
            .field("result", &kind.unwrap_or("<unmapped>"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Fixture {
        value: i32,
    }

    #[test]
    fn fresh_rule_has_no_result() {
        let config = InjectionConfig::new(RequestKey::of::<Fixture>(), 1);
        assert!(!config.has_result());
        assert!(config.is_owned_by(1));
        assert!(!config.is_owned_by(2));
    }

    #[test]
    fn set_and_clear_result() {
        let config = InjectionConfig::new(RequestKey::of::<Fixture>(), 1);
        config.set_result(AnyResult::value(Fixture { value: 3 }));
        assert!(config.has_result());

        config.clear_result();
        assert!(!config.has_result());
    }

    #[test]
    fn empty_rule_fails_resolution_with_missing_mapping() {
        let config = InjectionConfig::new(RequestKey::named::<Fixture>("x"), 1);
        let err = config.resolve(&Injector::new()).unwrap_err();
        match err {
            InjectorError::MissingMapping { type_name, name } => {
                assert!(type_name.contains("Fixture"));
                assert_eq!(name, "x");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn remapping_swaps_the_result_in_place() {
        let config = InjectionConfig::new(RequestKey::of::<Fixture>(), 1);
        config.set_result(AnyResult::value(Fixture { value: 1 }));
        config.set_result(AnyResult::value(Fixture { value: 2 }));

        let value = config.resolve(&Injector::new()).unwrap();
        let fixture = value.downcast::<Fixture>().unwrap();
        assert_eq!(fixture.value, 2);
    }
}
