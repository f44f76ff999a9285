//! Result strategies for mapping rules
//!
//! Each mapping rule carries one result strategy describing how a value is
//! produced for a request: a fixed instance, a fresh injected instance per
//! resolution, a lazily created and cached singleton, or a delegation to
//! another rule.
//!
//! Strategies are wrapped in the enum-based [`AnyResult`] rather than a trait
//! object; the match on four variants is visible to the optimizer and avoids
//! vtable indirection on every resolve.

use crate::config::InjectionConfig;
use crate::error::Result;
use crate::injector::Injector;
use crate::target::{Implements, Injectable, InjectTarget, SharedValue};
use once_cell::sync::OnceCell;
use std::sync::Arc;

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Type-erased construct-and-inject function captured at mapping time
type InstanceFn = Arc<dyn Fn(&Injector) -> Result<SharedValue> + Send + Sync>;

// =============================================================================
// Value Result
// =============================================================================

/// Fixed-instance result: returns the stored value unchanged on every
/// resolution, never triggering construction or injection.
///
/// The instance is pre-erased at mapping time so resolution is a plain
/// `Arc` clone.
pub struct ValueResult {
    instance: SharedValue,
}

impl ValueResult {
    /// Create from an owned instance
    #[inline]
    pub fn new<T: Injectable>(instance: T) -> Self {
        Self {
            instance: Arc::new(instance) as SharedValue,
        }
    }

    /// Create from an existing `Arc`
    #[inline]
    pub fn from_arc<T: Injectable>(instance: Arc<T>) -> Self {
        Self {
            instance: instance as SharedValue,
        }
    }

    /// Return the stored instance
    #[inline]
    pub fn resolve(&self) -> SharedValue {
        Arc::clone(&self.instance)
    }
}

// =============================================================================
// Class Result
// =============================================================================

/// Per-request result: constructs a fresh instance of the concrete type,
/// injects into it, and coerces it to the request type on every resolution.
/// No identity is shared across calls.
pub struct ClassResult {
    make: InstanceFn,
    #[cfg(feature = "logging")]
    type_name: &'static str,
}

impl ClassResult {
    /// Create a class result building `C` for requests of type `T`.
    #[inline]
    pub fn new<T, C>() -> Self
    where
        T: Injectable,
        C: InjectTarget + Implements<T>,
    {
        Self {
            make: Arc::new(|injector: &Injector| {
                let mut instance = C::construct_bare();
                injector.inject_into(&mut instance)?;
                Ok(C::coerce(Arc::new(instance)) as SharedValue)
            }),
            #[cfg(feature = "logging")]
            type_name: std::any::type_name::<C>(),
        }
    }

    /// Construct, inject and return a fresh instance
    #[inline]
    pub fn resolve(&self, injector: &Injector) -> Result<SharedValue> {
        #[cfg(feature = "logging")]
        trace!(
            target: "armature_inject",
            concrete = self.type_name,
            "Constructing fresh instance for class mapping"
        );

        (self.make)(injector)
    }
}

// =============================================================================
// Singleton Result
// =============================================================================

/// Lazily cached result: the first resolution constructs, injects and caches
/// one instance; every later resolution through the same rule object returns
/// that instance.
///
/// The cache lives on the rule, not the container. Because rules propagate by
/// reference to descendants that have not shadowed them, a singleton mapped
/// on a parent and inherited unshadowed by a child is the same instance on
/// both containers.
///
/// A circular singleton dependency re-enters the cell during initialization
/// and deadlocks; cycle detection is deliberately not provided.
pub struct SingletonResult {
    make: InstanceFn,
    instance: OnceCell<SharedValue>,
    #[cfg(feature = "logging")]
    type_name: &'static str,
}

impl SingletonResult {
    /// Create a singleton result building `C` for requests of type `T`.
    #[inline]
    pub fn new<T, C>() -> Self
    where
        T: Injectable,
        C: InjectTarget + Implements<T>,
    {
        Self {
            make: Arc::new(|injector: &Injector| {
                let mut instance = C::construct_bare();
                injector.inject_into(&mut instance)?;
                Ok(C::coerce(Arc::new(instance)) as SharedValue)
            }),
            instance: OnceCell::new(),
            #[cfg(feature = "logging")]
            type_name: std::any::type_name::<C>(),
        }
    }

    /// Return the cached instance, creating it on first access
    #[inline]
    pub fn resolve(&self, injector: &Injector) -> Result<SharedValue> {
        self.instance
            .get_or_try_init(|| {
                #[cfg(feature = "logging")]
                debug!(
                    target: "armature_inject",
                    concrete = self.type_name,
                    "Singleton initializing on first resolution"
                );

                (self.make)(injector)
            })
            .map(Arc::clone)
    }

    /// Whether the cached instance has been created yet
    #[inline]
    pub fn is_initialized(&self) -> bool {
        self.instance.get().is_some()
    }
}

// =============================================================================
// Alias Result
// =============================================================================

/// Delegating result: forwards resolution entirely to another rule,
/// contributing no identity or caching of its own.
pub struct AliasResult {
    rule: Arc<InjectionConfig>,
}

impl AliasResult {
    /// Create an alias delegating to an existing rule
    #[inline]
    pub fn new(rule: Arc<InjectionConfig>) -> Self {
        Self { rule }
    }

    /// The delegated rule
    #[inline]
    pub fn rule(&self) -> &Arc<InjectionConfig> {
        &self.rule
    }

    /// Resolve by delegating to the referenced rule
    #[inline]
    pub fn resolve(&self, injector: &Injector) -> Result<SharedValue> {
        self.rule.resolve(injector)
    }
}

// =============================================================================
// AnyResult - enum dispatch over the strategies
// =============================================================================

/// Type-erased result strategy stored on an [`InjectionConfig`].
pub(crate) enum AnyResult {
    /// Fixed instance
    Value(ValueResult),
    /// Fresh injected instance per resolution
    Class(ClassResult),
    /// Lazily created, cached instance
    Singleton(SingletonResult),
    /// Delegation to another rule
    Alias(AliasResult),
}

impl AnyResult {
    /// Create a value result
    #[inline]
    pub fn value<T: Injectable>(instance: T) -> Self {
        AnyResult::Value(ValueResult::new(instance))
    }

    /// Create a value result from an `Arc`
    #[inline]
    pub fn value_arc<T: Injectable>(instance: Arc<T>) -> Self {
        AnyResult::Value(ValueResult::from_arc(instance))
    }

    /// Create a class result
    #[inline]
    pub fn class<T, C>() -> Self
    where
        T: Injectable,
        C: InjectTarget + Implements<T>,
    {
        AnyResult::Class(ClassResult::new::<T, C>())
    }

    /// Create a singleton result
    #[inline]
    pub fn singleton<T, C>() -> Self
    where
        T: Injectable,
        C: InjectTarget + Implements<T>,
    {
        AnyResult::Singleton(SingletonResult::new::<T, C>())
    }

    /// Create an alias result
    #[inline]
    pub fn alias(rule: Arc<InjectionConfig>) -> Self {
        AnyResult::Alias(AliasResult::new(rule))
    }

    /// Produce the value for a request resolved through `injector`
    #[inline]
    pub fn resolve(&self, injector: &Injector) -> Result<SharedValue> {
        match self {
            AnyResult::Value(r) => Ok(r.resolve()),
            AnyResult::Class(r) => r.resolve(injector),
            AnyResult::Singleton(r) => r.resolve(injector),
            AnyResult::Alias(r) => r.resolve(injector),
        }
    }

    /// Short strategy name for logging and Debug output
    #[inline]
    pub fn kind(&self) -> &'static str {
        match self {
            AnyResult::Value(_) => "value",
            AnyResult::Class(_) => "class",
            AnyResult::Singleton(_) => "singleton",
            AnyResult::Alias(_) => "alias",
        }
    }
}
