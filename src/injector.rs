//! The injection container
//!
//! The `Injector` owns a registry of mapping rules, resolves requests through
//! their result strategies, and drives field injection into target objects.
//! Containers form a hierarchy: a child created with
//! [`Injector::create_child_injector`] inherits every ancestor rule by
//! reference and may shadow any of them locally.

use crate::config::{InjectionConfig, InjectorId};
use crate::error::{InjectorError, Result};
use crate::key::RequestKey;
use crate::registry::MappingRegistry;
use crate::result::AnyResult;
use crate::target::{Implements, InjectTarget, Injectable};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, Weak};

#[cfg(feature = "logging")]
use tracing::{debug, trace};

/// Process-unique container id, used to tell locally-authored rules apart
/// from inherited ones.
fn next_injector_id() -> InjectorId {
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Rule-based dependency injection container.
///
/// Rules are registered with the mapping API (`map_value`, `map_class`,
/// `map_singleton`, `map_rule`, each with a `_named` twin for qualified
/// requests), resolved with [`get_instance`](Injector::get_instance), and
/// applied to target objects with [`inject_into`](Injector::inject_into).
///
/// Cloning an `Injector` clones a handle to the same container, not the
/// container itself; use [`create_child_injector`](Injector::create_child_injector)
/// for a derived container.
///
/// # Examples
///
/// ```rust
/// use armature_inject::Injector;
///
/// #[derive(Clone)]
/// struct Config {
///     debug: bool,
/// }
///
/// let injector = Injector::new();
/// injector.map_value(Config { debug: true });
///
/// let config = injector.get_instance::<Config>().unwrap();
/// assert!(config.debug);
/// ```
#[derive(Clone)]
pub struct Injector {
    inner: Arc<InjectorInner>,
}

struct InjectorInner {
    /// Unique id, recorded as the owner on every rule authored here
    id: InjectorId,
    /// RequestKey -> rule map; holds inherited rules by reference
    registry: MappingRegistry,
    /// Back reference only; a child never keeps its parent alive
    parent: Weak<InjectorInner>,
    /// Children this container created, for write-time rule propagation
    children: Mutex<Vec<Arc<InjectorInner>>>,
    /// Hierarchy depth for diagnostics (0 = root)
    depth: u32,
}

impl Injector {
    /// Create a new root container.
    pub fn new() -> Self {
        let id = next_injector_id();

        #[cfg(feature = "logging")]
        debug!(
            target: "armature_inject",
            injector_id = id,
            depth = 0,
            "Creating root injector"
        );

        Self {
            inner: Arc::new(InjectorInner {
                id,
                registry: MappingRegistry::new(),
                parent: Weak::new(),
                children: Mutex::new(Vec::new()),
                depth: 0,
            }),
        }
    }

    // =========================================================================
    // Mapping API
    // =========================================================================

    /// Map requests for `T` to a fixed instance.
    ///
    /// Resolution returns exactly this instance on every call; no injection
    /// is ever performed on it.
    pub fn map_value<T: Injectable>(&self, instance: T) -> Arc<InjectionConfig> {
        self.map_value_named("", instance)
    }

    /// Map requests for `T` qualified by `name` to a fixed instance.
    pub fn map_value_named<T: Injectable>(
        &self,
        name: &str,
        instance: T,
    ) -> Arc<InjectionConfig> {
        let key = RequestKey::named::<T>(name);
        self.set_mapping(key, AnyResult::value(instance))
    }

    /// Map requests for `T` to an already shared instance.
    pub fn map_value_arc<T: Injectable>(&self, instance: Arc<T>) -> Arc<InjectionConfig> {
        self.map_value_arc_named("", instance)
    }

    /// Map requests for `T` qualified by `name` to an already shared instance.
    pub fn map_value_arc_named<T: Injectable>(
        &self,
        name: &str,
        instance: Arc<T>,
    ) -> Arc<InjectionConfig> {
        let key = RequestKey::named::<T>(name);
        self.set_mapping(key, AnyResult::value_arc(instance))
    }

    /// Map requests for `T` to a concrete class `C`.
    ///
    /// Every resolution constructs a fresh `C`, injects into it, then coerces
    /// it to `T` through [`Implements`]. No identity is shared across calls.
    pub fn map_class<T, C>(&self) -> Arc<InjectionConfig>
    where
        T: Injectable,
        C: InjectTarget + Implements<T>,
    {
        self.map_class_named::<T, C>("")
    }

    /// Map requests for `T` qualified by `name` to a concrete class `C`.
    pub fn map_class_named<T, C>(&self, name: &str) -> Arc<InjectionConfig>
    where
        T: Injectable,
        C: InjectTarget + Implements<T>,
    {
        let key = RequestKey::named::<T>(name);
        self.set_mapping(key, AnyResult::class::<T, C>())
    }

    /// Map requests for `T` to a lazily created singleton of `T` itself.
    ///
    /// The first resolution constructs, injects and caches one instance on
    /// the rule; all later resolutions through the same rule object return
    /// it, including resolutions from descendants inheriting the rule.
    pub fn map_singleton<T: InjectTarget>(&self) -> Arc<InjectionConfig> {
        self.map_singleton_of::<T, T>()
    }

    /// Map requests for `T` qualified by `name` to a singleton of `T`.
    pub fn map_singleton_named<T: InjectTarget>(
        &self,
        name: &str,
    ) -> Arc<InjectionConfig> {
        self.map_singleton_of_named::<T, T>(name)
    }

    /// Map requests for `T` to a lazily created singleton of concrete `C`.
    pub fn map_singleton_of<T, C>(&self) -> Arc<InjectionConfig>
    where
        T: Injectable,
        C: InjectTarget + Implements<T>,
    {
        self.map_singleton_of_named::<T, C>("")
    }

    /// Map requests for `T` qualified by `name` to a singleton of `C`.
    pub fn map_singleton_of_named<T, C>(
        &self,
        name: &str,
    ) -> Arc<InjectionConfig>
    where
        T: Injectable,
        C: InjectTarget + Implements<T>,
    {
        let key = RequestKey::named::<T>(name);
        self.set_mapping(key, AnyResult::singleton::<T, C>())
    }

    /// Map requests for `T` to an existing rule, possibly on another
    /// container.
    ///
    /// Returns the *delegated* rule rather than the new alias, so callers can
    /// keep configuring the original.
    pub fn map_rule<T: Injectable>(&self, rule: &Arc<InjectionConfig>) -> Arc<InjectionConfig> {
        self.map_rule_named::<T>("", rule)
    }

    /// Map requests for `T` qualified by `name` to an existing rule.
    pub fn map_rule_named<T: Injectable>(
        &self,
        name: &str,
        rule: &Arc<InjectionConfig>,
    ) -> Arc<InjectionConfig> {
        let key = RequestKey::named::<T>(name);
        self.set_mapping(key, AnyResult::alias(Arc::clone(rule)));
        Arc::clone(rule)
    }

    /// Remove the rule for unnamed requests of `T`.
    ///
    /// Fails with [`InjectorError::MissingMapping`] when neither this
    /// container nor an ancestor ever mapped the key. The key itself stays
    /// registered as an empty shell so later hierarchy bookkeeping still sees
    /// it; an inherited rule is shadowed by a local shell rather than
    /// destroyed on its ancestor.
    pub fn unmap<T: Injectable>(&self) -> Result<()> {
        self.unmap_named::<T>("")
    }

    /// Remove the rule for requests of `T` qualified by `name`.
    pub fn unmap_named<T: Injectable>(&self, name: &str) -> Result<()> {
        let key = RequestKey::named::<T>(name);
        let existing = self
            .inner
            .registry
            .get(&key)
            .ok_or_else(|| InjectorError::missing_mapping(&key))?;

        #[cfg(feature = "logging")]
        debug!(
            target: "armature_inject",
            service = key.type_name(),
            name = key.name(),
            depth = self.inner.depth,
            "Unmapping rule"
        );

        if existing.is_owned_by(self.inner.id) {
            existing.clear_result();
        } else {
            let shell = InjectionConfig::new(key.clone(), self.inner.id);
            self.inner.registry.insert(key.clone(), Arc::clone(&shell));
            propagate(&self.inner, &key, &shell);
        }
        Ok(())
    }

    /// Insert or replace the rule for `key` and hand it the given result.
    fn set_mapping(&self, key: RequestKey, result: AnyResult) -> Arc<InjectionConfig> {
        #[cfg(feature = "logging")]
        debug!(
            target: "armature_inject",
            service = key.type_name(),
            name = key.name(),
            kind = result.kind(),
            depth = self.inner.depth,
            "Registering mapping rule"
        );

        let config = match self.inner.registry.get(&key) {
            // Re-mapping a locally authored rule swaps its result in place;
            // descendants hold the same rule object and see the change.
            Some(existing) if existing.is_owned_by(self.inner.id) => existing,
            // First mapping, or shadowing an inherited rule: author a fresh
            // rule here and push it down to descendants without overrides.
            _ => {
                let config = InjectionConfig::new(key.clone(), self.inner.id);
                self.inner.registry.insert(key.clone(), Arc::clone(&config));
                propagate(&self.inner, &key, &config);
                config
            }
        };
        config.set_result(result);
        config
    }

    // =========================================================================
    // Query API
    // =========================================================================

    /// Whether a resolvable rule exists for unnamed requests of `T`.
    pub fn has_mapping<T: Injectable>(&self) -> bool {
        self.has_mapping_named::<T>("")
    }

    /// Whether a resolvable rule exists for requests of `T` qualified by
    /// `name`.
    ///
    /// Considers the local rule's result; a bare inherited shell defers to
    /// the ancestor chain the same way resolution does. Never fails.
    pub fn has_mapping_named<T: Injectable>(&self, name: &str) -> bool {
        let key = RequestKey::named::<T>(name);
        self.resolvable_config(&key).is_some()
    }

    /// The rule registered for unnamed requests of `T`, if any.
    pub fn get_config<T: Injectable>(&self) -> Option<Arc<InjectionConfig>> {
        self.get_config_named::<T>("")
    }

    /// The rule registered for requests of `T` qualified by `name`, if any.
    ///
    /// Returns empty shells too; use [`has_mapping`](Injector::has_mapping)
    /// for resolvability.
    pub fn get_config_named<T: Injectable>(
        &self,
        name: &str,
    ) -> Option<Arc<InjectionConfig>> {
        self.inner.registry.get(&RequestKey::named::<T>(name))
    }

    /// Whether any rule entry (including an empty shell) exists for unnamed
    /// requests of `T`.
    pub fn has_config<T: Injectable>(&self) -> bool {
        self.has_config_named::<T>("")
    }

    /// Whether any rule entry exists for requests of `T` qualified by `name`.
    pub fn has_config_named<T: Injectable>(&self, name: &str) -> bool {
        self.inner.registry.contains(&RequestKey::named::<T>(name))
    }

    /// Number of rule entries in this container (inherited ones included).
    pub fn len(&self) -> usize {
        self.inner.registry.len()
    }

    /// Whether this container has no rule entries.
    pub fn is_empty(&self) -> bool {
        self.inner.registry.is_empty()
    }

    /// Hierarchy depth of this container (0 = root).
    pub fn depth(&self) -> u32 {
        self.inner.depth
    }

    // =========================================================================
    // Resolution API
    // =========================================================================

    /// Resolve an unnamed request for `T`.
    pub fn get_instance<T: Injectable>(&self) -> Result<Arc<T>> {
        self.get_instance_named("")
    }

    /// Resolve a request for `T` qualified by `name`.
    ///
    /// Looks up the rule in this container, delegates to its result strategy
    /// (which may recursively construct and inject), and returns the produced
    /// value. The container itself performs no caching; identity semantics
    /// belong entirely to the rule's strategy.
    pub fn get_instance_named<T: Injectable>(
        &self,
        name: &str,
    ) -> Result<Arc<T>> {
        let key = RequestKey::named::<T>(name);

        #[cfg(feature = "logging")]
        trace!(
            target: "armature_inject",
            service = key.type_name(),
            name = key.name(),
            depth = self.inner.depth,
            "Resolving request"
        );

        let config = self
            .resolvable_config(&key)
            .ok_or_else(|| InjectorError::missing_mapping(&key))?;
        let value = config.resolve(self)?;
        value
            .downcast::<T>()
            .map_err(|_| InjectorError::type_mismatch::<T>(&key))
    }

    /// Resolve an unnamed request for `T`, returning `None` when unmapped.
    pub fn try_get_instance<T: Injectable>(&self) -> Option<Arc<T>> {
        self.get_instance::<T>().ok()
    }

    /// Resolve a named request for `T`, returning `None` when unmapped.
    pub fn try_get_instance_named<T: Injectable>(
        &self,
        name: &str,
    ) -> Option<Arc<T>> {
        self.get_instance_named::<T>(name).ok()
    }

    /// Find the rule this container would resolve `key` through, if any.
    ///
    /// A rule with a result answers directly. A bare shell inherited from an
    /// ancestor defers to the ancestor chain; a bare shell authored here
    /// means the key was explicitly unmapped and resolves nothing.
    fn resolvable_config(&self, key: &RequestKey) -> Option<Arc<InjectionConfig>> {
        let entry = self.inner.registry.get(key)?;
        if entry.has_result() {
            return Some(entry);
        }
        if entry.is_owned_by(self.inner.id) {
            return None;
        }
        self.ancestor_mapping(key)
    }

    // =========================================================================
    // Injection API
    // =========================================================================

    /// Inject this container's mappings into the target's injection points.
    ///
    /// Points are applied in discovery order, each field name at most once
    /// (first occurrence wins). A required point with no resolvable rule
    /// fails with [`InjectorError::UnsatisfiedDependency`]; optional points
    /// are skipped. There is no rollback: fields injected before a failure
    /// keep their values. Callers needing atomicity should pre-validate every
    /// dependency with [`has_mapping`](Injector::has_mapping).
    ///
    /// After the last point, the target's `post_construct` hook runs.
    pub fn inject_into<T: InjectTarget>(&self, target: &mut T) -> Result<()> {
        let points = T::injection_points();
        let target_name = std::any::type_name::<T>();

        #[cfg(feature = "logging")]
        debug!(
            target: "armature_inject",
            service = target_name,
            points = points.len(),
            depth = self.inner.depth,
            "Injecting into target"
        );

        let mut seen: Vec<&'static str> = Vec::with_capacity(points.len());
        for point in &points {
            if seen.contains(&point.field) {
                continue;
            }
            seen.push(point.field);

            match self.resolvable_config(&point.key) {
                Some(config) => {
                    let value = config.resolve(self)?;
                    target.assign(point.field, value)?;
                }
                None if point.optional => {
                    #[cfg(feature = "logging")]
                    trace!(
                        target: "armature_inject",
                        service = target_name,
                        field = point.field,
                        "Skipping unsatisfied optional injection point"
                    );
                }
                None => {
                    return Err(InjectorError::unsatisfied(
                        target_name,
                        point.field,
                        &point.key,
                    ));
                }
            }
        }

        target.post_construct();
        Ok(())
    }

    /// Construct a bare instance of `T` without performing any injection.
    ///
    /// Exists for adapters that wire dependencies externally.
    pub fn construct<T: InjectTarget>(&self) -> T {
        T::construct_bare()
    }

    /// Construct a fresh instance of `T` and inject into it.
    ///
    /// Always produces a new instance, never a cached one, regardless of how
    /// `T` is mapped elsewhere.
    pub fn instantiate<T: InjectTarget>(&self) -> Result<T> {
        let mut instance = T::construct_bare();
        self.inject_into(&mut instance)?;
        Ok(instance)
    }

    // =========================================================================
    // Hierarchy API
    // =========================================================================

    /// Create a child container inheriting every rule of this one.
    ///
    /// The child bulk-copies all current rule entries by reference and will
    /// receive future parent rules at write time, unless it has shadowed the
    /// key locally. The child holds only a weak back reference to its parent.
    pub fn create_child_injector(&self) -> Injector {
        let child = Injector {
            inner: Arc::new(InjectorInner {
                id: next_injector_id(),
                registry: MappingRegistry::new(),
                parent: Arc::downgrade(&self.inner),
                children: Mutex::new(Vec::new()),
                depth: self.inner.depth + 1,
            }),
        };

        for (key, config) in self.inner.registry.entries() {
            child.inner.registry.insert(key, config);
        }
        self.inner
            .children
            .lock()
            .unwrap()
            .push(Arc::clone(&child.inner));

        #[cfg(feature = "logging")]
        debug!(
            target: "armature_inject",
            parent_depth = self.inner.depth,
            child_depth = child.inner.depth,
            inherited_rules = child.inner.registry.len(),
            "Created child injector"
        );

        child
    }

    /// The parent container, if it is still alive.
    pub fn parent(&self) -> Option<Injector> {
        self.inner.parent.upgrade().map(|inner| Injector { inner })
    }

    /// Find the authoritative ancestor rule for unnamed requests of `T`.
    pub fn get_ancestor_mapping<T: Injectable>(&self) -> Option<Arc<InjectionConfig>> {
        self.get_ancestor_mapping_named::<T>("")
    }

    /// Find the authoritative ancestor rule for requests of `T` qualified by
    /// `name`.
    ///
    /// Walks up the parent chain for the first ancestor whose entry for the
    /// key was authored on that ancestor itself and still carries a result,
    /// skipping inherited copies and empty shells along the way.
    pub fn get_ancestor_mapping_named<T: Injectable>(
        &self,
        name: &str,
    ) -> Option<Arc<InjectionConfig>> {
        self.ancestor_mapping(&RequestKey::named::<T>(name))
    }

    fn ancestor_mapping(&self, key: &RequestKey) -> Option<Arc<InjectionConfig>> {
        let mut current = self.inner.parent.upgrade();
        while let Some(ancestor) = current {
            if let Some(config) = ancestor.registry.get(key) {
                if config.is_owned_by(ancestor.id) && config.has_result() {
                    return Some(config);
                }
            }
            current = ancestor.parent.upgrade();
        }
        None
    }
}

/// Push a new or cleared rule into every descendant without a local override.
///
/// Depth-first over the child list; a child that authored its own rule for
/// the key shadows the whole subtree below it.
fn propagate(inner: &InjectorInner, key: &RequestKey, config: &Arc<InjectionConfig>) {
    let children = inner.children.lock().unwrap();
    for child in children.iter() {
        if let Some(existing) = child.registry.get(key) {
            if existing.is_owned_by(child.id) {
                continue;
            }
        }
        child.registry.insert(key.clone(), Arc::clone(config));
        propagate(child, key, config);
    }
}

impl Default for Injector {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Injector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injector")
            .field("rule_count", &self.len())
            .field("depth", &self.inner.depth)
            .field("has_parent", &self.inner.parent.upgrade().is_some())
            .finish()
    }
}
