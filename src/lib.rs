//! # Armature Inject - Rule-Based Dependency Injection for Rust
//!
//! A mapping-rule dependency injection container with named qualifiers,
//! pluggable result strategies and hierarchical child containers.
//!
//! ## Features
//!
//! - 🗺️ **Mapping rules** - One rule per `(type, name)` request, swappable at runtime
//! - 🏷️ **Named qualifiers** - Several independent rules for the same type
//! - 🏭 **Result strategies** - Fixed values, per-request classes, lazy singletons, aliases
//! - 💉 **Field injection** - Targets declare injection points; the engine fills them
//! - 🌳 **Container hierarchies** - Children inherit rules by reference, override locally
//! - ⚡ **Lock-free registry** - `DashMap` keyed by request, no global locks
//! - 📊 **Observable** - Optional tracing integration with JSON or pretty output
//!
//! ## Quick Start
//!
//! ```rust
//! use armature_inject::Injector;
//!
//! #[derive(Clone)]
//! struct Database {
//!     url: String,
//! }
//!
//! let injector = Injector::new();
//!
//! // Map the unnamed request for Database to a fixed instance
//! injector.map_value(Database { url: "postgres://localhost".into() });
//!
//! // And a named request to a different one
//! injector.map_value_named("replica", Database { url: "postgres://replica".into() });
//!
//! // Resolve - returns Arc<T> for zero-copy sharing
//! let main = injector.get_instance::<Database>().unwrap();
//! let replica = injector.get_instance_named::<Database>("replica").unwrap();
//! assert_ne!(main.url, replica.url);
//! ```
//!
//! ## Field Injection
//!
//! Targets implement [`InjectTarget`] (by hand or with
//! `#[derive(InjectTarget)]` from the `derive` feature) to tell the engine
//! which fields want values:
//!
//! ```rust
//! use armature_inject::{
//!     InjectTarget, InjectionPoint, Injector, InjectorError, SharedValue,
//! };
//! use std::sync::Arc;
//!
//! #[derive(Clone)]
//! struct Database {
//!     url: String,
//! }
//!
//! #[derive(Default)]
//! struct UserService {
//!     db: Option<Arc<Database>>,
//! }
//!
//! impl InjectTarget for UserService {
//!     fn injection_points() -> Vec<InjectionPoint> {
//!         vec![InjectionPoint::required::<Database>("db")]
//!     }
//!
//!     fn construct_bare() -> Self {
//!         Self::default()
//!     }
//!
//!     fn assign(&mut self, field: &'static str, value: SharedValue) -> armature_inject::Result<()> {
//!         match field {
//!             "db" => {
//!                 self.db = value.downcast().ok();
//!                 Ok(())
//!             }
//!             other => Err(InjectorError::UnknownField {
//!                 target: "UserService",
//!                 field: other.to_string(),
//!             }),
//!         }
//!     }
//! }
//!
//! let injector = Injector::new();
//! injector.map_value(Database { url: "postgres://localhost".into() });
//!
//! let service = injector.instantiate::<UserService>().unwrap();
//! assert!(service.db.is_some());
//! ```
//!
//! ## Container Hierarchies
//!
//! ```rust
//! use armature_inject::Injector;
//!
//! #[derive(Clone)]
//! struct AppConfig {
//!     name: String,
//! }
//!
//! #[derive(Clone)]
//! struct RequestContext {
//!     id: String,
//! }
//!
//! let root = Injector::new();
//! root.map_value(AppConfig { name: "MyApp".into() });
//!
//! // Per-request child inherits root rules and adds its own
//! let request = root.create_child_injector();
//! request.map_value(RequestContext { id: "req-123".into() });
//!
//! assert!(request.has_mapping::<AppConfig>());
//! assert!(request.has_mapping::<RequestContext>());
//!
//! // The root never sees child rules
//! assert!(!root.has_mapping::<RequestContext>());
//! ```
//!
//! ## Result Strategies
//!
//! - `map_value` - always return the given instance, no injection performed
//! - `map_class` - construct, inject and return a fresh instance per request
//! - `map_singleton` - construct and inject once, lazily, then share
//! - `map_rule` - delegate the request to another rule, even across containers

mod config;
mod error;
mod injector;
mod key;
#[cfg(feature = "logging")]
pub mod logging;
mod registry;
mod result;
mod target;

pub use config::InjectionConfig;
pub use error::{InjectorError, Result};
pub use injector::Injector;
pub use key::RequestKey;
pub use result::{AliasResult, ClassResult, SingletonResult, ValueResult};
pub use target::{Implements, InjectTarget, Injectable, InjectionPoint, SharedValue};

// Derive macro lives in its own crate; same-name re-export next to the trait
#[cfg(feature = "derive")]
pub use armature_inject_derive::InjectTarget;

// Re-export tracing macros for convenience when logging is enabled
#[cfg(feature = "logging")]
pub use tracing::{debug, error, info, trace, warn};

// Re-export for convenience
pub use std::sync::Arc;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::{
        Implements, InjectTarget, Injectable, InjectionConfig, InjectionPoint, Injector,
        InjectorError, RequestKey, Result, SharedValue,
    };
    pub use std::sync::Arc;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Clone)]
    struct Database {
        url: String,
    }

    #[derive(Clone)]
    struct Cache {
        size: usize,
    }

    static SERVICES_BUILT: AtomicU32 = AtomicU32::new(0);

    struct UserService {
        serial: u32,
        db: Option<Arc<Database>>,
        cache: Option<Arc<Cache>>,
        started: bool,
    }

    impl InjectTarget for UserService {
        fn injection_points() -> Vec<InjectionPoint> {
            vec![
                InjectionPoint::required::<Database>("db"),
                InjectionPoint::required::<Cache>("cache"),
            ]
        }

        fn construct_bare() -> Self {
            Self {
                serial: SERVICES_BUILT.fetch_add(1, Ordering::SeqCst),
                db: None,
                cache: None,
                started: false,
            }
        }

        fn assign(&mut self, field: &'static str, value: SharedValue) -> Result<()> {
            match field {
                "db" => {
                    self.db = Some(value.downcast().map_err(|_| InjectorError::TypeMismatch {
                        expected: "Database",
                        key_type: "Database",
                    })?)
                }
                "cache" => {
                    self.cache =
                        Some(value.downcast().map_err(|_| InjectorError::TypeMismatch {
                            expected: "Cache",
                            key_type: "Cache",
                        })?)
                }
                other => {
                    return Err(InjectorError::UnknownField {
                        target: "UserService",
                        field: other.to_string(),
                    })
                }
            }
            Ok(())
        }

        fn post_construct(&mut self) {
            self.started = true;
        }
    }

    struct Dashboard {
        db: Option<Arc<Database>>,
        cache: Option<Arc<Cache>>,
    }

    impl InjectTarget for Dashboard {
        fn injection_points() -> Vec<InjectionPoint> {
            vec![
                InjectionPoint::required::<Database>("db"),
                InjectionPoint::optional::<Cache>("cache"),
            ]
        }

        fn construct_bare() -> Self {
            Self {
                db: None,
                cache: None,
            }
        }

        fn assign(&mut self, field: &'static str, value: SharedValue) -> Result<()> {
            match field {
                "db" => self.db = value.downcast().ok(),
                "cache" => self.cache = value.downcast().ok(),
                other => {
                    return Err(InjectorError::UnknownField {
                        target: "Dashboard",
                        field: other.to_string(),
                    })
                }
            }
            Ok(())
        }
    }

    fn mapped_injector() -> Injector {
        let injector = Injector::new();
        injector.map_value(Database {
            url: "postgres://localhost".into(),
        });
        injector.map_value(Cache { size: 64 });
        injector
    }

    #[test]
    fn value_mapping_returns_the_identical_instance() {
        let injector = mapped_injector();
        let a = injector.get_instance::<Database>().unwrap();
        let b = injector.get_instance::<Database>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn class_mapping_builds_a_fresh_injected_instance_per_request() {
        let injector = mapped_injector();
        injector.map_class::<UserService, UserService>();

        let a = injector.get_instance::<UserService>().unwrap();
        let b = injector.get_instance::<UserService>().unwrap();

        assert_ne!(a.serial, b.serial);
        assert!(a.db.is_some());
        assert!(a.cache.is_some());
        assert!(a.started);
    }

    #[test]
    fn singleton_mapping_shares_one_lazy_instance() {
        let injector = mapped_injector();
        let rule = injector.map_singleton::<UserService>();

        assert!(rule.has_result());

        let a = injector.get_instance::<UserService>().unwrap();
        let b = injector.get_instance::<UserService>().unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(a.started);
    }

    #[test]
    fn singleton_is_shared_with_unshadowed_children() {
        let parent = mapped_injector();
        parent.map_singleton::<UserService>();
        let child = parent.create_child_injector();

        let from_child = child.get_instance::<UserService>().unwrap();
        let from_parent = parent.get_instance::<UserService>().unwrap();
        assert!(Arc::ptr_eq(&from_child, &from_parent));
    }

    #[test]
    fn child_singleton_override_owns_its_own_instance() {
        let parent = mapped_injector();
        parent.map_singleton::<UserService>();

        let child = parent.create_child_injector();
        child.map_singleton::<UserService>();

        let from_parent = parent.get_instance::<UserService>().unwrap();
        let from_child = child.get_instance::<UserService>().unwrap();
        assert!(!Arc::ptr_eq(&from_parent, &from_child));
    }

    #[test]
    fn named_rules_resolve_independently() {
        let injector = Injector::new();
        injector.map_value(Database { url: "main".into() });
        injector.map_value_named("replica", Database { url: "replica".into() });

        assert_eq!(injector.get_instance::<Database>().unwrap().url, "main");
        assert_eq!(
            injector.get_instance_named::<Database>("replica").unwrap().url,
            "replica"
        );
        assert!(injector.try_get_instance_named::<Database>("missing").is_none());
    }

    #[test]
    fn alias_shares_the_delegated_rules_identity() {
        let injector = mapped_injector();
        let singleton = injector.map_singleton::<UserService>();
        injector.map_rule_named::<UserService>("primary", &singleton);

        let direct = injector.get_instance::<UserService>().unwrap();
        let aliased = injector.get_instance_named::<UserService>("primary").unwrap();
        assert!(Arc::ptr_eq(&direct, &aliased));
    }

    #[test]
    fn instantiate_ignores_singleton_caching() {
        let injector = mapped_injector();
        injector.map_singleton::<UserService>();

        let cached = injector.get_instance::<UserService>().unwrap();
        let fresh = injector.instantiate::<UserService>().unwrap();
        assert_ne!(cached.serial, fresh.serial);
        assert!(fresh.db.is_some());
        assert!(fresh.started);
    }

    #[test]
    fn construct_performs_no_injection() {
        let injector = mapped_injector();
        let bare = injector.construct::<UserService>();
        assert!(bare.db.is_none());
        assert!(!bare.started);
    }

    #[test]
    fn failed_injection_keeps_earlier_fields() {
        let injector = Injector::new();
        injector.map_value(Database { url: "main".into() });
        // Cache deliberately unmapped

        let mut service = UserService::construct_bare();
        let err = injector.inject_into(&mut service).unwrap_err();

        match err {
            InjectorError::UnsatisfiedDependency { target, field, .. } => {
                assert!(target.contains("UserService"));
                assert_eq!(field, "cache");
            }
            other => panic!("unexpected error: {other}"),
        }

        // No rollback: the db field stays injected, the hook never ran
        assert!(service.db.is_some());
        assert!(service.cache.is_none());
        assert!(!service.started);
    }

    #[test]
    fn optional_points_are_skipped_when_unmapped() {
        let injector = Injector::new();
        injector.map_value(Database { url: "main".into() });

        let dashboard = injector.instantiate::<Dashboard>().unwrap();
        assert!(dashboard.db.is_some());
        assert!(dashboard.cache.is_none());

        injector.map_value(Cache { size: 16 });
        let dashboard = injector.instantiate::<Dashboard>().unwrap();
        assert!(dashboard.cache.is_some());
    }

    #[test]
    fn parent_rules_reach_children_mapped_before_or_after_creation() {
        let parent = Injector::new();
        parent.map_value(Database { url: "early".into() });

        let child = parent.create_child_injector();
        parent.map_value(Cache { size: 8 });

        assert_eq!(child.get_instance::<Database>().unwrap().url, "early");
        assert_eq!(child.get_instance::<Cache>().unwrap().size, 8);
    }

    #[test]
    fn unmap_disables_resolution_and_injection() {
        let injector = mapped_injector();
        injector.unmap::<Cache>().unwrap();

        assert!(matches!(
            injector.get_instance::<Cache>(),
            Err(InjectorError::MissingMapping { .. })
        ));
        assert!(matches!(
            injector.instantiate::<UserService>(),
            Err(InjectorError::UnsatisfiedDependency { .. })
        ));
    }

    #[test]
    fn trait_object_requests_resolve_through_implements() {
        trait Clock: Send + Sync {
            fn now(&self) -> u64;
        }

        #[derive(Clone)]
        struct Time(Arc<dyn Clock>);

        #[derive(Default)]
        struct FixedClock;

        impl Clock for FixedClock {
            fn now(&self) -> u64 {
                42
            }
        }

        impl InjectTarget for FixedClock {
            fn injection_points() -> Vec<InjectionPoint> {
                Vec::new()
            }

            fn construct_bare() -> Self {
                Self::default()
            }

            fn assign(&mut self, field: &'static str, _: SharedValue) -> Result<()> {
                Err(InjectorError::UnknownField {
                    target: "FixedClock",
                    field: field.to_string(),
                })
            }
        }

        impl Implements<Time> for FixedClock {
            fn coerce(instance: Arc<Self>) -> Arc<Time> {
                Arc::new(Time(instance))
            }
        }

        let injector = Injector::new();
        injector.map_singleton_of::<Time, FixedClock>();

        let time = injector.get_instance::<Time>().unwrap();
        assert_eq!(time.0.now(), 42);
    }

    #[test]
    fn named_and_unnamed_points_receive_their_own_rules() {
        struct Failover {
            primary: Option<Arc<Database>>,
            fallback: Option<Arc<Database>>,
        }

        impl InjectTarget for Failover {
            fn injection_points() -> Vec<InjectionPoint> {
                vec![
                    InjectionPoint::named::<Database>("primary", "primary"),
                    InjectionPoint::required::<Database>("fallback"),
                ]
            }

            fn construct_bare() -> Self {
                Self {
                    primary: None,
                    fallback: None,
                }
            }

            fn assign(&mut self, field: &'static str, value: SharedValue) -> Result<()> {
                match field {
                    "primary" => self.primary = value.downcast().ok(),
                    "fallback" => self.fallback = value.downcast().ok(),
                    other => {
                        return Err(InjectorError::UnknownField {
                            target: "Failover",
                            field: other.to_string(),
                        })
                    }
                }
                Ok(())
            }
        }

        let injector = Injector::new();
        let plain = Arc::new(Database { url: "plain".into() });
        let named = Arc::new(Database { url: "named".into() });
        injector.map_value_arc(Arc::clone(&plain));
        injector.map_value_arc_named("primary", Arc::clone(&named));

        let failover = injector.instantiate::<Failover>().unwrap();
        assert!(Arc::ptr_eq(failover.primary.as_ref().unwrap(), &named));
        assert!(Arc::ptr_eq(failover.fallback.as_ref().unwrap(), &plain));
    }

    #[test]
    fn duplicate_injection_points_apply_first_occurrence_only() {
        struct Doubled {
            db: Option<Arc<Database>>,
            assignments: u32,
        }

        impl InjectTarget for Doubled {
            fn injection_points() -> Vec<InjectionPoint> {
                vec![
                    InjectionPoint::named::<Database>("db", "primary"),
                    InjectionPoint::required::<Database>("db"),
                ]
            }

            fn construct_bare() -> Self {
                Self {
                    db: None,
                    assignments: 0,
                }
            }

            fn assign(&mut self, field: &'static str, value: SharedValue) -> Result<()> {
                match field {
                    "db" => {
                        self.assignments += 1;
                        self.db = value.downcast().ok();
                        Ok(())
                    }
                    other => Err(InjectorError::UnknownField {
                        target: "Doubled",
                        field: other.to_string(),
                    }),
                }
            }
        }

        let injector = Injector::new();
        injector.map_value(Database { url: "plain".into() });
        injector.map_value_named("primary", Database { url: "primary".into() });

        let target = injector.instantiate::<Doubled>().unwrap();
        assert_eq!(target.assignments, 1);
        assert_eq!(target.db.unwrap().url, "primary");
    }
}
