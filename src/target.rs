//! Injection targets and the metadata collaborator traits
//!
//! The engine itself never inspects struct layouts. Everything it needs to
//! know about a target type comes through [`InjectTarget`]: which fields want
//! a value ([`InjectionPoint`]s), how to build a bare instance, and how to
//! write a resolved value into a named field. Implementations are either
//! hand-written or generated by `#[derive(InjectTarget)]` from the
//! `armature-inject-derive` crate.

use crate::error::{InjectorError, Result};
use crate::key::RequestKey;
use std::any::Any;
use std::sync::Arc;

/// Type-erased resolved value as stored in the registry and handed to
/// [`InjectTarget::assign`].
pub type SharedValue = Arc<dyn Any + Send + Sync>;

/// Marker trait for types that can participate in injection.
///
/// Automatically implemented for all `Send + Sync + 'static` types; never
/// implement this manually.
pub trait Injectable: Send + Sync + 'static {}

impl<T: Send + Sync + 'static> Injectable for T {}

/// Descriptor of a single injectable field on a target type.
///
/// Points are transient values recomputed (or statically built) per call;
/// only their field name and [`RequestKey`] matter to the engine.
#[derive(Debug, Clone)]
pub struct InjectionPoint {
    /// Name of the field receiving the value
    pub field: &'static str,
    /// The request this field asks the container to satisfy
    pub key: RequestKey,
    /// Optional points are skipped instead of failing when unmapped
    pub optional: bool,
}

impl InjectionPoint {
    /// Required unnamed point for a field of type `T`.
    #[inline]
    pub fn required<T: 'static>(field: &'static str) -> Self {
        Self {
            field,
            key: RequestKey::of::<T>(),
            optional: false,
        }
    }

    /// Required point for a field of type `T` qualified by `name`.
    #[inline]
    pub fn named<T: 'static>(field: &'static str, name: &'static str) -> Self {
        Self {
            field,
            key: RequestKey::named::<T>(name),
            optional: false,
        }
    }

    /// Optional unnamed point for a field of type `T`.
    #[inline]
    pub fn optional<T: 'static>(field: &'static str) -> Self {
        Self {
            field,
            key: RequestKey::of::<T>(),
            optional: true,
        }
    }

    /// Optional point qualified by `name`.
    #[inline]
    pub fn optional_named<T: 'static>(field: &'static str, name: &'static str) -> Self {
        Self {
            field,
            key: RequestKey::named::<T>(name),
            optional: true,
        }
    }
}

/// Metadata, construction and field-assignment capability for a target type.
///
/// This is the boundary between the engine and whatever knows struct layouts
/// (normally the derive macro). A conforming implementation must keep
/// `injection_points` stable for the process lifetime and list points most
/// specific first: the engine applies each field name at most once, first
/// occurrence wins.
///
/// # Examples
///
/// ```rust
/// use armature_inject::{InjectTarget, InjectionPoint, InjectorError, SharedValue};
/// use std::sync::Arc;
///
/// struct Database;
///
/// #[derive(Default)]
/// struct Report {
///     db: Option<Arc<Database>>,
/// }
///
/// impl InjectTarget for Report {
///     fn injection_points() -> Vec<InjectionPoint> {
///         vec![InjectionPoint::required::<Database>("db")]
///     }
///
///     fn construct_bare() -> Self {
///         Self::default()
///     }
///
///     fn assign(&mut self, field: &'static str, value: SharedValue) -> armature_inject::Result<()> {
///         match field {
///             "db" => {
///                 self.db = Some(value.downcast().map_err(|_| {
///                     InjectorError::TypeMismatch {
///                         expected: "Database",
///                         key_type: "Database",
///                     }
///                 })?);
///                 Ok(())
///             }
///             other => Err(InjectorError::UnknownField {
///                 target: "Report",
///                 field: other.to_string(),
///             }),
///         }
///     }
/// }
/// ```
pub trait InjectTarget: Injectable {
    /// Ordered field descriptors for this type, most specific first.
    fn injection_points() -> Vec<InjectionPoint>
    where
        Self: Sized;

    /// No-argument construction without any injection performed.
    fn construct_bare() -> Self
    where
        Self: Sized;

    /// Write a resolved value into the named field.
    ///
    /// Must accept every field name listed by `injection_points` and reject
    /// everything else with [`InjectorError::UnknownField`].
    fn assign(&mut self, field: &'static str, value: SharedValue) -> Result<()>;

    /// Hook invoked once after all injection points have been applied.
    fn post_construct(&mut self) {}
}

/// Coercion from a concrete implementation into the request type it serves.
///
/// `map_class::<T, C>` and `map_singleton_of::<T, C>` construct a `C` but
/// store it under the key for `T`; this trait is the typed seam that performs
/// that coercion. It is blanket-implemented for `C == T`, so homogeneous
/// mappings need nothing extra. For heterogeneous mappings, implement it on
/// the concrete type:
///
/// ```rust
/// use armature_inject::{Implements, InjectTarget, InjectionPoint, SharedValue};
/// use std::sync::Arc;
///
/// trait Greet: Send + Sync {
///     fn hello(&self) -> String;
/// }
///
/// // Request type: a cheap handle around the trait object.
/// #[derive(Clone)]
/// struct Greeter(Arc<dyn Greet>);
///
/// #[derive(Default)]
/// struct ConsoleGreeter;
///
/// impl Greet for ConsoleGreeter {
///     fn hello(&self) -> String {
///         "hello".into()
///     }
/// }
///
/// impl InjectTarget for ConsoleGreeter {
///     fn injection_points() -> Vec<InjectionPoint> {
///         Vec::new()
///     }
///     fn construct_bare() -> Self {
///         Self::default()
///     }
///     fn assign(&mut self, field: &'static str, _: SharedValue) -> armature_inject::Result<()> {
///         Err(armature_inject::InjectorError::UnknownField {
///             target: "ConsoleGreeter",
///             field: field.to_string(),
///         })
///     }
/// }
///
/// impl Implements<Greeter> for ConsoleGreeter {
///     fn coerce(instance: Arc<Self>) -> Arc<Greeter> {
///         Arc::new(Greeter(instance))
///     }
/// }
/// ```
pub trait Implements<T: Injectable>: InjectTarget {
    /// Coerce a freshly built and injected instance into the request type.
    fn coerce(instance: Arc<Self>) -> Arc<T>;
}

impl<T: InjectTarget> Implements<T> for T {
    #[inline]
    fn coerce(instance: Arc<Self>) -> Arc<T> {
        instance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone)]
    struct Engine {
        power: u32,
    }

    #[derive(Default)]
    struct Car {
        engine: Option<Arc<Engine>>,
        spare: Option<Arc<Engine>>,
        ready: bool,
    }

    impl InjectTarget for Car {
        fn injection_points() -> Vec<InjectionPoint> {
            vec![
                InjectionPoint::required::<Engine>("engine"),
                InjectionPoint::named::<Engine>("spare", "spare"),
            ]
        }

        fn construct_bare() -> Self {
            Self::default()
        }

        fn assign(&mut self, field: &'static str, value: SharedValue) -> Result<()> {
            let engine = value
                .downcast::<Engine>()
                .map_err(|_| InjectorError::TypeMismatch {
                    expected: "Engine",
                    key_type: "Engine",
                })?;
            match field {
                "engine" => self.engine = Some(engine),
                "spare" => self.spare = Some(engine),
                other => {
                    return Err(InjectorError::UnknownField {
                        target: "Car",
                        field: other.to_string(),
                    })
                }
            }
            Ok(())
        }

        fn post_construct(&mut self) {
            self.ready = true;
        }
    }

    #[test]
    fn points_carry_keys_in_declaration_order() {
        let points = Car::injection_points();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].field, "engine");
        assert!(!points[0].key.is_named());
        assert_eq!(points[1].field, "spare");
        assert_eq!(points[1].key.name(), "spare");
    }

    #[test]
    fn assign_writes_the_named_field() {
        let mut car = Car::construct_bare();
        let engine: SharedValue = Arc::new(Engine { power: 90 });
        car.assign("engine", engine).unwrap();
        assert_eq!(car.engine.as_ref().unwrap().power, 90);
        assert!(car.spare.is_none());
    }

    #[test]
    fn assign_rejects_unknown_fields() {
        let mut car = Car::construct_bare();
        let engine: SharedValue = Arc::new(Engine { power: 90 });
        let err = car.assign("wheel", engine).unwrap_err();
        assert!(matches!(err, InjectorError::UnknownField { .. }));
    }

    #[test]
    fn blanket_implements_is_identity() {
        let car = Arc::new(Car::construct_bare());
        let coerced: Arc<Car> = <Car as Implements<Car>>::coerce(Arc::clone(&car));
        assert!(Arc::ptr_eq(&car, &coerced));
    }
}
