//! Request keys for the mapping registry
//!
//! A [`RequestKey`] identifies one injectable request: the requested type plus
//! an optional qualifier name. Keys are pure values; equality and hashing only
//! consider the `TypeId` and the name, never object identity.

use std::any::TypeId;
use std::borrow::Cow;
use std::hash::{Hash, Hasher};

/// Key for one injectable request: `(requested type, qualifier name)`.
///
/// The empty name is the unnamed request; [`RequestKey::of`] and
/// `RequestKey::named::<T>("")` produce equal keys. The type name is carried
/// for diagnostics only and takes no part in equality or hashing, so keys
/// built in different containers (or different calls) compare purely by
/// `(TypeId, name)`.
///
/// # Examples
///
/// ```rust
/// use armature_inject::RequestKey;
///
/// struct Database;
///
/// let a = RequestKey::of::<Database>();
/// let b = RequestKey::named::<Database>("");
/// let c = RequestKey::named::<Database>("replica");
///
/// assert_eq!(a, b);
/// assert_ne!(a, c);
/// ```
#[derive(Debug, Clone)]
pub struct RequestKey {
    type_id: TypeId,
    type_name: &'static str,
    name: Cow<'static, str>,
}

impl RequestKey {
    /// Key for an unnamed request of type `T`.
    #[inline]
    pub fn of<T: 'static>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            name: Cow::Borrowed(""),
        }
    }

    /// Key for a request of type `T` qualified by `name`.
    ///
    /// An empty name means the unnamed request.
    #[inline]
    pub fn named<T: 'static>(name: &str) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            name: Cow::Owned(name.to_owned()),
        }
    }

    /// The `TypeId` of the requested type.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Human-readable name of the requested type (diagnostics only).
    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// The qualifier name; empty for unnamed requests.
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this key carries a non-empty qualifier name.
    #[inline]
    pub fn is_named(&self) -> bool {
        !self.name.is_empty()
    }
}

// Equality ignores type_name: two keys for the same (TypeId, name) built
// anywhere must compare equal.
impl PartialEq for RequestKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.name == other.name
    }
}

impl Eq for RequestKey {}

impl Hash for RequestKey {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
        self.name.hash(state);
    }
}

impl std::fmt::Display for RequestKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_named() {
            write!(f, "{} (named \"{}\")", self.type_name, self.name)
        } else {
            write!(f, "{}", self.type_name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ServiceA;
    struct ServiceB;

    #[test]
    fn equal_inputs_yield_equal_keys() {
        assert_eq!(RequestKey::of::<ServiceA>(), RequestKey::of::<ServiceA>());
        assert_eq!(
            RequestKey::named::<ServiceA>("x"),
            RequestKey::named::<ServiceA>("x")
        );
    }

    #[test]
    fn empty_name_is_unnamed() {
        assert_eq!(RequestKey::of::<ServiceA>(), RequestKey::named::<ServiceA>(""));
        assert!(!RequestKey::of::<ServiceA>().is_named());
        assert!(RequestKey::named::<ServiceA>("x").is_named());
    }

    #[test]
    fn distinct_pairs_never_collide() {
        assert_ne!(RequestKey::of::<ServiceA>(), RequestKey::of::<ServiceB>());
        assert_ne!(
            RequestKey::of::<ServiceA>(),
            RequestKey::named::<ServiceA>("x")
        );
        assert_ne!(
            RequestKey::named::<ServiceA>("x"),
            RequestKey::named::<ServiceA>("y")
        );
        assert_ne!(
            RequestKey::named::<ServiceA>("x"),
            RequestKey::named::<ServiceB>("x")
        );
    }

    #[test]
    fn hashes_agree_with_equality() {
        use std::collections::hash_map::DefaultHasher;

        fn hash_of(key: &RequestKey) -> u64 {
            let mut hasher = DefaultHasher::new();
            key.hash(&mut hasher);
            hasher.finish()
        }

        let unnamed = RequestKey::of::<ServiceA>();
        let empty_named = RequestKey::named::<ServiceA>("");
        assert_eq!(hash_of(&unnamed), hash_of(&empty_named));

        let a = RequestKey::named::<ServiceA>("x");
        let b = RequestKey::named::<ServiceA>("x");
        assert_eq!(hash_of(&a), hash_of(&b));
    }

    #[test]
    fn display_carries_qualifier() {
        let unnamed = format!("{}", RequestKey::of::<ServiceA>());
        assert!(unnamed.contains("ServiceA"));

        let named = format!("{}", RequestKey::named::<ServiceA>("replica"));
        assert!(named.contains("replica"));
    }
}
