//! Error types for the injection engine

use crate::key::RequestKey;
use thiserror::Error;

/// Errors surfaced by mapping, resolution and injection operations.
///
/// All failures propagate synchronously to the direct caller; there is no
/// retry and no fallback mapping. Query operations (`has_mapping`,
/// `get_config`, `try_get_instance`) never produce these errors.
#[derive(Error, Debug, Clone)]
pub enum InjectorError {
    /// No resolvable rule exists for the requested (type, name) pair
    #[error("no mapping found for {type_name} (name: \"{name}\")")]
    MissingMapping {
        type_name: &'static str,
        name: String,
    },

    /// An injection point on a target has no corresponding rule
    #[error(
        "unsatisfied dependency for field `{field}` of {target}: \
         no mapping found for {type_name} (name: \"{name}\")"
    )]
    UnsatisfiedDependency {
        target: &'static str,
        field: &'static str,
        type_name: &'static str,
        name: String,
    },

    /// A rule produced a value of a different type than the request
    ///
    /// Reachable through aliases, which may legally delegate to a rule
    /// registered for another type.
    #[error("mapping for {key_type} produced a value that is not {expected}")]
    TypeMismatch {
        expected: &'static str,
        key_type: &'static str,
    },

    /// A resolved value was handed to a field the target does not declare
    #[error("{target} has no injectable field `{field}`")]
    UnknownField { target: &'static str, field: String },

    /// The class being injected into or constructed is not instantiable
    ///
    /// Never produced by the engine itself; reserved for metadata
    /// collaborators that discover points for types they cannot build.
    #[error("{type_name} is not a valid injection target: {reason}")]
    InvalidTarget {
        type_name: &'static str,
        reason: String,
    },
}

impl InjectorError {
    /// Create a MissingMapping error from a request key
    #[inline]
    pub fn missing_mapping(key: &RequestKey) -> Self {
        Self::MissingMapping {
            type_name: key.type_name(),
            name: key.name().to_owned(),
        }
    }

    /// Create an UnsatisfiedDependency error for an injection point
    #[inline]
    pub fn unsatisfied(target: &'static str, field: &'static str, key: &RequestKey) -> Self {
        Self::UnsatisfiedDependency {
            target,
            field,
            type_name: key.type_name(),
            name: key.name().to_owned(),
        }
    }

    /// Create a TypeMismatch error for a failed downcast
    #[inline]
    pub fn type_mismatch<T: 'static>(key: &RequestKey) -> Self {
        Self::TypeMismatch {
            expected: std::any::type_name::<T>(),
            key_type: key.type_name(),
        }
    }
}

/// Result type alias for injection operations
pub type Result<T> = std::result::Result<T, InjectorError>;
