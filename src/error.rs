//! Error types for PolarCraft.
//!
//! The physics kernel itself is total: propagation and encoding never fail.
//! Errors exist at the edges, where configuration is loaded, where discovery
//! predicates inspect loosely-typed scene data, and where a host talks to the
//! engine runtime across threads.

use thiserror::Error;

/// Validation errors that occur while checking configuration.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        reason: String,
    },

    #[error("Failed to parse configuration: {message}")]
    ConfigParse {
        message: String,
    },

    #[error("Failed to read configuration file '{path}': {message}")]
    ConfigIo {
        path: String,
        message: String,
    },
}

/// Failures raised by a discovery predicate.
///
/// The evaluator never surfaces these to users; a failing predicate is
/// logged and treated as "condition not met".
#[allow(missing_docs)]
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PredicateError {
    #[error("Element '{element_id}' is missing property '{property}'")]
    MissingProperty {
        element_id: String,
        property: String,
    },

    #[error("Element '{element_id}' has a non-finite value for '{property}'")]
    NonFinite {
        element_id: String,
        property: String,
    },

    #[error("Predicate '{discovery_id}' panicked: {message}")]
    Panicked {
        discovery_id: String,
        message: String,
    },
}

/// Errors talking to the engine runtime.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Engine command queue is full (capacity: {capacity})")]
    QueueFull {
        capacity: usize,
    },

    #[error("Engine runtime disconnected")]
    Disconnected,
}

/// Top-level error type for PolarCraft.
#[allow(missing_docs)]
#[derive(Debug, Error)]
pub enum PolarError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Predicate error: {0}")]
    Predicate(#[from] PredicateError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("Internal error: {message}")]
    Internal {
        message: String,
    },
}

impl PolarError {
    /// Creates an internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is a predicate error.
    #[must_use]
    pub const fn is_predicate(&self) -> bool {
        matches!(self, Self::Predicate(_))
    }

    /// Returns true if this is a runtime error.
    #[must_use]
    pub const fn is_runtime(&self) -> bool {
        matches!(self, Self::Runtime(_))
    }

    /// Returns true if this is an internal error.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal { .. })
    }

    /// Returns true if retrying the same call may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Runtime(RuntimeError::QueueFull { .. }))
    }
}

/// Result type alias for PolarCraft operations.
pub type PolarResult<T> = Result<T, PolarError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_message() {
        let err = ValidationError::InvalidConfig {
            reason: "discovery_debounce_ms must be > 0".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("Invalid configuration"));
        assert!(msg.contains("discovery_debounce_ms"));
    }

    #[test]
    fn test_predicate_error_missing_property() {
        let err = PredicateError::MissingProperty {
            element_id: "pol-1".to_string(),
            property: "transmissionAxis".to_string(),
        };
        let msg = format!("{err}");
        assert!(msg.contains("pol-1"));
        assert!(msg.contains("transmissionAxis"));
    }

    #[test]
    fn test_polar_error_from_validation() {
        let err: PolarError = ValidationError::ConfigParse {
            message: "eof".to_string(),
        }
        .into();
        assert!(err.is_validation());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_polar_error_from_predicate() {
        let err: PolarError = PredicateError::Panicked {
            discovery_id: "malus-law-basic".to_string(),
            message: "boom".to_string(),
        }
        .into();
        assert!(err.is_predicate());
        assert!(format!("{err}").contains("malus-law-basic"));
    }

    #[test]
    fn test_polar_error_runtime_retryable() {
        let full: PolarError = RuntimeError::QueueFull { capacity: 8 }.into();
        assert!(full.is_runtime());
        assert!(full.is_retryable());

        let gone: PolarError = RuntimeError::Disconnected.into();
        assert!(!gone.is_retryable());
    }

    #[test]
    fn test_polar_error_internal() {
        let err = PolarError::internal("unexpected state");
        assert!(err.is_internal());
        assert!(format!("{err}").contains("unexpected state"));
    }
}
