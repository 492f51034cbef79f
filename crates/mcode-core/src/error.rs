//! Error types for mcode Core
//!
//! Every service operation fails with one [`ServiceError`]. Its
//! [`ErrorKind`] is the coarse classification callers branch on:
//! - no entity or component for a model code
//! - write refused by the ownership / permission guard
//! - value rejected by its parameter type
//! - submission to the write collaborator failed, timed out or was
//!   cancelled
//! - the cache contradicts the data model

use mcode_access::AccessDenied;
use mcode_index::ResolveError;
use mcode_model::{GraphError, HashError, ValidationResultKind};
use std::fmt::{self, Display, Formatter};

/// Main service error type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    /// No entity, or no component, carries the model code
    #[error("not found: {0}")]
    NotFound(String),

    /// Write refused; the cause is only logged
    #[error("permission denied")]
    PermissionDenied,

    /// Parameter type rejected the value
    #[error("invalid value '{value}' for {model_code} ({kind}): {message}")]
    InvalidValue {
        /// Validation outcome (invalid or inconclusive)
        kind: ValidationResultKind,
        /// Offending value
        value: String,
        /// Code being written
        model_code: String,
        /// Validation message
        message: String,
    },

    /// Write collaborator failed, timed out or was cancelled
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// Cache inconsistent with the data model
    #[error("malformed graph: {0}")]
    MalformedGraph(String),

    /// Configuration could not be loaded
    #[error("configuration error: {0}")]
    Config(String),
}

/// Discriminant of [`ServiceError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// [`ServiceError::NotFound`]
    NotFound,
    /// [`ServiceError::PermissionDenied`]
    PermissionDenied,
    /// [`ServiceError::InvalidValue`]
    InvalidValue,
    /// [`ServiceError::WriteFailed`]
    WriteFailed,
    /// [`ServiceError::MalformedGraph`]
    MalformedGraph,
    /// [`ServiceError::Config`]
    Config,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotFound => "NotFound",
            Self::PermissionDenied => "PermissionDenied",
            Self::InvalidValue => "InvalidValue",
            Self::WriteFailed => "WriteFailed",
            Self::MalformedGraph => "MalformedGraph",
            Self::Config => "Config",
        })
    }
}

impl ServiceError {
    /// Error kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::PermissionDenied => ErrorKind::PermissionDenied,
            Self::InvalidValue { .. } => ErrorKind::InvalidValue,
            Self::WriteFailed(_) => ErrorKind::WriteFailed,
            Self::MalformedGraph(_) => ErrorKind::MalformedGraph,
            Self::Config(_) => ErrorKind::Config,
        }
    }

    /// True when the cache or collaborators disagree with the data model
    #[inline]
    #[must_use]
    pub fn is_malformed_graph(&self) -> bool {
        matches!(self, Self::MalformedGraph(_))
    }
}

impl From<ResolveError> for ServiceError {
    fn from(error: ResolveError) -> Self {
        match error {
            ResolveError::NotFound { .. } => Self::NotFound(error.to_string()),
            ResolveError::Ambiguous { .. } | ResolveError::Graph(_) => {
                Self::MalformedGraph(error.to_string())
            }
        }
    }
}

impl From<GraphError> for ServiceError {
    fn from(error: GraphError) -> Self {
        Self::MalformedGraph(error.to_string())
    }
}

impl From<HashError> for ServiceError {
    fn from(error: HashError) -> Self {
        Self::MalformedGraph(format!("cannot hash entity: {error}"))
    }
}

impl From<AccessDenied> for ServiceError {
    fn from(_: AccessDenied) -> Self {
        Self::PermissionDenied
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcode_model::{ClassKind, Iid};

    #[test]
    fn resolve_errors_map_to_kinds() {
        let not_found = ResolveError::NotFound {
            what: "value-set",
            model_code: "ed1.x".into(),
        };
        assert_eq!(ServiceError::from(not_found).kind(), ErrorKind::NotFound);

        let ambiguous = ResolveError::Ambiguous {
            model_code: "ed1.x".into(),
            count: 2,
        };
        assert_eq!(
            ServiceError::from(ambiguous).kind(),
            ErrorKind::MalformedGraph
        );

        let graph = ResolveError::Graph(GraphError::Missing {
            expected: ClassKind::Parameter,
            iid: Iid::from_u128(1),
        });
        assert!(ServiceError::from(graph).is_malformed_graph());
    }

    #[test]
    fn access_denied_hides_cause() {
        let error = ServiceError::from(AccessDenied);
        assert_eq!(error, ServiceError::PermissionDenied);
        assert_eq!(error.to_string(), "permission denied");
    }

    #[test]
    fn invalid_value_message_carries_value() {
        let error = ServiceError::InvalidValue {
            kind: ValidationResultKind::Invalid,
            value: "abc".into(),
            model_code: "ed2.scalar1".into(),
            message: "'abc' is not a real number".into(),
        };
        let text = error.to_string();
        assert!(text.contains("abc"));
        assert!(text.contains("ed2.scalar1"));
        assert_eq!(error.kind().to_string(), "InvalidValue");
    }
}
