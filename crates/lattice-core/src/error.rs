//! Error types for lattice

use thiserror::Error;

/// Result type alias for lattice operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// Structural errors raised by the model engine.
///
/// Data-shape problems (missing required values, pattern mismatches, cardinality)
/// are never reported here; they surface through
/// [`Model::validate`](crate::Model::validate) instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Malformed cardinality '{spec}': {reason}")]
    MalformedCardinality { spec: String, reason: String },

    #[error("Property '{property}' of {model} is read-only")]
    ReadOnlyViolation { model: String, property: String },

    /// A `restrict` association still has attached children.
    #[error(
        "Cannot delete {model}({id}): association '{association}' restricts deletion while {children} child instance(s) are attached"
    )]
    RestrictedDeletion {
        model: String,
        id: String,
        association: String,
        children: usize,
    },

    #[error("Unknown property '{property}' on {model}")]
    UnknownProperty { model: String, property: String },

    #[error("'{property}' on {model} is an association, not a field")]
    NotAField { model: String, property: String },

    #[error("Unknown association '{association}' on {model}")]
    UnknownAssociation { model: String, association: String },

    #[error("Association '{association}' expects {expected} instances, got {found}")]
    AssociationTargetMismatch {
        association: String,
        expected: String,
        found: String,
    },

    #[error("{model}({id}) has been deleted")]
    InstanceDeleted { model: String, id: String },

    #[error("Invalid onDelete policy '{0}': expected cascade, restrict or setnull")]
    InvalidOnDelete(String),

    #[error("Invalid pattern: {0}")]
    InvalidPattern(String),

    #[error("Unknown pattern '{0}'")]
    UnknownPattern(String),

    #[error("Duplicate property '{property}' on {model}")]
    DuplicateProperty { model: String, property: String },

    #[error("Identity attribute '{id_attribute}' of {model} must name a field")]
    MissingIdentity { model: String, id_attribute: String },

    #[error("Unknown model type '{0}'")]
    UnknownModelType(String),

    #[error("Model type '{0}' is already registered")]
    DuplicateModelType(String),

    #[error("Invalid configuration for {model}: expected an object, got {found}")]
    InvalidConfig { model: String, found: &'static str },
}

impl ModelError {
    /// Returns true if this error is raised while declaring a model type
    pub fn is_definition_error(&self) -> bool {
        matches!(
            self,
            ModelError::MalformedCardinality { .. }
                | ModelError::InvalidOnDelete(_)
                | ModelError::InvalidPattern(_)
                | ModelError::UnknownPattern(_)
                | ModelError::DuplicateProperty { .. }
                | ModelError::MissingIdentity { .. }
                | ModelError::UnknownModelType(_)
                | ModelError::DuplicateModelType(_)
        )
    }

    pub(crate) fn malformed_cardinality(spec: &str, reason: impl Into<String>) -> Self {
        ModelError::MalformedCardinality {
            spec: spec.to_string(),
            reason: reason.into(),
        }
    }
}

impl From<regex::Error> for ModelError {
    fn from(err: regex::Error) -> Self {
        ModelError::InvalidPattern(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_errors() {
        assert!(ModelError::malformed_cardinality("x:4", "bad").is_definition_error());
        assert!(ModelError::InvalidOnDelete("drop".to_string()).is_definition_error());
        assert!(!ModelError::ReadOnlyViolation {
            model: "Person".to_string(),
            property: "age".to_string(),
        }
        .is_definition_error());
    }

    #[test]
    fn test_regex_error_conversion() {
        let err: ModelError = regex::Regex::new("(").unwrap_err().into();
        assert!(matches!(err, ModelError::InvalidPattern(_)));
    }

    #[test]
    fn test_restricted_deletion_message() {
        let err = ModelError::RestrictedDeletion {
            model: "Person".to_string(),
            id: "1".to_string(),
            association: "email".to_string(),
            children: 2,
        };
        assert_eq!(
            err.to_string(),
            "Cannot delete Person(1): association 'email' restricts deletion while 2 child instance(s) are attached"
        );
    }
}
