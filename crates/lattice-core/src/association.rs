//! Association descriptors
//!
//! An association is a cross reference from a parent model to child instances
//! of another model type, similar to a relationship in a relational database.
//! The parent holds the children; each child keeps a back reference to its
//! parents.

use crate::cardinality::Cardinality;
use crate::error::{ModelError, Result};
use crate::instance::Model;
use crate::validation::{ErrorType, ValidationError};
use crate::value::Value;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Referential Integrity
// ============================================================================

/// Action applied to attached children when the parent is deleted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OnDelete {
    /// Delete all attached children, applying their own policies
    Cascade,
    /// Refuse to delete the parent while children are attached
    Restrict,
    /// Clear the children's back reference to the parent
    #[default]
    SetNull,
}

impl FromStr for OnDelete {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cascade" => Ok(OnDelete::Cascade),
            "restrict" => Ok(OnDelete::Restrict),
            "setnull" => Ok(OnDelete::SetNull),
            _ => Err(ModelError::InvalidOnDelete(s.to_string())),
        }
    }
}

impl fmt::Display for OnDelete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnDelete::Cascade => write!(f, "cascade"),
            OnDelete::Restrict => write!(f, "restrict"),
            OnDelete::SetNull => write!(f, "setnull"),
        }
    }
}

// ============================================================================
// Association Descriptor
// ============================================================================

/// Declarative contract for a relation to another model type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssociationDescriptor {
    /// Property name on the parent
    pub name: String,
    /// Model type name of the children
    pub target: String,
    /// Allowed number of children
    pub cardinality: Cardinality,
    /// Policy applied when the parent is deleted
    pub on_delete: OnDelete,
}

impl AssociationDescriptor {
    /// Create a `0:N`, `setnull` association
    pub fn new(name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target: target.into(),
            cardinality: Cardinality::default(),
            on_delete: OnDelete::default(),
        }
    }

    /// Set cardinality from a `min:max` string
    pub fn cardinality(mut self, spec: &str) -> Result<Self> {
        self.cardinality = Cardinality::parse(spec)?;
        Ok(self)
    }

    /// Set an already parsed cardinality
    pub fn with_cardinality(mut self, cardinality: Cardinality) -> Self {
        self.cardinality = cardinality;
        self
    }

    /// Set the delete policy
    pub fn on_delete(mut self, on_delete: OnDelete) -> Self {
        self.on_delete = on_delete;
        self
    }

    /// Minimum number of children required to validate the parent
    pub fn min(&self) -> usize {
        self.cardinality.min
    }

    /// Maximum number of children, `None` when unbounded
    pub fn max(&self) -> Option<usize> {
        self.cardinality.max
    }

    /// Whether `count` children satisfy the cardinality
    pub fn is_valid(&self, count: usize) -> bool {
        self.cardinality.contains(count)
    }

    /// Cardinality check reported against the parent's model type
    pub fn check(&self, location: &str, count: usize) -> Option<ValidationError> {
        if self.is_valid(count) {
            return None;
        }
        Some(ValidationError::new(
            location,
            &self.name,
            format!(
                "Expected {} child instance(s) of {}, found {}",
                self.cardinality, self.target, count
            ),
            ErrorType::Cardinality,
        ))
    }

    /// Serialize the attached children with their nested `serialize(true)`
    ///
    /// See [`collapse`] for the shape of the result.
    pub fn serialize(&self, children: &[Model]) -> Value {
        self.serialize_with(children, |child| child.serialize(true))
    }

    /// Serialize the attached children with a custom per-child serializer
    pub fn serialize_with<F>(&self, children: &[Model], serialize_child: F) -> Value
    where
        F: FnMut(&Model) -> Value,
    {
        collapse(children.iter().map(serialize_child).collect())
    }
}

/// Reduce serialized children to the association's plain shape.
///
/// Zero children give an empty list, exactly one child gives its bare value and
/// two or more give a list.
pub fn collapse(mut serialized: Vec<Value>) -> Value {
    match serialized.len() {
        1 => serialized.pop().unwrap_or_default(),
        _ => Value::List(serialized),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_on_delete_parse() {
        assert_eq!("cascade".parse::<OnDelete>().unwrap(), OnDelete::Cascade);
        assert_eq!(" Restrict ".parse::<OnDelete>().unwrap(), OnDelete::Restrict);
        assert_eq!("SETNULL".parse::<OnDelete>().unwrap(), OnDelete::SetNull);
        assert_eq!(
            "drop".parse::<OnDelete>().unwrap_err(),
            ModelError::InvalidOnDelete("drop".to_string())
        );
        assert_eq!(OnDelete::default(), OnDelete::SetNull);
    }

    #[test]
    fn test_descriptor_defaults() {
        let assoc = AssociationDescriptor::new("email", "Email");
        assert_eq!(assoc.min(), 0);
        assert_eq!(assoc.max(), None);
        assert_eq!(assoc.on_delete, OnDelete::SetNull);
        assert!(assoc.is_valid(0));
        assert!(assoc.is_valid(250));
    }

    #[test]
    fn test_descriptor_cardinality() {
        let assoc = AssociationDescriptor::new("owner", "Person")
            .cardinality("1:1")
            .unwrap()
            .on_delete(OnDelete::Restrict);
        assert_eq!((assoc.min(), assoc.max()), (1, Some(1)));
        assert!(!assoc.is_valid(0));
        assert!(assoc.is_valid(1));
        assert!(!assoc.is_valid(2));

        let err = assoc.check("Account", 2).unwrap();
        assert_eq!(err.error_type, ErrorType::Cardinality);
        assert_eq!(err.field, "owner");
        assert!(assoc.check("Account", 1).is_none());
    }

    #[test]
    fn test_malformed_cardinality_is_definition_error() {
        let err = AssociationDescriptor::new("email", "Email")
            .cardinality("x:4")
            .unwrap_err();
        assert!(matches!(err, ModelError::MalformedCardinality { .. }));
        assert!(err.is_definition_error());
    }

    #[test]
    fn test_collapse_shapes() {
        assert_eq!(collapse(vec![]), Value::List(vec![]));
        assert_eq!(collapse(vec![Value::Int(1)]), Value::Int(1));
        assert_eq!(
            collapse(vec![Value::Int(1), Value::Int(2)]),
            Value::List(vec![Value::Int(1), Value::Int(2)])
        );
    }
}
