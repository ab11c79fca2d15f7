//! Validation error types
//!
//! Validation is fail-late: setters and constructors accept any value, and the
//! problems are collected here when a model is validated on demand.

use std::fmt;

// ============================================================================
// Validation Result
// ============================================================================

/// Validation result type
pub type ValidationResult<T> = Result<T, ValidationErrors>;

// ============================================================================
// Validation Errors Collection
// ============================================================================

/// Collection of validation errors found on one model instance
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationErrors {
    /// List of individual validation errors
    pub errors: Vec<ValidationError>,
}

impl ValidationErrors {
    /// Create a new empty validation errors collection
    pub fn new() -> Self {
        Self { errors: Vec::new() }
    }

    /// Check if there are any errors
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get the number of errors
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Add a validation error to the collection
    pub fn add(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Add multiple validation errors
    pub fn extend(&mut self, errors: impl IntoIterator<Item = ValidationError>) {
        self.errors.extend(errors);
    }

    /// Convert to Result - Ok if no errors, Err if there are errors
    pub fn into_result(self) -> ValidationResult<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// Get errors as a slice
    pub fn as_slice(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Errors reported for one property
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a ValidationError> {
        self.errors.iter().filter(move |e| e.field == field)
    }

    /// Whether any error of the given type was reported for a property
    pub fn has(&self, field: &str, error_type: ErrorType) -> bool {
        self.for_field(field).any(|e| e.error_type == error_type)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} validation error(s)", self.errors.len())
    }
}

impl std::error::Error for ValidationErrors {}

// ============================================================================
// Single Validation Error
// ============================================================================

/// A single property validation error
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Model type the error was found on (e.g., "Person")
    pub location: String,

    /// Field or association name
    pub field: String,

    /// Human-readable error message
    pub message: String,

    /// Error type classification
    pub error_type: ErrorType,
}

impl ValidationError {
    /// Create a new validation error
    pub fn new(
        location: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
        error_type: ErrorType,
    ) -> Self {
        Self {
            location: location.into(),
            field: field.into(),
            message: message.into(),
            error_type,
        }
    }

    /// Create a missing (required) value error
    pub fn missing(location: impl Into<String>, field: impl Into<String>) -> Self {
        Self::new(location, field, "Field required", ErrorType::Missing)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}): {} [{}]",
            self.location, self.field, self.message, self.error_type
        )
    }
}

// ============================================================================
// Error Type Classification
// ============================================================================

/// Classification of validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Required field is null
    Missing,

    /// Stringified value does not match the field pattern
    PatternMismatch,

    /// Value could not be coerced to the declared field type
    TypeError,

    /// Association child count outside its cardinality
    Cardinality,
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "missing"),
            Self::PatternMismatch => write!(f, "pattern_mismatch"),
            Self::TypeError => write!(f, "type_error"),
            Self::Cardinality => write!(f, "cardinality"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_errors_empty() {
        let errors = ValidationErrors::new();
        assert!(errors.is_empty());
        assert_eq!(errors.len(), 0);
        assert!(errors.into_result().is_ok());
    }

    #[test]
    fn test_validation_errors_add() {
        let mut errors = ValidationErrors::new();
        errors.add(ValidationError::missing("Email", "address"));
        errors.add(ValidationError::new(
            "Email",
            "address",
            "does not match pattern",
            ErrorType::PatternMismatch,
        ));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors.for_field("address").count(), 2);
        assert!(errors.has("address", ErrorType::Missing));
        assert!(!errors.has("address", ErrorType::Cardinality));
        assert!(errors.into_result().is_err());
    }

    #[test]
    fn test_error_display() {
        let error = ValidationError::missing("Email", "address");
        assert_eq!(error.to_string(), "Email (address): Field required [missing]");
        assert_eq!(ErrorType::Cardinality.to_string(), "cardinality");
    }
}
