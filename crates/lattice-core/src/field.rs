//! Field descriptors
//!
//! A field is a scalar slot on a model instance with a default value, an
//! optional required flag, an optional pattern and an optional declared type.

use crate::validation::{ErrorType, ValidationError};
use crate::value::Value;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use regex::Regex;
use std::fmt;
use tracing::warn;

// ============================================================================
// Type Tags
// ============================================================================

/// Declared type of a field, used for coercion on assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTag {
    /// Calendar date (`YYYY-MM-DD`)
    Date,
    /// UTC timestamp (RFC 3339)
    DateTime,
    String,
    Int,
    Float,
    Bool,
}

impl TypeTag {
    /// Whether a value already has this type (null is accepted by every tag)
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (TypeTag::Date, Value::Date(_))
                | (TypeTag::DateTime, Value::DateTime(_))
                | (TypeTag::String, Value::String(_))
                | (TypeTag::Int, Value::Int(_))
                | (TypeTag::Float, Value::Float(_))
                | (TypeTag::Bool, Value::Bool(_))
        )
    }

    /// Convert a value to this type, or return it unchanged when that is not
    /// possible.
    pub fn coerce(&self, value: Value) -> Value {
        match self.try_coerce(&value) {
            Some(coerced) => coerced,
            None => {
                warn!(
                    type_tag = %self,
                    found = value.type_name(),
                    "Coercion failed, keeping raw value"
                );
                value
            }
        }
    }

    fn try_coerce(&self, value: &Value) -> Option<Value> {
        if self.accepts(value) {
            return Some(value.clone());
        }
        match self {
            TypeTag::Date => match value {
                Value::DateTime(dt) => Some(Value::Date(dt.date_naive())),
                Value::String(s) => parse_date(s).map(Value::Date),
                Value::Int(millis) => {
                    DateTime::from_timestamp_millis(*millis).map(|dt| Value::Date(dt.date_naive()))
                }
                _ => None,
            },
            TypeTag::DateTime => match value {
                Value::Date(d) => Some(Value::DateTime(d.and_time(NaiveTime::MIN).and_utc())),
                Value::String(s) => parse_datetime(s).map(Value::DateTime),
                Value::Int(millis) => DateTime::from_timestamp_millis(*millis).map(Value::DateTime),
                _ => None,
            },
            TypeTag::String => match value {
                Value::Bool(_)
                | Value::Int(_)
                | Value::Float(_)
                | Value::Date(_)
                | Value::DateTime(_) => Some(Value::String(value.stringify())),
                _ => None,
            },
            TypeTag::Int => match value {
                Value::Float(f) if f.fract() == 0.0 && (I64_MIN..I64_MAX_EXCLUSIVE).contains(f) => {
                    Some(Value::Int(*f as i64))
                }
                Value::String(s) => s.trim().parse().ok().map(Value::Int),
                _ => None,
            },
            TypeTag::Float => match value {
                Value::Int(i) => Some(Value::Float(*i as f64)),
                Value::String(s) => s.trim().parse().ok().map(Value::Float),
                _ => None,
            },
            TypeTag::Bool => match value {
                Value::String(s) => match s.trim().to_ascii_lowercase().as_str() {
                    "true" => Some(Value::Bool(true)),
                    "false" => Some(Value::Bool(false)),
                    _ => None,
                },
                _ => None,
            },
        }
    }
}

// Integral floats in this range convert to i64 without saturating
const I64_MIN: f64 = i64::MIN as f64;
const I64_MAX_EXCLUSIVE: f64 = i64::MAX as f64;

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeTag::Date => "date",
            TypeTag::DateTime => "datetime",
            TypeTag::String => "string",
            TypeTag::Int => "integer",
            TypeTag::Float => "float",
            TypeTag::Bool => "boolean",
        };
        f.write_str(name)
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| parse_datetime(s).map(|dt| dt.date_naive()))
}

fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN).and_utc())
        })
}

// ============================================================================
// Field Descriptor
// ============================================================================

/// Declarative contract for one scalar attribute of a model
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    /// Field name
    pub name: String,
    /// Value bound when the configuration omits the field
    pub default: Value,
    /// Whether a null value makes the instance invalid
    pub required: bool,
    /// Pattern the stringified value must match
    pub pattern: Option<Regex>,
    /// Declared type used for coercion
    pub type_tag: Option<TypeTag>,
    /// Optional description for documentation
    pub description: Option<String>,
}

impl FieldDescriptor {
    /// Create an optional field with a null default
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: Value::Null,
            required: false,
            pattern: None,
            type_tag: None,
            description: None,
        }
    }

    /// Set field as required
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Set default value
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = value.into();
        self
    }

    /// Set validation pattern
    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.pattern = Some(pattern);
        self
    }

    /// Compile and set validation pattern
    pub fn try_pattern(self, pattern: &str) -> crate::Result<Self> {
        Ok(self.pattern(Regex::new(pattern)?))
    }

    /// Set declared type
    pub fn type_tag(mut self, type_tag: TypeTag) -> Self {
        self.type_tag = Some(type_tag);
        self
    }

    /// Set description
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Apply the declared type to an incoming value
    pub fn coerce(&self, value: Value) -> Value {
        match self.type_tag {
            Some(tag) => tag.coerce(value),
            None => value,
        }
    }

    /// Value bound at construction when the configuration has nothing usable
    pub fn initial_value(&self) -> Value {
        self.coerce(self.default.clone())
    }

    /// Check a value against this field's contract
    ///
    /// `location` is the model type name used in the reported errors.
    pub fn check(&self, location: &str, value: &Value) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        if value.is_null() {
            if self.required {
                errors.push(ValidationError::missing(location, &self.name));
            }
            return errors;
        }

        if let Some(tag) = self.type_tag {
            if !tag.accepts(value) {
                errors.push(ValidationError::new(
                    location,
                    &self.name,
                    format!("Expected {}, got {}", tag, value.type_name()),
                    ErrorType::TypeError,
                ));
            }
        }

        if let Some(pattern) = &self.pattern {
            if !pattern.is_match(&value.stringify()) {
                errors.push(ValidationError::new(
                    location,
                    &self.name,
                    format!("Value does not match pattern '{}'", pattern.as_str()),
                    ErrorType::PatternMismatch,
                ));
            }
        }

        errors
    }

    /// Whether a value satisfies this field's contract
    pub fn is_valid(&self, value: &Value) -> bool {
        self.check("", value).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_defaults() {
        let field = FieldDescriptor::new("image");
        assert_eq!(field.default, Value::Null);
        assert!(!field.required);
        assert!(field.pattern.is_none());
        assert!(field.type_tag.is_none());
        assert!(field.is_valid(&Value::Null));
    }

    #[test]
    fn test_required_field() {
        let field = FieldDescriptor::new("address").required();
        assert!(!field.is_valid(&Value::Null));
        assert!(field.is_valid(&Value::from("a@b.io")));

        let errors = field.check("Email", &Value::Null);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error_type, ErrorType::Missing);
        assert_eq!(errors[0].location, "Email");
    }

    #[test]
    fn test_pattern_uses_stringified_value() {
        let field = FieldDescriptor::new("code").try_pattern(r"^\d{3}$").unwrap();
        assert!(field.is_valid(&Value::Int(123)));
        assert!(field.is_valid(&Value::from("456")));
        assert!(!field.is_valid(&Value::Int(12)));
        // null optional values skip the pattern
        assert!(field.is_valid(&Value::Null));
    }

    #[test]
    fn test_unanchored_pattern() {
        let field = FieldDescriptor::new("gender").try_pattern("m|f").unwrap();
        assert!(field.is_valid(&Value::from("m")));
        assert!(field.is_valid(&Value::from("female")));
        assert!(!field.is_valid(&Value::from("x")));
    }

    #[test]
    fn test_date_coercion() {
        let field = FieldDescriptor::new("dob").type_tag(TypeTag::Date);
        let expected = Value::Date(NaiveDate::from_ymd_opt(1990, 5, 17).unwrap());

        assert_eq!(field.coerce(Value::from("1990-05-17")), expected);
        assert_eq!(field.coerce(Value::from("1990-05-17T22:10:00Z")), expected);
        assert_eq!(field.coerce(Value::Null), Value::Null);
    }

    #[test]
    fn test_failed_coercion_is_reported_late() {
        let field = FieldDescriptor::new("dob").type_tag(TypeTag::Date);
        let raw = field.coerce(Value::from("not a date"));
        assert_eq!(raw, Value::from("not a date"));

        let errors = field.check("Person", &raw);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error_type, ErrorType::TypeError);
    }

    #[test]
    fn test_datetime_coercion() {
        let date = NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
        let coerced = TypeTag::DateTime.coerce(Value::Date(date));
        assert_eq!(coerced.as_date(), Some(date));
        assert!(matches!(
            TypeTag::DateTime.coerce(Value::from("2020-01-02T03:04:05+02:00")),
            Value::DateTime(_)
        ));
    }

    #[test]
    fn test_scalar_coercions() {
        assert_eq!(TypeTag::Int.coerce(Value::from(" 42 ")), Value::Int(42));
        assert_eq!(TypeTag::Int.coerce(Value::Float(3.0)), Value::Int(3));
        assert_eq!(TypeTag::Int.coerce(Value::Float(3.5)), Value::Float(3.5));
        assert_eq!(TypeTag::Float.coerce(Value::Int(2)), Value::Float(2.0));
        assert_eq!(TypeTag::Bool.coerce(Value::from("TRUE")), Value::Bool(true));
        assert_eq!(TypeTag::String.coerce(Value::Int(7)), Value::from("7"));
    }

    #[test]
    fn test_int_coercion_out_of_range_keeps_raw() {
        assert_eq!(TypeTag::Int.coerce(Value::Float(1e20)), Value::Float(1e20));
        assert_eq!(TypeTag::Int.coerce(Value::Float(-1e20)), Value::Float(-1e20));
        assert_eq!(TypeTag::Int.coerce(Value::Float(f64::INFINITY)), Value::Float(f64::INFINITY));
        assert_eq!(TypeTag::Int.coerce(Value::Float(-4096.0)), Value::Int(-4096));

        let field = FieldDescriptor::new("count").type_tag(TypeTag::Int);
        let raw = field.coerce(Value::Float(1e20));
        let errors = field.check("Counter", &raw);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].error_type, ErrorType::TypeError);
    }
}
