//! Virtual (computed) properties
//!
//! A virtual property is derived from the other properties of the same
//! instance. It is recomputed on every read and can never be assigned.
//!
//! # Example
//!
//! ```rust
//! use lattice_core::{FieldDescriptor, Model, ModelSchema, Value, VirtualDescriptor};
//! use lattice_core::computed::get_string_field;
//! use std::sync::Arc;
//!
//! let schema = ModelSchema::builder("Person")
//!     .field(FieldDescriptor::new("first_name"))
//!     .field(FieldDescriptor::new("last_name"))
//!     .virtual_field(VirtualDescriptor::from_fn("full_name", |model| {
//!         let first = get_string_field(model, "first_name").unwrap_or_default();
//!         let last = get_string_field(model, "last_name").unwrap_or_default();
//!         Value::String(format!("{first} {last}"))
//!     }))
//!     .build()
//!     .unwrap();
//!
//! let person = Model::new(&Arc::new(schema), Value::object([
//!     ("first_name", Value::from("John")),
//!     ("last_name", Value::from("Doe")),
//! ])).unwrap();
//! assert_eq!(person.get("full_name").unwrap(), Value::from("John Doe"));
//! ```

use crate::instance::Model;
use crate::value::Value;
use chrono::{Datelike, Local, NaiveDate};
use std::fmt;
use std::sync::Arc;

// ============================================================================
// Computed Property Trait
// ============================================================================

/// Getter of a virtual property
pub trait ComputedProperty: Send + Sync {
    /// Compute the value from the current state of the owning instance
    fn compute(&self, model: &Model) -> Value;
}

/// Shared computed property for dynamic dispatch
pub type BoxedComputedProperty = Arc<dyn ComputedProperty>;

/// Computed property created from a function
pub struct FnComputed<F>
where
    F: Fn(&Model) -> Value + Send + Sync,
{
    compute_fn: F,
}

impl<F> FnComputed<F>
where
    F: Fn(&Model) -> Value + Send + Sync,
{
    pub fn new(compute_fn: F) -> Self {
        Self { compute_fn }
    }
}

impl<F> ComputedProperty for FnComputed<F>
where
    F: Fn(&Model) -> Value + Send + Sync,
{
    fn compute(&self, model: &Model) -> Value {
        (self.compute_fn)(model)
    }
}

// ============================================================================
// Virtual Descriptor
// ============================================================================

/// Declarative contract for a derived, read-only attribute
#[derive(Clone)]
pub struct VirtualDescriptor {
    /// Property name
    pub name: String,
    /// Whether the property appears in serialized output
    pub enumerable: bool,
    /// Optional description for documentation
    pub description: Option<String>,
    getter: BoxedComputedProperty,
}

impl VirtualDescriptor {
    /// Create an enumerable virtual property
    pub fn new(name: impl Into<String>, getter: impl ComputedProperty + 'static) -> Self {
        Self {
            name: name.into(),
            enumerable: true,
            description: None,
            getter: Arc::new(getter),
        }
    }

    /// Create an enumerable virtual property from a function
    pub fn from_fn<F>(name: impl Into<String>, compute_fn: F) -> Self
    where
        F: Fn(&Model) -> Value + Send + Sync + 'static,
    {
        Self::new(name, FnComputed::new(compute_fn))
    }

    /// Exclude the property from serialized output
    pub fn hidden(mut self) -> Self {
        self.enumerable = false;
        self
    }

    /// Set description
    pub fn description(mut self, desc: impl Into<String>) -> Self {
        self.description = Some(desc.into());
        self
    }

    /// Evaluate the getter against an instance
    pub fn compute(&self, model: &Model) -> Value {
        self.getter.compute(model)
    }
}

impl fmt::Debug for VirtualDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualDescriptor")
            .field("name", &self.name)
            .field("enumerable", &self.enumerable)
            .finish()
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Helper to extract a string field from a model
pub fn get_string_field(model: &Model, field_name: &str) -> Option<String> {
    match model.get(field_name) {
        Ok(Value::String(s)) => Some(s),
        _ => None,
    }
}

/// Helper to extract an integer field from a model
pub fn get_int_field(model: &Model, field_name: &str) -> Option<i64> {
    model.get(field_name).ok().and_then(|v| v.as_i64())
}

/// Helper to extract a boolean field from a model
pub fn get_bool_field(model: &Model, field_name: &str) -> Option<bool> {
    model.get(field_name).ok().and_then(|v| v.as_bool())
}

/// Helper to extract a date (or the date of a timestamp) field from a model
pub fn get_date_field(model: &Model, field_name: &str) -> Option<NaiveDate> {
    model.get(field_name).ok().and_then(|v| v.as_date())
}

// ============================================================================
// Common Computed Properties
// ============================================================================

/// Current local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Whole years between `dob` and `on`, one less while the birthday of that
/// year has not been reached
pub fn age_on(dob: NaiveDate, on: NaiveDate) -> i64 {
    let mut age = i64::from(on.year() - dob.year());
    if (on.month(), on.day()) < (dob.month(), dob.day()) {
        age -= 1;
    }
    age
}

/// Age in years computed from a date field; null when the field is null
#[derive(Debug, Clone)]
pub struct AgeFromDate {
    source_field: String,
    as_of: Option<NaiveDate>,
}

impl AgeFromDate {
    /// Compute the age of `source_field` relative to today
    pub fn new(source_field: impl Into<String>) -> Self {
        Self {
            source_field: source_field.into(),
            as_of: None,
        }
    }

    /// Compute the age relative to a fixed date instead of today
    pub fn as_of(mut self, date: NaiveDate) -> Self {
        self.as_of = Some(date);
        self
    }
}

impl ComputedProperty for AgeFromDate {
    fn compute(&self, model: &Model) -> Value {
        match get_date_field(model, &self.source_field) {
            Some(dob) => Value::Int(age_on(dob, self.as_of.unwrap_or_else(today))),
            None => Value::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldDescriptor, TypeTag};
    use crate::schema::ModelSchema;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn person(dob: Value, as_of: NaiveDate) -> Model {
        let schema = ModelSchema::builder("Person")
            .field(FieldDescriptor::new("dob").type_tag(TypeTag::Date))
            .virtual_field(VirtualDescriptor::new("age", AgeFromDate::new("dob").as_of(as_of)))
            .build()
            .unwrap();
        Model::new(&Arc::new(schema), Value::object([("dob", dob)])).unwrap()
    }

    #[test]
    fn test_age_on() {
        assert_eq!(age_on(date(1990, 6, 15), date(2020, 6, 14)), 29);
        assert_eq!(age_on(date(1990, 6, 15), date(2020, 6, 15)), 30);
        assert_eq!(age_on(date(1990, 6, 15), date(2020, 5, 20)), 29);
        assert_eq!(age_on(date(1990, 6, 15), date(2020, 7, 1)), 30);
    }

    #[test]
    fn test_age_virtual() {
        let model = person(Value::from("1990-06-15"), date(2020, 6, 14));
        assert_eq!(model.get("age").unwrap(), Value::Int(29));
    }

    #[test]
    fn test_age_virtual_null_dob() {
        let model = person(Value::Null, date(2020, 6, 14));
        assert_eq!(model.get("age").unwrap(), Value::Null);
    }

    #[test]
    fn test_virtual_recomputes_on_every_read() {
        let model = person(Value::from("2000-01-01"), date(2020, 6, 1));
        assert_eq!(model.get("age").unwrap(), Value::Int(20));
        model.set("dob", Value::from("2010-01-01")).unwrap();
        assert_eq!(model.get("age").unwrap(), Value::Int(10));
    }

    #[test]
    fn test_hidden_descriptor() {
        let descriptor = VirtualDescriptor::from_fn("secret", |_| Value::Null)
            .hidden()
            .description("not serialized");
        assert!(!descriptor.enumerable);
        assert_eq!(descriptor.description.as_deref(), Some("not serialized"));
    }
}
