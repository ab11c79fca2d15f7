//! Person model
//!
//! Represents a human actor in the system: a user, a customer, an
//! administrator. A person owns any number of [`Email`] addresses.

use crate::email::{self, Email};
use chrono::NaiveDate;
use lattice_core::computed::{get_date_field, get_string_field};
use lattice_core::{
    AgeFromDate, AssociationDescriptor, FieldDescriptor, Model, ModelRegistry, ModelSchema,
    PatternLibrary, Result, TypeTag, Value, VirtualDescriptor,
};

/// Model type name
pub const TYPE_NAME: &str = "Person";

/// Default for unknown first and last names
pub const UNKNOWN_NAME: &str = "Unknown";

/// Name of the library pattern checked against `gender`
pub const GENDER_PATTERN: &str = "gender";

/// Default `gender` pattern, registered by [`register_patterns`]
const DEFAULT_GENDER_PATTERN: &str = "m|f";

/// Add the patterns used by `Person` to a library, keeping any already present
pub fn register_patterns(patterns: &mut PatternLibrary) -> Result<()> {
    if !patterns.contains(GENDER_PATTERN) {
        patterns.register(GENDER_PATTERN, DEFAULT_GENDER_PATTERN)?;
    }
    Ok(())
}

/// Declare the `Person` model type.
///
/// `gender` is checked against the library's `gender` pattern.
pub fn schema(patterns: &PatternLibrary) -> Result<ModelSchema> {
    ModelSchema::builder(TYPE_NAME)
        .association(AssociationDescriptor::new("email", email::TYPE_NAME).cardinality("0:N")?)
        .field(FieldDescriptor::new("image"))
        .field(FieldDescriptor::new("display_name"))
        .field(FieldDescriptor::new("first_name").default_value(UNKNOWN_NAME))
        .field(FieldDescriptor::new("last_name").default_value(UNKNOWN_NAME))
        .field(FieldDescriptor::new("middle_name"))
        .field(FieldDescriptor::new("suffix"))
        .field(FieldDescriptor::new("gender").pattern(patterns.get(GENDER_PATTERN)?))
        .field(
            FieldDescriptor::new("dob")
                .type_tag(TypeTag::Date)
                .description("Date of birth"),
        )
        .field(FieldDescriptor::new("login"))
        .virtual_field(VirtualDescriptor::new("age", AgeFromDate::new("dob")))
        .build()
}

/// Typed handle over a `Person` instance
#[derive(Debug, Clone)]
pub struct Person {
    model: Model,
}

impl Person {
    /// Create a person from a configuration object
    pub fn new(registry: &ModelRegistry, config: Value) -> Result<Self> {
        registry.create(TYPE_NAME, config).map(|model| Self { model })
    }

    /// Wrap an existing instance. Returns `None` for other model types.
    pub fn from_model(model: Model) -> Option<Self> {
        (model.type_name() == TYPE_NAME).then_some(Self { model })
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn into_model(self) -> Model {
        self.model
    }

    pub fn first_name(&self) -> Option<String> {
        get_string_field(&self.model, "first_name")
    }

    pub fn last_name(&self) -> Option<String> {
        get_string_field(&self.model, "last_name")
    }

    pub fn dob(&self) -> Option<NaiveDate> {
        get_date_field(&self.model, "dob")
    }

    /// Age in whole years, `None` without a date of birth
    pub fn age(&self) -> Option<i64> {
        self.model.get("age").ok().and_then(|age| age.as_i64())
    }

    /// Attach an email address. Returns `false` if it was already attached.
    pub fn add_email(&self, email: &Email) -> Result<bool> {
        self.model.attach("email", email.model())
    }

    pub fn remove_email(&self, email: &Email) -> Result<bool> {
        self.model.detach("email", email.model())
    }

    pub fn emails(&self) -> Result<Vec<Email>> {
        Ok(self
            .model
            .children("email")?
            .into_iter()
            .filter_map(Email::from_model)
            .collect())
    }
}
