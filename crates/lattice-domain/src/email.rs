//! Email address model

use lattice_core::computed::get_string_field;
use lattice_core::{
    FieldDescriptor, Model, ModelRegistry, ModelSchema, PatternLibrary, Result, TypeTag, Value,
    VirtualDescriptor,
};
use tracing::debug;
use uuid::Uuid;

/// Model type name
pub const TYPE_NAME: &str = "Email";

/// Declare the `Email` model type.
///
/// `address` is both the identity and a required field checked against the
/// library's `email` pattern; `valid_syntax` tests the same pattern.
pub fn schema(patterns: &PatternLibrary) -> Result<ModelSchema> {
    let email = patterns.get("email")?;
    ModelSchema::builder(TYPE_NAME)
        .id_attribute("address")
        .field(
            FieldDescriptor::new("address")
                .required()
                .pattern(email.clone())
                .description("The email address (i.e. me@domain.com)"),
        )
        .field(
            FieldDescriptor::new("valid")
                .default_value(false)
                .description("Whether the address has been confirmed"),
        )
        .field(FieldDescriptor::new("validation_code"))
        .field(FieldDescriptor::new("last_validated").type_tag(TypeTag::DateTime))
        .virtual_field(
            VirtualDescriptor::from_fn("valid_syntax", move |model| {
                let address = get_string_field(model, "address").unwrap_or_default();
                Value::Bool(email.is_match(&address))
            })
            .description("Whether the address is syntactically valid"),
        )
        .build()
}

/// Typed handle over an `Email` instance
#[derive(Debug, Clone)]
pub struct Email {
    model: Model,
}

impl Email {
    /// Create an email instance from a configuration object
    pub fn new(registry: &ModelRegistry, config: Value) -> Result<Self> {
        registry.create(TYPE_NAME, config).map(|model| Self { model })
    }

    /// Create an email instance for an address
    pub fn with_address(registry: &ModelRegistry, address: &str) -> Result<Self> {
        Self::new(registry, Value::object([("address", Value::from(address))]))
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

    pub fn address(&self) -> Option<String> {
        get_string_field(&self.model, "address")
    }

    pub fn validation_code(&self) -> Option<String> {
        get_string_field(&self.model, "validation_code")
    }

    /// Generate a validation code, store it and return it
    pub fn create_validation_code(&self) -> Result<String> {
        let code = Uuid::new_v4().simple().to_string();
        self.model.set("validation_code", code.as_str())?;
        debug!(address = %self.model.id(), "Created validation code");
        Ok(code)
    }
}
