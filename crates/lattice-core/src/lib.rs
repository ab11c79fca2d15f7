//! Lattice Core
//!
//! In-memory model engine: declarative model types with fields, virtual
//! (computed) properties and associations to other model types.
//!
//! - **Fields** carry a default, a required flag, an optional pattern and an
//!   optional declared type used for coercion.
//! - **Virtuals** are recomputed on every read and reject writes.
//! - **Associations** hold child instances under a `min:max` cardinality and
//!   an `on_delete` policy (`cascade`, `restrict`, `setnull`).
//!
//! Validation is fail-late: construction and assignment never reject data;
//! [`Model::validate`] reports every problem at once.
//!
//! # Example
//!
//! ```rust
//! use lattice_core::{FieldDescriptor, ModelRegistry, ModelSchema, Value};
//!
//! let mut registry = ModelRegistry::new();
//! let email = registry.patterns().get("email").unwrap();
//! registry
//!     .register(
//!         ModelSchema::builder("Email")
//!             .id_attribute("address")
//!             .field(FieldDescriptor::new("address").required().pattern(email))
//!             .build()
//!             .unwrap(),
//!     )
//!     .unwrap();
//!
//! let address = registry
//!     .create("Email", Value::object([("address", Value::from("not-an-email"))]))
//!     .unwrap();
//! assert!(!address.is_valid());
//!
//! address.set("address", "jane@example.com").unwrap();
//! assert!(address.is_valid());
//! ```

pub mod association;
pub mod cardinality;
pub mod computed;
pub mod error;
pub mod field;
pub mod instance;
pub mod patterns;
pub mod registry;
pub mod schema;
pub mod serialize;
pub mod validation;
pub mod value;

// Re-export commonly used types
pub use association::{collapse, AssociationDescriptor, OnDelete};
pub use cardinality::Cardinality;
pub use computed::{AgeFromDate, BoxedComputedProperty, ComputedProperty, FnComputed, VirtualDescriptor};
pub use error::{ModelError, Result};
pub use field::{FieldDescriptor, TypeTag};
pub use instance::{DeleteReport, Identity, Lifecycle, Model};
pub use patterns::PatternLibrary;
pub use registry::ModelRegistry;
pub use schema::{ModelSchema, ModelSchemaBuilder, SchemaEntry};
pub use serialize::SerializeConfig;
pub use validation::{ErrorType, ValidationError, ValidationErrors, ValidationResult};
pub use value::Value;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
