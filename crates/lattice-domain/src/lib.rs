//! Lattice Domain
//!
//! Concrete model types built on `lattice-core`:
//!
//! - [`Email`]: an email address with syntax checking and validation codes
//! - [`Person`]: a human actor owning any number of email addresses
//!
//! # Example
//!
//! ```rust
//! use lattice_domain::{registry, Email, Person};
//! use lattice_core::Value;
//!
//! let registry = registry().unwrap();
//! let person = Person::new(&registry, Value::object([
//!     ("id", Value::Int(1)),
//!     ("first_name", Value::from("John")),
//! ])).unwrap();
//! let email = Email::with_address(&registry, "john@example.com").unwrap();
//! person.add_email(&email).unwrap();
//!
//! let out = person.model().serialize(false);
//! assert_eq!(out.get("email"), Some(&Value::from("john@example.com")));
//! ```

pub mod email;
pub mod person;

pub use email::Email;
pub use person::Person;

use lattice_core::{ModelRegistry, Result};
use tracing::debug;

/// Registry with every domain model registered.
///
/// `Email` is registered before `Person`, which references it.
pub fn registry() -> Result<ModelRegistry> {
    let mut registry = ModelRegistry::new();
    person::register_patterns(registry.patterns_mut())?;
    let email = email::schema(registry.patterns())?;
    registry.register(email)?;
    let person = person::schema(registry.patterns())?;
    registry.register(person)?;
    debug!(models = ?registry.type_names(), "Domain registry ready");
    Ok(registry)
}
