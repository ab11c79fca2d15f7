//! Person Lifecycle Example
//!
//! Builds a person with two email addresses, validates it, serializes it and
//! deletes it.
//!
//! Run with:
//! ```bash
//! RUST_LOG=debug cargo run -p lattice-domain --example person_lifecycle
//! ```

use lattice_core::{Result, Value};
use lattice_domain::{registry, Email, Person};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let registry = registry()?;

    // ========================================================================
    // Construction
    // ========================================================================

    println!("1. Construction");
    println!("---------------");
    let person = Person::new(
        &registry,
        Value::object([
            ("id", Value::Int(1)),
            ("first_name", Value::from("Jane")),
            ("gender", Value::from("x")),
            ("dob", Value::from("1988-11-03")),
        ]),
    )?;
    println!("  Age: {:?}", person.age());

    match person.model().validate() {
        Ok(()) => println!("  Valid"),
        Err(errors) => println!("  Invalid: {errors}"),
    }
    person.model().set("gender", "f")?;
    println!("  Valid after fixing gender: {}", person.model().is_valid());
    println!();

    // ========================================================================
    // Associations
    // ========================================================================

    println!("2. Associations");
    println!("---------------");
    let home = Email::with_address(&registry, "jane@home.io")?;
    let work = Email::with_address(&registry, "jane@work.io")?;
    person.add_email(&home)?;
    println!("  One email:  {}", person.model().serialize(false).to_json());
    person.add_email(&work)?;
    println!("  Two emails: {}", person.model().serialize(false).to_json());

    let code = work.create_validation_code()?;
    println!("  Validation code for {}: {code}", work.model().id());
    println!();

    // ========================================================================
    // Deletion
    // ========================================================================

    println!("3. Deletion");
    println!("-----------");
    let report = person.model().delete()?;
    println!(
        "  Deleted {} instance(s), cleared {} back reference(s)",
        report.deleted_count(),
        report.nullified
    );
    println!("  Emails still live: {}", !home.model().is_deleted() && !work.model().is_deleted());

    Ok(())
}
