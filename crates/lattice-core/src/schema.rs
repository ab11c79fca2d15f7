//! Model schemas
//!
//! A schema is the declaration of a model type: its name, its identity
//! attribute and an ordered list of field, virtual and association entries.
//! Schemas are immutable once built and shared by every instance of the type.

use crate::association::AssociationDescriptor;
use crate::computed::VirtualDescriptor;
use crate::error::{ModelError, Result};
use crate::field::FieldDescriptor;
use std::collections::HashMap;

/// Default identity attribute
pub const DEFAULT_ID_ATTRIBUTE: &str = "id";

// ============================================================================
// Schema Entries
// ============================================================================

/// One declared property of a model type
#[derive(Debug, Clone)]
pub enum SchemaEntry {
    Field(FieldDescriptor),
    Virtual(VirtualDescriptor),
    Association(AssociationDescriptor),
}

impl SchemaEntry {
    pub fn name(&self) -> &str {
        match self {
            SchemaEntry::Field(f) => &f.name,
            SchemaEntry::Virtual(v) => &v.name,
            SchemaEntry::Association(a) => &a.name,
        }
    }
}

impl From<FieldDescriptor> for SchemaEntry {
    fn from(field: FieldDescriptor) -> Self {
        SchemaEntry::Field(field)
    }
}

impl From<VirtualDescriptor> for SchemaEntry {
    fn from(virtual_field: VirtualDescriptor) -> Self {
        SchemaEntry::Virtual(virtual_field)
    }
}

impl From<AssociationDescriptor> for SchemaEntry {
    fn from(association: AssociationDescriptor) -> Self {
        SchemaEntry::Association(association)
    }
}

// ============================================================================
// Model Schema
// ============================================================================

/// Declaration of a model type
#[derive(Debug, Clone)]
pub struct ModelSchema {
    type_name: String,
    id_attribute: String,
    entries: Vec<SchemaEntry>,
    index: HashMap<String, usize>,
}

impl ModelSchema {
    /// Start declaring a model type
    pub fn builder(type_name: impl Into<String>) -> ModelSchemaBuilder {
        ModelSchemaBuilder::new(type_name)
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn id_attribute(&self) -> &str {
        &self.id_attribute
    }

    /// All entries in declaration order
    pub fn entries(&self) -> &[SchemaEntry] {
        &self.entries
    }

    pub fn entry(&self, name: &str) -> Option<&SchemaEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        match self.entry(name) {
            Some(SchemaEntry::Field(f)) => Some(f),
            _ => None,
        }
    }

    pub fn virtual_field(&self, name: &str) -> Option<&VirtualDescriptor> {
        match self.entry(name) {
            Some(SchemaEntry::Virtual(v)) => Some(v),
            _ => None,
        }
    }

    pub fn association(&self, name: &str) -> Option<&AssociationDescriptor> {
        match self.entry(name) {
            Some(SchemaEntry::Association(a)) => Some(a),
            _ => None,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.entries.iter().filter_map(|e| match e {
            SchemaEntry::Field(f) => Some(f),
            _ => None,
        })
    }

    pub fn virtuals(&self) -> impl Iterator<Item = &VirtualDescriptor> {
        self.entries.iter().filter_map(|e| match e {
            SchemaEntry::Virtual(v) => Some(v),
            _ => None,
        })
    }

    pub fn associations(&self) -> impl Iterator<Item = &AssociationDescriptor> {
        self.entries.iter().filter_map(|e| match e {
            SchemaEntry::Association(a) => Some(a),
            _ => None,
        })
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`ModelSchema`]
#[derive(Debug, Clone)]
pub struct ModelSchemaBuilder {
    type_name: String,
    id_attribute: String,
    entries: Vec<SchemaEntry>,
}

impl ModelSchemaBuilder {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            id_attribute: DEFAULT_ID_ATTRIBUTE.to_string(),
            entries: Vec::new(),
        }
    }

    /// Name the field acting as identity
    pub fn id_attribute(mut self, name: impl Into<String>) -> Self {
        self.id_attribute = name.into();
        self
    }

    pub fn field(self, field: FieldDescriptor) -> Self {
        self.entry(field)
    }

    pub fn virtual_field(self, virtual_field: VirtualDescriptor) -> Self {
        self.entry(virtual_field)
    }

    pub fn association(self, association: AssociationDescriptor) -> Self {
        self.entry(association)
    }

    pub fn entry(mut self, entry: impl Into<SchemaEntry>) -> Self {
        self.entries.push(entry.into());
        self
    }

    /// Finish the declaration.
    ///
    /// Fails on duplicate property names and when the identity attribute names
    /// a virtual or an association. An undeclared identity attribute is added
    /// as an optional field with a null default.
    pub fn build(self) -> Result<ModelSchema> {
        let mut entries = self.entries;
        let mut index = HashMap::with_capacity(entries.len() + 1);

        for (i, entry) in entries.iter().enumerate() {
            if index.insert(entry.name().to_string(), i).is_some() {
                return Err(ModelError::DuplicateProperty {
                    model: self.type_name,
                    property: entry.name().to_string(),
                });
            }
        }

        let identity = index
            .get(&self.id_attribute)
            .map(|&i| matches!(entries[i], SchemaEntry::Field(_)));
        match identity {
            Some(true) => {}
            Some(false) => {
                return Err(ModelError::MissingIdentity {
                    model: self.type_name,
                    id_attribute: self.id_attribute,
                })
            }
            None => {
                index.insert(self.id_attribute.clone(), entries.len());
                entries.push(SchemaEntry::Field(FieldDescriptor::new(&self.id_attribute)));
            }
        }

        Ok(ModelSchema {
            type_name: self.type_name,
            id_attribute: self.id_attribute,
            entries,
            index,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Value;

    #[test]
    fn test_build_keeps_declaration_order() {
        let schema = ModelSchema::builder("Email")
            .id_attribute("address")
            .field(FieldDescriptor::new("address").required())
            .virtual_field(VirtualDescriptor::from_fn("domain", |_| Value::Null))
            .field(FieldDescriptor::new("valid").default_value(false))
            .build()
            .unwrap();

        let names: Vec<_> = schema.entries().iter().map(SchemaEntry::name).collect();
        assert_eq!(names, ["address", "domain", "valid"]);
        assert_eq!(schema.id_attribute(), "address");
        assert!(schema.field("address").unwrap().required);
        assert!(schema.virtual_field("domain").is_some());
        assert!(schema.field("domain").is_none());
    }

    #[test]
    fn test_implicit_identity_field() {
        let schema = ModelSchema::builder("Person")
            .field(FieldDescriptor::new("first_name"))
            .build()
            .unwrap();
        assert_eq!(schema.id_attribute(), DEFAULT_ID_ATTRIBUTE);
        let id = schema.field("id").unwrap();
        assert!(!id.required);
        assert_eq!(schema.fields().count(), 2);
    }

    #[test]
    fn test_duplicate_property() {
        let err = ModelSchema::builder("Person")
            .field(FieldDescriptor::new("email"))
            .association(AssociationDescriptor::new("email", "Email"))
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::DuplicateProperty {
                model: "Person".to_string(),
                property: "email".to_string(),
            }
        );
    }

    #[test]
    fn test_identity_must_be_field() {
        let err = ModelSchema::builder("Person")
            .id_attribute("age")
            .virtual_field(VirtualDescriptor::from_fn("age", |_| Value::Null))
            .build()
            .unwrap_err();
        assert!(matches!(err, ModelError::MissingIdentity { .. }));
    }

    #[test]
    fn test_association_lookup() {
        let schema = ModelSchema::builder("Person")
            .association(AssociationDescriptor::new("email", "Email"))
            .build()
            .unwrap();
        assert_eq!(schema.associations().count(), 1);
        assert_eq!(schema.association("email").unwrap().target, "Email");
        assert_eq!(schema.virtuals().count(), 0);
    }
}
