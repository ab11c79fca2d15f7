//! Model instances
//!
//! A [`Model`] is a live instance of a [`ModelSchema`]: it owns one slot per
//! declared field, evaluates virtuals on demand and holds the children attached
//! to each association.
//!
//! Instances are cheap handles (`Rc`) and are meant for a single thread of
//! control. Parents hold their children strongly; children keep weak back
//! references to their parents.
//!
//! # Example
//!
//! ```rust
//! use lattice_core::{AssociationDescriptor, FieldDescriptor, Model, ModelSchema, OnDelete, Value};
//! use std::sync::Arc;
//!
//! let email = Arc::new(
//!     ModelSchema::builder("Email")
//!         .id_attribute("address")
//!         .field(FieldDescriptor::new("address").required())
//!         .build()
//!         .unwrap(),
//! );
//! let person = Arc::new(
//!     ModelSchema::builder("Person")
//!         .association(
//!             AssociationDescriptor::new("email", "Email")
//!                 .cardinality("1:N")
//!                 .unwrap()
//!                 .on_delete(OnDelete::Cascade),
//!         )
//!         .build()
//!         .unwrap(),
//! );
//!
//! let jane = Model::new(&person, Value::object([("id", Value::Int(1))])).unwrap();
//! assert!(!jane.is_valid());
//!
//! let work = Model::new(&email, Value::object([("address", Value::from("jane@work.io"))])).unwrap();
//! jane.attach("email", &work).unwrap();
//! assert!(jane.is_valid());
//!
//! jane.delete().unwrap();
//! assert!(work.is_deleted());
//! ```

use crate::association::{AssociationDescriptor, OnDelete};
use crate::error::{ModelError, Result};
use crate::schema::{ModelSchema, SchemaEntry};
use crate::serialize::SerializeConfig;
use crate::validation::{ValidationErrors, ValidationResult};
use crate::value::Value;
use std::cell::{Ref, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

// ============================================================================
// Lifecycle
// ============================================================================

/// Lifecycle state of an instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Constructed and usable
    Live,
    /// Inside a `delete()` call; returns to `Live` if a restrict blocks it
    Deleting,
    /// Deleted; fields stay readable but the instance can no longer change
    Deleted,
}

/// `(type, id)` pair identifying an instance for referential purposes
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub model_type: String,
    pub id: Value,
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.model_type, self.id)
    }
}

/// Outcome of a successful deletion
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeleteReport {
    /// Every deleted instance, the target of `delete()` first
    pub deleted: Vec<Identity>,
    /// Number of surviving children whose back reference was cleared
    pub nullified: usize,
}

impl DeleteReport {
    pub fn deleted_count(&self) -> usize {
        self.deleted.len()
    }
}

// ============================================================================
// Internal State
// ============================================================================

struct BackRef {
    parent: Weak<ModelInner>,
    association: String,
}

impl BackRef {
    fn points_to(&self, parent: &Model) -> bool {
        std::ptr::eq(self.parent.as_ptr(), Rc::as_ptr(&parent.inner))
    }
}

struct ModelState {
    values: HashMap<String, Value>,
    children: HashMap<String, Vec<Model>>,
    parents: Vec<BackRef>,
    lifecycle: Lifecycle,
}

struct ModelInner {
    schema: Arc<ModelSchema>,
    state: RefCell<ModelState>,
}

// ============================================================================
// Model
// ============================================================================

/// Live instance of a model type
#[derive(Clone)]
pub struct Model {
    inner: Rc<ModelInner>,
}

impl Model {
    /// Construct an instance from a configuration object.
    ///
    /// Declared fields are seeded from `config`, falling back to their default
    /// when the key is missing or null; undeclared keys are ignored. The
    /// instance is not validated.
    pub fn new(schema: &Arc<ModelSchema>, config: Value) -> Result<Self> {
        let mut config = match config {
            Value::Null => Vec::new(),
            Value::Object(entries) => entries,
            other => {
                return Err(ModelError::InvalidConfig {
                    model: schema.type_name().to_string(),
                    found: other.type_name(),
                })
            }
        };

        let mut values = HashMap::new();
        for field in schema.fields() {
            let supplied = config
                .iter()
                .position(|(key, _)| *key == field.name)
                .map(|i| config.swap_remove(i).1);
            let value = match supplied {
                Some(value) if !value.is_null() => field.coerce(value),
                _ => field.initial_value(),
            };
            values.insert(field.name.clone(), value);
        }

        let children = schema
            .associations()
            .map(|a| (a.name.clone(), Vec::new()))
            .collect();

        Ok(Self {
            inner: Rc::new(ModelInner {
                schema: Arc::clone(schema),
                state: RefCell::new(ModelState {
                    values,
                    children,
                    parents: Vec::new(),
                    lifecycle: Lifecycle::Live,
                }),
            }),
        })
    }

    pub fn schema(&self) -> &Arc<ModelSchema> {
        &self.inner.schema
    }

    pub fn type_name(&self) -> &str {
        self.inner.schema.type_name()
    }

    pub fn id_attribute(&self) -> &str {
        self.inner.schema.id_attribute()
    }

    /// Current value of the identity attribute
    pub fn id(&self) -> Value {
        self.state()
            .values
            .get(self.id_attribute())
            .cloned()
            .unwrap_or_default()
    }

    pub fn identity(&self) -> Identity {
        Identity {
            model_type: self.type_name().to_string(),
            id: self.id(),
        }
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.state().lifecycle
    }

    pub fn is_deleted(&self) -> bool {
        self.lifecycle() == Lifecycle::Deleted
    }

    /// Whether both handles refer to the same instance
    pub fn ptr_eq(&self, other: &Model) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    /// Same instance, or same type with an equal non-null identity value
    pub fn same_identity(&self, other: &Model) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.type_name() != other.type_name() {
            return false;
        }
        let id = self.id();
        !id.is_null() && id == other.id()
    }

    // ------------------------------------------------------------------------
    // Properties
    // ------------------------------------------------------------------------

    /// Read a field or a virtual property
    pub fn get(&self, name: &str) -> Result<Value> {
        match self.inner.schema.entry(name) {
            Some(SchemaEntry::Field(field)) => Ok(self
                .state()
                .values
                .get(&field.name)
                .cloned()
                .unwrap_or_else(|| field.default.clone())),
            Some(SchemaEntry::Virtual(virtual_field)) => Ok(virtual_field.compute(self)),
            Some(SchemaEntry::Association(_)) => Err(ModelError::NotAField {
                model: self.type_name().to_string(),
                property: name.to_string(),
            }),
            None => Err(self.unknown_property(name)),
        }
    }

    /// Assign a field.
    ///
    /// The value is coerced to the field's declared type when possible and
    /// stored as-is otherwise; contract violations are reported by
    /// [`validate`](Self::validate), never here.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        match self.inner.schema.entry(name) {
            Some(SchemaEntry::Field(field)) => {
                self.ensure_live()?;
                let value = field.coerce(value.into());
                self.inner
                    .state
                    .borrow_mut()
                    .values
                    .insert(field.name.clone(), value);
                Ok(())
            }
            Some(SchemaEntry::Virtual(_)) => Err(ModelError::ReadOnlyViolation {
                model: self.type_name().to_string(),
                property: name.to_string(),
            }),
            Some(SchemaEntry::Association(_)) => Err(ModelError::NotAField {
                model: self.type_name().to_string(),
                property: name.to_string(),
            }),
            None => Err(self.unknown_property(name)),
        }
    }

    // ------------------------------------------------------------------------
    // Associations
    // ------------------------------------------------------------------------

    /// Descriptor of an association declared on this model type
    pub fn association(&self, name: &str) -> Result<&AssociationDescriptor> {
        self.inner
            .schema
            .association(name)
            .ok_or_else(|| ModelError::UnknownAssociation {
                model: self.type_name().to_string(),
                association: name.to_string(),
            })
    }

    /// Children currently attached to an association
    pub fn children(&self, association: &str) -> Result<Vec<Model>> {
        let descriptor = self.association(association)?;
        Ok(self
            .state()
            .children
            .get(&descriptor.name)
            .cloned()
            .unwrap_or_default())
    }

    pub fn child_count(&self, association: &str) -> Result<usize> {
        let descriptor = self.association(association)?;
        Ok(self
            .state()
            .children
            .get(&descriptor.name)
            .map_or(0, Vec::len))
    }

    /// Live parents referencing this instance, with the association name
    pub fn parents(&self) -> Vec<(Model, String)> {
        self.state()
            .parents
            .iter()
            .filter_map(|back_ref| {
                back_ref
                    .parent
                    .upgrade()
                    .map(|inner| (Model { inner }, back_ref.association.clone()))
            })
            .collect()
    }

    /// Whether `parent` holds a reference to this instance
    pub fn has_parent(&self, parent: &Model) -> bool {
        self.state().parents.iter().any(|b| b.points_to(parent))
    }

    /// Attach a child to an association.
    ///
    /// Returns `false` without changing anything when the child (or another
    /// instance with the same identity) is already attached. Cardinality is
    /// not checked here.
    pub fn attach(&self, association: &str, child: &Model) -> Result<bool> {
        let descriptor = self.association(association)?;
        self.ensure_live()?;
        child.ensure_live()?;

        if child.type_name() != descriptor.target {
            return Err(ModelError::AssociationTargetMismatch {
                association: descriptor.name.clone(),
                expected: descriptor.target.clone(),
                found: child.type_name().to_string(),
            });
        }

        let attached = self.children(association)?;
        if attached.iter().any(|c| c.same_identity(child)) {
            debug!(
                parent = %self.identity(),
                child = %child.identity(),
                association = %descriptor.name,
                "Child already attached"
            );
            return Ok(false);
        }

        self.inner
            .state
            .borrow_mut()
            .children
            .entry(descriptor.name.clone())
            .or_default()
            .push(child.clone());
        child.inner.state.borrow_mut().parents.push(BackRef {
            parent: Rc::downgrade(&self.inner),
            association: descriptor.name.clone(),
        });

        debug!(
            parent = %self.identity(),
            child = %child.identity(),
            association = %descriptor.name,
            "Attached child"
        );
        Ok(true)
    }

    /// Detach a child from an association.
    ///
    /// Returns whether a child was removed. Dropping below the minimum
    /// cardinality is allowed and reported by validation.
    pub fn detach(&self, association: &str, child: &Model) -> Result<bool> {
        let descriptor = self.association(association)?;
        let attached = self.children(association)?;
        let Some(position) = attached.iter().position(|c| c.same_identity(child)) else {
            return Ok(false);
        };

        let removed = self
            .inner
            .state
            .borrow_mut()
            .children
            .get_mut(&descriptor.name)
            .map(|set| set.remove(position));
        if let Some(removed) = removed {
            removed.remove_back_ref(self, &descriptor.name);
            debug!(
                parent = %self.identity(),
                child = %removed.identity(),
                association = %descriptor.name,
                "Detached child"
            );
        }
        Ok(true)
    }

    // ------------------------------------------------------------------------
    // Validation
    // ------------------------------------------------------------------------

    /// Check every field and association; virtuals are never validated
    pub fn validate(&self) -> ValidationResult<()> {
        let schema = &self.inner.schema;
        let location = schema.type_name();
        let state = self.state();
        let mut errors = ValidationErrors::new();

        for entry in schema.entries() {
            match entry {
                SchemaEntry::Field(field) => {
                    let value = state.values.get(&field.name).unwrap_or(&field.default);
                    errors.extend(field.check(location, value));
                }
                SchemaEntry::Association(association) => {
                    let count = state.children.get(&association.name).map_or(0, Vec::len);
                    if let Some(error) = association.check(location, count) {
                        errors.add(error);
                    }
                }
                SchemaEntry::Virtual(_) => {}
            }
        }

        errors.into_result()
    }

    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    // ------------------------------------------------------------------------
    // Serialization
    // ------------------------------------------------------------------------

    /// Reduce the instance to a plain object.
    ///
    /// Fields and enumerable virtuals map to their current values. Each
    /// association maps to its children reduced by
    /// [`AssociationDescriptor::serialize_with`]: their nested
    /// `serialize(true)` when `deep`, their identity values otherwise.
    pub fn serialize(&self, deep: bool) -> Value {
        self.serialize_with(&SerializeConfig::new().deep(deep))
    }

    pub fn serialize_with(&self, config: &SerializeConfig) -> Value {
        let mut path = Vec::new();
        self.serialize_on_path(config, &config.for_children(), &mut path)
    }

    /// `config` applies to this instance and `nested` to every child below it.
    /// Instances already on `path` are emitted as identity values so that
    /// cyclic graphs terminate.
    fn serialize_on_path(
        &self,
        config: &SerializeConfig,
        nested: &SerializeConfig,
        path: &mut Vec<*const ModelInner>,
    ) -> Value {
        path.push(Rc::as_ptr(&self.inner));
        let mut out = Vec::new();

        for entry in self.inner.schema.entries() {
            if config.should_exclude(entry.name()) {
                continue;
            }
            match entry {
                SchemaEntry::Field(field) => {
                    let value = self
                        .state()
                        .values
                        .get(&field.name)
                        .cloned()
                        .unwrap_or_else(|| field.default.clone());
                    if value.is_null() && !config.include_none() {
                        continue;
                    }
                    out.push((field.name.clone(), value));
                }
                SchemaEntry::Virtual(virtual_field) => {
                    if !virtual_field.enumerable || !config.include_virtuals() {
                        continue;
                    }
                    let value = virtual_field.compute(self);
                    if value.is_null() && !config.include_none() {
                        continue;
                    }
                    out.push((virtual_field.name.clone(), value));
                }
                SchemaEntry::Association(association) => {
                    let children = self
                        .state()
                        .children
                        .get(&association.name)
                        .cloned()
                        .unwrap_or_default();
                    let serialized = association.serialize_with(&children, |child| {
                        if config.is_deep() && !path.contains(&Rc::as_ptr(&child.inner)) {
                            child.serialize_on_path(nested, nested, path)
                        } else {
                            child.id()
                        }
                    });
                    out.push((association.name.clone(), serialized));
                }
            }
        }

        path.pop();
        Value::Object(out)
    }

    // ------------------------------------------------------------------------
    // Deletion
    // ------------------------------------------------------------------------

    /// Delete the instance, applying the `on_delete` policy of every outgoing
    /// association.
    ///
    /// The whole cascade closure is planned before anything changes: if any
    /// `restrict` association in it still has children, the call fails with
    /// [`ModelError::RestrictedDeletion`] and every instance is left as it was.
    #[instrument(skip(self), fields(model = %self.type_name(), id = %self.id()))]
    pub fn delete(&self) -> Result<DeleteReport> {
        self.ensure_live()?;
        info!("Starting delete");
        self.set_lifecycle(Lifecycle::Deleting);

        let plan = match self.plan_deletion() {
            Ok(plan) => plan,
            Err(err) => {
                self.set_lifecycle(Lifecycle::Live);
                return Err(err);
            }
        };

        let doomed: HashSet<*const ModelInner> =
            plan.iter().map(|m| Rc::as_ptr(&m.inner)).collect();
        for model in &plan {
            model.set_lifecycle(Lifecycle::Deleting);
        }

        let mut report = DeleteReport::default();
        for model in &plan {
            model.release(&doomed, &mut report);
        }

        info!(
            deleted = report.deleted_count(),
            nullified = report.nullified,
            "Delete complete"
        );
        Ok(report)
    }

    /// Collect the instances a deletion would remove, depth-first, refusing
    /// on the first restrict association that has children.
    fn plan_deletion(&self) -> Result<Vec<Model>> {
        let mut plan = Vec::new();
        let mut visited = HashSet::new();
        let mut stack = vec![self.clone()];
        visited.insert(Rc::as_ptr(&self.inner));

        while let Some(model) = stack.pop() {
            for association in model.inner.schema.associations() {
                let children = model
                    .state()
                    .children
                    .get(&association.name)
                    .cloned()
                    .unwrap_or_default();
                if children.is_empty() {
                    continue;
                }
                match association.on_delete {
                    OnDelete::Restrict => {
                        warn!(
                            model = %model.identity(),
                            association = %association.name,
                            children = children.len(),
                            "Delete blocked by restrict association"
                        );
                        return Err(ModelError::RestrictedDeletion {
                            model: model.type_name().to_string(),
                            id: model.id().to_string(),
                            association: association.name.clone(),
                            children: children.len(),
                        });
                    }
                    OnDelete::Cascade => {
                        debug!(
                            model = %model.identity(),
                            association = %association.name,
                            children = children.len(),
                            "Cascading delete"
                        );
                        for child in children {
                            if visited.insert(Rc::as_ptr(&child.inner)) {
                                stack.push(child);
                            }
                        }
                    }
                    OnDelete::SetNull => {}
                }
            }
            plan.push(model);
        }

        Ok(plan)
    }

    /// Drop every reference to and from this instance and mark it deleted
    fn release(&self, doomed: &HashSet<*const ModelInner>, report: &mut DeleteReport) {
        let (children, parents) = {
            let mut state = self.inner.state.borrow_mut();
            (
                std::mem::take(&mut state.children),
                std::mem::take(&mut state.parents),
            )
        };

        for (association, attached) in &children {
            for child in attached {
                child.remove_back_ref(self, association);
                if !doomed.contains(&Rc::as_ptr(&child.inner)) {
                    report.nullified += 1;
                    debug!(
                        parent = %self.identity(),
                        child = %child.identity(),
                        association = %association,
                        "Cleared back reference"
                    );
                }
            }
        }

        for back_ref in parents {
            if let Some(parent) = back_ref.parent.upgrade() {
                if let Some(set) = parent.state.borrow_mut().children.get_mut(&back_ref.association) {
                    set.retain(|c| !Rc::ptr_eq(&c.inner, &self.inner));
                }
            }
        }

        self.set_lifecycle(Lifecycle::Deleted);
        report.deleted.push(self.identity());
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn state(&self) -> Ref<'_, ModelState> {
        self.inner.state.borrow()
    }

    fn set_lifecycle(&self, lifecycle: Lifecycle) {
        self.inner.state.borrow_mut().lifecycle = lifecycle;
    }

    fn ensure_live(&self) -> Result<()> {
        if self.lifecycle() == Lifecycle::Live {
            Ok(())
        } else {
            Err(ModelError::InstanceDeleted {
                model: self.type_name().to_string(),
                id: self.id().to_string(),
            })
        }
    }

    fn remove_back_ref(&self, parent: &Model, association: &str) {
        self.inner
            .state
            .borrow_mut()
            .parents
            .retain(|b| !(b.points_to(parent) && b.association == association));
    }

    fn unknown_property(&self, name: &str) -> ModelError {
        ModelError::UnknownProperty {
            model: self.type_name().to_string(),
            property: name.to_string(),
        }
    }
}

impl PartialEq for Model {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = f.debug_struct("Model");
        out.field("type", &self.type_name());
        match self.inner.state.try_borrow() {
            Ok(state) => out
                .field("id", state.values.get(self.id_attribute()).unwrap_or(&Value::Null))
                .field("lifecycle", &state.lifecycle),
            Err(_) => out.field("state", &"<borrowed>"),
        };
        out.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDescriptor;
    use crate::validation::ErrorType;

    fn node_schema(on_delete: OnDelete) -> Arc<ModelSchema> {
        Arc::new(
            ModelSchema::builder("Node")
                .field(FieldDescriptor::new("label"))
                .association(AssociationDescriptor::new("next", "Node").on_delete(on_delete))
                .build()
                .unwrap(),
        )
    }

    fn node(schema: &Arc<ModelSchema>, id: i64) -> Model {
        Model::new(schema, Value::object([("id", Value::Int(id))])).unwrap()
    }

    #[test]
    fn test_construct_from_null_config() {
        let schema = node_schema(OnDelete::SetNull);
        let model = Model::new(&schema, Value::Null).unwrap();
        assert_eq!(model.id(), Value::Null);
        assert_eq!(model.get("label").unwrap(), Value::Null);
        assert_eq!(model.lifecycle(), Lifecycle::Live);
    }

    #[test]
    fn test_construct_rejects_non_object_config() {
        let schema = node_schema(OnDelete::SetNull);
        let err = Model::new(&schema, Value::Int(3)).unwrap_err();
        assert_eq!(
            err,
            ModelError::InvalidConfig {
                model: "Node".to_string(),
                found: "integer",
            }
        );
    }

    #[test]
    fn test_unknown_and_association_properties() {
        let schema = node_schema(OnDelete::SetNull);
        let model = node(&schema, 1);
        assert!(matches!(model.get("nope"), Err(ModelError::UnknownProperty { .. })));
        assert!(matches!(model.get("next"), Err(ModelError::NotAField { .. })));
        assert!(matches!(model.set("next", 1), Err(ModelError::NotAField { .. })));
        assert!(matches!(
            model.children("label"),
            Err(ModelError::UnknownAssociation { .. })
        ));
    }

    #[test]
    fn test_cycle_cascade_terminates() {
        let schema = node_schema(OnDelete::Cascade);
        let a = node(&schema, 1);
        let b = node(&schema, 2);
        a.attach("next", &b).unwrap();
        b.attach("next", &a).unwrap();

        let report = a.delete().unwrap();
        assert_eq!(report.deleted_count(), 2);
        assert!(a.is_deleted());
        assert!(b.is_deleted());
    }

    #[test]
    fn test_self_reference() {
        let schema = node_schema(OnDelete::Cascade);
        let a = node(&schema, 1);
        assert!(a.attach("next", &a).unwrap());
        assert!(a.has_parent(&a));

        let report = a.delete().unwrap();
        assert_eq!(report.deleted_count(), 1);
        assert!(a.is_deleted());
    }

    #[test]
    fn test_deep_serialize_cycle_emits_identity() {
        let schema = node_schema(OnDelete::SetNull);
        let a = node(&schema, 1);
        let b = node(&schema, 2);
        a.attach("next", &b).unwrap();
        b.attach("next", &a).unwrap();

        let out = a.serialize(true);
        let next = out.get("next").unwrap();
        assert_eq!(next.get("id"), Some(&Value::Int(2)));
        assert_eq!(next.get("next"), Some(&Value::Int(1)));
    }

    #[test]
    fn test_deleted_instance_is_frozen() {
        let schema = node_schema(OnDelete::SetNull);
        let a = node(&schema, 1);
        a.delete().unwrap();

        assert!(matches!(a.set("label", "x"), Err(ModelError::InstanceDeleted { .. })));
        assert!(matches!(a.delete(), Err(ModelError::InstanceDeleted { .. })));
        assert_eq!(a.get("id").unwrap(), Value::Int(1));
    }

    #[test]
    fn test_validate_reports_each_problem() {
        let schema = Arc::new(
            ModelSchema::builder("Account")
                .field(FieldDescriptor::new("name").required())
                .association(
                    AssociationDescriptor::new("owner", "Account")
                        .cardinality("1:1")
                        .unwrap(),
                )
                .build()
                .unwrap(),
        );
        let account = Model::new(&schema, Value::Null).unwrap();
        let errors = account.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors.has("name", ErrorType::Missing));
        assert!(errors.has("owner", ErrorType::Cardinality));
    }

    #[test]
    fn test_debug_output() {
        let schema = node_schema(OnDelete::SetNull);
        let a = node(&schema, 7);
        let text = format!("{a:?}");
        assert!(text.contains("Node"));
        assert!(text.contains("Int(7)"));
    }
}
