//! Model type registry
//!
//! The registry maps model type names to their schemas and owns the
//! [`PatternLibrary`] used while declaring them. Association targets are
//! resolved against it at registration time, so a type must be registered
//! after every type it references (self references excepted).

use crate::error::{ModelError, Result};
use crate::instance::Model;
use crate::patterns::PatternLibrary;
use crate::schema::ModelSchema;
use crate::value::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Named collection of model schemas
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    schemas: HashMap<String, Arc<ModelSchema>>,
    patterns: PatternLibrary,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelRegistry {
    /// Empty registry with the built-in patterns
    pub fn new() -> Self {
        Self::with_patterns(PatternLibrary::with_builtins())
    }

    pub fn with_patterns(patterns: PatternLibrary) -> Self {
        Self {
            schemas: HashMap::new(),
            patterns,
        }
    }

    pub fn patterns(&self) -> &PatternLibrary {
        &self.patterns
    }

    pub fn patterns_mut(&mut self) -> &mut PatternLibrary {
        &mut self.patterns
    }

    /// Register a model type.
    ///
    /// Fails if the name is taken or if an association targets a type that is
    /// not registered yet.
    #[instrument(skip(self, schema), fields(model = %schema.type_name()))]
    pub fn register(&mut self, schema: ModelSchema) -> Result<Arc<ModelSchema>> {
        let type_name = schema.type_name().to_string();
        if self.schemas.contains_key(&type_name) {
            return Err(ModelError::DuplicateModelType(type_name));
        }

        for association in schema.associations() {
            if association.target != type_name && !self.schemas.contains_key(&association.target) {
                return Err(ModelError::UnknownModelType(association.target.clone()));
            }
        }

        let schema = Arc::new(schema);
        self.schemas.insert(type_name, Arc::clone(&schema));
        debug!(
            entries = schema.entries().len(),
            id_attribute = %schema.id_attribute(),
            "Registered model type"
        );
        Ok(schema)
    }

    pub fn schema(&self, type_name: &str) -> Result<&Arc<ModelSchema>> {
        self.schemas
            .get(type_name)
            .ok_or_else(|| ModelError::UnknownModelType(type_name.to_string()))
    }

    /// Construct an instance of a registered type
    pub fn create(&self, type_name: &str, config: Value) -> Result<Model> {
        Model::new(self.schema(type_name)?, config)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.schemas.contains_key(type_name)
    }

    /// Registered type names, sorted
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.schemas.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
