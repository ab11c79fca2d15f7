//! Serialization options
//!
//! `Model::serialize(deep)` uses the defaults below; `Model::serialize_with`
//! takes an explicit configuration.

/// Options controlling how a model instance is reduced to a plain value
#[derive(Debug, Clone)]
pub struct SerializeConfig {
    /// Serialize associated children with their nested `serialize(true)`
    /// instead of their identity value
    deep: bool,
    /// Include null field values in output
    include_none: bool,
    /// Include enumerable virtual properties
    include_virtuals: bool,
    /// Exclude properties by name
    exclude_fields: Vec<String>,
    /// Include only these properties (if non-empty)
    include_fields: Vec<String>,
}

impl Default for SerializeConfig {
    fn default() -> Self {
        Self {
            deep: false,
            include_none: true,
            include_virtuals: true,
            exclude_fields: Vec::new(),
            include_fields: Vec::new(),
        }
    }
}

impl SerializeConfig {
    /// Create the default configuration (shallow, nulls and virtuals included)
    pub fn new() -> Self {
        Self::default()
    }

    pub fn deep(mut self, deep: bool) -> Self {
        self.deep = deep;
        self
    }

    pub fn is_deep(&self) -> bool {
        self.deep
    }

    /// Set whether to include null values
    pub fn with_include_none(mut self, include: bool) -> Self {
        self.include_none = include;
        self
    }

    pub fn include_none(&self) -> bool {
        self.include_none
    }

    /// Set whether to include enumerable virtual properties
    pub fn with_virtuals(mut self, include: bool) -> Self {
        self.include_virtuals = include;
        self
    }

    pub fn include_virtuals(&self) -> bool {
        self.include_virtuals
    }

    /// Set properties to exclude
    pub fn with_exclude(mut self, fields: Vec<String>) -> Self {
        self.exclude_fields = fields;
        self
    }

    /// Set properties to include (all others are dropped)
    pub fn with_include(mut self, fields: Vec<String>) -> Self {
        self.include_fields = fields;
        self
    }

    /// Configuration for nested children: the include and exclude lists only
    /// filter the top-level instance
    pub fn for_children(&self) -> Self {
        Self {
            deep: self.deep,
            include_none: self.include_none,
            include_virtuals: self.include_virtuals,
            ..Self::default()
        }
    }

    /// Check if a property should be excluded
    pub fn should_exclude(&self, field: &str) -> bool {
        if self.exclude_fields.iter().any(|f| f == field) {
            return true;
        }
        !self.include_fields.is_empty() && !self.include_fields.iter().any(|f| f == field)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SerializeConfig::new();
        assert!(!config.is_deep());
        assert!(config.include_none());
        assert!(config.include_virtuals());
        assert!(!config.should_exclude("anything"));
    }

    #[test]
    fn test_exclude_and_include() {
        let config = SerializeConfig::new().with_exclude(vec!["login".to_string()]);
        assert!(config.should_exclude("login"));
        assert!(!config.should_exclude("first_name"));

        let config = SerializeConfig::new()
            .with_include(vec!["first_name".to_string(), "login".to_string()])
            .with_exclude(vec!["login".to_string()]);
        assert!(!config.should_exclude("first_name"));
        assert!(config.should_exclude("login"));
        assert!(config.should_exclude("last_name"));
    }

    #[test]
    fn test_for_children_drops_property_lists() {
        let config = SerializeConfig::new()
            .deep(true)
            .with_include_none(false)
            .with_include(vec!["email".to_string()])
            .with_exclude(vec!["login".to_string()]);
        let nested = config.for_children();
        assert!(nested.is_deep());
        assert!(!nested.include_none());
        assert!(nested.include_virtuals());
        assert!(!nested.should_exclude("address"));
        assert!(!nested.should_exclude("login"));
    }
}
