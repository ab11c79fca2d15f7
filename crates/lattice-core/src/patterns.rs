//! Named validation patterns
//!
//! A `PatternLibrary` is handed to schema constructors so that model
//! declarations can share regexes (e.g. `email`) without reaching for global
//! state.

use crate::error::{ModelError, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

// ============================================================================
// Pre-compiled Regex Patterns
// ============================================================================

/// Email regex pattern (RFC 5322 simplified)
static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap()
});

/// URL regex pattern (http/https)
static URL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").unwrap()
});

/// UUID regex pattern (any version, with or without dashes)
static UUID_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{4}-?[0-9a-fA-F]{12}$")
        .unwrap()
});

/// Validate email format
///
/// # Example
/// ```
/// use lattice_core::patterns::is_email;
///
/// assert!(is_email("user@example.com"));
/// assert!(!is_email("invalid-email"));
/// ```
pub fn is_email(value: &str) -> bool {
    EMAIL_REGEX.is_match(value)
}

// ============================================================================
// Pattern Library
// ============================================================================

/// Registry of named regexes available to model declarations
#[derive(Debug, Clone, Default)]
pub struct PatternLibrary {
    patterns: HashMap<String, Regex>,
}

impl PatternLibrary {
    /// Create an empty library
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a library holding the built-in `email`, `url` and `uuid` patterns
    pub fn with_builtins() -> Self {
        let mut library = Self::new();
        library.insert("email", EMAIL_REGEX.clone());
        library.insert("url", URL_REGEX.clone());
        library.insert("uuid", UUID_REGEX.clone());
        library
    }

    /// Add (or replace) a compiled pattern
    pub fn insert(&mut self, name: impl Into<String>, pattern: Regex) {
        self.patterns.insert(name.into(), pattern);
    }

    /// Compile and add a pattern
    pub fn register(&mut self, name: impl Into<String>, pattern: &str) -> Result<()> {
        let regex = Regex::new(pattern)?;
        self.insert(name, regex);
        Ok(())
    }

    /// Get a pattern by name
    pub fn get(&self, name: &str) -> Result<Regex> {
        self.patterns
            .get(name)
            .cloned()
            .ok_or_else(|| ModelError::UnknownPattern(name.to_string()))
    }

    /// Test a value against a named pattern; unknown names never match
    pub fn matches(&self, name: &str, value: &str) -> bool {
        self.patterns
            .get(name)
            .is_some_and(|pattern| pattern.is_match(value))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.patterns.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
