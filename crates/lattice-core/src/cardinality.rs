//! Association cardinality
//!
//! Cardinality is written as `<min>:<max>`, where `max` may be `N` or `M`
//! (any case) for an unbounded upper limit:
//!
//! * `0:N` - any number of children (default)
//! * `1:N` - at least one child
//! * `1:1` - exactly one child
//! * `0:1` - at most one child
//! * `1:4` - between one and four children

use crate::error::{ModelError, Result};
use std::fmt;
use std::str::FromStr;

/// Allowed range of attached children, `max = None` meaning unbounded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cardinality {
    pub min: usize,
    pub max: Option<usize>,
}

impl Cardinality {
    pub const fn new(min: usize, max: Option<usize>) -> Self {
        Self { min, max }
    }

    /// Parse a `min:max` string
    pub fn parse(spec: &str) -> Result<Self> {
        let Some((left, right)) = spec.split_once(':') else {
            return Err(ModelError::malformed_cardinality(
                spec,
                "expected '<min>:<max>'",
            ));
        };

        let min: usize = left.trim().parse().map_err(|_| {
            ModelError::malformed_cardinality(spec, format!("minimum '{left}' is not an integer"))
        })?;

        let right = right.trim().to_uppercase();
        let max = if right == "N" || right == "M" {
            None
        } else {
            let max: usize = right.parse().map_err(|_| {
                ModelError::malformed_cardinality(
                    spec,
                    format!("maximum '{right}' is neither an integer nor N/M"),
                )
            })?;
            if max < min {
                return Err(ModelError::malformed_cardinality(
                    spec,
                    format!("maximum {max} is lower than minimum {min}"),
                ));
            }
            Some(max)
        };

        Ok(Self { min, max })
    }

    /// Whether `count` attached children satisfy this cardinality
    pub fn contains(&self, count: usize) -> bool {
        count >= self.min && self.max.map_or(true, |max| count <= max)
    }

    pub fn is_unbounded(&self) -> bool {
        self.max.is_none()
    }
}

impl Default for Cardinality {
    fn default() -> Self {
        Self::new(0, None)
    }
}

impl FromStr for Cardinality {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) => write!(f, "{}:{}", self.min, max),
            None => write!(f, "{}:N", self.min),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bounded() {
        assert_eq!(Cardinality::parse("1:4").unwrap(), Cardinality::new(1, Some(4)));
        assert_eq!(Cardinality::parse("1:1").unwrap(), Cardinality::new(1, Some(1)));
    }

    #[test]
    fn test_parse_unbounded() {
        assert_eq!(Cardinality::parse("0:N").unwrap(), Cardinality::new(0, None));
        assert_eq!(Cardinality::parse("2:m").unwrap(), Cardinality::new(2, None));
        assert_eq!(Cardinality::parse("1: n ").unwrap(), Cardinality::new(1, None));
    }

    #[test]
    fn test_parse_malformed() {
        for spec in ["x:4", ":4", "-1:4", "3", "1:x", "4:1", ""] {
            let err = Cardinality::parse(spec).unwrap_err();
            assert!(
                matches!(err, ModelError::MalformedCardinality { .. }),
                "{spec} should be malformed"
            );
        }
    }

    #[test]
    fn test_contains() {
        let any = Cardinality::default();
        assert!(any.contains(0));
        assert!(any.contains(10_000));

        let one = Cardinality::new(1, Some(1));
        assert!(!one.contains(0));
        assert!(one.contains(1));
        assert!(!one.contains(2));
    }

    #[test]
    fn test_display_and_from_str() {
        let c: Cardinality = "1:4".parse().unwrap();
        assert_eq!(c.to_string(), "1:4");
        assert_eq!(Cardinality::default().to_string(), "0:N");
        assert!(Cardinality::default().is_unbounded());
    }
}
