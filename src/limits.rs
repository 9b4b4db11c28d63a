//! Limits and constraints for object-graph processing
//!
//! Marshalling and unmarshalling are recursive, so inbound DOM from an
//! untrusted peer is bounded here before it can exhaust the stack or memory.

use crate::error::{Error, Result};

/// Structural limits applied while marshalling or unmarshalling
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum element nesting depth
    pub max_depth: usize,

    /// Maximum number of attributes per element
    pub max_attributes: usize,

    /// Maximum number of child nodes per element
    pub max_children: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_attributes: 1000,
            max_children: 100_000,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_depth: 64,
            max_attributes: 100,
            max_children: 10_000,
        }
    }

    /// Create permissive limits (less restrictive, use with caution)
    pub fn permissive() -> Self {
        Self {
            max_depth: 4096,
            max_attributes: 10_000,
            max_children: 1_000_000,
        }
    }

    /// Check if nesting depth is within limits
    pub fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            Err(Error::LimitExceeded(format!(
                "element depth {} exceeds maximum {}",
                depth, self.max_depth
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the attribute count is within limits
    pub fn check_attributes(&self, count: usize) -> Result<()> {
        if count > self.max_attributes {
            Err(Error::LimitExceeded(format!(
                "attribute count {} exceeds maximum {}",
                count, self.max_attributes
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the child count is within limits
    pub fn check_children(&self, count: usize) -> Result<()> {
        if count > self.max_children {
            Err(Error::LimitExceeded(format!(
                "child count {} exceeds maximum {}",
                count, self.max_children
            )))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = Limits::default();
        assert!(limits.check_depth(256).is_ok());
        assert!(limits.check_depth(257).is_err());
    }

    #[test]
    fn test_strict_is_tighter_than_permissive() {
        let strict = Limits::strict();
        let permissive = Limits::permissive();
        assert!(strict.max_depth < permissive.max_depth);
        assert!(strict.max_attributes < permissive.max_attributes);
        assert!(strict.max_children < permissive.max_children);
    }

    #[test]
    fn test_limit_error_kind() {
        let limits = Limits::strict();
        assert!(matches!(limits.check_attributes(101), Err(Error::LimitExceeded(_))));
        assert!(matches!(limits.check_children(10_001), Err(Error::LimitExceeded(_))));
    }
}
