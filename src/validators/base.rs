//! Base validator infrastructure
//!
//! This module provides the rule trait, the per-call validation context
//! and the suite that runs rules by object type.

use indexmap::IndexMap;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

use crate::error::ValidationError;
use crate::namespaces::QName;
use crate::object::{HasChildren, SchemaObject};

/// Outcome of a single rule or of a fail-fast validation run
pub type ValidationResult = std::result::Result<(), ValidationError>;

/// Validation mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Stop at the first failure
    #[default]
    Strict,
    /// Run every rule and collect all failures
    Lax,
    /// No validation is performed
    Skip,
}

impl ValidationMode {
    /// Get the mode as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationMode::Strict => "strict",
            ValidationMode::Lax => "lax",
            ValidationMode::Skip => "skip",
        }
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A stateless check over one object
///
/// Rules must not mutate the object and must give the same answer for the
/// same object every time.
pub trait ValidationRule: fmt::Debug + Send + Sync {
    /// Short name used in diagnostics
    fn name(&self) -> &str;

    /// Check `object`, delegating to children through `ctx`
    fn check(&self, object: &SchemaObject, ctx: &mut ValidationContext<'_>) -> ValidationResult;
}

/// State of one validation call
///
/// Tracks which objects have already been validated so a parent rule that
/// delegates to its children never runs a child's rules twice.
pub struct ValidationContext<'a> {
    suite: &'a ValidatorSuite,
    mode: ValidationMode,
    visited: HashSet<usize>,
    path: Vec<String>,
    errors: Vec<ValidationError>,
}

impl<'a> ValidationContext<'a> {
    fn new(suite: &'a ValidatorSuite, mode: ValidationMode) -> Self {
        Self {
            suite,
            mode,
            visited: HashSet::new(),
            path: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Mode of this validation call
    pub fn mode(&self) -> ValidationMode {
        self.mode
    }

    /// Run the rules registered for `child`'s type, unless they already
    /// ran in this call
    pub fn validate_child(&mut self, child: &SchemaObject) -> ValidationResult {
        let suite = self.suite;
        suite.run(child, self)
    }

    /// Slash-separated element path from the validated root
    pub fn path(&self) -> String {
        format!("/{}", self.path.join("/"))
    }
}

/// Rules keyed by object type, run in registration order
#[derive(Debug, Default, Clone)]
pub struct ValidatorSuite {
    rules: IndexMap<QName, Vec<Arc<dyn ValidationRule>>>,
}

impl ValidatorSuite {
    /// Create an empty suite
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule for objects whose type's default element is `type_name`
    pub fn register(&mut self, type_name: QName, rule: impl ValidationRule + 'static) {
        self.register_shared(type_name, Arc::new(rule));
    }

    /// Append a shared rule
    pub fn register_shared(&mut self, type_name: QName, rule: Arc<dyn ValidationRule>) {
        self.rules.entry(type_name).or_default().push(rule);
    }

    /// Rules registered for a type
    pub fn rules_for(&self, type_name: &QName) -> &[Arc<dyn ValidationRule>] {
        self.rules.get(type_name).map(|rules| rules.as_slice()).unwrap_or(&[])
    }

    /// Types that have rules
    pub fn types(&self) -> impl Iterator<Item = &QName> {
        self.rules.keys()
    }

    /// Run the rules for `object`, stopping at the first failure
    pub fn validate(&self, object: &SchemaObject) -> ValidationResult {
        let mut ctx = ValidationContext::new(self, ValidationMode::Strict);
        self.run(object, &mut ctx)
    }

    /// Run the rules for `object` and every descendant, stopping at the
    /// first failure
    pub fn validate_tree(&self, object: &SchemaObject) -> ValidationResult {
        let mut ctx = ValidationContext::new(self, ValidationMode::Strict);
        self.walk(object, &mut ctx)
    }

    /// Run the rules for `object` and every descendant in the given mode
    ///
    /// Returns every failure found: at most one in strict mode, none when
    /// skipping.
    pub fn validate_with_mode(&self, object: &SchemaObject, mode: ValidationMode) -> Vec<ValidationError> {
        if mode == ValidationMode::Skip {
            return Vec::new();
        }
        let mut ctx = ValidationContext::new(self, mode);
        if let Err(e) = self.walk(object, &mut ctx) {
            ctx.errors.push(e);
        }
        ctx.errors
    }

    /// Whether `object` and its descendants pass every rule
    pub fn is_valid(&self, object: &SchemaObject) -> bool {
        self.validate_tree(object).is_ok()
    }

    fn walk(&self, object: &SchemaObject, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        self.run(object, ctx)?;
        ctx.path.push(object.element_name().prefixed_name());
        let result = object
            .children()
            .objects()
            .try_for_each(|child| self.walk(child, ctx));
        ctx.path.pop();
        result
    }

    fn run(&self, object: &SchemaObject, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        if !ctx.visited.insert(object as *const SchemaObject as usize) {
            return Ok(());
        }

        ctx.path.push(object.element_name().prefixed_name());
        let result = self.run_rules(object, ctx);
        ctx.path.pop();
        result
    }

    fn run_rules(&self, object: &SchemaObject, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        for rule in self.rules_for(object.type_name()) {
            trace!("Running {} on {}", rule.name(), object.element_name());
            if let Err(e) = rule.check(object, ctx) {
                let e = if e.path.is_none() { e.with_path(ctx.path()) } else { e };
                match ctx.mode {
                    ValidationMode::Lax => ctx.errors.push(e),
                    _ => return Err(e),
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeDescriptor;
    use crate::registry::Builder;
    use crate::validators::{FnRule, RequiredAttribute, ValidChildren};

    fn parent_builder() -> Builder {
        Builder::new(TypeDescriptor::new(QName::namespaced("urn:t", "Parent")))
    }

    fn child_builder() -> Builder {
        Builder::new(TypeDescriptor::new(QName::namespaced("urn:t", "Child")))
    }

    #[test]
    fn test_validation_mode_default() {
        assert_eq!(ValidationMode::default(), ValidationMode::Strict);
        assert_eq!(ValidationMode::Lax.to_string(), "lax");
    }

    #[test]
    fn test_fail_fast_reports_first_rule() {
        let mut suite = ValidatorSuite::new();
        let parent = QName::namespaced("urn:t", "Parent");
        suite.register(parent.clone(), RequiredAttribute::new(QName::local("A")));
        suite.register(parent.clone(), RequiredAttribute::new(QName::local("B")));

        let obj = parent_builder().build_object();
        let err = suite.validate(&obj).unwrap_err();
        assert_eq!(err.attribute, Some(QName::local("A")));
        assert_eq!(err.element, parent);
        assert_eq!(err.path.as_deref(), Some("/Parent"));
    }

    #[test]
    fn test_lax_collects_all() {
        let mut suite = ValidatorSuite::new();
        let parent = QName::namespaced("urn:t", "Parent");
        suite.register(parent.clone(), RequiredAttribute::new(QName::local("A")));
        suite.register(parent, RequiredAttribute::new(QName::local("B")));
        suite.register(
            QName::namespaced("urn:t", "Child"),
            RequiredAttribute::new(QName::local("C")),
        );

        let mut obj = parent_builder().build_object();
        obj.add_child(child_builder().build_object());

        let errors = suite.validate_with_mode(&obj, ValidationMode::Lax);
        assert_eq!(errors.len(), 3);
        assert_eq!(errors[2].path.as_deref(), Some("/Parent/Child"));
        assert_eq!(suite.validate_with_mode(&obj, ValidationMode::Strict).len(), 1);
        assert!(suite.validate_with_mode(&obj, ValidationMode::Skip).is_empty());
    }

    #[test]
    fn test_delegation_does_not_rerun_child_rules() {
        let mut suite = ValidatorSuite::new();
        suite.register(QName::namespaced("urn:t", "Parent"), ValidChildren);
        suite.register(
            QName::namespaced("urn:t", "Child"),
            RequiredAttribute::new(QName::local("C")),
        );

        let mut obj = parent_builder().build_object();
        obj.add_child(child_builder().build_object());

        let errors = suite.validate_with_mode(&obj, ValidationMode::Lax);
        assert_eq!(errors.len(), 1);
        assert!(suite.validate(&obj).is_err());
        assert!(!suite.is_valid(&obj));
    }

    #[test]
    fn test_unregistered_type_passes() {
        let suite = ValidatorSuite::new();
        assert!(suite.validate(&parent_builder().build_object()).is_ok());
        assert!(suite.rules_for(&QName::local("Nothing")).is_empty());
    }

    #[test]
    fn test_validate_does_not_descend() {
        let mut suite = ValidatorSuite::new();
        suite.register(
            QName::namespaced("urn:t", "Child"),
            FnRule::new("always-fails", |obj| {
                Err(ValidationError::new("nope", obj.element_name()))
            }),
        );

        let mut obj = parent_builder().build_object();
        obj.add_child(child_builder().build_object());
        assert!(suite.validate(&obj).is_ok());
        assert!(suite.validate_tree(&obj).is_err());
    }
}
