//! Stock validation rules

use std::fmt;

use crate::error::ValidationError;
use crate::namespaces::{NamespaceContext, QName};
use crate::object::{HasAttributes, HasChildren, HasText, SchemaObject, ValueKind};

use super::base::{ValidationContext, ValidationResult, ValidationRule};

/// Requires an attribute to be present with a non-blank value
///
/// Used for algorithm-URI style fields where an empty value is as useless
/// as a missing one.
#[derive(Debug, Clone)]
pub struct RequiredAttribute {
    attribute: QName,
    message: Option<String>,
}

impl RequiredAttribute {
    /// Create a rule for `attribute`
    pub fn new(attribute: QName) -> Self {
        Self {
            attribute,
            message: None,
        }
    }

    /// Use a custom failure message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The attribute checked
    pub fn attribute(&self) -> &QName {
        &self.attribute
    }
}

impl ValidationRule for RequiredAttribute {
    fn name(&self) -> &str {
        "required-attribute"
    }

    fn check(&self, object: &SchemaObject, _ctx: &mut ValidationContext<'_>) -> ValidationResult {
        match object.attribute(&self.attribute) {
            Some(value) if !value.trim().is_empty() => Ok(()),
            _ => {
                let message = self.message.clone().unwrap_or_else(|| {
                    format!(
                        "{} attribute is required and must not be empty",
                        self.attribute.local_name
                    )
                });
                Err(ValidationError::new(message, object.element_name()).with_attribute(&self.attribute))
            }
        }
    }
}

/// Requires non-blank text content
#[derive(Debug, Clone, Default)]
pub struct RequiredText {
    message: Option<String>,
}

impl RequiredText {
    /// Create the rule
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom failure message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ValidationRule for RequiredText {
    fn name(&self) -> &str {
        "required-text"
    }

    fn check(&self, object: &SchemaObject, _ctx: &mut ValidationContext<'_>) -> ValidationResult {
        match object.text() {
            Some(text) if !text.trim().is_empty() => Ok(()),
            _ => Err(ValidationError::new(
                self.message
                    .clone()
                    .unwrap_or_else(|| "text content is required".to_string()),
                object.element_name(),
            )),
        }
    }
}

/// Bounds the number of children with a given element name
#[derive(Debug, Clone)]
pub struct ChildCount {
    child: QName,
    min: usize,
    max: Option<usize>,
}

impl ChildCount {
    /// Require between `min` and `max` (unbounded when None) occurrences
    pub fn new(child: QName, min: usize, max: Option<usize>) -> Self {
        Self { child, min, max }
    }

    /// At most one occurrence
    pub fn optional(child: QName) -> Self {
        Self::new(child, 0, Some(1))
    }

    /// Exactly one occurrence
    pub fn required(child: QName) -> Self {
        Self::new(child, 1, Some(1))
    }
}

impl ValidationRule for ChildCount {
    fn name(&self) -> &str {
        "child-count"
    }

    fn check(&self, object: &SchemaObject, _ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let count = object.children().find_all(&self.child).count();
        let too_many = self.max.map_or(false, |max| count > max);
        if count < self.min || too_many {
            let expected = match self.max {
                Some(max) if max == self.min => format!("{}", max),
                Some(max) => format!("{}..{}", self.min, max),
                None => format!("at least {}", self.min),
            };
            return Err(ValidationError::new(
                format!(
                    "expected {} {} child element(s), found {}",
                    expected, self.child.local_name, count
                ),
                object.element_name(),
            ));
        }
        Ok(())
    }
}

/// Requires an attribute, when present, to be in the lexical space of a kind
///
/// QName values are resolved against the declarations made on the object
/// itself.
#[derive(Debug, Clone)]
pub struct LexicalAttribute {
    attribute: QName,
    kind: ValueKind,
}

impl LexicalAttribute {
    /// Create a rule for `attribute`
    pub fn new(attribute: QName, kind: ValueKind) -> Self {
        Self { attribute, kind }
    }
}

impl ValidationRule for LexicalAttribute {
    fn name(&self) -> &str {
        "lexical-attribute"
    }

    fn check(&self, object: &SchemaObject, _ctx: &mut ValidationContext<'_>) -> ValidationResult {
        let value = match object.attribute(&self.attribute) {
            Some(value) => value,
            None => return Ok(()),
        };

        let mut scope = NamespaceContext::new();
        for namespace in object.namespaces() {
            scope.declare(namespace);
        }
        self.kind.check_lexical(value, &scope).map_err(|reason| {
            ValidationError::new(
                format!("{} attribute is not a valid {}: {}", self.attribute.local_name, self.kind, reason),
                object.element_name(),
            )
            .with_attribute(&self.attribute)
        })
    }
}

/// Runs the registered rules of every child object
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidChildren;

impl ValidationRule for ValidChildren {
    fn name(&self) -> &str {
        "valid-children"
    }

    fn check(&self, object: &SchemaObject, ctx: &mut ValidationContext<'_>) -> ValidationResult {
        object
            .children()
            .objects()
            .try_for_each(|child| ctx.validate_child(child))
    }
}

type CheckFn = dyn Fn(&SchemaObject) -> ValidationResult + Send + Sync;

/// A rule backed by a closure
pub struct FnRule {
    name: String,
    check: Box<CheckFn>,
}

impl FnRule {
    /// Create a rule named `name`
    pub fn new<F>(name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&SchemaObject) -> ValidationResult + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            check: Box::new(check),
        }
    }
}

impl fmt::Debug for FnRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnRule").field("name", &self.name).finish()
    }
}

impl ValidationRule for FnRule {
    fn name(&self) -> &str {
        &self.name
    }

    fn check(&self, object: &SchemaObject, _ctx: &mut ValidationContext<'_>) -> ValidationResult {
        (self.check)(object)
    }
}
