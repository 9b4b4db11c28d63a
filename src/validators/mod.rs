//! Validator chain
//!
//! Domain rules that schema validation cannot express, run against
//! constructed objects. Rules are registered per object type in a
//! [`ValidatorSuite`] and executed in registration order. The default
//! entry points stop at the first failure; [`ValidationMode::Lax`]
//! collects every failure instead.

mod base;
mod rules;

pub use base::{ValidationContext, ValidationMode, ValidationResult, ValidationRule, ValidatorSuite};
pub use rules::{ChildCount, FnRule, LexicalAttribute, RequiredAttribute, RequiredText, ValidChildren};
