//! Error types for xmltooling
//!
//! This module defines all error types used throughout the library.
//! Registration, marshalling, unmarshalling and validation failures each get
//! their own variant so callers can tell a programmer error from a rejected
//! message.

use std::fmt;
use thiserror::Error;

use crate::namespaces::QName;

/// Result type alias using xmltooling Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for xmltooling operations
#[derive(Error, Debug)]
pub enum Error {
    /// A builder was registered twice under the same key
    #[error("duplicate registration: {0}")]
    DuplicateRegistration(QName),

    /// Object graph could not be turned into DOM
    #[error("marshalling error: {0}")]
    Marshalling(#[from] MarshallingError),

    /// DOM could not be turned into an object graph
    #[error("unmarshalling error: {0}")]
    Unmarshalling(#[from] UnmarshallingError),

    /// Object is well formed but breaks a domain rule
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Name error (invalid XML name)
    #[error("name error: {0}")]
    Name(String),

    /// Namespace error
    #[error("namespace error: {0}")]
    Namespace(String),

    /// XML reading/writing error at the DOM boundary
    #[error("XML error: {0}")]
    Xml(String),

    /// Limit exceeded error
    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    /// Malformed type descriptor table
    #[error("descriptor error: {0}")]
    Descriptor(String),

    /// Failure reported by a security collaborator
    #[error("security error: {0}")]
    Security(String),
}

impl Error {
    /// Whether this error means an inbound message should be rejected
    /// rather than treated as a local bug.
    pub fn is_rejected_message(&self) -> bool {
        matches!(self, Error::Unmarshalling(_) | Error::Xml(_) | Error::LimitExceeded(_))
    }
}

/// Raised when an object violates a structural precondition at marshal time
#[derive(Debug, Clone)]
pub struct MarshallingError {
    /// Error message
    pub message: String,
    /// Element being marshalled
    pub element: Option<QName>,
    /// Attribute concerned, if any
    pub attribute: Option<QName>,
}

impl MarshallingError {
    /// Create a new marshalling error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            element: None,
            attribute: None,
        }
    }

    /// Set the element being marshalled
    pub fn with_element(mut self, element: &QName) -> Self {
        self.element = Some(element.clone());
        self
    }

    /// Set the attribute concerned
    pub fn with_attribute(mut self, attribute: &QName) -> Self {
        self.attribute = Some(attribute.clone());
        self
    }
}

impl fmt::Display for MarshallingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref element) = self.element {
            write!(f, " (element {}", element)?;
            if let Some(ref attribute) = self.attribute {
                write!(f, ", attribute {}", attribute)?;
            }
            write!(f, ")")?;
        }

        Ok(())
    }
}

impl std::error::Error for MarshallingError {}

/// Raised when inbound DOM cannot be mapped onto a typed object
#[derive(Debug, Clone)]
pub struct UnmarshallingError {
    /// Error message
    pub message: String,
    /// Element being unmarshalled
    pub element: Option<QName>,
    /// Offending lexical value
    pub value: Option<String>,
}

impl UnmarshallingError {
    /// Create a new unmarshalling error
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            element: None,
            value: None,
        }
    }

    /// Set the element being unmarshalled
    pub fn with_element(mut self, element: &QName) -> Self {
        self.element = Some(element.clone());
        self
    }

    /// Set the offending value
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

impl fmt::Display for UnmarshallingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref element) = self.element {
            write!(f, " (element {})", element)?;
        }

        if let Some(ref value) = self.value {
            write!(f, ": '{}'", value)?;
        }

        Ok(())
    }
}

impl std::error::Error for UnmarshallingError {}

/// Domain rule violation reported by the validator chain
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error message
    pub message: String,
    /// Element that failed validation
    pub element: QName,
    /// Attribute that failed validation
    pub attribute: Option<QName>,
    /// Path from the validated root to the failing element
    pub path: Option<String>,
}

impl ValidationError {
    /// Create a new validation error for an element
    pub fn new(message: impl Into<String>, element: &QName) -> Self {
        Self {
            message: message.into(),
            element: element.clone(),
            attribute: None,
            path: None,
        }
    }

    /// Set the attribute concerned
    pub fn with_attribute(mut self, attribute: &QName) -> Self {
        self.attribute = Some(attribute.clone());
        self
    }

    /// Set the path where validation failed
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(ref attribute) = self.attribute {
            write!(f, "\n\nAttribute: {}", attribute)?;
        }

        write!(f, "\n\nElement: {}", self.element)?;

        if let Some(ref path) = self.path {
            write!(f, "\n\nPath: {}", path)?;
        }

        Ok(())
    }
}

impl std::error::Error for ValidationError {}
