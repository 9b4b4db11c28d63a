//! Type descriptors
//!
//! A descriptor is the per-type metadata that drives the generic object
//! model: the default element name, the optional XSI type name, the modeled
//! attributes in schema order, and the content model. Descriptors are plain
//! data and can be loaded from JSON tables.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Error, Result};
use crate::namespaces::QName;
use crate::object::ValueKind;
use crate::XSD_NAMESPACE;

/// Name of the descriptor used for content no registered type claims
pub static ANY_TYPE: Lazy<QName> = Lazy::new(|| QName::prefixed(XSD_NAMESPACE, "anyType", "xs"));

/// A modeled attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSpec {
    /// Attribute name; unqualified attributes have no namespace
    pub name: QName,
    /// Lexical space of the value
    #[serde(default)]
    pub kind: ValueKind,
    /// Whether marshalling requires the attribute to be present
    #[serde(default)]
    pub required: bool,
}

/// What an element may contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContentModel {
    /// No content
    Empty,
    /// Character data of the given kind
    Simple(ValueKind),
    /// Child elements; whitespace between them is insignificant
    #[default]
    Complex,
    /// Child elements interleaved with significant text
    Mixed,
}

impl ContentModel {
    /// Whether whitespace-only text can be dropped when reading
    pub fn ignores_whitespace(&self) -> bool {
        matches!(self, ContentModel::Empty | ContentModel::Complex)
    }
}

/// Metadata for one schema type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Default element name
    pub name: QName,
    /// XSI type name, when the type is reused under other element names
    #[serde(default)]
    pub type_name: Option<QName>,
    /// Modeled attributes in the order they are written
    #[serde(default)]
    pub attributes: Vec<AttributeSpec>,
    /// Content model
    #[serde(default)]
    pub content: ContentModel,
}

impl TypeDescriptor {
    /// Create a descriptor with no attributes and complex content
    pub fn new(name: QName) -> Self {
        Self {
            name,
            type_name: None,
            attributes: Vec::new(),
            content: ContentModel::Complex,
        }
    }

    /// The catch-all descriptor for unknown content
    pub fn any() -> Self {
        Self::new(ANY_TYPE.clone()).with_content(ContentModel::Mixed)
    }

    /// Set the XSI type name
    pub fn with_type_name(mut self, type_name: QName) -> Self {
        self.type_name = Some(type_name);
        self
    }

    /// Append an optional attribute
    pub fn with_attribute(mut self, name: QName, kind: ValueKind) -> Self {
        self.attributes.push(AttributeSpec {
            name,
            kind,
            required: false,
        });
        self
    }

    /// Append a required attribute
    pub fn with_required_attribute(mut self, name: QName, kind: ValueKind) -> Self {
        self.attributes.push(AttributeSpec {
            name,
            kind,
            required: true,
        });
        self
    }

    /// Set the content model
    pub fn with_content(mut self, content: ContentModel) -> Self {
        self.content = content;
        self
    }

    /// Find a modeled attribute
    pub fn attribute_spec(&self, name: &QName) -> Option<&AttributeSpec> {
        self.attributes.iter().find(|a| &a.name == name)
    }

    /// The name written as `xsi:type` when the type appears under another element name
    pub fn xsi_type(&self) -> &QName {
        self.type_name.as_ref().unwrap_or(&self.name)
    }

    /// Whether this is the catch-all descriptor
    pub fn is_wildcard(&self) -> bool {
        self.name == *ANY_TYPE
    }

    /// Check internal consistency
    pub fn check(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for spec in &self.attributes {
            if !seen.insert(&spec.name) {
                return Err(Error::Descriptor(format!(
                    "attribute {} declared twice on {}",
                    spec.name, self.name
                )));
            }
            if spec.name.namespace() == Some(crate::XSI_NAMESPACE) {
                return Err(Error::Descriptor(format!(
                    "xsi attribute {} cannot be modeled on {}",
                    spec.name, self.name
                )));
            }
        }
        Ok(())
    }
}
