//! XML namespace handling
//!
//! This module provides the qualified identity used to name every object,
//! attribute and XSI type, and the prefix bindings in scope while reading or
//! writing a DOM subtree.

use crate::error::{Error, Result};
use crate::names::{split_qname, validate_ncname};
use crate::XML_NAMESPACE;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// XML Namespace URI
pub type NamespaceUri = String;

/// Namespace prefix
pub type Prefix = String;

/// Qualified name (QName) - namespace URI, local name and presentation prefix
///
/// Two QNames are equal when their namespace and local name match; the
/// prefix only matters when the name is written out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawQName")]
pub struct QName {
    /// Namespace URI (None for no namespace)
    pub namespace: Option<NamespaceUri>,
    /// Local name
    pub local_name: String,
    /// Preferred prefix
    pub prefix: Option<Prefix>,
}

#[derive(Deserialize)]
struct RawQName {
    namespace: Option<String>,
    local_name: String,
    prefix: Option<String>,
}

impl TryFrom<RawQName> for QName {
    type Error = Error;

    fn try_from(raw: RawQName) -> Result<Self> {
        QName::try_new(raw.namespace, raw.local_name, raw.prefix)
    }
}

impl QName {
    /// Create a new QName
    ///
    /// An empty namespace is treated as no namespace. The local name is not
    /// checked; use [`QName::try_new`] for untrusted input.
    pub fn new(
        namespace: Option<impl Into<String>>,
        local_name: impl Into<String>,
        prefix: Option<impl Into<String>>,
    ) -> Self {
        Self {
            namespace: namespace.map(|s| s.into()).filter(|s| !s.is_empty()),
            local_name: local_name.into(),
            prefix: prefix.map(|s| s.into()).filter(|s| !s.is_empty()),
        }
    }

    /// Create a QName, checking that the local name and prefix are NCNames
    pub fn try_new(
        namespace: Option<impl Into<String>>,
        local_name: impl Into<String>,
        prefix: Option<impl Into<String>>,
    ) -> Result<Self> {
        let qname = Self::new(namespace, local_name, prefix);
        validate_ncname(&qname.local_name)?;
        if let Some(ref prefix) = qname.prefix {
            validate_ncname(prefix)?;
        }
        Ok(qname)
    }

    /// Create a QName without a namespace
    pub fn local(local_name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            local_name: local_name.into(),
            prefix: None,
        }
    }

    /// Create a QName with a namespace
    pub fn namespaced(namespace: impl Into<String>, local_name: impl Into<String>) -> Self {
        Self::new(Some(namespace), local_name, None::<String>)
    }

    /// Create a QName with a namespace and a preferred prefix
    pub fn prefixed(
        namespace: impl Into<String>,
        local_name: impl Into<String>,
        prefix: impl Into<String>,
    ) -> Self {
        Self::new(Some(namespace), local_name, Some(prefix))
    }

    /// Get the namespace as a string slice
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Get the prefix as a string slice
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Return a copy of this name carrying a different prefix
    pub fn with_prefix(&self, prefix: Option<&str>) -> Self {
        Self::new(self.namespace.clone(), self.local_name.clone(), prefix)
    }

    /// The `prefix:local` form used in element tags and `xsi:type` values
    pub fn prefixed_name(&self) -> String {
        match self.prefix() {
            Some(prefix) => format!("{}:{}", prefix, self.local_name),
            None => self.local_name.clone(),
        }
    }
}

impl PartialEq for QName {
    fn eq(&self, other: &Self) -> bool {
        self.namespace == other.namespace && self.local_name == other.local_name
    }
}

impl Eq for QName {}

impl Hash for QName {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.namespace.hash(state);
        self.local_name.hash(state);
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{{{}}}{}", ns, self.local_name),
            None => write!(f, "{}", self.local_name),
        }
    }
}

/// A single `xmlns` declaration
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace {
    /// Declared prefix (None for the default namespace)
    pub prefix: Option<Prefix>,
    /// Namespace URI
    pub uri: NamespaceUri,
}

impl Namespace {
    /// Create a new declaration
    pub fn new(prefix: Option<impl Into<String>>, uri: impl Into<String>) -> Self {
        Self {
            prefix: prefix.map(|p| p.into()).filter(|p| !p.is_empty()),
            uri: uri.into(),
        }
    }
}

/// Namespace context for resolving prefixes
#[derive(Debug, Clone)]
pub struct NamespaceContext {
    /// Mapping from prefix to namespace URI
    prefixes: IndexMap<Prefix, NamespaceUri>,
    /// Default namespace (no prefix)
    default_namespace: Option<NamespaceUri>,
}

impl NamespaceContext {
    /// Create a new empty namespace context
    pub fn new() -> Self {
        Self {
            prefixes: IndexMap::new(),
            default_namespace: None,
        }
    }

    /// Add a namespace prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Set the default namespace; an empty URI undeclares it
    pub fn set_default_namespace(&mut self, namespace: impl Into<String>) {
        let namespace = namespace.into();
        self.default_namespace = if namespace.is_empty() { None } else { Some(namespace) };
    }

    /// Apply a declaration to this context
    pub fn declare(&mut self, namespace: &Namespace) {
        match namespace.prefix {
            Some(ref prefix) => self.add_prefix(prefix.clone(), namespace.uri.clone()),
            None => self.set_default_namespace(namespace.uri.clone()),
        }
    }

    /// Get the namespace for a prefix
    pub fn get_namespace(&self, prefix: &str) -> Option<&str> {
        if prefix == "xml" {
            return Some(XML_NAMESPACE);
        }
        self.prefixes.get(prefix).map(|s| s.as_str())
    }

    /// Get the default namespace
    pub fn get_default_namespace(&self) -> Option<&str> {
        self.default_namespace.as_deref()
    }

    /// Get the namespace bound to an optional prefix
    pub fn namespace_for(&self, prefix: Option<&str>) -> Option<&str> {
        match prefix {
            Some(prefix) => self.get_namespace(prefix),
            None => self.get_default_namespace(),
        }
    }

    /// Check whether `prefix` is currently bound to `uri`
    pub fn is_bound(&self, prefix: Option<&str>, uri: Option<&str>) -> bool {
        self.namespace_for(prefix) == uri
    }

    /// Find a non-default prefix bound to `uri`, honouring later shadowing
    pub fn find_prefix(&self, uri: &str) -> Option<&str> {
        if uri == XML_NAMESPACE {
            return Some("xml");
        }
        self.prefixes
            .iter()
            .rev()
            .find(|(_, ns)| ns.as_str() == uri)
            .map(|(prefix, _)| prefix.as_str())
    }

    /// Resolve a prefixed name to a QName
    pub fn resolve(&self, prefixed_name: &str) -> Result<QName> {
        match split_qname(prefixed_name) {
            (Some(prefix), local) => {
                let namespace = self
                    .get_namespace(prefix)
                    .ok_or_else(|| Error::Namespace(format!("Unknown prefix: {}", prefix)))?;
                QName::try_new(Some(namespace), local, Some(prefix))
            }
            (None, local) => QName::try_new(self.default_namespace.clone(), local, None::<String>),
        }
    }
}

impl Default for NamespaceContext {
    fn default() -> Self {
        Self::new()
    }
}
