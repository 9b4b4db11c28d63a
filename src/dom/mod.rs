//! DOM boundary
//!
//! The marshaller produces, and the unmarshaller consumes, this small owned
//! tree. Turning bytes into a tree and back is left to [`reader`] and
//! [`writer`], which wrap roxmltree and quick-xml respectively.

mod reader;
mod writer;

pub use reader::parse_str;
pub use writer::to_xml_string;

use crate::namespaces::{Namespace, QName};
use indexmap::IndexMap;

/// Ordered attribute map of a DOM element
pub type DomAttributes = IndexMap<QName, String>;

/// A node in an element's child list
#[derive(Debug, Clone, PartialEq)]
pub enum DomNode {
    /// Child element
    Element(DomElement),
    /// Character data
    Text(String),
}

/// XML Element in the DOM tree
#[derive(Debug, Clone, PartialEq)]
pub struct DomElement {
    /// Element qualified name, prefix included
    pub name: QName,
    /// Attributes in document order, `xmlns` declarations excluded
    pub attributes: DomAttributes,
    /// Child nodes in document order
    pub children: Vec<DomNode>,
    /// Namespace declarations made on this element
    pub namespaces: Vec<Namespace>,
}

impl DomElement {
    /// Create a new element
    pub fn new(name: QName) -> Self {
        Self {
            name,
            attributes: IndexMap::new(),
            children: Vec::new(),
            namespaces: Vec::new(),
        }
    }

    /// Get the local name of the element
    pub fn local_name(&self) -> &str {
        &self.name.local_name
    }

    /// Get the namespace of the element
    pub fn namespace(&self) -> Option<&str> {
        self.name.namespace()
    }

    /// Get an unqualified attribute value by local name
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.get_attribute_qname(&QName::local(name))
    }

    /// Get an attribute value by qualified name
    pub fn get_attribute_qname(&self, qname: &QName) -> Option<&str> {
        self.attributes.get(qname).map(|s| s.as_str())
    }

    /// Set an attribute, keeping its original position when replaced
    pub fn set_attribute(&mut self, name: QName, value: impl Into<String>) {
        self.attributes.insert(name, value.into());
    }

    /// Record a namespace declaration unless the same one is already present
    pub fn declare_namespace(&mut self, namespace: Namespace) {
        if !self.namespaces.contains(&namespace) {
            self.namespaces.push(namespace);
        }
    }

    /// Add a child element
    pub fn add_child(&mut self, child: DomElement) {
        self.children.push(DomNode::Element(child));
    }

    /// Append character data, merging with a preceding text node
    pub fn append_text(&mut self, text: &str) {
        if let Some(DomNode::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(DomNode::Text(text.to_string()));
        }
    }

    /// Concatenated character data of the direct text children
    pub fn text(&self) -> Option<String> {
        let mut text: Option<String> = None;
        for child in &self.children {
            if let DomNode::Text(t) = child {
                text.get_or_insert_with(String::new).push_str(t);
            }
        }
        text
    }

    /// Iterate over child elements, skipping text
    pub fn child_elements(&self) -> impl Iterator<Item = &DomElement> {
        self.children.iter().filter_map(|child| match child {
            DomNode::Element(e) => Some(e),
            DomNode::Text(_) => None,
        })
    }

    /// Find child elements by local name
    pub fn find_children(&self, local_name: &str) -> Vec<&DomElement> {
        self.child_elements()
            .filter(|e| e.local_name() == local_name)
            .collect()
    }
}
