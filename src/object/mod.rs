//! Schema object model
//!
//! Every schema element is represented by the same [`SchemaObject`] type.
//! What makes a `FaultString` different from an `AgreementMethod` is the
//! shared [`TypeDescriptor`] it was built from: which attributes are
//! modeled, in which order they are written, and what content it holds.
//!
//! Objects are only created by a [`Builder`](crate::registry::Builder).
//! They are mutable until marshalled and may be mutated afterwards without
//! affecting DOM already produced.
//!
//! A graph of objects is a tree: each child is owned by exactly one parent.
//! Mutating a graph while it is being marshalled on another thread is not
//! possible through safe code, since marshalling borrows it.

mod capabilities;
mod values;

pub use capabilities::{AttributeSet, Child, ChildList, HasAttributes, HasChildren, HasText};
pub use values::{Base64Binary, ValueKind, XmlValue, XsBoolean};

use std::sync::Arc;

use crate::descriptor::TypeDescriptor;
use crate::error::{Error, UnmarshallingError};
use crate::namespaces::{Namespace, QName};

/// An instance of a schema element
#[derive(Debug, Clone)]
pub struct SchemaObject {
    descriptor: Arc<TypeDescriptor>,
    element_name: QName,
    schema_type: Option<QName>,
    nil: Option<XsBoolean>,
    schema_location: Option<String>,
    no_namespace_schema_location: Option<String>,
    attributes: AttributeSet,
    unknown_attributes: AttributeSet,
    children: ChildList,
    namespaces: Vec<Namespace>,
}

impl SchemaObject {
    pub(crate) fn new(descriptor: Arc<TypeDescriptor>, element_name: QName) -> Self {
        Self {
            descriptor,
            element_name,
            schema_type: None,
            nil: None,
            schema_location: None,
            no_namespace_schema_location: None,
            attributes: AttributeSet::new(),
            unknown_attributes: AttributeSet::new(),
            children: ChildList::new(),
            namespaces: Vec::new(),
        }
    }

    /// Descriptor of the type this object was built from
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Default element name of this object's type
    pub fn type_name(&self) -> &QName {
        &self.descriptor.name
    }

    /// Name of the element as instantiated
    pub fn element_name(&self) -> &QName {
        &self.element_name
    }

    /// Whether the object is named after its type's default element
    pub fn has_default_name(&self) -> bool {
        self.element_name == self.descriptor.name
    }

    /// XSI type override, if any
    pub fn schema_type(&self) -> Option<&QName> {
        self.schema_type.as_ref()
    }

    pub(crate) fn set_schema_type(&mut self, schema_type: Option<QName>) {
        self.schema_type = schema_type;
    }

    /// `xsi:nil`, absent unless explicitly set
    pub fn nil(&self) -> Option<XsBoolean> {
        self.nil
    }

    /// Whether `xsi:nil` is present and true
    pub fn is_nil(&self) -> bool {
        self.nil.map_or(false, |n| n.value)
    }

    /// Set or clear `xsi:nil`
    pub fn set_nil(&mut self, nil: Option<XsBoolean>) {
        self.nil = nil;
    }

    /// `xsi:schemaLocation`
    pub fn schema_location(&self) -> Option<&str> {
        self.schema_location.as_deref()
    }

    /// Set or clear `xsi:schemaLocation`
    pub fn set_schema_location(&mut self, location: Option<String>) {
        self.schema_location = location;
    }

    /// `xsi:noNamespaceSchemaLocation`
    pub fn no_namespace_schema_location(&self) -> Option<&str> {
        self.no_namespace_schema_location.as_deref()
    }

    /// Set or clear `xsi:noNamespaceSchemaLocation`
    pub fn set_no_namespace_schema_location(&mut self, location: Option<String>) {
        self.no_namespace_schema_location = location;
    }

    /// Attributes modeled by the descriptor
    pub fn attributes(&self) -> &AttributeSet {
        &self.attributes
    }

    /// Attributes the descriptor does not model, kept for re-marshalling
    pub fn unknown_attributes(&self) -> &AttributeSet {
        &self.unknown_attributes
    }

    /// Extra namespace declarations to write on this element
    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    /// Declare a namespace on this element, e.g. for QName-valued content
    pub fn declare_namespace(&mut self, namespace: Namespace) {
        if !self.namespaces.contains(&namespace) {
            self.namespaces.push(namespace);
        }
    }

    /// Read an attribute as a typed value
    pub fn value<T: XmlValue>(&self, name: &QName) -> Result<Option<T>, Error> {
        self.attribute(name)
            .map(|v| T::from_lexical(v).map_err(|reason| self.conversion_error(reason, v)))
            .transpose()
    }

    /// Write an attribute from a typed value
    pub fn set_value<T: XmlValue>(&mut self, name: QName, value: &T) {
        self.set_attribute(name, value.to_lexical());
    }

    /// Read the text content as a typed value
    pub fn text_value<T: XmlValue>(&self) -> Result<Option<T>, Error> {
        self.children
            .text()
            .map(|v| T::from_lexical(&v).map_err(|reason| self.conversion_error(reason, &v)))
            .transpose()
    }

    /// Replace the text content with a typed value
    pub fn set_text_value<T: XmlValue>(&mut self, value: &T) {
        self.children.set_text(value.to_lexical());
    }

    /// Append a child object, taking ownership of it
    pub fn add_child(&mut self, child: SchemaObject) {
        self.children.push_object(child);
    }

    /// Child objects in document order
    pub fn child_objects(&self) -> impl Iterator<Item = &SchemaObject> {
        self.children.objects()
    }

    fn conversion_error(&self, reason: String, value: &str) -> Error {
        UnmarshallingError::new(reason)
            .with_element(&self.element_name)
            .with_value(value)
            .into()
    }
}

impl HasAttributes for SchemaObject {
    fn attribute(&self, name: &QName) -> Option<&str> {
        self.attributes
            .get(name)
            .or_else(|| self.unknown_attributes.get(name))
    }

    /// Modeled attributes go to the typed slot, everything else to the
    /// overflow slot.
    fn set_attribute(&mut self, name: QName, value: String) {
        if self.descriptor.attribute_spec(&name).is_some() {
            self.attributes.set(name, value);
        } else {
            self.unknown_attributes.set(name, value);
        }
    }

    fn remove_attribute(&mut self, name: &QName) -> Option<String> {
        self.attributes
            .remove(name)
            .or_else(|| self.unknown_attributes.remove(name))
    }
}

impl HasChildren for SchemaObject {
    fn children(&self) -> &ChildList {
        &self.children
    }

    fn children_mut(&mut self) -> &mut ChildList {
        &mut self.children
    }
}

impl HasText for SchemaObject {}

/// Equality covers identity, XSI data, attributes and children.
/// Namespace declarations are presentation only and are ignored.
impl PartialEq for SchemaObject {
    fn eq(&self, other: &Self) -> bool {
        self.descriptor.name == other.descriptor.name
            && self.element_name == other.element_name
            && self.schema_type == other.schema_type
            && self.nil == other.nil
            && self.schema_location == other.schema_location
            && self.no_namespace_schema_location == other.no_namespace_schema_location
            && self.attributes == other.attributes
            && self.unknown_attributes == other.unknown_attributes
            && self.children == other.children
    }
}
