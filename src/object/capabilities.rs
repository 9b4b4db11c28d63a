//! Capability building blocks shared by every schema object
//!
//! Attribute storage, child lists and text content are small structs that
//! [`SchemaObject`](super::SchemaObject) composes; the traits expose them
//! uniformly.

use indexmap::IndexMap;

use crate::namespaces::QName;

use super::SchemaObject;

/// Ordered attribute storage
///
/// Presence is meaningful: an absent attribute and an attribute set to the
/// empty string are different states.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttributeSet {
    values: IndexMap<QName, String>,
}

impl AttributeSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value
    pub fn get(&self, name: &QName) -> Option<&str> {
        self.values.get(name).map(|s| s.as_str())
    }

    /// Get a value together with the stored name, which carries the prefix
    /// it was read or set with
    pub fn get_key_value(&self, name: &QName) -> Option<(&QName, &str)> {
        self.values.get_key_value(name).map(|(k, v)| (k, v.as_str()))
    }

    /// Set a value, keeping the original position when replaced
    pub fn set(&mut self, name: QName, value: impl Into<String>) {
        match self.values.get_index_of(&name) {
            Some(index) => {
                self.values.shift_remove_index(index);
                self.values.shift_insert(index, name, value.into());
            }
            None => {
                self.values.insert(name, value.into());
            }
        }
    }

    /// Remove a value, preserving the order of the rest
    pub fn remove(&mut self, name: &QName) -> Option<String> {
        self.values.shift_remove(name)
    }

    /// Check whether a value is present
    pub fn contains(&self, name: &QName) -> bool {
        self.values.contains_key(name)
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&QName, &str)> {
        self.values.iter().map(|(k, v)| (k, v.as_str()))
    }

    /// Number of values
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A child of a schema object
#[derive(Debug, Clone, PartialEq)]
pub enum Child {
    /// Nested object, exclusively owned by its parent
    Object(SchemaObject),
    /// Character data
    Text(String),
}

impl Child {
    /// Borrow the object, if this child is one
    pub fn as_object(&self) -> Option<&SchemaObject> {
        match self {
            Child::Object(o) => Some(o),
            Child::Text(_) => None,
        }
    }

    /// Borrow the text, if this child is text
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Child::Object(_) => None,
            Child::Text(t) => Some(t),
        }
    }
}

/// Ordered child storage
///
/// Children are owned by value, so moving a child to another parent means
/// taking it out of this list first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildList {
    items: Vec<Child>,
}

impl ChildList {
    /// Create an empty list
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a child object
    pub fn push_object(&mut self, object: SchemaObject) {
        self.items.push(Child::Object(object));
    }

    /// Append a text node
    pub fn push_text(&mut self, text: impl Into<String>) {
        self.items.push(Child::Text(text.into()));
    }

    /// Insert a child at `index`
    pub fn insert(&mut self, index: usize, child: Child) {
        self.items.insert(index, child);
    }

    /// Detach and return the child at `index`
    pub fn remove(&mut self, index: usize) -> Option<Child> {
        if index < self.items.len() {
            Some(self.items.remove(index))
        } else {
            None
        }
    }

    /// Detach and return the first child object named `name`
    pub fn take_object(&mut self, name: &QName) -> Option<SchemaObject> {
        let index = self
            .items
            .iter()
            .position(|c| matches!(c, Child::Object(o) if o.element_name() == name))?;
        match self.items.remove(index) {
            Child::Object(o) => Some(o),
            Child::Text(_) => None,
        }
    }

    /// Remove every child
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Iterate over all children in document order
    pub fn iter(&self) -> std::slice::Iter<'_, Child> {
        self.items.iter()
    }

    /// Iterate over the child objects
    pub fn objects(&self) -> impl Iterator<Item = &SchemaObject> {
        self.items.iter().filter_map(Child::as_object)
    }

    /// Iterate mutably over the child objects
    pub fn objects_mut(&mut self) -> impl Iterator<Item = &mut SchemaObject> {
        self.items.iter_mut().filter_map(|c| match c {
            Child::Object(o) => Some(o),
            Child::Text(_) => None,
        })
    }

    /// First child object named `name`
    pub fn find(&self, name: &QName) -> Option<&SchemaObject> {
        self.objects().find(|o| o.element_name() == name)
    }

    /// All child objects named `name`
    pub fn find_all<'a>(&'a self, name: &'a QName) -> impl Iterator<Item = &'a SchemaObject> + 'a {
        self.objects().filter(move |o| o.element_name() == name)
    }

    /// Concatenated text children, None when there are none
    pub fn text(&self) -> Option<String> {
        let mut text: Option<String> = None;
        for t in self.items.iter().filter_map(Child::as_text) {
            text.get_or_insert_with(String::new).push_str(t);
        }
        text
    }

    /// Replace all text children with a single text node after the objects
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.items.retain(|c| matches!(c, Child::Object(_)));
        self.items.push(Child::Text(text.into()));
    }

    /// Remove all text children
    pub fn clear_text(&mut self) {
        self.items.retain(|c| matches!(c, Child::Object(_)));
    }

    /// Number of children
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether there are no children
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a> IntoIterator for &'a ChildList {
    type Item = &'a Child;
    type IntoIter = std::slice::Iter<'a, Child>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Objects that carry attributes
pub trait HasAttributes {
    /// Value of an attribute, modeled or not
    fn attribute(&self, name: &QName) -> Option<&str>;

    /// Set an attribute
    fn set_attribute(&mut self, name: QName, value: String);

    /// Remove an attribute
    fn remove_attribute(&mut self, name: &QName) -> Option<String>;

    /// Whether an attribute is present
    fn has_attribute(&self, name: &QName) -> bool {
        self.attribute(name).is_some()
    }
}

/// Objects that carry an ordered child list
pub trait HasChildren {
    /// The children
    fn children(&self) -> &ChildList;

    /// The children, mutably
    fn children_mut(&mut self) -> &mut ChildList;
}

/// Objects with character content
pub trait HasText: HasChildren {
    /// Concatenated text content
    fn text(&self) -> Option<String> {
        self.children().text()
    }

    /// Replace the text content
    fn set_text(&mut self, text: String) {
        self.children_mut().set_text(text);
    }
}
