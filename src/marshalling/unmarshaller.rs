//! DOM to object graph

use std::sync::Arc;
use tracing::{debug, trace};

use crate::descriptor::ContentModel;
use crate::dom::{DomElement, DomNode};
use crate::error::{Result, UnmarshallingError};
use crate::limits::Limits;
use crate::namespaces::{NamespaceContext, QName};
use crate::object::{HasAttributes, HasChildren, SchemaObject, XmlValue, XsBoolean};
use crate::registry::{Builder, BuilderRegistry};
use crate::XSI_NAMESPACE;

use super::XSI_TYPE;

/// Configuration for the unmarshaller
#[derive(Debug, Clone)]
pub struct UnmarshallerConfig {
    /// Structural limits applied to inbound DOM
    limits: Limits,
    /// Whether unregistered elements are kept via the fallback builder
    preserve_unknown: bool,
    /// Whether whitespace-only text in element-only content is dropped
    ignore_whitespace: bool,
}

impl Default for UnmarshallerConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            preserve_unknown: true,
            ignore_whitespace: true,
        }
    }
}

impl UnmarshallerConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the structural limits
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Check whether unknown elements are preserved
    pub fn preserve_unknown(&self) -> bool {
        self.preserve_unknown
    }

    /// Check whether insignificant whitespace is dropped
    pub fn ignore_whitespace(&self) -> bool {
        self.ignore_whitespace
    }

    /// Set the structural limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set whether unknown elements are preserved
    ///
    /// Preservation also needs a registry with a fallback builder.
    pub fn with_preserve_unknown(mut self, preserve: bool) -> Self {
        self.preserve_unknown = preserve;
        self
    }

    /// Set whether insignificant whitespace is dropped
    pub fn with_ignore_whitespace(mut self, ignore: bool) -> Self {
        self.ignore_whitespace = ignore;
        self
    }
}

/// Reads DOM subtrees into object graphs
///
/// Builders are looked up in the registry given at construction; the
/// unmarshaller itself holds no mutable state.
#[derive(Debug, Clone)]
pub struct Unmarshaller {
    registry: Arc<BuilderRegistry>,
    config: UnmarshallerConfig,
}

impl Unmarshaller {
    /// Create an unmarshaller with the default configuration
    pub fn new(registry: Arc<BuilderRegistry>) -> Self {
        Self::with_config(registry, UnmarshallerConfig::default())
    }

    /// Create an unmarshaller with a custom configuration
    pub fn with_config(registry: Arc<BuilderRegistry>, config: UnmarshallerConfig) -> Self {
        Self { registry, config }
    }

    /// Get the registry builders are taken from
    pub fn registry(&self) -> &Arc<BuilderRegistry> {
        &self.registry
    }

    /// Get the configuration
    pub fn config(&self) -> &UnmarshallerConfig {
        &self.config
    }

    /// Unmarshal a detached element
    pub fn unmarshal(&self, element: &DomElement) -> Result<SchemaObject> {
        self.unmarshal_in_scope(element, &NamespaceContext::new())
    }

    /// Unmarshal an element taken from a document in which `scope` is the
    /// set of bindings inherited from its ancestors
    pub fn unmarshal_in_scope(&self, element: &DomElement, scope: &NamespaceContext) -> Result<SchemaObject> {
        self.unmarshal_element(element, scope, 1)
    }

    fn unmarshal_element(&self, element: &DomElement, parent_scope: &NamespaceContext, depth: usize) -> Result<SchemaObject> {
        let limits = &self.config.limits;
        limits.check_depth(depth)?;
        limits.check_attributes(element.attributes.len())?;
        limits.check_children(element.children.len())?;

        trace!("Unmarshalling element {}", element.name);

        let mut scope = parent_scope.clone();
        for namespace in &element.namespaces {
            scope.declare(namespace);
        }

        let schema_type = match element.get_attribute_qname(&XSI_TYPE) {
            Some(value) => Some(scope.resolve(value.trim()).map_err(|e| {
                UnmarshallingError::new(format!("unresolvable xsi:type: {}", e))
                    .with_element(&element.name)
                    .with_value(value)
            })?),
            None => None,
        };

        let builder = self.select_builder(&element.name, schema_type.as_ref())?;
        let mut object = builder.build_object_named(element.name.clone());
        object.set_schema_type(schema_type);

        for namespace in &element.namespaces {
            object.declare_namespace(namespace.clone());
        }

        self.unmarshal_attributes(element, &scope, &mut object)?;

        let content = object.descriptor().content;
        for node in &element.children {
            match node {
                DomNode::Element(child) => {
                    let child = self.unmarshal_element(child, &scope, depth + 1)?;
                    object.add_child(child);
                }
                DomNode::Text(text) => {
                    if self.config.ignore_whitespace && content.ignores_whitespace() && text.trim().is_empty() {
                        continue;
                    }
                    object.children_mut().push_text(text.as_str());
                }
            }
        }

        if let ContentModel::Simple(kind) = content {
            if let Some(text) = object.children().text() {
                kind.check_lexical(&text, &scope).map_err(|reason| {
                    UnmarshallingError::new(format!("malformed {} content: {}", kind, reason))
                        .with_element(&element.name)
                        .with_value(text.as_str())
                })?;
            }
        }

        Ok(object)
    }

    /// Builder lookup: the `xsi:type` wins over the element name, and the
    /// fallback is used only when neither is registered
    fn select_builder(&self, element_name: &QName, schema_type: Option<&QName>) -> Result<Arc<Builder>> {
        if let Some(schema_type) = schema_type {
            if let Some(builder) = self.registry.lookup(schema_type) {
                return Ok(builder);
            }
            debug!("No builder for xsi:type {}, trying element name {}", schema_type, element_name);
        }

        if let Some(builder) = self.registry.lookup(element_name) {
            return Ok(builder);
        }

        match self.registry.fallback() {
            Some(builder) if self.config.preserve_unknown => {
                debug!("Preserving unknown element {} as generic content", element_name);
                Ok(builder)
            }
            _ => Err(UnmarshallingError::new("no builder registered and no fallback configured")
                .with_element(element_name)
                .into()),
        }
    }

    fn unmarshal_attributes(&self, element: &DomElement, scope: &NamespaceContext, object: &mut SchemaObject) -> Result<()> {
        for (name, value) in &element.attributes {
            if name.namespace() == Some(XSI_NAMESPACE) {
                match name.local_name.as_str() {
                    "type" => continue,
                    "nil" => {
                        let nil = XsBoolean::from_lexical(value).map_err(|reason| {
                            UnmarshallingError::new(format!("malformed xsi:nil: {}", reason))
                                .with_element(&element.name)
                                .with_value(value.as_str())
                        })?;
                        object.set_nil(Some(nil));
                        continue;
                    }
                    "schemaLocation" => {
                        object.set_schema_location(Some(value.clone()));
                        continue;
                    }
                    "noNamespaceSchemaLocation" => {
                        object.set_no_namespace_schema_location(Some(value.clone()));
                        continue;
                    }
                    _ => {}
                }
            }

            if let Some(spec) = object.descriptor().attribute_spec(name) {
                spec.kind.check_lexical(value, scope).map_err(|reason| {
                    UnmarshallingError::new(format!("malformed {} attribute {}: {}", spec.kind, name, reason))
                        .with_element(&element.name)
                        .with_value(value.as_str())
                })?;
            }
            object.set_attribute(name.clone(), value.clone());
        }
        Ok(())
    }
}
