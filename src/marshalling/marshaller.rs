//! Object graph to DOM

use tracing::trace;

use crate::descriptor::ContentModel;
use crate::dom::{DomElement, DomNode};
use crate::error::{MarshallingError, Result};
use crate::limits::Limits;
use crate::names::is_valid_ncname;
use crate::namespaces::{Namespace, NamespaceContext, QName};
use crate::object::{Child, HasAttributes, HasChildren, SchemaObject, ValueKind, XmlValue};

use super::{XSI_NIL, XSI_NO_NAMESPACE_SCHEMA_LOCATION, XSI_SCHEMA_LOCATION, XSI_TYPE};

/// Configuration for the marshaller
#[derive(Debug, Clone)]
pub struct MarshallerConfig {
    /// Structural limits applied to the object graph
    limits: Limits,
    /// Whether to write `xmlns:xsi` where XSI attributes need it
    declare_xsi_namespace: bool,
}

impl Default for MarshallerConfig {
    fn default() -> Self {
        Self {
            limits: Limits::default(),
            declare_xsi_namespace: true,
        }
    }
}

impl MarshallerConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the structural limits
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Check whether the XSI namespace is declared where needed
    pub fn declare_xsi_namespace(&self) -> bool {
        self.declare_xsi_namespace
    }

    /// Set the structural limits
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set whether the XSI namespace is declared where needed
    ///
    /// Turn this off when the output is placed inside a document that
    /// already binds the `xsi` prefix.
    pub fn with_declare_xsi_namespace(mut self, declare: bool) -> Self {
        self.declare_xsi_namespace = declare;
        self
    }
}

/// Writes object graphs as DOM subtrees
///
/// Holds no mutable state; one instance may marshal disjoint graphs from
/// several threads at once.
#[derive(Debug, Clone, Default)]
pub struct Marshaller {
    config: MarshallerConfig,
}

impl Marshaller {
    /// Create a marshaller with the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a marshaller with a custom configuration
    pub fn with_config(config: MarshallerConfig) -> Self {
        Self { config }
    }

    /// Get the configuration
    pub fn config(&self) -> &MarshallerConfig {
        &self.config
    }

    /// Marshal an object graph into a detached element
    ///
    /// The output is a snapshot: mutating `object` afterwards does not
    /// change the returned DOM.
    pub fn marshal(&self, object: &SchemaObject) -> Result<DomElement> {
        self.marshal_in_scope(object, &NamespaceContext::new())
    }

    /// Marshal an object graph that will be placed under an element whose
    /// namespace bindings are `scope`
    ///
    /// Prefixes already bound in `scope` are reused rather than redeclared.
    pub fn marshal_in_scope(&self, object: &SchemaObject, scope: &NamespaceContext) -> Result<DomElement> {
        self.marshal_object(object, scope, 1)
    }

    fn marshal_object(&self, object: &SchemaObject, parent_scope: &NamespaceContext, depth: usize) -> Result<DomElement> {
        let limits = &self.config.limits;
        limits.check_depth(depth)?;
        limits.check_attributes(object.attributes().len() + object.unknown_attributes().len())?;
        limits.check_children(object.children().len())?;

        let name = object.element_name();
        trace!("Marshalling element {}", name);
        if !is_valid_ncname(&name.local_name) {
            return Err(MarshallingError::new("invalid element name")
                .with_element(name)
                .into());
        }

        let mut frame = Frame {
            element: DomElement::new(name.clone()),
            scope: parent_scope.clone(),
        };

        for namespace in object.namespaces() {
            frame.bind(namespace.prefix.as_deref(), &namespace.uri, true)?;
        }
        frame.bind_element_name()?;

        self.marshal_xsi_attributes(object, &mut frame)?;
        self.marshal_attributes(object, &mut frame)?;
        self.check_qname_values(object, &frame)?;

        for child in object.children() {
            match child {
                Child::Object(child) => {
                    let element = self.marshal_object(child, &frame.scope, depth + 1)?;
                    frame.element.add_child(element);
                }
                Child::Text(text) => frame.element.children.push(DomNode::Text(text.clone())),
            }
        }

        Ok(frame.element)
    }

    fn marshal_xsi_attributes(&self, object: &SchemaObject, frame: &mut Frame) -> Result<()> {
        let declare = self.config.declare_xsi_namespace;

        if let Some(schema_type) = object.schema_type() {
            trace!("Writing xsi:type {} on {}", schema_type, object.element_name());
            let value = frame.type_value(schema_type)?;
            frame.write_attribute(&XSI_TYPE, &value, declare)?;
        }
        if let Some(location) = object.schema_location() {
            frame.write_attribute(&XSI_SCHEMA_LOCATION, location, declare)?;
        }
        if let Some(location) = object.no_namespace_schema_location() {
            frame.write_attribute(&XSI_NO_NAMESPACE_SCHEMA_LOCATION, location, declare)?;
        }
        if let Some(nil) = object.nil() {
            frame.write_attribute(&XSI_NIL, &nil.to_lexical(), declare)?;
        }
        Ok(())
    }

    fn marshal_attributes(&self, object: &SchemaObject, frame: &mut Frame) -> Result<()> {
        for spec in &object.descriptor().attributes {
            match object.attributes().get_key_value(&spec.name) {
                Some((name, value)) => frame.write_attribute(name, value, true)?,
                None if spec.required => {
                    return Err(MarshallingError::new("required attribute is absent")
                        .with_element(object.element_name())
                        .with_attribute(&spec.name)
                        .into());
                }
                None => {}
            }
        }

        for (name, value) in object.unknown_attributes().iter() {
            frame.write_attribute(name, value, true)?;
        }
        Ok(())
    }

    /// QName-valued attributes and content must resolve against the
    /// bindings in scope on the written element
    fn check_qname_values(&self, object: &SchemaObject, frame: &Frame) -> Result<()> {
        for spec in object.descriptor().attributes.iter().filter(|spec| spec.kind == ValueKind::QName) {
            if let Some(value) = object.attribute(&spec.name) {
                ValueKind::QName.check_lexical(value, &frame.scope).map_err(|reason| {
                    MarshallingError::new(format!("unresolvable namespace prefix: {}", reason))
                        .with_element(object.element_name())
                        .with_attribute(&spec.name)
                })?;
            }
        }

        if object.descriptor().content == ContentModel::Simple(ValueKind::QName) {
            if let Some(text) = object.children().text() {
                ValueKind::QName.check_lexical(&text, &frame.scope).map_err(|reason| {
                    MarshallingError::new(format!("unresolvable namespace prefix: {}", reason))
                        .with_element(object.element_name())
                })?;
            }
        }
        Ok(())
    }
}

/// The element being written together with the bindings in scope on it
struct Frame {
    element: DomElement,
    scope: NamespaceContext,
}

impl Frame {
    /// Bind `prefix` to `uri` on this element unless the binding is
    /// already in scope; `declare` controls whether `xmlns` is written
    fn bind(&mut self, prefix: Option<&str>, uri: &str, declare: bool) -> std::result::Result<(), MarshallingError> {
        let target = Some(uri).filter(|u| !u.is_empty());
        if self.scope.is_bound(prefix, target) {
            return Ok(());
        }
        if prefix.is_some() && target.is_none() {
            return Err(MarshallingError::new("a namespace prefix cannot be bound to the empty namespace")
                .with_element(&self.element.name));
        }
        if let Some(existing) = self
            .element
            .namespaces
            .iter()
            .find(|ns| ns.prefix.as_deref() == prefix)
        {
            return Err(MarshallingError::new(format!(
                "prefix '{}' is already declared for {} on this element",
                prefix.unwrap_or(""),
                existing.uri
            ))
            .with_element(&self.element.name));
        }

        let namespace = Namespace::new(prefix, uri);
        self.scope.declare(&namespace);
        if declare {
            self.element.declare_namespace(namespace);
        }
        Ok(())
    }

    fn bind_element_name(&mut self) -> std::result::Result<(), MarshallingError> {
        let name = self.element.name.clone();
        match (name.namespace(), name.prefix()) {
            (Some(uri), prefix) => self.bind(prefix, uri, true),
            (None, Some(_)) => Err(MarshallingError::new("prefixed element name has no namespace").with_element(&name)),
            (None, None) => self.bind(None, "", true),
        }
    }

    /// The name to write a namespaced attribute under
    fn qualify(&mut self, name: &QName, declare: bool) -> std::result::Result<QName, MarshallingError> {
        let uri = match name.namespace() {
            Some(uri) => uri,
            None => return Ok(QName::local(name.local_name.clone())),
        };
        if let Some(prefix) = name.prefix() {
            if self.scope.is_bound(Some(prefix), Some(uri)) {
                return Ok(name.clone());
            }
        }
        if let Some(prefix) = self.scope.find_prefix(uri) {
            return Ok(name.with_prefix(Some(prefix)));
        }
        match name.prefix() {
            Some(prefix) if self.scope.get_namespace(prefix).is_some() => {
                let prefix = self.fresh_prefix();
                self.bind(Some(prefix.as_str()), uri, true)?;
                Ok(name.with_prefix(Some(prefix.as_str())))
            }
            Some(prefix) => {
                self.bind(Some(prefix), uri, declare)?;
                Ok(name.clone())
            }
            None => Err(MarshallingError::new("unresolvable namespace prefix")
                .with_element(&self.element.name)
                .with_attribute(name)),
        }
    }

    /// First `nsN` prefix not bound in scope
    fn fresh_prefix(&self) -> String {
        (1..)
            .map(|n| format!("ns{}", n))
            .find(|prefix| self.scope.get_namespace(prefix).is_none())
            .unwrap_or_default()
    }

    /// Lexical form of an `xsi:type` value, binding its prefix if needed
    fn type_value(&mut self, type_name: &QName) -> std::result::Result<String, MarshallingError> {
        let element = self.element.name.clone();
        let unresolvable = || {
            MarshallingError::new(format!("unresolvable namespace prefix for type {}", type_name))
                .with_element(&element)
                .with_attribute(&XSI_TYPE)
        };

        let uri = match type_name.namespace() {
            Some(uri) => uri,
            None if self.scope.get_default_namespace().is_none() => return Ok(type_name.local_name.clone()),
            None => return Err(unresolvable()),
        };
        if type_name.prefix().is_none()
            && self.scope.find_prefix(uri).is_none()
            && self.scope.get_default_namespace() == Some(uri)
        {
            return Ok(type_name.local_name.clone());
        }
        self.qualify(type_name, true)
            .map(|name| name.prefixed_name())
            .map_err(|_| unresolvable())
    }

    fn write_attribute(&mut self, name: &QName, value: &str, declare: bool) -> std::result::Result<(), MarshallingError> {
        let name = self.qualify(name, declare)?;
        self.element.set_attribute(name, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::TypeDescriptor;
    use crate::dom::to_xml_string;
    use crate::error::Error;
    use crate::object::{HasAttributes, HasText, ValueKind, XsBoolean};
    use crate::registry::Builder;
    use crate::XSI_NAMESPACE;

    const NS: &str = "urn:test";

    fn status_code() -> Builder {
        Builder::new(
            TypeDescriptor::new(QName::prefixed(NS, "StatusCode", "t"))
                .with_type_name(QName::prefixed(NS, "StatusCodeType", "t"))
                .with_required_attribute(QName::local("Value"), ValueKind::AnyUri)
                .with_attribute(QName::local("Reason"), ValueKind::String)
                .with_attribute(QName::local("Flag"), ValueKind::Boolean),
        )
    }

    #[test]
    fn test_attributes_in_schema_order() {
        let mut obj = status_code().build_object();
        obj.set_attribute(QName::local("Flag"), "true".to_string());
        obj.set_attribute(QName::local("Value"), "urn:ok".to_string());

        let xml = to_xml_string(&Marshaller::new().marshal(&obj).unwrap()).unwrap();
        assert_eq!(xml, r#"<t:StatusCode xmlns:t="urn:test" Value="urn:ok" Flag="true"/>"#);
    }

    #[test]
    fn test_absent_attribute_omitted_empty_written() {
        let mut obj = status_code().build_object();
        obj.set_attribute(QName::local("Value"), "urn:ok".to_string());
        obj.set_attribute(QName::local("Reason"), String::new());

        let element = Marshaller::new().marshal(&obj).unwrap();
        assert_eq!(element.get_attribute("Reason"), Some(""));
        assert_eq!(element.get_attribute("Flag"), None);
    }

    #[test]
    fn test_required_attribute_absent() {
        let obj = status_code().build_object();
        let err = Marshaller::new().marshal(&obj).unwrap_err();
        match err {
            Error::Marshalling(e) => assert_eq!(e.attribute, Some(QName::local("Value"))),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_xsi_type_only_for_non_default_name() {
        let builder = status_code();
        let mut obj = builder.build_object_named(QName::prefixed(NS, "SubStatus", "t"));
        obj.set_attribute(QName::local("Value"), "urn:ok".to_string());

        let xml = to_xml_string(&Marshaller::new().marshal(&obj).unwrap()).unwrap();
        assert_eq!(
            xml,
            r#"<t:SubStatus xmlns:t="urn:test" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="t:StatusCodeType" Value="urn:ok"/>"#
        );

        let mut obj = builder.build_object();
        obj.set_attribute(QName::local("Value"), "urn:ok".to_string());
        let element = Marshaller::new().marshal(&obj).unwrap();
        assert!(element
            .get_attribute_qname(&QName::namespaced(XSI_NAMESPACE, "type"))
            .is_none());
    }

    #[test]
    fn test_xsi_type_in_default_namespace() {
        let builder = Builder::new(
            TypeDescriptor::new(QName::namespaced("N", "Thing"))
                .with_type_name(QName::namespaced("N", "ThingType")),
        );
        let obj = builder.build_object_named(QName::namespaced("N", "Other"));
        let element = Marshaller::new().marshal(&obj).unwrap();
        assert_eq!(
            element.get_attribute_qname(&XSI_TYPE),
            Some("ThingType")
        );
    }

    #[test]
    fn test_unresolvable_type_prefix() {
        let builder = Builder::new(
            TypeDescriptor::new(QName::namespaced("N", "Thing"))
                .with_type_name(QName::namespaced("urn:elsewhere", "ThingType")),
        );
        let obj = builder.build_object_named(QName::namespaced("N", "Other"));
        let err = Marshaller::new().marshal(&obj).unwrap_err();
        assert!(matches!(err, Error::Marshalling(ref e) if e.message.contains("unresolvable")));
    }

    #[test]
    fn test_unresolvable_qname_content() {
        let builder = Builder::new(
            TypeDescriptor::new(QName::local("code")).with_content(ContentModel::Simple(ValueKind::QName)),
        );
        let mut obj = builder.build_object();
        obj.set_text("s:Server".to_string());

        let err = Marshaller::new().marshal(&obj).unwrap_err();
        assert!(matches!(err, Error::Marshalling(ref e) if e.message.contains("unresolvable namespace prefix")));

        obj.declare_namespace(Namespace::new(Some("s"), "urn:s"));
        let xml = to_xml_string(&Marshaller::new().marshal(&obj).unwrap()).unwrap();
        assert_eq!(xml, r#"<code xmlns:s="urn:s">s:Server</code>"#);

        let mut scope = NamespaceContext::new();
        scope.add_prefix("s", "urn:s");
        let mut bare = builder.build_object();
        bare.set_text("s:Server".to_string());
        assert!(Marshaller::new().marshal_in_scope(&bare, &scope).is_ok());
    }

    #[test]
    fn test_unresolvable_qname_attribute() {
        let builder = Builder::new(
            TypeDescriptor::new(QName::local("ref")).with_attribute(QName::local("Target"), ValueKind::QName),
        );
        let mut obj = builder.build_object();
        obj.set_attribute(QName::local("Target"), "q:thing".to_string());

        match Marshaller::new().marshal(&obj).unwrap_err() {
            Error::Marshalling(e) => {
                assert!(e.message.starts_with("unresolvable namespace prefix"));
                assert_eq!(e.element, Some(QName::local("ref")));
                assert_eq!(e.attribute, Some(QName::local("Target")));
            }
            other => panic!("unexpected error: {}", other),
        }

        obj.set_attribute(QName::local("Target"), "thing".to_string());
        assert!(Marshaller::new().marshal(&obj).is_ok());
    }

    #[test]
    fn test_type_prefix_collision_gets_fresh_prefix() {
        let builder = Builder::new(
            TypeDescriptor::new(QName::prefixed(NS, "Thing", "t"))
                .with_type_name(QName::prefixed(NS, "ThingType", "t")),
        );
        let obj = builder.build_object_named(QName::prefixed("urn:other", "Other", "t"));

        let xml = to_xml_string(&Marshaller::new().marshal(&obj).unwrap()).unwrap();
        assert_eq!(
            xml,
            concat!(
                r#"<t:Other xmlns:t="urn:other" xmlns:ns1="urn:test" "#,
                r#"xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="ns1:ThingType"/>"#
            )
        );
    }

    #[test]
    fn test_attribute_prefix_collision_gets_fresh_prefix() {
        let mut obj = status_code().build_object();
        obj.set_attribute(QName::local("Value"), "urn:ok".to_string());
        obj.set_attribute(QName::prefixed("urn:ext", "extra", "t"), "1".to_string());

        let xml = to_xml_string(&Marshaller::new().marshal(&obj).unwrap()).unwrap();
        assert_eq!(
            xml,
            r#"<t:StatusCode xmlns:t="urn:test" xmlns:ns1="urn:ext" Value="urn:ok" ns1:extra="1"/>"#
        );
    }

    #[test]
    fn test_conflicting_prefix_on_element() {
        let mut obj = status_code().build_object();
        obj.set_attribute(QName::local("Value"), "urn:ok".to_string());
        obj.declare_namespace(Namespace::new(Some("t"), "urn:other"));

        assert!(matches!(Marshaller::new().marshal(&obj), Err(Error::Marshalling(_))));
    }

    #[test]
    fn test_namespaced_attribute_needs_prefix() {
        let mut obj = status_code().build_object();
        obj.set_attribute(QName::local("Value"), "urn:ok".to_string());
        obj.set_attribute(QName::namespaced("urn:ext", "extra"), "1".to_string());
        assert!(Marshaller::new().marshal(&obj).is_err());

        obj.set_attribute(QName::prefixed("urn:ext", "extra", "ext"), "1".to_string());
        let xml = to_xml_string(&Marshaller::new().marshal(&obj).unwrap()).unwrap();
        assert_eq!(
            xml,
            r#"<t:StatusCode xmlns:t="urn:test" xmlns:ext="urn:ext" Value="urn:ok" ext:extra="1"/>"#
        );
    }

    #[test]
    fn test_children_reuse_parent_bindings() {
        let builder = status_code();
        let mut parent = builder.build_object();
        parent.set_attribute(QName::local("Value"), "urn:outer".to_string());
        let mut child = builder.build_object();
        child.set_attribute(QName::local("Value"), "urn:inner".to_string());
        parent.add_child(child);

        let xml = to_xml_string(&Marshaller::new().marshal(&parent).unwrap()).unwrap();
        assert_eq!(
            xml,
            r#"<t:StatusCode xmlns:t="urn:test" Value="urn:outer"><t:StatusCode Value="urn:inner"/></t:StatusCode>"#
        );
    }

    #[test]
    fn test_xsi_attributes() {
        let mut obj = Builder::new(TypeDescriptor::new(QName::local("Empty"))).build_object();
        obj.set_nil(Some(XsBoolean::numeric(true)));
        obj.set_schema_location(Some("urn:a a.xsd".to_string()));

        let xml = to_xml_string(&Marshaller::new().marshal(&obj).unwrap()).unwrap();
        assert_eq!(
            xml,
            r#"<Empty xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="urn:a a.xsd" xsi:nil="1"/>"#
        );

        let marshaller = Marshaller::with_config(MarshallerConfig::new().with_declare_xsi_namespace(false));
        let element = marshaller.marshal(&obj).unwrap();
        assert!(element.namespaces.is_empty());
        assert_eq!(element.get_attribute_qname(&XSI_NIL), Some("1"));
    }

    #[test]
    fn test_xsi_type_written_first() {
        let builder = Builder::new(
            TypeDescriptor::new(QName::local("Thing")).with_type_name(QName::local("ThingType")),
        );
        let mut obj = builder.build_object_named(QName::local("Other"));
        obj.set_nil(Some(XsBoolean::new(false)));
        obj.set_no_namespace_schema_location(Some("t.xsd".to_string()));

        let xml = to_xml_string(&Marshaller::new().marshal(&obj).unwrap()).unwrap();
        assert_eq!(
            xml,
            concat!(
                r#"<Other xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:type="ThingType" "#,
                r#"xsi:noNamespaceSchemaLocation="t.xsd" xsi:nil="false"/>"#
            )
        );
    }

    #[test]
    fn test_depth_limit() {
        let builder = Builder::new(TypeDescriptor::new(QName::local("n")));
        let mut root = builder.build_object();
        let mut middle = builder.build_object();
        middle.add_child(builder.build_object());
        root.add_child(middle);

        let limits = Limits {
            max_depth: 2,
            ..Limits::default()
        };
        let marshaller = Marshaller::with_config(MarshallerConfig::new().with_limits(limits));
        assert!(matches!(marshaller.marshal(&root), Err(Error::LimitExceeded(_))));
        assert!(Marshaller::new().marshal(&root).is_ok());
    }

    #[test]
    fn test_output_is_snapshot() {
        let mut obj = status_code().build_object();
        obj.set_attribute(QName::local("Value"), "urn:before".to_string());
        let element = Marshaller::new().marshal(&obj).unwrap();

        obj.set_attribute(QName::local("Value"), "urn:after".to_string());
        assert_eq!(element.get_attribute("Value"), Some("urn:before"));
    }
}
