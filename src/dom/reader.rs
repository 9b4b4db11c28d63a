//! roxmltree-backed conversion from XML text to [`DomElement`]

use crate::error::{Error, Result};
use crate::namespaces::{Namespace, QName};
use crate::XML_NAMESPACE;

use super::DomElement;

/// Parse an XML document and return its document element
///
/// Comments and processing instructions are dropped; text and CDATA become
/// text nodes. Namespace declarations are kept on the element that makes
/// them.
pub fn parse_str(xml: &str) -> Result<DomElement> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| Error::Xml(format!("Error parsing XML: {}", e)))?;

    Ok(convert_element(doc.root_element(), None))
}

fn convert_element(node: roxmltree::Node<'_, '_>, parent: Option<roxmltree::Node<'_, '_>>) -> DomElement {
    let tag = node.tag_name();
    let prefix = tag.namespace().and_then(|ns| node.lookup_prefix(ns));
    let mut element = DomElement::new(QName::new(tag.namespace(), tag.name(), prefix));

    for ns in node.namespaces() {
        if ns.uri() == XML_NAMESPACE {
            continue;
        }
        let inherited = parent.map_or(false, |p| {
            p.namespaces()
                .any(|pns| pns.name() == ns.name() && pns.uri() == ns.uri())
        });
        if !inherited {
            element.declare_namespace(Namespace::new(ns.name(), ns.uri()));
        }
    }

    for attr in node.attributes() {
        let prefix = attr.namespace().and_then(|ns| node.lookup_prefix(ns));
        element.set_attribute(
            QName::new(attr.namespace(), attr.name(), prefix),
            attr.value(),
        );
    }

    for child in node.children() {
        if child.is_element() {
            element.add_child(convert_element(child, Some(node)));
        } else if child.is_text() {
            if let Some(text) = child.text() {
                element.append_text(text);
            }
        }
    }

    element
}
