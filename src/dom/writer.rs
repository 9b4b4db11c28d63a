//! quick-xml-backed serialization of a [`DomElement`] subtree

use crate::error::{Error, Result};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::io::Cursor;

use super::{DomElement, DomNode};

/// Serialize an element subtree to a string, without an XML declaration
pub fn to_xml_string(element: &DomElement) -> Result<String> {
    let mut writer = Writer::new(Cursor::new(Vec::new()));
    write_element(&mut writer, element)?;

    String::from_utf8(writer.into_inner().into_inner())
        .map_err(|e| Error::Xml(format!("Serialized XML is not UTF-8: {}", e)))
}

fn write_element<W: std::io::Write>(writer: &mut Writer<W>, element: &DomElement) -> Result<()> {
    let tag = element.name.prefixed_name();
    let mut start = BytesStart::new(tag.as_str());

    for ns in &element.namespaces {
        let key = match ns.prefix {
            Some(ref prefix) => format!("xmlns:{}", prefix),
            None => "xmlns".to_string(),
        };
        start.push_attribute((key.as_str(), ns.uri.as_str()));
    }

    for (name, value) in &element.attributes {
        let key = name.prefixed_name();
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(xml_error);
    }

    writer.write_event(Event::Start(start)).map_err(xml_error)?;
    for child in &element.children {
        match child {
            DomNode::Element(e) => write_element(writer, e)?,
            DomNode::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(xml_error)?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(tag.as_str())))
        .map_err(xml_error)
}

fn xml_error(e: quick_xml::Error) -> Error {
    Error::Xml(format!("Error writing XML: {}", e))
}
