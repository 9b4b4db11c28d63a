//! Object graph <-> DOM conversion
//!
//! The [`Marshaller`] writes an object graph as a [`DomElement`] subtree and
//! the [`Unmarshaller`] reads one back. Both hold only immutable
//! configuration and may be shared across threads; neither attaches its
//! output to an enclosing document.
//!
//! [`DomElement`]: crate::dom::DomElement

mod marshaller;
mod unmarshaller;

pub use marshaller::{Marshaller, MarshallerConfig};
pub use unmarshaller::{Unmarshaller, UnmarshallerConfig};

use once_cell::sync::Lazy;

use crate::namespaces::QName;
use crate::{XSI_NAMESPACE, XSI_PREFIX};

/// `xsi:type`
pub static XSI_TYPE: Lazy<QName> = Lazy::new(|| QName::prefixed(XSI_NAMESPACE, "type", XSI_PREFIX));

/// `xsi:nil`
pub static XSI_NIL: Lazy<QName> = Lazy::new(|| QName::prefixed(XSI_NAMESPACE, "nil", XSI_PREFIX));

/// `xsi:schemaLocation`
pub static XSI_SCHEMA_LOCATION: Lazy<QName> =
    Lazy::new(|| QName::prefixed(XSI_NAMESPACE, "schemaLocation", XSI_PREFIX));

/// `xsi:noNamespaceSchemaLocation`
pub static XSI_NO_NAMESPACE_SCHEMA_LOCATION: Lazy<QName> =
    Lazy::new(|| QName::prefixed(XSI_NAMESPACE, "noNamespaceSchemaLocation", XSI_PREFIX));
