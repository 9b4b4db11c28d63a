//! # xmltooling
//!
//! Typed XML object binding for SAML, SOAP and XML-Security messages.
//!
//! Every schema element is represented as a [`SchemaObject`] built by a
//! [`Builder`] registered in a [`BuilderRegistry`] under its element name or
//! XSI type name. A [`Marshaller`] turns an object graph into a DOM subtree,
//! an [`Unmarshaller`] turns DOM back into objects, and a [`ValidatorSuite`]
//! runs domain rules the schema cannot express. [`SecurityConfiguration`]
//! carries the transport security parameters used when messages travel
//! over HTTP.
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use xmltooling::catalog::{self, soap11};
//! use xmltooling::{dom, BuilderRegistry, HasText, Marshaller, Unmarshaller};
//!
//! let registry = Arc::new(BuilderRegistry::new());
//! catalog::register_all(&registry).unwrap();
//!
//! let mut fault_string = registry.build(&soap11::FAULT_STRING).unwrap();
//! fault_string.set_text("Server error".to_string());
//!
//! let element = Marshaller::new().marshal(&fault_string).unwrap();
//! let xml = dom::to_xml_string(&element).unwrap();
//!
//! let parsed = dom::parse_str(&xml).unwrap();
//! let back = Unmarshaller::new(registry).unmarshal(&parsed).unwrap();
//! assert_eq!(back, fault_string);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

// Foundation
pub mod error;
pub mod limits;

// Names and namespaces
pub mod names;
pub mod namespaces;

// DOM boundary
pub mod dom;

// Object model
pub mod descriptor;
pub mod object;
pub mod registry;

// Binding and validation
pub mod marshalling;
pub mod validators;

// Transport security parameters
pub mod security;

// Schema catalogs
pub mod catalog;

// Re-exports for convenience
pub use descriptor::{AttributeSpec, ContentModel, TypeDescriptor};
pub use error::{Error, MarshallingError, Result, UnmarshallingError, ValidationError};
pub use limits::Limits;
pub use marshalling::{Marshaller, MarshallerConfig, Unmarshaller, UnmarshallerConfig};
pub use namespaces::{Namespace, NamespaceContext, QName};
pub use object::{Child, HasAttributes, HasChildren, HasText, SchemaObject};
pub use registry::{Builder, BuilderRegistry};
pub use security::{SecurityConfiguration, SecurityConfigurationBuilder};
pub use validators::{ValidationMode, ValidationRule, ValidatorSuite};

/// Version of the xmltooling library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// XML Schema namespace
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// XML Schema instance namespace
pub const XSI_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema-instance";

/// Conventional prefix for the XML Schema instance namespace
pub const XSI_PREFIX: &str = "xsi";

/// XML namespace
pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";

/// XMLNS namespace
pub const XMLNS_NAMESPACE: &str = "http://www.w3.org/2000/xmlns/";
