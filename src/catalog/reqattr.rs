//! SAML requested attributes protocol extension

use once_cell::sync::Lazy;

use crate::descriptor::{ContentModel, TypeDescriptor};
use crate::error::Result;
use crate::namespaces::QName;
use crate::object::ValueKind;
use crate::registry::BuilderRegistry;
use crate::validators::{LexicalAttribute, RequiredAttribute, ValidChildren, ValidatorSuite};

/// Requested attributes extension namespace
pub const NAMESPACE: &str = "urn:oasis:names:tc:SAML:protocol:ext:req-attr";
/// Conventional prefix
pub const PREFIX: &str = "req-attr";

/// SAML 2.0 metadata namespace
pub const MD_NAMESPACE: &str = "urn:oasis:names:tc:SAML:2.0:metadata";
/// Conventional metadata prefix
pub const MD_PREFIX: &str = "md";

/// SAML 2.0 assertion namespace
pub const SAML_NAMESPACE: &str = "urn:oasis:names:tc:SAML:2.0:assertion";
/// Conventional assertion prefix
pub const SAML_PREFIX: &str = "saml";

/// `req-attr:RequestedAttributes`
pub static REQUESTED_ATTRIBUTES: Lazy<QName> =
    Lazy::new(|| QName::prefixed(NAMESPACE, "RequestedAttributes", PREFIX));
/// `req-attr:RequestedAttributesType`
pub static REQUESTED_ATTRIBUTES_TYPE: Lazy<QName> =
    Lazy::new(|| QName::prefixed(NAMESPACE, "RequestedAttributesType", PREFIX));
/// `md:RequestedAttribute`
pub static REQUESTED_ATTRIBUTE: Lazy<QName> =
    Lazy::new(|| QName::prefixed(MD_NAMESPACE, "RequestedAttribute", MD_PREFIX));
/// `md:RequestedAttributeType`
pub static REQUESTED_ATTRIBUTE_TYPE: Lazy<QName> =
    Lazy::new(|| QName::prefixed(MD_NAMESPACE, "RequestedAttributeType", MD_PREFIX));
/// `saml:AttributeValue`
pub static ATTRIBUTE_VALUE: Lazy<QName> =
    Lazy::new(|| QName::prefixed(SAML_NAMESPACE, "AttributeValue", SAML_PREFIX));

/// `Name` attribute
pub static NAME: Lazy<QName> = Lazy::new(|| QName::local("Name"));
/// `NameFormat` attribute
pub static NAME_FORMAT: Lazy<QName> = Lazy::new(|| QName::local("NameFormat"));
/// `FriendlyName` attribute
pub static FRIENDLY_NAME: Lazy<QName> = Lazy::new(|| QName::local("FriendlyName"));
/// `isRequired` attribute
pub static IS_REQUIRED: Lazy<QName> = Lazy::new(|| QName::local("isRequired"));

/// Type descriptors of this catalog
pub fn descriptors() -> Vec<TypeDescriptor> {
    vec![
        TypeDescriptor::new(REQUESTED_ATTRIBUTES.clone()).with_type_name(REQUESTED_ATTRIBUTES_TYPE.clone()),
        TypeDescriptor::new(REQUESTED_ATTRIBUTE.clone())
            .with_type_name(REQUESTED_ATTRIBUTE_TYPE.clone())
            .with_required_attribute(NAME.clone(), ValueKind::String)
            .with_attribute(NAME_FORMAT.clone(), ValueKind::AnyUri)
            .with_attribute(FRIENDLY_NAME.clone(), ValueKind::String)
            .with_attribute(IS_REQUIRED.clone(), ValueKind::Boolean),
        TypeDescriptor::new(ATTRIBUTE_VALUE.clone()).with_content(ContentModel::Mixed),
    ]
}

/// Register the builders of this catalog
pub fn register(registry: &BuilderRegistry) -> Result<()> {
    super::register_descriptors(registry, descriptors())
}

/// Register the validators of this catalog
pub fn register_validators(suite: &mut ValidatorSuite) {
    suite.register(REQUESTED_ATTRIBUTES.clone(), ValidChildren);
    suite.register(REQUESTED_ATTRIBUTE.clone(), RequiredAttribute::new(NAME.clone()));
    suite.register(
        REQUESTED_ATTRIBUTE.clone(),
        LexicalAttribute::new(NAME_FORMAT.clone(), ValueKind::AnyUri),
    );
    suite.register(REQUESTED_ATTRIBUTE.clone(), ValidChildren);
}
