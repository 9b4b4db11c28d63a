//! SAML 2.0 protocol status elements
//!
//! Builders come from a bundled JSON descriptor table.

use once_cell::sync::Lazy;

use crate::descriptor::TypeDescriptor;
use crate::error::Result;
use crate::namespaces::QName;
use crate::registry::BuilderRegistry;
use crate::validators::{ChildCount, RequiredAttribute, ValidChildren, ValidatorSuite};

/// SAML 2.0 protocol namespace
pub const NAMESPACE: &str = "urn:oasis:names:tc:SAML:2.0:protocol";
/// Conventional prefix
pub const PREFIX: &str = "samlp";

const TABLE: &str = include_str!("tables/saml2p.json");

/// `samlp:Status`
pub static STATUS: Lazy<QName> = Lazy::new(|| QName::prefixed(NAMESPACE, "Status", PREFIX));
/// `samlp:StatusType`
pub static STATUS_TYPE: Lazy<QName> = Lazy::new(|| QName::prefixed(NAMESPACE, "StatusType", PREFIX));
/// `samlp:StatusCode`
pub static STATUS_CODE: Lazy<QName> = Lazy::new(|| QName::prefixed(NAMESPACE, "StatusCode", PREFIX));
/// `samlp:StatusCodeType`
pub static STATUS_CODE_TYPE: Lazy<QName> = Lazy::new(|| QName::prefixed(NAMESPACE, "StatusCodeType", PREFIX));
/// `samlp:StatusMessage`
pub static STATUS_MESSAGE: Lazy<QName> = Lazy::new(|| QName::prefixed(NAMESPACE, "StatusMessage", PREFIX));
/// `samlp:StatusDetail`
pub static STATUS_DETAIL: Lazy<QName> = Lazy::new(|| QName::prefixed(NAMESPACE, "StatusDetail", PREFIX));

/// `Value` attribute of a status code
pub static VALUE: Lazy<QName> = Lazy::new(|| QName::local("Value"));

/// Top-level status code: the request succeeded
pub const SUCCESS: &str = "urn:oasis:names:tc:SAML:2.0:status:Success";
/// Top-level status code: the requester made an error
pub const REQUESTER: &str = "urn:oasis:names:tc:SAML:2.0:status:Requester";
/// Top-level status code: the responder made an error
pub const RESPONDER: &str = "urn:oasis:names:tc:SAML:2.0:status:Responder";

/// Type descriptors of this catalog
pub fn descriptors() -> Result<Vec<TypeDescriptor>> {
    super::load_descriptors(TABLE)
}

/// Register the builders of this catalog
pub fn register(registry: &BuilderRegistry) -> Result<()> {
    super::register_descriptors(registry, descriptors()?)
}

/// Register the validators of this catalog
pub fn register_validators(suite: &mut ValidatorSuite) {
    suite.register(STATUS.clone(), ChildCount::required(STATUS_CODE.clone()));
    suite.register(STATUS.clone(), ChildCount::optional(STATUS_MESSAGE.clone()));
    suite.register(STATUS.clone(), ChildCount::optional(STATUS_DETAIL.clone()));
    suite.register(STATUS.clone(), ValidChildren);

    suite.register(
        STATUS_CODE.clone(),
        RequiredAttribute::new(VALUE.clone()).with_message("Value attribute is required"),
    );
    suite.register(STATUS_CODE.clone(), ChildCount::optional(STATUS_CODE.clone()));
    suite.register(STATUS_CODE.clone(), ValidChildren);
}
