//! SOAP 1.1 envelope and fault elements
//!
//! Fault children are unqualified, as the SOAP 1.1 schema declares them.

use once_cell::sync::Lazy;

use crate::descriptor::{ContentModel, TypeDescriptor};
use crate::error::Result;
use crate::namespaces::{Namespace, QName};
use crate::object::{HasText, SchemaObject, ValueKind};
use crate::registry::BuilderRegistry;
use crate::validators::{ChildCount, RequiredText, ValidChildren, ValidatorSuite};

/// SOAP 1.1 envelope namespace
pub const NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Conventional prefix
pub const PREFIX: &str = "soap11";

/// `soap11:Envelope`
pub static ENVELOPE: Lazy<QName> = Lazy::new(|| QName::prefixed(NAMESPACE, "Envelope", PREFIX));
/// `soap11:Header`
pub static HEADER: Lazy<QName> = Lazy::new(|| QName::prefixed(NAMESPACE, "Header", PREFIX));
/// `soap11:Body`
pub static BODY: Lazy<QName> = Lazy::new(|| QName::prefixed(NAMESPACE, "Body", PREFIX));
/// `soap11:Fault`
pub static FAULT: Lazy<QName> = Lazy::new(|| QName::prefixed(NAMESPACE, "Fault", PREFIX));
/// `faultcode`
pub static FAULT_CODE: Lazy<QName> = Lazy::new(|| QName::local("faultcode"));
/// `faultstring`
pub static FAULT_STRING: Lazy<QName> = Lazy::new(|| QName::local("faultstring"));
/// `faultactor`
pub static FAULT_ACTOR: Lazy<QName> = Lazy::new(|| QName::local("faultactor"));
/// `detail`
pub static DETAIL: Lazy<QName> = Lazy::new(|| QName::local("detail"));

/// Fault code: the message was incorrectly formed or lacked information
pub static CLIENT: Lazy<QName> = Lazy::new(|| QName::prefixed(NAMESPACE, "Client", PREFIX));
/// Fault code: the message could not be processed for reasons not
/// attributable to its contents
pub static SERVER: Lazy<QName> = Lazy::new(|| QName::prefixed(NAMESPACE, "Server", PREFIX));
/// Fault code: an invalid namespace was found for the envelope
pub static VERSION_MISMATCH: Lazy<QName> = Lazy::new(|| QName::prefixed(NAMESPACE, "VersionMismatch", PREFIX));
/// Fault code: a mandatory header was not understood
pub static MUST_UNDERSTAND: Lazy<QName> = Lazy::new(|| QName::prefixed(NAMESPACE, "MustUnderstand", PREFIX));

/// Type descriptors of this catalog
pub fn descriptors() -> Vec<TypeDescriptor> {
    vec![
        TypeDescriptor::new(ENVELOPE.clone()),
        TypeDescriptor::new(HEADER.clone()),
        TypeDescriptor::new(BODY.clone()),
        TypeDescriptor::new(FAULT.clone()),
        TypeDescriptor::new(FAULT_CODE.clone()).with_content(ContentModel::Simple(ValueKind::QName)),
        TypeDescriptor::new(FAULT_STRING.clone()).with_content(ContentModel::Simple(ValueKind::String)),
        TypeDescriptor::new(FAULT_ACTOR.clone()).with_content(ContentModel::Simple(ValueKind::AnyUri)),
        TypeDescriptor::new(DETAIL.clone()),
    ]
}

/// Register the builders of this catalog
pub fn register(registry: &BuilderRegistry) -> Result<()> {
    super::register_descriptors(registry, descriptors())
}

/// Register the validators of this catalog
pub fn register_validators(suite: &mut ValidatorSuite) {
    suite.register(ENVELOPE.clone(), ChildCount::optional(HEADER.clone()));
    suite.register(ENVELOPE.clone(), ChildCount::required(BODY.clone()));
    suite.register(ENVELOPE.clone(), ValidChildren);
    suite.register(BODY.clone(), ValidChildren);

    suite.register(FAULT.clone(), ChildCount::required(FAULT_CODE.clone()));
    suite.register(FAULT.clone(), ChildCount::required(FAULT_STRING.clone()));
    suite.register(FAULT.clone(), ChildCount::optional(FAULT_ACTOR.clone()));
    suite.register(FAULT.clone(), ChildCount::optional(DETAIL.clone()));
    suite.register(FAULT.clone(), ValidChildren);

    suite.register(FAULT_CODE.clone(), RequiredText::new().with_message("faultcode must not be empty"));
    suite.register(FAULT_STRING.clone(), RequiredText::new().with_message("faultstring must not be empty"));
}

/// Build a fault with the given code and message
///
/// The code's namespace is declared on the `faultcode` element so its
/// QName content resolves wherever the fault is placed. Returns None when
/// this catalog is not registered.
pub fn build_fault(registry: &BuilderRegistry, code: &QName, message: &str) -> Option<SchemaObject> {
    let mut fault = registry.build(&FAULT)?;

    let mut fault_code = registry.build(&FAULT_CODE)?;
    let content = match (code.namespace(), code.prefix()) {
        (Some(uri), Some(prefix)) => {
            fault_code.declare_namespace(Namespace::new(Some(prefix), uri));
            code.prefixed_name()
        }
        (Some(uri), None) => {
            fault_code.declare_namespace(Namespace::new(Some(PREFIX), uri));
            format!("{}:{}", PREFIX, code.local_name)
        }
        (None, _) => code.local_name.clone(),
    };
    fault_code.set_text(content);
    fault.add_child(fault_code);

    let mut fault_string = registry.build(&FAULT_STRING)?;
    fault_string.set_text(message.to_string());
    fault.add_child(fault_string);

    Some(fault)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::to_xml_string;
    use crate::marshalling::Marshaller;

    #[test]
    fn test_build_fault() {
        let registry = BuilderRegistry::new();
        register(&registry).unwrap();

        let fault = build_fault(&registry, &SERVER, "Server error").unwrap();
        let xml = to_xml_string(&Marshaller::new().marshal(&fault).unwrap()).unwrap();
        assert_eq!(
            xml,
            concat!(
                r#"<soap11:Fault xmlns:soap11="http://schemas.xmlsoap.org/soap/envelope/">"#,
                r#"<faultcode>soap11:Server</faultcode>"#,
                r#"<faultstring>Server error</faultstring>"#,
                r#"</soap11:Fault>"#
            )
        );
    }

    #[test]
    fn test_fault_validators() {
        let registry = BuilderRegistry::new();
        register(&registry).unwrap();
        let mut suite = ValidatorSuite::new();
        register_validators(&mut suite);

        let fault = build_fault(&registry, &CLIENT, "bad request").unwrap();
        assert!(suite.validate(&fault).is_ok());

        let empty_fault = registry.build(&FAULT).unwrap();
        let err = suite.validate(&empty_fault).unwrap_err();
        assert!(err.message.contains("faultcode"), "{}", err.message);

        let blank = build_fault(&registry, &CLIENT, "  ").unwrap();
        let err = suite.validate(&blank).unwrap_err();
        assert_eq!(err.element, *FAULT_STRING);
    }
}
