//! XML Encryption key agreement elements

use once_cell::sync::Lazy;

use crate::descriptor::{ContentModel, TypeDescriptor};
use crate::error::Result;
use crate::namespaces::QName;
use crate::object::ValueKind;
use crate::registry::BuilderRegistry;
use crate::validators::{ChildCount, RequiredAttribute, ValidChildren, ValidatorSuite};

/// XML Encryption namespace
pub const NAMESPACE: &str = "http://www.w3.org/2001/04/xmlenc#";
/// Conventional prefix
pub const PREFIX: &str = "xenc";

/// XML Signature namespace
pub const DSIG_NAMESPACE: &str = "http://www.w3.org/2000/09/xmldsig#";
/// Conventional XML Signature prefix
pub const DSIG_PREFIX: &str = "ds";

/// `xenc:AgreementMethod`
pub static AGREEMENT_METHOD: Lazy<QName> = Lazy::new(|| QName::prefixed(NAMESPACE, "AgreementMethod", PREFIX));
/// `xenc:AgreementMethodType`
pub static AGREEMENT_METHOD_TYPE: Lazy<QName> =
    Lazy::new(|| QName::prefixed(NAMESPACE, "AgreementMethodType", PREFIX));
/// `xenc:KA-Nonce`
pub static KA_NONCE: Lazy<QName> = Lazy::new(|| QName::prefixed(NAMESPACE, "KA-Nonce", PREFIX));
/// `xenc:OriginatorKeyInfo`
pub static ORIGINATOR_KEY_INFO: Lazy<QName> =
    Lazy::new(|| QName::prefixed(NAMESPACE, "OriginatorKeyInfo", PREFIX));
/// `xenc:RecipientKeyInfo`
pub static RECIPIENT_KEY_INFO: Lazy<QName> = Lazy::new(|| QName::prefixed(NAMESPACE, "RecipientKeyInfo", PREFIX));
/// `ds:KeyInfo`
pub static KEY_INFO: Lazy<QName> = Lazy::new(|| QName::prefixed(DSIG_NAMESPACE, "KeyInfo", DSIG_PREFIX));
/// `ds:KeyInfoType`, the type shared by every key info element
pub static KEY_INFO_TYPE: Lazy<QName> = Lazy::new(|| QName::prefixed(DSIG_NAMESPACE, "KeyInfoType", DSIG_PREFIX));

/// `Algorithm` attribute
pub static ALGORITHM: Lazy<QName> = Lazy::new(|| QName::local("Algorithm"));
/// `Id` attribute
pub static ID: Lazy<QName> = Lazy::new(|| QName::local("Id"));

/// Type descriptors of this catalog
pub fn descriptors() -> Vec<TypeDescriptor> {
    vec![
        TypeDescriptor::new(AGREEMENT_METHOD.clone())
            .with_type_name(AGREEMENT_METHOD_TYPE.clone())
            .with_required_attribute(ALGORITHM.clone(), ValueKind::AnyUri)
            .with_content(ContentModel::Mixed),
        TypeDescriptor::new(KA_NONCE.clone()).with_content(ContentModel::Simple(ValueKind::Base64Binary)),
        TypeDescriptor::new(ORIGINATOR_KEY_INFO.clone()).with_attribute(ID.clone(), ValueKind::String),
        TypeDescriptor::new(RECIPIENT_KEY_INFO.clone()).with_attribute(ID.clone(), ValueKind::String),
        TypeDescriptor::new(KEY_INFO.clone())
            .with_type_name(KEY_INFO_TYPE.clone())
            .with_attribute(ID.clone(), ValueKind::String),
    ]
}

/// Register the builders of this catalog
pub fn register(registry: &BuilderRegistry) -> Result<()> {
    super::register_descriptors(registry, descriptors())
}

/// Register the validators of this catalog
pub fn register_validators(suite: &mut ValidatorSuite) {
    suite.register(
        AGREEMENT_METHOD.clone(),
        RequiredAttribute::new(ALGORITHM.clone()).with_message("AgreementMethod algorithm URI was empty"),
    );
    suite.register(AGREEMENT_METHOD.clone(), ChildCount::optional(KA_NONCE.clone()));
    suite.register(AGREEMENT_METHOD.clone(), ChildCount::optional(ORIGINATOR_KEY_INFO.clone()));
    suite.register(AGREEMENT_METHOD.clone(), ChildCount::optional(RECIPIENT_KEY_INFO.clone()));
    suite.register(AGREEMENT_METHOD.clone(), ValidChildren);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{Base64Binary, HasAttributes};

    fn setup() -> (BuilderRegistry, ValidatorSuite) {
        let registry = BuilderRegistry::new();
        register(&registry).unwrap();
        let mut suite = ValidatorSuite::new();
        register_validators(&mut suite);
        (registry, suite)
    }

    fn agreement_method(registry: &BuilderRegistry, algorithm: Option<&str>) -> crate::object::SchemaObject {
        let mut method = registry.build(&AGREEMENT_METHOD).unwrap();
        if let Some(algorithm) = algorithm {
            method.set_attribute(ALGORITHM.clone(), algorithm.to_string());
        }
        method
    }

    #[test]
    fn test_valid_agreement_method() {
        let (registry, suite) = setup();
        let mut method = agreement_method(&registry, Some("urn:string:foo"));
        let mut nonce = registry.build(&KA_NONCE).unwrap();
        nonce.set_text_value(&Base64Binary(b"nonce".to_vec()));
        method.add_child(nonce);
        method.add_child(registry.build(&ORIGINATOR_KEY_INFO).unwrap());
        method.add_child(registry.build(&RECIPIENT_KEY_INFO).unwrap());

        assert!(suite.validate(&method).is_ok());
    }

    #[test]
    fn test_missing_algorithm() {
        let (registry, suite) = setup();
        for algorithm in [None, Some(""), Some("   ")] {
            let method = agreement_method(&registry, algorithm);
            let err = suite.validate(&method).unwrap_err();
            assert_eq!(err.message, "AgreementMethod algorithm URI was empty");
            assert_eq!(err.attribute.as_ref(), Some(&*ALGORITHM));
        }
    }

    #[test]
    fn test_key_info_reused_by_type() {
        let (registry, _) = setup();
        let info = registry
            .build_named(&KEY_INFO_TYPE, RECIPIENT_KEY_INFO.clone())
            .unwrap();
        assert_eq!(info.element_name(), &*RECIPIENT_KEY_INFO);
        assert_eq!(info.schema_type(), Some(&*KEY_INFO_TYPE));
    }
}
