//! Integration tests for marshalling and unmarshalling bundled catalog
//! messages through serialized XML

use std::sync::Arc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;

use xmltooling::catalog::{self, reqattr, soap11, xmlenc};
use xmltooling::dom::{parse_str, to_xml_string};
use xmltooling::object::Base64Binary;
use xmltooling::{BuilderRegistry, Error, HasAttributes, HasText, Marshaller, Namespace, SchemaObject, Unmarshaller};

fn registry() -> Arc<BuilderRegistry> {
    let registry = BuilderRegistry::with_fallback();
    catalog::register_all(&registry).expect("bundled catalogs register");
    Arc::new(registry)
}

fn to_xml(object: &SchemaObject) -> String {
    let element = Marshaller::new().marshal(object).expect("marshal");
    to_xml_string(&element).expect("serialize")
}

fn from_xml(registry: &Arc<BuilderRegistry>, xml: &str) -> SchemaObject {
    let element = parse_str(xml).expect("parse");
    Unmarshaller::new(registry.clone()).unmarshal(&element).expect("unmarshal")
}

#[test]
fn test_fault_string_element() {
    let registry = registry();
    let mut fault_string = registry.build(&soap11::FAULT_STRING).unwrap();
    fault_string.set_text("Server error".to_string());

    let xml = to_xml(&fault_string);
    assert_eq!(xml, "<faultstring>Server error</faultstring>");
    assert_eq!(from_xml(&registry, &xml), fault_string);
}

#[test]
fn test_soap_envelope_roundtrip() {
    let registry = registry();
    let fault = soap11::build_fault(&registry, &soap11::SERVER, "Internal failure").unwrap();
    let mut body = registry.build(&soap11::BODY).unwrap();
    body.add_child(fault);
    let mut envelope = registry.build(&soap11::ENVELOPE).unwrap();
    envelope.add_child(body);

    let xml = to_xml(&envelope);
    assert_eq!(
        xml,
        concat!(
            r#"<soap11:Envelope xmlns:soap11="http://schemas.xmlsoap.org/soap/envelope/">"#,
            r#"<soap11:Body><soap11:Fault>"#,
            r#"<faultcode>soap11:Server</faultcode>"#,
            r#"<faultstring>Internal failure</faultstring>"#,
            r#"</soap11:Fault></soap11:Body></soap11:Envelope>"#
        )
    );

    let back = from_xml(&registry, &xml);
    assert_eq!(back, envelope);
}

#[test]
fn test_agreement_method_with_typed_key_info() {
    let registry = registry();
    let mut method = registry.build(&xmlenc::AGREEMENT_METHOD).unwrap();
    method.set_attribute(xmlenc::ALGORITHM.clone(), "urn:string:foo".to_string());

    let mut nonce = registry.build(&xmlenc::KA_NONCE).unwrap();
    nonce.set_text_value(&Base64Binary(b"a nonce".to_vec()));
    method.add_child(nonce);

    let recipient = registry
        .build_named(&xmlenc::KEY_INFO_TYPE, xmlenc::RECIPIENT_KEY_INFO.clone())
        .unwrap();
    method.add_child(recipient);

    let xml = to_xml(&method);
    assert!(xml.contains(r#"xsi:type="ds:KeyInfoType""#), "{}", xml);
    assert!(xml.contains(r#"xmlns:ds="http://www.w3.org/2000/09/xmldsig#""#), "{}", xml);

    let back = from_xml(&registry, &xml);
    assert_eq!(back, method);

    let key_info = back.child_objects().nth(1).unwrap();
    assert_eq!(key_info.element_name(), &*xmlenc::RECIPIENT_KEY_INFO);
    assert_eq!(key_info.type_name(), &*xmlenc::KEY_INFO);
    assert_eq!(
        back.child_objects().next().unwrap().text_value::<Base64Binary>().unwrap(),
        Some(Base64Binary(b"a nonce".to_vec()))
    );
}

#[test]
fn test_unknown_extension_survives_roundtrip() {
    let registry = registry();
    let xml = concat!(
        r#"<req-attr:RequestedAttributes xmlns:req-attr="urn:oasis:names:tc:SAML:protocol:ext:req-attr" "#,
        r#"xmlns:md="urn:oasis:names:tc:SAML:2.0:metadata" xmlns:ext="urn:example:ext">"#,
        r#"<md:RequestedAttribute Name="mail" isRequired="true" ext:source="ldap">"#,
        r#"<ext:Hint>primary address</ext:Hint>"#,
        r#"</md:RequestedAttribute>"#,
        r#"</req-attr:RequestedAttributes>"#
    );
    let object = from_xml(&registry, xml);

    let requested = object.child_objects().next().unwrap();
    assert_eq!(requested.attributes().get(&reqattr::IS_REQUIRED), Some("true"));
    assert_eq!(requested.unknown_attributes().len(), 1);
    let hint = requested.child_objects().next().unwrap();
    assert!(hint.descriptor().is_wildcard());

    let again = from_xml(&registry, &to_xml(&object));
    assert_eq!(again, object);
}

#[test]
fn test_non_latin_names_survive_roundtrip() {
    let registry = registry();
    let xml = r#"<名前 xmlns="urn:x" 属性="値">t</名前>"#;

    let object = from_xml(&registry, xml);
    assert!(object.descriptor().is_wildcard());
    assert_eq!(to_xml(&object), xml);
    assert_eq!(from_xml(&registry, &to_xml(&object)), object);
}

#[test]
fn test_fault_code_prefix_must_be_bound() {
    let registry = registry();
    let mut code = registry.build(&soap11::FAULT_CODE).unwrap();
    code.set_text("soap11:Server".to_string());

    let err = Marshaller::new().marshal(&code).unwrap_err();
    assert!(matches!(err, Error::Marshalling(ref e) if e.message.contains("unresolvable namespace prefix")));

    code.declare_namespace(Namespace::new(Some(soap11::PREFIX), soap11::NAMESPACE));
    let xml = to_xml(&code);
    assert_eq!(
        xml,
        r#"<faultcode xmlns:soap11="http://schemas.xmlsoap.org/soap/envelope/">soap11:Server</faultcode>"#
    );
    assert_eq!(from_xml(&registry, &xml), code);
}

#[test]
fn test_marshalled_dom_is_detached() {
    let registry = registry();
    let mut fault_string = registry.build(&soap11::FAULT_STRING).unwrap();
    fault_string.set_text("before".to_string());

    let element = Marshaller::new().marshal(&fault_string).unwrap();
    fault_string.set_text("after".to_string());

    assert_eq!(element.text().as_deref(), Some("before"));
}

proptest! {
    #[test]
    fn prop_text_and_attribute_values_survive(
        message in "[a-zA-Z0-9 <>&\"'.,;:!?-]{1,40}",
        friendly in "[a-zA-Z0-9 <>&\"'.-]{0,20}",
    ) {
        let registry = registry();

        let mut fault_string = registry.build(&soap11::FAULT_STRING).unwrap();
        fault_string.set_text(message.clone());
        let back = from_xml(&registry, &to_xml(&fault_string));
        prop_assert_eq!(back.text(), Some(message));

        let mut requested = registry.build(&reqattr::REQUESTED_ATTRIBUTE).unwrap();
        requested.set_attribute(reqattr::NAME.clone(), "mail".to_string());
        requested.set_attribute(reqattr::FRIENDLY_NAME.clone(), friendly.clone());
        let back = from_xml(&registry, &to_xml(&requested));
        prop_assert_eq!(back.attribute(&reqattr::FRIENDLY_NAME), Some(friendly.as_str()));
    }
}
