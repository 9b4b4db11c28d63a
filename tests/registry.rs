//! Integration tests for the builder registry

use std::sync::Arc;
use std::thread;

use xmltooling::catalog::{self, saml2p};
use xmltooling::{Builder, BuilderRegistry, ContentModel, Error, QName, TypeDescriptor};

#[test]
fn test_concurrent_registration_and_lookup() {
    let registry = Arc::new(BuilderRegistry::new());
    catalog::register_all(&registry).unwrap();
    let before = registry.len();

    thread::scope(|scope| {
        for worker in 0..8 {
            let registry = registry.clone();
            scope.spawn(move || {
                for i in 0..25 {
                    let name = QName::namespaced("urn:example:load", format!("Type{}_{}", worker, i));
                    registry.register(name.clone(), Builder::new(TypeDescriptor::new(name))).unwrap();
                    assert!(registry.lookup(&saml2p::STATUS_CODE).is_some());
                }
            });
        }
    });

    assert_eq!(registry.len(), before + 200);
}

#[test]
fn test_concurrent_duplicate_has_one_winner() {
    let registry = Arc::new(BuilderRegistry::new());
    let name = QName::namespaced("urn:example", "Contested");

    let wins: usize = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                let name = name.clone();
                scope.spawn(move || registry.register(name.clone(), Builder::new(TypeDescriptor::new(name))).is_ok())
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap() as usize).sum()
    });

    assert_eq!(wins, 1);
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_snapshot_is_stable() {
    let registry = BuilderRegistry::new();
    catalog::register_all(&registry).unwrap();
    let snapshot = registry.snapshot();

    registry.deregister(&saml2p::STATUS_CODE).unwrap();
    assert!(!registry.contains(&saml2p::STATUS_CODE));
    assert!(snapshot.contains_key(&*saml2p::STATUS_CODE));
}

#[test]
fn test_json_table_registration() {
    let json = r#"[
        {
            "name": {"namespace": "urn:example:ext", "local_name": "Note", "prefix": "ex"},
            "type_name": {"namespace": "urn:example:ext", "local_name": "NoteType", "prefix": "ex"},
            "attributes": [{"name": {"local_name": "lang"}, "required": true}],
            "content": "mixed"
        }
    ]"#;
    let registry = BuilderRegistry::new();
    assert_eq!(catalog::register_json(&registry, json).unwrap(), 1);

    let note_type = QName::namespaced("urn:example:ext", "NoteType");
    let builder = registry.lookup(&note_type).unwrap();
    assert_eq!(builder.descriptor().content, ContentModel::Mixed);
    assert!(builder.descriptor().attributes[0].required);

    let renamed = registry
        .build_named(&note_type, QName::namespaced("urn:example:ext", "Comment"))
        .unwrap();
    assert_eq!(renamed.schema_type(), Some(&note_type));

    assert!(matches!(
        catalog::register_json(&registry, json),
        Err(Error::DuplicateRegistration(_))
    ));
}

#[test]
fn test_missing_key_builds_nothing() {
    let registry = BuilderRegistry::new();
    assert!(registry.build(&QName::local("Nothing")).is_none());
    assert!(registry.fallback().is_none());

    let registry = BuilderRegistry::with_fallback();
    assert!(registry.build(&QName::local("Nothing")).is_none());
    assert!(registry.fallback().unwrap().descriptor().is_wildcard());
}
