//! Builder registry
//!
//! Maps element names and XSI type names to the [`Builder`] that constructs
//! objects of that type. A registry is an ordinary value: build one at
//! startup, register the schema catalogs you need, then share it behind an
//! `Arc` with unmarshallers.
//!
//! Lookups read an immutable snapshot of the table. Registration clones the
//! table, inserts, and swaps the new snapshot in, so readers never observe a
//! half-applied registration.

use indexmap::IndexMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::debug;

use crate::descriptor::TypeDescriptor;
use crate::error::{Error, Result};
use crate::namespaces::QName;
use crate::object::SchemaObject;

/// Snapshot of the registration table
pub type BuilderMap = IndexMap<QName, Arc<Builder>>;

/// Factory for objects of one schema type
#[derive(Debug, Clone)]
pub struct Builder {
    descriptor: Arc<TypeDescriptor>,
}

impl Builder {
    /// Create a builder for a descriptor
    pub fn new(descriptor: TypeDescriptor) -> Self {
        Self {
            descriptor: Arc::new(descriptor),
        }
    }

    /// Create a builder sharing an existing descriptor
    pub fn from_shared(descriptor: Arc<TypeDescriptor>) -> Self {
        Self { descriptor }
    }

    /// The descriptor objects are built from
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Build an empty object named after the type's default element
    pub fn build_object(&self) -> SchemaObject {
        SchemaObject::new(self.descriptor.clone(), self.descriptor.name.clone())
    }

    /// Build an empty object under `element_name`
    ///
    /// When the name differs from the type's default element name, the
    /// type's XSI type name is recorded on the object so the marshaller
    /// writes `xsi:type`.
    pub fn build_object_named(&self, element_name: QName) -> SchemaObject {
        let by_type = element_name != self.descriptor.name && !self.descriptor.is_wildcard();
        let mut object = SchemaObject::new(self.descriptor.clone(), element_name);
        if by_type {
            object.set_schema_type(Some(self.descriptor.xsi_type().clone()));
        }
        object
    }
}

/// Registry of builders keyed by qualified name
#[derive(Debug, Default)]
pub struct BuilderRegistry {
    builders: RwLock<Arc<BuilderMap>>,
    fallback: Option<Arc<Builder>>,
}

impl BuilderRegistry {
    /// Create an empty registry without a fallback builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty registry whose fallback builds `xs:anyType` objects
    /// for content no registered type claims
    pub fn with_fallback() -> Self {
        Self {
            builders: RwLock::new(Arc::new(IndexMap::new())),
            fallback: Some(Arc::new(Builder::new(TypeDescriptor::any()))),
        }
    }

    /// Register a builder under `key`
    ///
    /// Fails with [`Error::DuplicateRegistration`] if the key is taken; the
    /// existing registration stays in effect.
    pub fn register(&self, key: QName, builder: Builder) -> Result<()> {
        self.register_all(vec![(key, Arc::new(builder))])
    }

    /// Register a descriptor under its default element name and, when
    /// distinct, its XSI type name
    pub fn register_descriptor(&self, descriptor: TypeDescriptor) -> Result<()> {
        descriptor.check()?;
        let builder = Arc::new(Builder::new(descriptor));
        let descriptor = builder.descriptor();

        let mut entries = vec![(descriptor.name.clone(), builder.clone())];
        if let Some(ref type_name) = descriptor.type_name {
            if *type_name != descriptor.name {
                entries.push((type_name.clone(), builder.clone()));
            }
        }
        self.register_all(entries)
    }

    fn register_all(&self, entries: Vec<(QName, Arc<Builder>)>) -> Result<()> {
        let mut guard = self.builders.write();
        for (key, _) in &entries {
            if guard.contains_key(key) {
                return Err(Error::DuplicateRegistration(key.clone()));
            }
        }

        let mut next = BuilderMap::clone(&guard);
        for (key, builder) in entries {
            debug!("Registering builder for {} under {}", builder.descriptor().name, key);
            next.insert(key, builder);
        }
        *guard = Arc::new(next);
        Ok(())
    }

    /// Remove a registration, returning its builder
    pub fn deregister(&self, key: &QName) -> Option<Arc<Builder>> {
        let mut guard = self.builders.write();
        let mut next = BuilderMap::clone(&guard);
        let removed = next.shift_remove(key);
        if removed.is_some() {
            *guard = Arc::new(next);
        }
        removed
    }

    /// Find the builder for `key`
    ///
    /// A miss is not an error: it means the name is an unknown or extension
    /// element.
    pub fn lookup(&self, key: &QName) -> Option<Arc<Builder>> {
        self.builders.read().get(key).cloned()
    }

    /// The fallback builder for unknown content
    pub fn fallback(&self) -> Option<Arc<Builder>> {
        self.fallback.clone()
    }

    /// Build an object of the type registered under `key`, named after the
    /// type's default element
    pub fn build(&self, key: &QName) -> Option<SchemaObject> {
        self.lookup(key).map(|b| b.build_object())
    }

    /// Build an object of the type registered under `type_key`, named
    /// `element_name`
    pub fn build_named(&self, type_key: &QName, element_name: QName) -> Option<SchemaObject> {
        self.lookup(type_key).map(|b| b.build_object_named(element_name))
    }

    /// Current registration table
    pub fn snapshot(&self) -> Arc<BuilderMap> {
        self.builders.read().clone()
    }

    /// Registered keys in registration order
    pub fn keys(&self) -> Vec<QName> {
        self.snapshot().keys().cloned().collect()
    }

    /// Whether `key` is registered
    pub fn contains(&self, key: &QName) -> bool {
        self.builders.read().contains_key(key)
    }

    /// Number of registered keys
    pub fn len(&self) -> usize {
        self.builders.read().len()
    }

    /// Whether nothing is registered
    pub fn is_empty(&self) -> bool {
        self.builders.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ContentModel;
    use crate::object::ValueKind;

    fn fault_string() -> TypeDescriptor {
        TypeDescriptor::new(QName::namespaced("N", "FaultString"))
            .with_content(ContentModel::Simple(ValueKind::String))
    }

    #[test]
    fn test_register_and_lookup() {
        let registry = BuilderRegistry::new();
        registry.register_descriptor(fault_string()).unwrap();

        let builder = registry.lookup(&QName::namespaced("N", "FaultString")).unwrap();
        let obj = builder.build_object();
        assert_eq!(obj.element_name(), &QName::namespaced("N", "FaultString"));
        assert!(obj.schema_type().is_none());
        assert!(registry.lookup(&QName::namespaced("N", "Other")).is_none());
    }

    #[test]
    fn test_duplicate_registration_keeps_first() {
        let registry = BuilderRegistry::new();
        let key = QName::namespaced("N", "FaultString");
        registry.register(key.clone(), Builder::new(fault_string())).unwrap();

        let second = Builder::new(TypeDescriptor::new(QName::namespaced("N", "Impostor")));
        let err = registry.register(key.clone(), second).unwrap_err();
        assert!(matches!(err, Error::DuplicateRegistration(ref k) if *k == key));

        let builder = registry.lookup(&key).unwrap();
        assert_eq!(builder.descriptor().name.local_name, "FaultString");
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_descriptor_is_atomic() {
        let registry = BuilderRegistry::new();
        let type_name = QName::namespaced("N", "KeyInfoType");
        registry
            .register(type_name.clone(), Builder::new(TypeDescriptor::new(type_name.clone())))
            .unwrap();

        let desc = TypeDescriptor::new(QName::namespaced("N", "KeyInfo")).with_type_name(type_name);
        assert!(registry.register_descriptor(desc).is_err());
        assert!(!registry.contains(&QName::namespaced("N", "KeyInfo")));
    }

    #[test]
    fn test_build_by_type_records_xsi_type() {
        let registry = BuilderRegistry::new();
        let desc = TypeDescriptor::new(QName::namespaced("N", "KeyInfo"))
            .with_type_name(QName::namespaced("N", "KeyInfoType"));
        registry.register_descriptor(desc).unwrap();
        assert_eq!(registry.len(), 2);

        let obj = registry
            .build_named(
                &QName::namespaced("N", "KeyInfoType"),
                QName::namespaced("N", "OriginatorKeyInfo"),
            )
            .unwrap();
        assert_eq!(obj.schema_type(), Some(&QName::namespaced("N", "KeyInfoType")));
        assert!(!obj.has_default_name());

        let obj = registry.build(&QName::namespaced("N", "KeyInfoType")).unwrap();
        assert!(obj.schema_type().is_none());
    }

    #[test]
    fn test_snapshot_is_stable() {
        let registry = BuilderRegistry::new();
        let before = registry.snapshot();
        registry.register_descriptor(fault_string()).unwrap();

        assert!(before.is_empty());
        assert_eq!(registry.snapshot().len(), 1);
        assert!(registry.deregister(&QName::namespaced("N", "FaultString")).is_some());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_fallback() {
        assert!(BuilderRegistry::new().fallback().is_none());
        let registry = BuilderRegistry::with_fallback();
        let fallback = registry.fallback().unwrap();
        let obj = fallback.build_object_named(QName::namespaced("urn:ext", "Unknown"));
        assert!(obj.descriptor().is_wildcard());
        assert!(obj.schema_type().is_none());
    }

    #[test]
    fn test_concurrent_lookups() {
        let registry = Arc::new(BuilderRegistry::new());
        registry.register_descriptor(fault_string()).unwrap();

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    (0..100).all(|_| registry.lookup(&QName::namespaced("N", "FaultString")).is_some())
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap());
        }
    }
}
