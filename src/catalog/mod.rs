//! Schema catalogs
//!
//! Registration data for concrete protocol elements layered on the generic
//! core. Each catalog module exposes its well-known names, a `register`
//! function for builders and a `register_validators` function for its
//! domain rules. Catalogs may also be supplied as JSON descriptor tables,
//! see [`load_descriptors`].

pub mod reqattr;
pub mod saml2p;
pub mod soap11;
pub mod xmlenc;

use tracing::debug;

use crate::descriptor::TypeDescriptor;
use crate::error::{Error, Result};
use crate::registry::BuilderRegistry;
use crate::validators::ValidatorSuite;

/// Register the builders of every bundled catalog
pub fn register_all(registry: &BuilderRegistry) -> Result<()> {
    soap11::register(registry)?;
    xmlenc::register(registry)?;
    reqattr::register(registry)?;
    saml2p::register(registry)?;
    Ok(())
}

/// Register the validators of every bundled catalog
pub fn register_validators(suite: &mut ValidatorSuite) {
    soap11::register_validators(suite);
    xmlenc::register_validators(suite);
    reqattr::register_validators(suite);
    saml2p::register_validators(suite);
}

/// Parse a JSON array of type descriptors
///
/// Every descriptor is checked for internal consistency.
pub fn load_descriptors(json: &str) -> Result<Vec<TypeDescriptor>> {
    let descriptors: Vec<TypeDescriptor> =
        serde_json::from_str(json).map_err(|e| Error::Descriptor(format!("invalid descriptor table: {}", e)))?;
    for descriptor in &descriptors {
        descriptor.check()?;
    }
    Ok(descriptors)
}

/// Load a JSON descriptor table and register every entry
///
/// Returns the number of descriptors registered.
pub fn register_json(registry: &BuilderRegistry, json: &str) -> Result<usize> {
    let descriptors = load_descriptors(json)?;
    let count = descriptors.len();
    register_descriptors(registry, descriptors)?;
    Ok(count)
}

fn register_descriptors(registry: &BuilderRegistry, descriptors: Vec<TypeDescriptor>) -> Result<()> {
    for descriptor in descriptors {
        debug!("Registering catalog type {}", descriptor.name);
        registry.register_descriptor(descriptor)?;
    }
    Ok(())
}
