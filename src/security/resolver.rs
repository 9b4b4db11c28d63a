//! Layered resolution of security parameters

use tracing::debug;

use crate::error::{Error, Result};

use super::collaborators::CriteriaSet;
use super::configuration::SecurityConfiguration;

/// Merges an ordered list of configurations into effective parameters
///
/// Configurations are ordered most specific first, e.g. per-peer, then
/// per-profile, then global. Each field takes the first value present.
#[derive(Debug, Clone, Copy, Default)]
pub struct SecurityParametersResolver;

impl SecurityParametersResolver {
    /// Create a resolver
    pub fn new() -> Self {
        Self
    }

    /// Resolve effective parameters
    ///
    /// An explicit `tls_criteria` replaces any configured criteria set.
    /// Fails when `configs` is empty.
    pub fn resolve(&self, configs: &[SecurityConfiguration], tls_criteria: Option<CriteriaSet>) -> Result<SecurityConfiguration> {
        if configs.is_empty() {
            return Err(Error::Security(
                "at least one security configuration is required".to_string(),
            ));
        }

        let criteria = tls_criteria.or_else(|| first(configs, |c| c.tls_criteria_set()).cloned());
        let resolved = SecurityConfiguration::builder()
            .credentials_provider(first(configs, |c| c.credentials_provider()).cloned())
            .auth_cache(first(configs, |c| c.auth_cache()).cloned())
            .tls_trust_engine(first(configs, |c| c.tls_trust_engine()).cloned())
            .tls_criteria_set(criteria)
            .tls_protocols(first(configs, |c| c.tls_protocols()).map(|p| p.to_vec()))
            .tls_cipher_suites(first(configs, |c| c.tls_cipher_suites()).map(|s| s.to_vec()))
            .hostname_verifier(first(configs, |c| c.hostname_verifier()).cloned())
            .client_tls_credential(first(configs, |c| c.client_tls_credential()).cloned())
            .build();

        log_result(&resolved);
        Ok(resolved)
    }
}

/// First value present for a field, in configuration order
fn first<'a, T: ?Sized>(
    configs: &'a [SecurityConfiguration],
    field: impl Fn(&'a SecurityConfiguration) -> Option<&'a T>,
) -> Option<&'a T> {
    configs.iter().find_map(field)
}

fn log_result(params: &SecurityConfiguration) {
    debug!("Resolved credentials provider present: {}", params.credentials_provider().is_some());
    debug!("Resolved auth cache present: {}", params.auth_cache().is_some());
    debug!("Resolved TLS trust engine present: {}", params.tls_trust_engine().is_some());
    debug!("Resolved TLS criteria set present: {}", params.tls_criteria_set().is_some());
    debug!("Resolved TLS protocols: {:?}", params.tls_protocols());
    debug!("Resolved TLS cipher suites: {:?}", params.tls_cipher_suites());
    debug!("Resolved hostname verifier present: {}", params.hostname_verifier().is_some());
    debug!("Resolved client TLS credential present: {}", params.client_tls_credential().is_some());
}
