//! Security configuration value object

use std::fmt;
use std::sync::Arc;

use super::collaborators::{
    AuthCache, AuthScope, BasicCredentialsProvider, CredentialsProvider, CriteriaSet, HostnameVerifier, TrustEngine,
    UsernamePasswordCredentials, X509Credential,
};

/// Transport security parameters handed to an HTTP client
///
/// Every field is independently optional; absence means "use the transport
/// default". No field implies or defaults another. Instances are immutable;
/// use [`SecurityConfiguration::to_builder`] to derive a modified copy.
#[derive(Clone, Default)]
pub struct SecurityConfiguration {
    credentials_provider: Option<Arc<dyn CredentialsProvider>>,
    auth_cache: Option<Arc<dyn AuthCache>>,
    tls_trust_engine: Option<Arc<dyn TrustEngine>>,
    tls_criteria_set: Option<CriteriaSet>,
    tls_protocols: Option<Vec<String>>,
    tls_cipher_suites: Option<Vec<String>>,
    hostname_verifier: Option<Arc<dyn HostnameVerifier>>,
    client_tls_credential: Option<Arc<X509Credential>>,
}

impl SecurityConfiguration {
    /// Start building a configuration
    pub fn builder() -> SecurityConfigurationBuilder {
        SecurityConfigurationBuilder::default()
    }

    /// Copy this configuration into a builder
    pub fn to_builder(&self) -> SecurityConfigurationBuilder {
        SecurityConfigurationBuilder { config: self.clone() }
    }

    /// HTTP credentials provider
    pub fn credentials_provider(&self) -> Option<&Arc<dyn CredentialsProvider>> {
        self.credentials_provider.as_ref()
    }

    /// HTTP auth cache
    pub fn auth_cache(&self) -> Option<&Arc<dyn AuthCache>> {
        self.auth_cache.as_ref()
    }

    /// Trust engine for the server's TLS certificate
    pub fn tls_trust_engine(&self) -> Option<&Arc<dyn TrustEngine>> {
        self.tls_trust_engine.as_ref()
    }

    /// Criteria passed to the TLS trust engine
    pub fn tls_criteria_set(&self) -> Option<&CriteriaSet> {
        self.tls_criteria_set.as_ref()
    }

    /// Allowed TLS protocol versions, in preference order
    pub fn tls_protocols(&self) -> Option<&[String]> {
        self.tls_protocols.as_deref()
    }

    /// Allowed TLS cipher suites, in preference order
    pub fn tls_cipher_suites(&self) -> Option<&[String]> {
        self.tls_cipher_suites.as_deref()
    }

    /// Host name verifier
    pub fn hostname_verifier(&self) -> Option<&Arc<dyn HostnameVerifier>> {
        self.hostname_verifier.as_ref()
    }

    /// Client credential for mutual TLS
    pub fn client_tls_credential(&self) -> Option<&Arc<X509Credential>> {
        self.client_tls_credential.as_ref()
    }

    /// Whether no field is set
    pub fn is_empty(&self) -> bool {
        self.credentials_provider.is_none()
            && self.auth_cache.is_none()
            && self.tls_trust_engine.is_none()
            && self.tls_criteria_set.is_none()
            && self.tls_protocols.is_none()
            && self.tls_cipher_suites.is_none()
            && self.hostname_verifier.is_none()
            && self.client_tls_credential.is_none()
    }
}

/// Prints which fields are present, never their contents
impl fmt::Debug for SecurityConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecurityConfiguration")
            .field("credentials_provider", &self.credentials_provider.is_some())
            .field("auth_cache", &self.auth_cache.is_some())
            .field("tls_trust_engine", &self.tls_trust_engine.is_some())
            .field("tls_criteria_set", &self.tls_criteria_set)
            .field("tls_protocols", &self.tls_protocols)
            .field("tls_cipher_suites", &self.tls_cipher_suites)
            .field("hostname_verifier", &self.hostname_verifier.is_some())
            .field("client_tls_credential", &self.client_tls_credential.is_some())
            .finish()
    }
}

/// Builder for [`SecurityConfiguration`]
///
/// Every setter takes an `Option` so a field can also be cleared.
#[derive(Clone, Default)]
pub struct SecurityConfigurationBuilder {
    config: SecurityConfiguration,
}

impl SecurityConfigurationBuilder {
    /// Set the HTTP credentials provider
    pub fn credentials_provider(mut self, provider: Option<Arc<dyn CredentialsProvider>>) -> Self {
        self.config.credentials_provider = provider;
        self
    }

    /// Install a provider answering every scope with `credentials`, or
    /// clear the provider when None
    pub fn basic_credentials(self, credentials: Option<UsernamePasswordCredentials>) -> Self {
        self.basic_credentials_for_scope(credentials, AuthScope::any())
    }

    /// Install a provider answering `scope` with `credentials`, or clear the
    /// provider when None
    pub fn basic_credentials_for_scope(self, credentials: Option<UsernamePasswordCredentials>, scope: AuthScope) -> Self {
        let provider = credentials.map(|credentials| {
            let provider = BasicCredentialsProvider::new();
            provider.set_credentials(scope, credentials);
            Arc::new(provider) as Arc<dyn CredentialsProvider>
        });
        self.credentials_provider(provider)
    }

    /// Set the HTTP auth cache
    pub fn auth_cache(mut self, cache: Option<Arc<dyn AuthCache>>) -> Self {
        self.config.auth_cache = cache;
        self
    }

    /// Set the TLS trust engine
    pub fn tls_trust_engine(mut self, engine: Option<Arc<dyn TrustEngine>>) -> Self {
        self.config.tls_trust_engine = engine;
        self
    }

    /// Set the TLS trust criteria
    pub fn tls_criteria_set(mut self, criteria: Option<CriteriaSet>) -> Self {
        self.config.tls_criteria_set = criteria;
        self
    }

    /// Set the allowed TLS protocols; an empty list counts as unset
    pub fn tls_protocols(mut self, protocols: Option<Vec<String>>) -> Self {
        self.config.tls_protocols = non_empty(protocols);
        self
    }

    /// Set the allowed TLS cipher suites; an empty list counts as unset
    pub fn tls_cipher_suites(mut self, suites: Option<Vec<String>>) -> Self {
        self.config.tls_cipher_suites = non_empty(suites);
        self
    }

    /// Set the host name verifier
    pub fn hostname_verifier(mut self, verifier: Option<Arc<dyn HostnameVerifier>>) -> Self {
        self.config.hostname_verifier = verifier;
        self
    }

    /// Set the client TLS credential
    pub fn client_tls_credential(mut self, credential: Option<Arc<X509Credential>>) -> Self {
        self.config.client_tls_credential = credential;
        self
    }

    /// Finish building
    pub fn build(self) -> SecurityConfiguration {
        self.config
    }
}

fn non_empty(values: Option<Vec<String>>) -> Option<Vec<String>> {
    values
        .map(|v| v.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect::<Vec<_>>())
        .filter(|v| !v.is_empty())
}
