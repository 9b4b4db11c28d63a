//! Transport security configuration
//!
//! [`SecurityConfiguration`] is the bundle of trust and TLS parameters an
//! HTTP client applies when sending messages. This crate defines its shape
//! and how layered configurations merge; applying it is the transport's job.

mod collaborators;
mod configuration;
mod resolver;

pub use collaborators::{
    AuthCache, AuthScope, BasicAuthCache, BasicCredentialsProvider, CredentialsProvider, CriteriaSet, Criterion,
    HostnameVerifier, TrustEngine, UsernamePasswordCredentials, X509Credential,
};
pub use configuration::{SecurityConfiguration, SecurityConfigurationBuilder};
pub use resolver::SecurityParametersResolver;
