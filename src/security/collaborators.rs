//! Transport security collaborators
//!
//! The traits here are implemented by the HTTP client layer; this crate
//! only carries them. Value types are plain data.

use indexmap::IndexMap;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;

use crate::error::Result;

/// Host, port and realm an HTTP credential applies to
///
/// `None` matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AuthScope {
    /// Host name
    pub host: Option<String>,
    /// Port
    pub port: Option<u16>,
    /// Authentication realm
    pub realm: Option<String>,
    /// Authentication scheme, e.g. `Basic`
    pub scheme: Option<String>,
}

impl AuthScope {
    /// Scope matching every request
    pub fn any() -> Self {
        Self::default()
    }

    /// Scope for a host and port
    pub fn new(host: impl Into<String>, port: Option<u16>) -> Self {
        Self {
            host: Some(host.into()),
            port,
            ..Self::default()
        }
    }

    /// Restrict to a realm
    pub fn with_realm(mut self, realm: impl Into<String>) -> Self {
        self.realm = Some(realm.into());
        self
    }

    /// Restrict to a scheme
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    /// Score how well this scope matches `target`; None when it does not
    fn match_score(&self, target: &AuthScope) -> Option<u8> {
        fn part<T: PartialEq>(mine: &Option<T>, theirs: &Option<T>, weight: u8) -> Option<u8> {
            match (mine, theirs) {
                (None, _) => Some(0),
                (Some(a), Some(b)) if a == b => Some(weight),
                _ => None,
            }
        }

        let host = match (&self.host, &target.host) {
            (None, _) => Some(0),
            (Some(a), Some(b)) if a.eq_ignore_ascii_case(b) => Some(8),
            _ => None,
        }?;
        Some(host + part(&self.port, &target.port, 4)? + part(&self.realm, &target.realm, 2)? + part(&self.scheme, &target.scheme, 1)?)
    }
}

/// Username and password for HTTP authentication
#[derive(Clone, PartialEq, Eq)]
pub struct UsernamePasswordCredentials {
    username: String,
    password: String,
}

impl UsernamePasswordCredentials {
    /// Create credentials
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }

    /// The username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// The password
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for UsernamePasswordCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UsernamePasswordCredentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Client or peer X.509 credential
#[derive(Clone, PartialEq, Eq)]
pub struct X509Credential {
    entity_id: Option<String>,
    certificates: Vec<Vec<u8>>,
    private_key: Option<Vec<u8>>,
}

impl X509Credential {
    /// Create a credential from a DER certificate chain, entity first
    pub fn new(certificates: Vec<Vec<u8>>) -> Self {
        Self {
            entity_id: None,
            certificates,
            private_key: None,
        }
    }

    /// Attach the owning entity's identifier
    pub fn with_entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Attach a DER private key
    pub fn with_private_key(mut self, key: Vec<u8>) -> Self {
        self.private_key = Some(key);
        self
    }

    /// Identifier of the owning entity
    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    /// The entity certificate
    pub fn entity_certificate(&self) -> Option<&[u8]> {
        self.certificates.first().map(|c| c.as_slice())
    }

    /// The full chain, entity first
    pub fn certificates(&self) -> &[Vec<u8>] {
        &self.certificates
    }

    /// The private key, when this is a client credential
    pub fn private_key(&self) -> Option<&[u8]> {
        self.private_key.as_deref()
    }
}

impl fmt::Debug for X509Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("X509Credential")
            .field("entity_id", &self.entity_id)
            .field("certificates", &self.certificates.len())
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A single trust-evaluation criterion
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Criterion {
    /// Entity whose credential is being evaluated
    EntityId(String),
    /// Entity on the other side of the exchange
    PeerEntityId(String),
    /// Expected TLS server name
    ServerName(String),
    /// Minimum key length in bits
    KeyLength(u32),
    /// Criterion understood only by a specific trust engine
    Other {
        /// Criterion name
        name: String,
        /// Criterion value
        value: String,
    },
}

/// Ordered, duplicate-free set of criteria
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CriteriaSet {
    criteria: Vec<Criterion>,
}

impl CriteriaSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a criterion unless an equal one is present
    pub fn add(&mut self, criterion: Criterion) {
        if !self.criteria.contains(&criterion) {
            self.criteria.push(criterion);
        }
    }

    /// Builder-style [`CriteriaSet::add`]
    pub fn with(mut self, criterion: Criterion) -> Self {
        self.add(criterion);
        self
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Criterion> {
        self.criteria.iter()
    }

    /// Whether an equal criterion is present
    pub fn contains(&self, criterion: &Criterion) -> bool {
        self.criteria.contains(criterion)
    }

    /// Number of criteria
    pub fn len(&self) -> usize {
        self.criteria.len()
    }

    /// Whether the set is empty
    pub fn is_empty(&self) -> bool {
        self.criteria.is_empty()
    }
}

impl FromIterator<Criterion> for CriteriaSet {
    fn from_iter<I: IntoIterator<Item = Criterion>>(iter: I) -> Self {
        let mut set = Self::new();
        for criterion in iter {
            set.add(criterion);
        }
        set
    }
}

/// Supplies HTTP authentication credentials
pub trait CredentialsProvider: Send + Sync {
    /// Best credentials for `scope`, if any
    fn credentials(&self, scope: &AuthScope) -> Option<UsernamePasswordCredentials>;
}

/// Remembers which authentication scheme a host accepted
pub trait AuthCache: Send + Sync {
    /// Cached scheme for a host
    fn get(&self, host: &str) -> Option<String>;

    /// Cache a scheme for a host
    fn put(&self, host: &str, scheme: &str);

    /// Forget a host
    fn remove(&self, host: &str);

    /// Forget everything
    fn clear(&self);
}

/// Decides whether a presented credential is trusted
pub trait TrustEngine: Send + Sync {
    /// Evaluate `token` against `criteria`
    ///
    /// `Ok(false)` means untrusted; an error means evaluation itself failed.
    fn validate(&self, token: &X509Credential, criteria: Option<&CriteriaSet>) -> Result<bool>;
}

/// Checks a TLS peer certificate against the requested host name
pub trait HostnameVerifier: Send + Sync {
    /// Whether `peer` is acceptable for `hostname`
    fn verify(&self, hostname: &str, peer: &X509Credential) -> bool;
}

/// Credentials provider holding a table of scoped credentials
///
/// The most specific matching scope wins; among equally specific scopes
/// the one set first wins.
#[derive(Debug, Default)]
pub struct BasicCredentialsProvider {
    entries: RwLock<IndexMap<AuthScope, UsernamePasswordCredentials>>,
}

impl BasicCredentialsProvider {
    /// Create an empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the credentials for a scope, replacing any previous ones
    pub fn set_credentials(&self, scope: AuthScope, credentials: UsernamePasswordCredentials) {
        self.entries.write().insert(scope, credentials);
    }

    /// Remove all credentials
    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

impl CredentialsProvider for BasicCredentialsProvider {
    fn credentials(&self, scope: &AuthScope) -> Option<UsernamePasswordCredentials> {
        self.entries
            .read()
            .iter()
            .rev()
            .filter_map(|(candidate, creds)| candidate.match_score(scope).map(|score| (score, creds)))
            .max_by_key(|(score, _)| *score)
            .map(|(_, creds)| creds.clone())
    }
}

/// In-memory auth cache
#[derive(Debug, Default)]
pub struct BasicAuthCache {
    schemes: RwLock<HashMap<String, String>>,
}

impl BasicAuthCache {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuthCache for BasicAuthCache {
    fn get(&self, host: &str) -> Option<String> {
        self.schemes.read().get(&host.to_ascii_lowercase()).cloned()
    }

    fn put(&self, host: &str, scheme: &str) {
        self.schemes
            .write()
            .insert(host.to_ascii_lowercase(), scheme.to_string());
    }

    fn remove(&self, host: &str) {
        self.schemes.write().remove(&host.to_ascii_lowercase());
    }

    fn clear(&self) {
        self.schemes.write().clear();
    }
}
