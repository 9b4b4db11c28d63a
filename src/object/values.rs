//! Typed attribute and content values
//!
//! Objects store lexical strings so that unmarshalled content re-marshals
//! byte-for-byte. [`ValueKind`] says how a lexical value must look, and
//! [`XmlValue`] converts between the lexical form and a Rust type.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::names::is_valid_qname;
use crate::namespaces::NamespaceContext;

static DURATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^-?P(\d+Y)?(\d+M)?(\d+D)?(T(\d+H)?(\d+M)?(\d+(\.\d+)?S)?)?$").unwrap()
});

/// Lexical space of an attribute or simple content value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ValueKind {
    /// xs:string, anything goes
    #[default]
    String,
    /// xs:boolean
    Boolean,
    /// xs:dateTime
    DateTime,
    /// xs:duration
    Duration,
    /// xs:base64Binary
    Base64Binary,
    /// xs:anyURI
    AnyUri,
    /// xs:QName, prefix must resolve in scope
    QName,
}

impl ValueKind {
    /// Check a lexical value against this kind
    ///
    /// Returns a short reason on failure. `scope` is only consulted for
    /// QName values.
    pub fn check_lexical(&self, value: &str, scope: &NamespaceContext) -> Result<(), String> {
        match self {
            ValueKind::String => Ok(()),
            ValueKind::Boolean => XsBoolean::from_lexical(value).map(|_| ()),
            ValueKind::DateTime => DateTime::<Utc>::from_lexical(value).map(|_| ()),
            ValueKind::Duration => check_duration(value),
            ValueKind::Base64Binary => Base64Binary::from_lexical(value).map(|_| ()),
            ValueKind::AnyUri => check_any_uri(value),
            ValueKind::QName => {
                let value = value.trim();
                if !is_valid_qname(value) {
                    return Err("malformed QName".to_string());
                }
                scope.resolve(value).map(|_| ()).map_err(|e| e.to_string())
            }
        }
    }

    /// Schema name of the kind, for messages
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Boolean => "boolean",
            ValueKind::DateTime => "dateTime",
            ValueKind::Duration => "duration",
            ValueKind::Base64Binary => "base64Binary",
            ValueKind::AnyUri => "anyURI",
            ValueKind::QName => "QName",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

fn check_duration(value: &str) -> Result<(), String> {
    let value = value.trim();
    if DURATION.is_match(value) && !value.ends_with('P') && !value.ends_with('T') {
        Ok(())
    } else {
        Err("malformed duration".to_string())
    }
}

fn check_any_uri(value: &str) -> Result<(), String> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(());
    }
    match url::Url::parse(value) {
        Ok(_) => Ok(()),
        Err(url::ParseError::RelativeUrlWithoutBase) if !value.contains(char::is_whitespace) => Ok(()),
        Err(e) => Err(format!("malformed URI: {}", e)),
    }
}

/// Conversion between a Rust value and its XML lexical form
pub trait XmlValue: Sized {
    /// Lexical space this type lives in
    const KIND: ValueKind;

    /// Parse the lexical form
    fn from_lexical(value: &str) -> Result<Self, String>;

    /// Produce the canonical lexical form
    fn to_lexical(&self) -> String;
}

impl XmlValue for String {
    const KIND: ValueKind = ValueKind::String;

    fn from_lexical(value: &str) -> Result<Self, String> {
        Ok(value.to_string())
    }

    fn to_lexical(&self) -> String {
        self.clone()
    }
}

/// xs:boolean that remembers whether it was written as `1`/`0`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct XsBoolean {
    /// The boolean value
    pub value: bool,
    /// Whether the numeric lexical form is used
    pub numeric: bool,
}

impl XsBoolean {
    /// Create a boolean using the `true`/`false` form
    pub fn new(value: bool) -> Self {
        Self { value, numeric: false }
    }

    /// Create a boolean using the `1`/`0` form
    pub fn numeric(value: bool) -> Self {
        Self { value, numeric: true }
    }
}

impl From<bool> for XsBoolean {
    fn from(value: bool) -> Self {
        Self::new(value)
    }
}

impl XmlValue for XsBoolean {
    const KIND: ValueKind = ValueKind::Boolean;

    fn from_lexical(value: &str) -> Result<Self, String> {
        match value.trim() {
            "true" => Ok(Self::new(true)),
            "false" => Ok(Self::new(false)),
            "1" => Ok(Self::numeric(true)),
            "0" => Ok(Self::numeric(false)),
            _ => Err("malformed boolean".to_string()),
        }
    }

    fn to_lexical(&self) -> String {
        match (self.value, self.numeric) {
            (true, false) => "true",
            (false, false) => "false",
            (true, true) => "1",
            (false, true) => "0",
        }
        .to_string()
    }
}

impl XmlValue for bool {
    const KIND: ValueKind = ValueKind::Boolean;

    fn from_lexical(value: &str) -> Result<Self, String> {
        XsBoolean::from_lexical(value).map(|b| b.value)
    }

    fn to_lexical(&self) -> String {
        XsBoolean::new(*self).to_lexical()
    }
}

impl XmlValue for DateTime<Utc> {
    const KIND: ValueKind = ValueKind::DateTime;

    fn from_lexical(value: &str) -> Result<Self, String> {
        DateTime::parse_from_rfc3339(value.trim())
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| format!("malformed dateTime: {}", e))
    }

    fn to_lexical(&self) -> String {
        self.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }
}

/// Decoded xs:base64Binary content
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Base64Binary(pub Vec<u8>);

impl XmlValue for Base64Binary {
    const KIND: ValueKind = ValueKind::Base64Binary;

    fn from_lexical(value: &str) -> Result<Self, String> {
        let compact: String = value.chars().filter(|c| !c.is_whitespace()).collect();
        STANDARD
            .decode(compact)
            .map(Base64Binary)
            .map_err(|e| format!("malformed base64: {}", e))
    }

    fn to_lexical(&self) -> String {
        STANDARD.encode(&self.0)
    }
}

impl XmlValue for url::Url {
    const KIND: ValueKind = ValueKind::AnyUri;

    fn from_lexical(value: &str) -> Result<Self, String> {
        url::Url::parse(value.trim()).map_err(|e| format!("malformed URI: {}", e))
    }

    fn to_lexical(&self) -> String {
        self.to_string()
    }
}
