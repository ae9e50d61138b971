//! URL composition: query-string parameters and base-address generators.

use std::fmt;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::Value;

use crate::error::{ensure_not_blank, Result};

/// Everything except the RFC 3986 unreserved characters is escaped,
/// including `/`.
const DATA: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// A single escaped query-string parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlParam {
    key: String,
    value: Option<String>,
}

impl UrlParam {
    pub fn new(key: &str, value: Option<&str>) -> Result<Self> {
        ensure_not_blank("key", key)?;
        Ok(Self {
            key: key.to_string(),
            value: value.map(Self::encode),
        })
    }

    /// Percent-encodes `value` as URL data.
    pub fn encode(value: &str) -> String {
        utf8_percent_encode(value, DATA).to_string()
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// The escaped value.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    pub fn has_value(&self) -> bool {
        self.value.as_deref().is_some_and(|v| !v.trim().is_empty())
    }
}

impl fmt::Display for UrlParam {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}={}", Self::encode(&self.key), value),
            None => f.write_str(&Self::encode(&self.key)),
        }
    }
}

/// Ordered list of parameters rendered as `?k=v&k=v`, or nothing when empty.
#[derive(Debug, Clone, Default)]
pub struct QueryString {
    params: Vec<UrlParam>,
}

impl QueryString {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` as escaped raw text.
    pub fn push_raw(&mut self, key: &str, value: &str) -> Result<()> {
        self.params.push(UrlParam::new(key, Some(value))?);
        Ok(())
    }

    /// Adds `value` JSON-encoded, then escaped.
    pub fn push_json(&mut self, key: &str, value: &Value) -> Result<()> {
        self.push_raw(key, &value.to_string())
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl fmt::Display for QueryString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, param) in self.params.iter().enumerate() {
            f.write_str(if i == 0 { "?" } else { "&" })?;
            write!(f, "{param}")?;
        }
        Ok(())
    }
}

/// Escapes a document id for use as a path segment. The `_design/` and
/// `_local/` prefixes keep their slash.
pub fn encode_doc_id(id: &str) -> String {
    for prefix in ["_design/", "_local/"] {
        if let Some(rest) = id.strip_prefix(prefix) {
            return format!("{prefix}{}", UrlParam::encode(rest));
        }
    }
    UrlParam::encode(id)
}

/// Produces the URL a database-level request is sent to.
pub trait RequestUrlGenerator: Send + Sync {
    fn generate(&self, segment: &str) -> String;
}

/// Always addresses the one database the generator was created for.
#[derive(Debug, Clone)]
pub struct ConstantRequestUrlGenerator {
    url: String,
}

impl ConstantRequestUrlGenerator {
    pub fn new(address: &str, db_name: &str) -> Self {
        Self {
            url: join(address, db_name),
        }
    }
}

impl RequestUrlGenerator for ConstantRequestUrlGenerator {
    fn generate(&self, _segment: &str) -> String {
        self.url.clone()
    }
}

/// Appends the requested segment (usually a database name) to the address.
#[derive(Debug, Clone)]
pub struct AppendingRequestUrlGenerator {
    address: String,
}

impl AppendingRequestUrlGenerator {
    pub fn new(address: &str) -> Self {
        Self {
            address: address.trim_end_matches('/').to_string(),
        }
    }
}

impl RequestUrlGenerator for AppendingRequestUrlGenerator {
    fn generate(&self, segment: &str) -> String {
        join(&self.address, segment)
    }
}

pub(crate) fn join(address: &str, segment: &str) -> String {
    format!(
        "{}/{}",
        address.trim_end_matches('/'),
        segment.trim_start_matches('/')
    )
}
