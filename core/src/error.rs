//! Error types for the CouchDB client.
//!
//! # Design
//! Non-2xx responses are not errors: they materialize into failure-shaped
//! [`Response`](crate::Response) values. Only argument validation, transport
//! failures and success bodies that cannot be mapped use `Err`.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CouchError {
    /// The caller supplied empty or invalid request data. Raised before any I/O.
    #[error("invalid argument `{name}`: {reason}")]
    InvalidArgument { name: &'static str, reason: String },

    /// The transport could not complete the exchange.
    #[error("transport failure: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A 2xx response whose body does not match the expected schema.
    #[error("could not map successful response: {0}")]
    Mapping(String),

    /// A request value could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CouchError {
    pub(crate) fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        CouchError::InvalidArgument {
            name,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CouchError>;

/// Fails with `InvalidArgument` when `value` is empty or whitespace.
pub(crate) fn ensure_not_blank(name: &'static str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CouchError::invalid(name, "must not be empty"));
    }
    Ok(())
}

/// Fails with `InvalidArgument` when `items` is empty.
pub(crate) fn ensure_has_items<T>(name: &'static str, items: &[T]) -> Result<()> {
    if items.is_empty() {
        return Err(CouchError::invalid(name, "must contain at least one item"));
    }
    Ok(())
}
