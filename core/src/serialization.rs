//! JSON helpers shared by the factories.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{CouchError, Result};

/// Compact JSON text for `value`.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

pub fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Deserializes a successful response body. Failures are mapping errors,
/// not serialization errors: the server answered but not in the expected shape.
pub fn from_json<T: DeserializeOwned>(text: &str) -> Result<T> {
    serde_json::from_str(text).map_err(|e| CouchError::Mapping(e.to_string()))
}
