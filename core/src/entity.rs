//! Typed documents with explicit id/revision accessors.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::Result;
use crate::http::HttpResponse;
use crate::responses::{materialize, DocumentHeader, Response};
use crate::serialization::from_json;

/// A document type whose id and revision the client can read and write.
///
/// ```
/// use couch_core::Entity;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Artist {
///     #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
///     id: Option<String>,
///     #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
///     rev: Option<String>,
///     name: String,
/// }
///
/// impl Entity for Artist {
///     fn id(&self) -> Option<&str> { self.id.as_deref() }
///     fn set_id(&mut self, id: String) { self.id = Some(id); }
///     fn rev(&self) -> Option<&str> { self.rev.as_deref() }
///     fn set_rev(&mut self, rev: String) { self.rev = Some(rev); }
/// }
/// ```
pub trait Entity: Serialize + DeserializeOwned {
    fn id(&self) -> Option<&str>;
    fn set_id(&mut self, id: String);
    fn rev(&self) -> Option<&str>;
    fn set_rev(&mut self, rev: String);
}

/// Materializes entity responses and round-trips id/revision.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntityResponseFactory;

impl EntityResponseFactory {
    /// For writes: on success the `{"id", "rev"}` body is applied to `entity`.
    pub fn create_for<T: Entity>(
        &self,
        response: HttpResponse,
        entity: &mut T,
    ) -> Result<Response<DocumentHeader>> {
        materialize(response, |r| {
            let header: DocumentHeader = from_json(&r.body)?;
            entity.set_id(header.id.clone());
            if !header.rev.is_empty() {
                entity.set_rev(header.rev.clone());
            }
            Ok(header)
        })
    }

    /// For reads: the entity is deserialized from the body, then `_id` and
    /// `_rev` are applied even if `T` does not map them itself.
    pub fn create<T: Entity>(&self, response: HttpResponse) -> Result<Response<T>> {
        materialize(response, |r| {
            let value: Value = from_json(&r.body)?;
            let id = value.get("_id").and_then(Value::as_str).map(str::to_string);
            let rev = value.get("_rev").and_then(Value::as_str).map(str::to_string);
            let mut entity: T = serde_json::from_value(value)
                .map_err(|e| crate::CouchError::Mapping(e.to_string()))?;
            if let Some(id) = id {
                entity.set_id(id);
            }
            if let Some(rev) = rev {
                entity.set_rev(rev);
            }
            Ok(entity)
        })
    }
}
