use std::marker::PhantomData;

use serde::de::DeserializeOwned;

use super::content::{
    ChangeRow, ChangesResult, Document, DocumentHeader, IndexList, IndexResult,
    ReplicationResult, SearchResult, ViewResult,
};
use super::{materialize, Response};
use crate::error::{CouchError, Result};
use crate::http::HttpResponse;
use crate::requests::ChangesFeed;
use crate::serialization::from_json;

/// Turns an `HttpResponse` into a typed [`Response`].
///
/// Implementors only say how a 2xx body becomes `Content`; failure
/// materialization is shared.
pub trait ResponseFactory {
    type Content;

    fn materialize(&self, response: &HttpResponse) -> Result<Self::Content>;

    fn create(&self, response: HttpResponse) -> Result<Response<Self::Content>> {
        materialize(response, |r| self.materialize(r))
    }
}

/// The body verbatim. Used for database info and list functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextResponseFactory;

impl ResponseFactory for TextResponseFactory {
    type Content = String;

    fn materialize(&self, response: &HttpResponse) -> Result<String> {
        Ok(response.body.clone())
    }
}

/// For operations whose success carries nothing, such as `HEAD` on a database.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyResponseFactory;

impl ResponseFactory for EmptyResponseFactory {
    type Content = ();

    fn materialize(&self, _response: &HttpResponse) -> Result<()> {
        Ok(())
    }
}

/// Deserializes the body into `T`.
pub struct JsonResponseFactory<T> {
    _content: PhantomData<fn() -> T>,
}

impl<T> JsonResponseFactory<T> {
    pub fn new() -> Self {
        Self {
            _content: PhantomData,
        }
    }
}

impl<T> Default for JsonResponseFactory<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: DeserializeOwned> ResponseFactory for JsonResponseFactory<T> {
    type Content = T;

    fn materialize(&self, response: &HttpResponse) -> Result<T> {
        from_json(&response.body)
    }
}

pub type DocumentHeaderResponseFactory = JsonResponseFactory<DocumentHeader>;
pub type ViewQueryResponseFactory = JsonResponseFactory<ViewResult>;
pub type ReplicationResponseFactory = JsonResponseFactory<ReplicationResult>;
pub type IndexResponseFactory = JsonResponseFactory<IndexResult>;
pub type IndexListResponseFactory = JsonResponseFactory<IndexList>;
pub type SearchResponseFactory = JsonResponseFactory<SearchResult>;

/// Full document; `_id`, `_rev` and `_conflicts` are lifted out of the body.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentResponseFactory;

impl ResponseFactory for DocumentResponseFactory {
    type Content = Document;

    fn materialize(&self, response: &HttpResponse) -> Result<Document> {
        Document::from_json(&response.body)
    }
}

/// `HEAD` on a document has no body: the id comes from the request and the
/// revision from the `ETag` header.
#[derive(Debug, Clone)]
pub struct HeadDocumentResponseFactory {
    id: String,
}

impl HeadDocumentResponseFactory {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

impl ResponseFactory for HeadDocumentResponseFactory {
    type Content = DocumentHeader;

    fn materialize(&self, response: &HttpResponse) -> Result<DocumentHeader> {
        let rev = response
            .etag()
            .ok_or_else(|| CouchError::Mapping("missing etag header".to_string()))?;
        Ok(DocumentHeader {
            id: self.id.clone(),
            rev: rev.to_string(),
        })
    }
}

/// `normal` and `longpoll` feeds answer with one JSON object. A `continuous`
/// feed is one change per line followed by a closing `{"last_seq": ..}` line.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangesResponseFactory {
    feed: ChangesFeed,
}

impl ChangesResponseFactory {
    pub fn new(feed: ChangesFeed) -> Self {
        Self { feed }
    }
}

impl ResponseFactory for ChangesResponseFactory {
    type Content = ChangesResult;

    fn materialize(&self, response: &HttpResponse) -> Result<ChangesResult> {
        if self.feed != ChangesFeed::Continuous {
            return from_json(&response.body);
        }

        let mut result = ChangesResult {
            results: Vec::new(),
            last_seq: serde_json::Value::Null,
            pending: None,
        };
        for line in response.body.lines().map(str::trim).filter(|l| !l.is_empty()) {
            let value: serde_json::Value = from_json(line)?;
            if let Some(last_seq) = value.get("last_seq") {
                result.last_seq = last_seq.clone();
                result.pending = value.get("pending").and_then(|p| p.as_u64());
                continue;
            }
            let row: ChangeRow =
                serde_json::from_value(value).map_err(|e| CouchError::Mapping(e.to_string()))?;
            result.results.push(row);
        }
        Ok(result)
    }
}
