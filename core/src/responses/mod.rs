//! Typed responses and the factories that materialize them.
//!
//! # Design
//! Success is decided purely from the transport status (2xx). A failure is a
//! normal value carrying the server's `error`/`reason`, never an `Err`; only
//! a 2xx body that does not match the operation's schema is reported as
//! [`CouchError::Mapping`](crate::CouchError::Mapping).

mod content;
mod factories;

pub use content::{
    ChangeRev, ChangeRow, ChangesResult, Document, DocumentHeader, IndexInfo, IndexList,
    IndexResult, ReplicationResult, SearchResult, SearchRow, ViewResult, ViewRow,
};
pub use factories::{
    ChangesResponseFactory, DocumentHeaderResponseFactory, DocumentResponseFactory,
    EmptyResponseFactory, HeadDocumentResponseFactory, IndexListResponseFactory,
    IndexResponseFactory, JsonResponseFactory, ReplicationResponseFactory, ResponseFactory,
    SearchResponseFactory, TextResponseFactory, ViewQueryResponseFactory,
};

use serde::Deserialize;

use crate::error::Result;
use crate::http::HttpResponse;

/// A materialized response: `content` on success, `error`/`reason` otherwise.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<C> {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub content: Option<C>,
    pub error: Option<String>,
    pub reason: Option<String>,
}

pub type TextResponse = Response<String>;
pub type DocumentHeaderResponse = Response<DocumentHeader>;
pub type DocumentResponse = Response<Document>;
pub type ViewQueryResponse = Response<ViewResult>;
pub type ChangesResponse = Response<ChangesResult>;
pub type ReplicationResponse = Response<ReplicationResult>;

impl<C> Response<C> {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn success(response: HttpResponse, content: C) -> Self {
        Self {
            status: response.status,
            headers: response.headers,
            content: Some(content),
            error: None,
            reason: None,
        }
    }

    fn failure(response: HttpResponse) -> Self {
        let (error, reason) = failure_details(&response);
        Self {
            status: response.status,
            headers: response.headers,
            content: None,
            error,
            reason,
        }
    }
}

impl<C: ResponseContent> Response<C> {
    /// True when there is no content or the content itself is empty.
    pub fn is_empty(&self) -> bool {
        self.content.as_ref().map_or(true, ResponseContent::is_empty)
    }
}

/// Emptiness of a success payload.
pub trait ResponseContent {
    fn is_empty(&self) -> bool {
        false
    }
}

impl ResponseContent for String {
    fn is_empty(&self) -> bool {
        self.trim().is_empty()
    }
}

impl ResponseContent for () {
    fn is_empty(&self) -> bool {
        true
    }
}

/// Dispatches on the status: `success` materializes 2xx bodies, anything
/// else becomes a failure response.
pub fn materialize<C>(
    response: HttpResponse,
    success: impl FnOnce(&HttpResponse) -> Result<C>,
) -> Result<Response<C>> {
    if response.is_success() {
        let content = success(&response)?;
        Ok(Response::success(response, content))
    } else {
        Ok(Response::failure(response))
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: Option<String>,
    reason: Option<String>,
}

/// `{"error", "reason"}` when the body carries them, else the raw body,
/// else the canonical status text.
fn failure_details(response: &HttpResponse) -> (Option<String>, Option<String>) {
    if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&response.body) {
        if envelope.error.is_some() || envelope.reason.is_some() {
            return (envelope.error, envelope.reason);
        }
    }
    let body = response.body.trim();
    if !body.is_empty() {
        return (Some(body.to_string()), None);
    }
    let canonical = http::StatusCode::from_u16(response.status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .map(str::to_string);
    (canonical, None)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(response: HttpResponse) -> TextResponse {
        TextResponseFactory.create(response).unwrap()
    }

    #[test]
    fn not_found_envelope_is_copied() {
        let res = text(HttpResponse::new(
            404,
            r#"{"error":"not_found","reason":"missing"}"#,
        ));
        assert!(!res.is_success());
        assert_eq!(res.status, 404);
        assert_eq!(res.error.as_deref(), Some("not_found"));
        assert_eq!(res.reason.as_deref(), Some("missing"));
        assert!(res.content.is_none());
        assert!(res.is_empty());
    }

    #[test]
    fn unparsable_failure_body_falls_back_to_text() {
        let res = text(HttpResponse::new(500, "upstream exploded"));
        assert_eq!(res.error.as_deref(), Some("upstream exploded"));
        assert!(res.reason.is_none());
    }

    #[test]
    fn empty_failure_body_falls_back_to_status_text() {
        let res = text(HttpResponse::new(404, ""));
        assert_eq!(res.error.as_deref(), Some("Not Found"));
    }

    #[test]
    fn json_without_envelope_falls_back_to_text() {
        let res = text(HttpResponse::new(400, r#"{"ok":false}"#));
        assert_eq!(res.error.as_deref(), Some(r#"{"ok":false}"#));
    }

    #[test]
    fn redirect_is_not_success() {
        let res = text(HttpResponse::new(304, ""));
        assert!(!res.is_success());
        assert_eq!(res.error.as_deref(), Some("Not Modified"));
    }

    #[test]
    fn headers_are_carried_over() {
        let res = text(HttpResponse::new(200, "{}").with_header("ETag", "\"1-a\""));
        assert_eq!(res.header("etag"), Some("\"1-a\""));
    }

    #[test]
    fn blank_text_is_empty() {
        assert!(text(HttpResponse::new(200, "  ")).is_empty());
        assert!(!text(HttpResponse::new(200, "{}")).is_empty());
    }
}
