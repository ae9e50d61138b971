//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! Requests and responses are plain data. Factories build `HttpRequest`
//! values and response factories consume `HttpResponse` values; the network
//! round-trip in between belongs to a [`Connection`](crate::Connection).
//!
//! `HttpRequest::path` is either relative to the connection address (the
//! usual case for document, view and index operations) or absolute (database
//! operations addressed through a `RequestUrlGenerator`). [`HttpRequest::url`]
//! resolves both forms against a base address.

use std::fmt;

/// Header names used by the factories.
pub mod headers {
    pub const ACCEPT: &str = "accept";
    pub const CONTENT_TYPE: &str = "content-type";
    pub const DESTINATION: &str = "destination";
    pub const ETAG: &str = "etag";
    /// Diagnostic tag naming the request value a `HttpRequest` was built from.
    pub const REQUEST_TYPE: &str = "x-couch-request-type";
}

/// Content types understood by the server.
pub mod content_types {
    pub const JSON: &str = "application/json";
    pub const HTML: &str = "text/html";
    pub const TEXT: &str = "text/plain";
}

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Copy,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Head => "HEAD",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Copy => "COPY",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Creates a request that accepts JSON and carries no body.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: vec![(headers::ACCEPT.to_string(), content_types::JSON.to_string())],
            body: None,
        }
    }

    /// Sets a header, replacing any previous value with the same name.
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn with_request_type(self, request_type: &str) -> Self {
        self.with_header(headers::REQUEST_TYPE, request_type)
    }

    pub fn with_accept(self, content_type: &str) -> Self {
        self.with_header(headers::ACCEPT, content_type)
    }

    pub fn with_json_content(mut self, body: String) -> Self {
        self.body = Some(body);
        self.with_header(headers::CONTENT_TYPE, content_types::JSON)
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Resolves `path` against `base`. Absolute paths are returned unchanged.
    pub fn url(&self, base: &str) -> String {
        if self.path.contains("://") {
            return self.path.clone();
        }
        let base = base.trim_end_matches('/');
        if self.path.is_empty() {
            return base.to_string();
        }
        if self.path.starts_with('?') {
            return format!("{base}{}", self.path);
        }
        format!("{base}/{}", self.path.trim_start_matches('/'))
    }
}

/// An HTTP response described as plain data.
///
/// Constructed by the transport after executing an `HttpRequest`, then
/// passed to a response factory for materialization.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.push((name.to_string(), value.into()));
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// The `ETag` header without its surrounding quotes.
    pub fn etag(&self) -> Option<&str> {
        self.header(headers::ETAG).map(|v| v.trim_matches('"'))
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}
