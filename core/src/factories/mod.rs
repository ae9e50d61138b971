//! Builders turning typed request values into [`HttpRequest`]s.
//!
//! # Design
//! Each factory implements [`HttpRequestFactory`] once per request type it
//! handles, so the call site reads `factory.create(&request)` and the
//! request type picks the implementation. Factories only validate and
//! compose; they never perform I/O, and one request value always yields the
//! same `HttpRequest`.

mod changes;
mod databases;
mod documents;
mod indexes;
mod search;
mod views;

pub use changes::ChangesHttpRequestFactory;
pub use databases::{DatabaseHttpRequestFactory, ReplicationHttpRequestFactory};
pub use documents::DocumentHttpRequestFactory;
pub use indexes::IndexHttpRequestFactory;
pub use search::SearchHttpRequestFactory;
pub use views::{QueryListHttpRequestFactory, ViewHttpRequestFactory};

use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest};
use crate::requests::Request;

pub trait HttpRequestFactory<R: Request> {
    fn create(&self, request: &R) -> Result<HttpRequest>;
}

/// A bare request for `R`, tagged with its request-type header.
fn request_for<R: Request>(method: HttpMethod, path: impl Into<String>) -> HttpRequest {
    HttpRequest::new(method, path).with_request_type(R::TYPE_NAME)
}
