//! Client core for CouchDB-compatible document databases.
//!
//! # Overview
//! Typed request values are turned into plain [`HttpRequest`]s by request
//! factories, sent through a [`Connection`], and the resulting
//! [`HttpResponse`]s are materialized into typed [`Response`]s by response
//! factories. The async contexts ([`Documents`], [`Views`], [`Changes`],
//! [`Databases`], ...) wire the three steps together.
//!
//! # Design
//! - Factories are pure: the same request value always yields the same
//!   `HttpRequest`, and invalid input fails before any I/O.
//! - Non-2xx statuses are values, not errors. [`CouchError`] is reserved for
//!   invalid arguments, transport failures and unmappable success bodies.
//! - The transport is a trait so hosts can bring their own HTTP stack;
//!   [`HttpConnection`] is the `reqwest` implementation.
//!
//! ```
//! use couch_core::factories::{HttpRequestFactory, ViewHttpRequestFactory};
//! use couch_core::{HttpMethod, QueryViewRequest, Stale};
//!
//! let mut request = QueryViewRequest::new("artists", "albums");
//! request.configure().stale(Stale::UpdateAfter).limit(10);
//! let http = ViewHttpRequestFactory.create(&request).unwrap();
//! assert_eq!(http.method, HttpMethod::Get);
//! assert_eq!(http.path, "/_design/artists/_view/albums?stale=update_after&limit=10");
//! ```

pub mod client;
pub mod config;
pub mod connection;
pub mod contexts;
pub mod entity;
pub mod error;
pub mod factories;
pub mod http;
pub mod query;
pub mod requests;
pub mod responses;
pub mod serialization;
pub mod url;

pub use client::{DbClient, ServerClient};
pub use config::ClientConfig;
pub use connection::{Connection, HttpConnection};
pub use contexts::{Changes, Database, Databases, Documents, Entities, Queries, Searches, Views};
pub use entity::{Entity, EntityResponseFactory};
pub use error::{CouchError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use query::{QueryParameters, QueryParametersConfigurator, Stale};
pub use requests::{
    ChangesFeed, CompactDatabaseRequest, CopyDocumentRequest, DeleteDatabaseRequest,
    DeleteDocumentRequest, DeleteIndexRequest, GetChangesRequest, GetDatabaseRequest,
    GetDocumentRequest, GetIndexesRequest, HeadDatabaseRequest, HeadDocumentRequest, IndexField,
    IndexType, PostDocumentRequest, PostIndexRequest, PutDatabaseRequest, PutDocumentRequest,
    QueryListRequest, QueryViewRequest, ReplicateDatabaseRequest, SearchIndexRequest,
    SortDirection, ViewCleanupRequest,
};
pub use responses::{Response, ResponseFactory};
pub use url::{AppendingRequestUrlGenerator, ConstantRequestUrlGenerator, RequestUrlGenerator, UrlParam};
