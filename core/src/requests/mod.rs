//! Typed request values, one per API call.
//!
//! A request is built by the caller and read, never mutated, by the matching
//! [`HttpRequestFactory`](crate::factories::HttpRequestFactory).

mod changes;
mod databases;
mod documents;
mod indexes;
mod search;
mod views;

pub use changes::{ChangesFeed, GetChangesRequest};
pub use databases::{
    CompactDatabaseRequest, DeleteDatabaseRequest, GetDatabaseRequest, HeadDatabaseRequest,
    PutDatabaseRequest, ReplicateDatabaseRequest, ViewCleanupRequest,
};
pub use documents::{
    CopyDocumentRequest, DeleteDocumentRequest, GetDocumentRequest, HeadDocumentRequest,
    PostDocumentRequest, PutDocumentRequest,
};
pub use indexes::{
    DeleteIndexRequest, GetIndexesRequest, IndexField, IndexType, PostIndexRequest, SortDirection,
};
pub use search::{SearchIndexIdentity, SearchIndexRequest};
pub use views::{ListIdentity, QueryListRequest, QueryViewRequest, ViewIdentity};

/// Identifies a request value in the diagnostic request-type header.
pub trait Request {
    const TYPE_NAME: &'static str;
}

macro_rules! impl_request {
    ($($ty:ident),* $(,)?) => {
        $(
            impl Request for $ty {
                const TYPE_NAME: &'static str = stringify!($ty);
            }
        )*
    };
}

impl_request!(
    GetChangesRequest,
    HeadDatabaseRequest,
    GetDatabaseRequest,
    PutDatabaseRequest,
    DeleteDatabaseRequest,
    CompactDatabaseRequest,
    ViewCleanupRequest,
    ReplicateDatabaseRequest,
    HeadDocumentRequest,
    GetDocumentRequest,
    PostDocumentRequest,
    PutDocumentRequest,
    DeleteDocumentRequest,
    CopyDocumentRequest,
    PostIndexRequest,
    GetIndexesRequest,
    DeleteIndexRequest,
    SearchIndexRequest,
    QueryViewRequest,
    QueryListRequest,
);
