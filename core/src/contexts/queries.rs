use std::sync::Arc;

use super::execute;
use crate::connection::Connection;
use crate::error::Result;
use crate::factories::IndexHttpRequestFactory;
use crate::requests::{DeleteIndexRequest, GetIndexesRequest, PostIndexRequest};
use crate::responses::{
    IndexList, IndexListResponseFactory, IndexResult, IndexResponseFactory, Response,
    TextResponse, TextResponseFactory,
};

/// Mango index management.
pub struct Queries {
    connection: Arc<dyn Connection>,
    factory: IndexHttpRequestFactory,
}

impl Queries {
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self {
            connection,
            factory: IndexHttpRequestFactory,
        }
    }

    pub async fn post_index(&self, request: &PostIndexRequest) -> Result<Response<IndexResult>> {
        let responses = IndexResponseFactory::new();
        execute(self.connection.as_ref(), &self.factory, request, &responses).await
    }

    pub async fn get_indexes(&self) -> Result<Response<IndexList>> {
        let responses = IndexListResponseFactory::new();
        execute(self.connection.as_ref(), &self.factory, &GetIndexesRequest, &responses).await
    }

    pub async fn delete_index(&self, request: &DeleteIndexRequest) -> Result<TextResponse> {
        execute(self.connection.as_ref(), &self.factory, request, &TextResponseFactory).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contexts::fake::FakeConnection;
    use crate::http::HttpResponse;
    use crate::requests::IndexField;
    use crate::CouchError;

    #[tokio::test]
    async fn post_index_reports_result() {
        let conn = FakeConnection::new(
            "http://localhost:5984/db",
            vec![HttpResponse::new(
                200,
                r#"{"result":"created","id":"_design/by-name","name":"name-idx"}"#,
            )],
        );
        let request = PostIndexRequest::new(vec![IndexField::new("name")]);
        let res = Queries::new(conn.clone()).post_index(&request).await.unwrap();
        assert_eq!(res.content.unwrap().result, "created");
        assert_eq!(
            conn.last().body.as_deref(),
            Some(r#"{"index":{"fields":[{"name":"asc"}]}}"#)
        );
    }

    #[tokio::test]
    async fn empty_fields_are_rejected_before_sending() {
        let conn = FakeConnection::new("http://localhost:5984/db", vec![]);
        let err = Queries::new(conn.clone())
            .post_index(&PostIndexRequest::new(Vec::new()))
            .await
            .unwrap_err();
        assert!(matches!(err, CouchError::InvalidArgument { name: "fields", .. }));
        assert!(conn.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn get_indexes_lists_definitions() {
        let conn = FakeConnection::new(
            "http://localhost:5984/db",
            vec![HttpResponse::new(
                200,
                r#"{"total_rows":1,"indexes":[{"ddoc":null,"name":"_all_docs","type":"special","def":{"fields":[{"_id":"asc"}]}}]}"#,
            )],
        );
        let res = Queries::new(conn).get_indexes().await.unwrap();
        let list = res.content.unwrap();
        assert_eq!(list.indexes[0].index_type, "special");
    }
}
