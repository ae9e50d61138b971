use std::sync::Arc;

use super::execute;
use crate::connection::Connection;
use crate::error::Result;
use crate::factories::SearchHttpRequestFactory;
use crate::requests::SearchIndexRequest;
use crate::responses::{Response, SearchResponseFactory, SearchResult};

/// Cloudant search indexes.
pub struct Searches {
    connection: Arc<dyn Connection>,
    factory: SearchHttpRequestFactory,
}

impl Searches {
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self {
            connection,
            factory: SearchHttpRequestFactory,
        }
    }

    pub async fn search(&self, request: &SearchIndexRequest) -> Result<Response<SearchResult>> {
        let responses = SearchResponseFactory::new();
        execute(self.connection.as_ref(), &self.factory, request, &responses).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contexts::fake::FakeConnection;
    use crate::http::HttpResponse;

    #[tokio::test]
    async fn search_returns_rows_and_bookmark() {
        let conn = FakeConnection::new(
            "http://localhost:5984/db",
            vec![HttpResponse::new(
                200,
                r#"{"total_rows":1,"bookmark":"g1","rows":[{"id":"a","order":[1.0,0],"fields":{}}]}"#,
            )],
        );
        let request = SearchIndexRequest::new("views", "art").expression("kind:song");
        let res = Searches::new(conn.clone()).search(&request).await.unwrap();
        let result = res.content.unwrap();
        assert_eq!(result.bookmark.as_deref(), Some("g1"));
        assert_eq!(result.rows[0].id, "a");
        assert_eq!(conn.last().path, "/_design/views/_search/art?q=kind%3Asong");
    }
}
