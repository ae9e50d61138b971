use std::sync::Arc;

use super::execute;
use crate::connection::Connection;
use crate::error::Result;
use crate::factories::{DatabaseHttpRequestFactory, ReplicationHttpRequestFactory};
use crate::requests::{
    CompactDatabaseRequest, DeleteDatabaseRequest, GetDatabaseRequest, HeadDatabaseRequest,
    PutDatabaseRequest, ReplicateDatabaseRequest, ViewCleanupRequest,
};
use crate::responses::{
    EmptyResponseFactory, ReplicationResponse, ReplicationResponseFactory, Response,
    TextResponse, TextResponseFactory,
};

/// Operations on the one database a db-scoped client is bound to.
pub struct Database {
    connection: Arc<dyn Connection>,
    db_name: String,
    factory: DatabaseHttpRequestFactory,
}

impl Database {
    /// `server_address` is the server root; `db_name` the bound database.
    pub fn new(connection: Arc<dyn Connection>, server_address: &str, db_name: &str) -> Self {
        Self {
            connection,
            db_name: db_name.to_string(),
            factory: DatabaseHttpRequestFactory::for_db(server_address, db_name),
        }
    }

    pub fn name(&self) -> &str {
        &self.db_name
    }

    /// Existence check: success iff the database exists.
    pub async fn head(&self) -> Result<Response<()>> {
        let request = HeadDatabaseRequest::new(self.db_name.as_str());
        execute(self.connection.as_ref(), &self.factory, &request, &EmptyResponseFactory).await
    }

    /// Database info as raw JSON.
    pub async fn get(&self) -> Result<TextResponse> {
        let request = GetDatabaseRequest::new(self.db_name.as_str());
        execute(self.connection.as_ref(), &self.factory, &request, &TextResponseFactory).await
    }

    pub async fn put(&self) -> Result<TextResponse> {
        let request = PutDatabaseRequest::new(self.db_name.as_str());
        execute(self.connection.as_ref(), &self.factory, &request, &TextResponseFactory).await
    }

    pub async fn delete(&self) -> Result<TextResponse> {
        let request = DeleteDatabaseRequest::new(self.db_name.as_str());
        execute(self.connection.as_ref(), &self.factory, &request, &TextResponseFactory).await
    }

    /// Starts compaction; the server answers 202 before it finishes.
    pub async fn compact(&self) -> Result<TextResponse> {
        let request = CompactDatabaseRequest::new(self.db_name.as_str());
        execute(self.connection.as_ref(), &self.factory, &request, &TextResponseFactory).await
    }

    pub async fn view_cleanup(&self) -> Result<TextResponse> {
        let request = ViewCleanupRequest::new(self.db_name.as_str());
        execute(self.connection.as_ref(), &self.factory, &request, &TextResponseFactory).await
    }
}

/// Server-level database management; every call names its database.
pub struct Databases {
    connection: Arc<dyn Connection>,
    factory: DatabaseHttpRequestFactory,
    replication: ReplicationHttpRequestFactory,
}

impl Databases {
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        let address = connection.address().to_string();
        Self {
            connection,
            factory: DatabaseHttpRequestFactory::for_server(&address),
            replication: ReplicationHttpRequestFactory::new(&address),
        }
    }

    pub async fn head(&self, db_name: &str) -> Result<Response<()>> {
        let request = HeadDatabaseRequest::new(db_name);
        execute(self.connection.as_ref(), &self.factory, &request, &EmptyResponseFactory).await
    }

    pub async fn get(&self, db_name: &str) -> Result<TextResponse> {
        let request = GetDatabaseRequest::new(db_name);
        execute(self.connection.as_ref(), &self.factory, &request, &TextResponseFactory).await
    }

    pub async fn put(&self, db_name: &str) -> Result<TextResponse> {
        let request = PutDatabaseRequest::new(db_name);
        execute(self.connection.as_ref(), &self.factory, &request, &TextResponseFactory).await
    }

    pub async fn delete(&self, db_name: &str) -> Result<TextResponse> {
        let request = DeleteDatabaseRequest::new(db_name);
        execute(self.connection.as_ref(), &self.factory, &request, &TextResponseFactory).await
    }

    pub async fn compact(&self, db_name: &str) -> Result<TextResponse> {
        let request = CompactDatabaseRequest::new(db_name);
        execute(self.connection.as_ref(), &self.factory, &request, &TextResponseFactory).await
    }

    pub async fn view_cleanup(&self, db_name: &str) -> Result<TextResponse> {
        let request = ViewCleanupRequest::new(db_name);
        execute(self.connection.as_ref(), &self.factory, &request, &TextResponseFactory).await
    }

    pub async fn replicate(&self, request: &ReplicateDatabaseRequest) -> Result<ReplicationResponse> {
        let responses = ReplicationResponseFactory::new();
        execute(self.connection.as_ref(), &self.replication, request, &responses).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contexts::fake::FakeConnection;
    use crate::http::{HttpMethod, HttpResponse};

    #[tokio::test]
    async fn bound_database_addresses_its_own_url() {
        let conn = FakeConnection::new(
            "http://localhost:5984/artists",
            vec![HttpResponse::new(200, ""), HttpResponse::new(202, r#"{"ok":true}"#)],
        );
        let db = Database::new(conn.clone(), "http://localhost:5984", "artists");
        assert!(db.head().await.unwrap().is_success());
        assert_eq!(conn.last().path, "http://localhost:5984/artists");

        let res = db.compact().await.unwrap();
        assert_eq!(res.status, 202);
        assert_eq!(conn.last().method, HttpMethod::Post);
        assert_eq!(conn.last().path, "http://localhost:5984/artists/_compact");
    }

    #[tokio::test]
    async fn missing_database_head_is_failure() {
        let conn = FakeConnection::new("http://localhost:5984", vec![HttpResponse::new(404, "")]);
        let res = Databases::new(conn).head("nope").await.unwrap();
        assert!(!res.is_success());
        assert_eq!(res.error.as_deref(), Some("Not Found"));
    }

    #[tokio::test]
    async fn replicate_continuous() {
        let conn = FakeConnection::new(
            "http://localhost:5984",
            vec![HttpResponse::new(202, r#"{"ok":true,"_local_id":"abc+continuous"}"#)],
        );
        let mut request = ReplicateDatabaseRequest::new("db1", "db2");
        request.continuous = Some(true);
        let res = Databases::new(conn.clone()).replicate(&request).await.unwrap();
        assert_eq!(res.content.unwrap().local_id.as_deref(), Some("abc+continuous"));
        assert_eq!(conn.last().path, "http://localhost:5984/_replicate");
    }
}
