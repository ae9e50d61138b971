use super::{request_for, HttpRequestFactory};
use crate::error::{ensure_not_blank, Result};
use crate::http::{HttpMethod, HttpRequest};
use crate::requests::{
    CompactDatabaseRequest, DeleteDatabaseRequest, GetDatabaseRequest, HeadDatabaseRequest,
    PutDatabaseRequest, ReplicateDatabaseRequest, Request, ViewCleanupRequest,
};
use crate::serialization::to_json;
use crate::url::{
    join, AppendingRequestUrlGenerator, ConstantRequestUrlGenerator, RequestUrlGenerator,
};

/// Database-level operations. Produces absolute URLs through its
/// [`RequestUrlGenerator`]: constant when bound to one database, appending
/// when the database is named per call.
pub struct DatabaseHttpRequestFactory {
    url_generator: Box<dyn RequestUrlGenerator>,
}

impl DatabaseHttpRequestFactory {
    pub fn new(url_generator: Box<dyn RequestUrlGenerator>) -> Self {
        Self { url_generator }
    }

    /// Always addresses `db_name` on `address`.
    pub fn for_db(address: &str, db_name: &str) -> Self {
        Self::new(Box::new(ConstantRequestUrlGenerator::new(address, db_name)))
    }

    /// Addresses whichever database the request names.
    pub fn for_server(address: &str) -> Self {
        Self::new(Box::new(AppendingRequestUrlGenerator::new(address)))
    }

    fn db_url(&self, db_name: &str) -> Result<String> {
        ensure_not_blank("db_name", db_name)?;
        Ok(self.url_generator.generate(db_name))
    }

    fn simple<R: Request>(&self, method: HttpMethod, db_name: &str) -> Result<HttpRequest> {
        Ok(request_for::<R>(method, self.db_url(db_name)?))
    }
}

impl HttpRequestFactory<HeadDatabaseRequest> for DatabaseHttpRequestFactory {
    fn create(&self, request: &HeadDatabaseRequest) -> Result<HttpRequest> {
        self.simple::<HeadDatabaseRequest>(HttpMethod::Head, &request.db_name)
    }
}

impl HttpRequestFactory<GetDatabaseRequest> for DatabaseHttpRequestFactory {
    fn create(&self, request: &GetDatabaseRequest) -> Result<HttpRequest> {
        self.simple::<GetDatabaseRequest>(HttpMethod::Get, &request.db_name)
    }
}

impl HttpRequestFactory<PutDatabaseRequest> for DatabaseHttpRequestFactory {
    fn create(&self, request: &PutDatabaseRequest) -> Result<HttpRequest> {
        self.simple::<PutDatabaseRequest>(HttpMethod::Put, &request.db_name)
    }
}

impl HttpRequestFactory<DeleteDatabaseRequest> for DatabaseHttpRequestFactory {
    fn create(&self, request: &DeleteDatabaseRequest) -> Result<HttpRequest> {
        self.simple::<DeleteDatabaseRequest>(HttpMethod::Delete, &request.db_name)
    }
}

impl HttpRequestFactory<CompactDatabaseRequest> for DatabaseHttpRequestFactory {
    fn create(&self, request: &CompactDatabaseRequest) -> Result<HttpRequest> {
        let url = join(&self.db_url(&request.db_name)?, "_compact");
        Ok(request_for::<CompactDatabaseRequest>(HttpMethod::Post, url).with_json_content("{}".to_string()))
    }
}

impl HttpRequestFactory<ViewCleanupRequest> for DatabaseHttpRequestFactory {
    fn create(&self, request: &ViewCleanupRequest) -> Result<HttpRequest> {
        let url = join(&self.db_url(&request.db_name)?, "_view_cleanup");
        Ok(request_for::<ViewCleanupRequest>(HttpMethod::Post, url).with_json_content("{}".to_string()))
    }
}

/// `POST {server}/_replicate`.
pub struct ReplicationHttpRequestFactory {
    url_generator: AppendingRequestUrlGenerator,
}

impl ReplicationHttpRequestFactory {
    pub fn new(address: &str) -> Self {
        Self {
            url_generator: AppendingRequestUrlGenerator::new(address),
        }
    }
}

impl HttpRequestFactory<ReplicateDatabaseRequest> for ReplicationHttpRequestFactory {
    fn create(&self, request: &ReplicateDatabaseRequest) -> Result<HttpRequest> {
        ensure_not_blank("source", &request.source)?;
        ensure_not_blank("target", &request.target)?;
        let url = self.url_generator.generate("_replicate");
        Ok(request_for::<ReplicateDatabaseRequest>(HttpMethod::Post, url)
            .with_json_content(to_json(request)?))
    }
}
