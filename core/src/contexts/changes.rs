use std::sync::Arc;

use super::execute;
use crate::connection::Connection;
use crate::error::Result;
use crate::factories::ChangesHttpRequestFactory;
use crate::requests::{ChangesFeed, GetChangesRequest};
use crate::responses::{ChangesResponse, ChangesResponseFactory};

/// Reads the database changes feed. A `continuous` feed is read until the
/// server closes it, so pair it with `timeout`.
pub struct Changes {
    connection: Arc<dyn Connection>,
    factory: ChangesHttpRequestFactory,
}

impl Changes {
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self {
            connection,
            factory: ChangesHttpRequestFactory,
        }
    }

    pub async fn get(&self, feed: ChangesFeed) -> Result<ChangesResponse> {
        self.get_with(&GetChangesRequest::new(feed)).await
    }

    pub async fn get_with(&self, request: &GetChangesRequest) -> Result<ChangesResponse> {
        let responses = ChangesResponseFactory::new(request.feed);
        execute(self.connection.as_ref(), &self.factory, request, &responses).await
    }
}
