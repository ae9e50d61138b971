use std::sync::Arc;

use super::execute;
use crate::connection::Connection;
use crate::error::Result;
use crate::factories::{QueryListHttpRequestFactory, ViewHttpRequestFactory};
use crate::requests::{QueryListRequest, QueryViewRequest};
use crate::responses::{TextResponse, TextResponseFactory, ViewQueryResponse, ViewQueryResponseFactory};

pub struct Views {
    connection: Arc<dyn Connection>,
    views: ViewHttpRequestFactory,
    lists: QueryListHttpRequestFactory,
}

impl Views {
    pub fn new(connection: Arc<dyn Connection>) -> Self {
        Self {
            connection,
            views: ViewHttpRequestFactory,
            lists: QueryListHttpRequestFactory,
        }
    }

    pub async fn query(&self, request: &QueryViewRequest) -> Result<ViewQueryResponse> {
        let responses = ViewQueryResponseFactory::new();
        execute(self.connection.as_ref(), &self.views, request, &responses).await
    }

    /// Runs a list function; its output is returned as text since lists
    /// may render any content type.
    pub async fn query_list(&self, request: &QueryListRequest) -> Result<TextResponse> {
        execute(self.connection.as_ref(), &self.lists, request, &TextResponseFactory).await
    }
}
