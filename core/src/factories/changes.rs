use serde_json::Value;

use super::{request_for, HttpRequestFactory};
use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest};
use crate::requests::{ChangesFeed, GetChangesRequest};
use crate::url::QueryString;

/// `GET /_changes`. The default `normal` feed is not spelled out.
#[derive(Debug, Clone, Default)]
pub struct ChangesHttpRequestFactory;

impl HttpRequestFactory<GetChangesRequest> for ChangesHttpRequestFactory {
    fn create(&self, request: &GetChangesRequest) -> Result<HttpRequest> {
        let mut query = QueryString::new();
        if request.feed != ChangesFeed::Normal {
            query.push_raw("feed", request.feed.as_str())?;
        }
        if let Some(since) = request.since.as_deref().filter(|s| !s.trim().is_empty()) {
            query.push_raw("since", since)?;
        }
        if let Some(limit) = request.limit {
            query.push_json("limit", &Value::from(limit))?;
        }
        if let Some(descending) = request.descending {
            query.push_json("descending", &Value::Bool(descending))?;
        }
        if let Some(include_docs) = request.include_docs {
            query.push_json("include_docs", &Value::Bool(include_docs))?;
        }
        if let Some(heartbeat) = request.heartbeat {
            query.push_json("heartbeat", &Value::from(heartbeat))?;
        }
        if let Some(timeout) = request.timeout {
            query.push_json("timeout", &Value::from(timeout))?;
        }
        if let Some(filter) = request.filter.as_deref().filter(|f| !f.trim().is_empty()) {
            query.push_raw("filter", filter)?;
        }
        Ok(request_for::<GetChangesRequest>(
            HttpMethod::Get,
            format!("/_changes{query}"),
        ))
    }
}
