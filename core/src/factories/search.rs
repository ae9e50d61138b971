use serde_json::Value;

use super::{request_for, HttpRequestFactory};
use crate::error::{ensure_not_blank, CouchError, Result};
use crate::http::{HttpMethod, HttpRequest};
use crate::requests::SearchIndexRequest;
use crate::serialization::to_value;
use crate::url::QueryString;

/// `GET /_design/{ddoc}/_search/{index}?q=...`.
#[derive(Debug, Clone, Default)]
pub struct SearchHttpRequestFactory;

impl HttpRequestFactory<SearchIndexRequest> for SearchHttpRequestFactory {
    fn create(&self, request: &SearchIndexRequest) -> Result<HttpRequest> {
        ensure_not_blank("design_document", &request.index.design_document)?;
        ensure_not_blank("index_name", &request.index.name)?;
        let expression = request
            .expression
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or_else(|| CouchError::invalid("expression", "must not be empty"))?;

        let mut query = QueryString::new();
        query.push_raw("q", expression)?;
        if !request.sort.is_empty() {
            query.push_json("sort", &to_value(&request.sort)?)?;
        }
        if let Some(bookmark) = request.bookmark.as_deref().filter(|b| !b.trim().is_empty()) {
            query.push_raw("bookmark", bookmark)?;
        }
        if let Some(stale) = request.stale {
            query.push_raw("stale", stale.as_str())?;
        }
        if let Some(include_docs) = request.include_docs {
            query.push_json("include_docs", &Value::Bool(include_docs))?;
        }
        if let Some(limit) = request.limit {
            query.push_json("limit", &Value::from(limit))?;
        }

        let path = format!(
            "/_design/{}/_search/{}{query}",
            request.index.design_document, request.index.name
        );
        Ok(request_for::<SearchIndexRequest>(HttpMethod::Get, path))
    }
}
