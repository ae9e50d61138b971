use serde_json::{json, Map, Value};

use super::{request_for, HttpRequestFactory};
use crate::error::{ensure_has_items, ensure_not_blank, Result};
use crate::http::{HttpMethod, HttpRequest};
use crate::requests::{DeleteIndexRequest, GetIndexesRequest, PostIndexRequest};
use crate::serialization::{to_json, to_value};
use crate::url::UrlParam;

/// Mango index management: create, list and delete.
#[derive(Debug, Clone, Default)]
pub struct IndexHttpRequestFactory;

impl IndexHttpRequestFactory {
    /// `{"index": {"fields": [...]}, "ddoc": .., "type": .., "name": ..}`,
    /// the last three only when set.
    fn body(request: &PostIndexRequest) -> Result<Value> {
        ensure_has_items("fields", &request.fields)?;

        let mut body = Map::new();
        body.insert(
            "index".to_string(),
            json!({ "fields": to_value(&request.fields)? }),
        );
        if let Some(ddoc) = request.design_document.as_deref().filter(|d| !d.trim().is_empty()) {
            body.insert("ddoc".to_string(), Value::from(ddoc));
        }
        if let Some(index_type) = request.index_type {
            body.insert("type".to_string(), Value::from(index_type.as_str()));
        }
        if let Some(name) = request.name.as_deref().filter(|n| !n.trim().is_empty()) {
            body.insert("name".to_string(), Value::from(name));
        }
        Ok(Value::Object(body))
    }
}

impl HttpRequestFactory<PostIndexRequest> for IndexHttpRequestFactory {
    fn create(&self, request: &PostIndexRequest) -> Result<HttpRequest> {
        let body = to_json(&Self::body(request)?)?;
        Ok(request_for::<PostIndexRequest>(HttpMethod::Post, "/_index").with_json_content(body))
    }
}

impl HttpRequestFactory<GetIndexesRequest> for IndexHttpRequestFactory {
    fn create(&self, _request: &GetIndexesRequest) -> Result<HttpRequest> {
        Ok(request_for::<GetIndexesRequest>(HttpMethod::Get, "/_index"))
    }
}

impl HttpRequestFactory<DeleteIndexRequest> for IndexHttpRequestFactory {
    fn create(&self, request: &DeleteIndexRequest) -> Result<HttpRequest> {
        ensure_not_blank("design_document", &request.design_document)?;
        ensure_not_blank("name", &request.name)?;

        let ddoc = request
            .design_document
            .strip_prefix("_design/")
            .unwrap_or(&request.design_document);
        let path = format!(
            "/_index/{}/{}/{}",
            UrlParam::encode(ddoc),
            request.index_type.as_str(),
            UrlParam::encode(&request.name)
        );
        Ok(request_for::<DeleteIndexRequest>(HttpMethod::Delete, path))
    }
}
