use super::{request_for, HttpRequestFactory};
use crate::error::{ensure_not_blank, Result};
use crate::http::{headers, HttpMethod, HttpRequest};
use crate::requests::{
    CopyDocumentRequest, DeleteDocumentRequest, GetDocumentRequest, HeadDocumentRequest,
    PostDocumentRequest, PutDocumentRequest,
};
use crate::url::{encode_doc_id, QueryString, UrlParam};

/// Document CRUD, addressed relative to the database.
#[derive(Debug, Clone, Default)]
pub struct DocumentHttpRequestFactory;

fn doc_path(id: &str, query: QueryString) -> String {
    format!("/{}{query}", encode_doc_id(id))
}

fn rev_query(rev: Option<&str>) -> Result<QueryString> {
    let mut query = QueryString::new();
    if let Some(rev) = rev.filter(|r| !r.trim().is_empty()) {
        query.push_raw("rev", rev)?;
    }
    Ok(query)
}

fn with_batch(mut query: QueryString, batch: bool) -> Result<QueryString> {
    if batch {
        query.push_raw("batch", "ok")?;
    }
    Ok(query)
}

impl HttpRequestFactory<HeadDocumentRequest> for DocumentHttpRequestFactory {
    fn create(&self, request: &HeadDocumentRequest) -> Result<HttpRequest> {
        ensure_not_blank("id", &request.id)?;
        let path = doc_path(&request.id, rev_query(request.rev.as_deref())?);
        Ok(request_for::<HeadDocumentRequest>(HttpMethod::Head, path))
    }
}

impl HttpRequestFactory<GetDocumentRequest> for DocumentHttpRequestFactory {
    fn create(&self, request: &GetDocumentRequest) -> Result<HttpRequest> {
        ensure_not_blank("id", &request.id)?;
        let mut query = rev_query(request.rev.as_deref())?;
        if let Some(conflicts) = request.conflicts {
            query.push_raw("conflicts", if conflicts { "true" } else { "false" })?;
        }
        Ok(request_for::<GetDocumentRequest>(
            HttpMethod::Get,
            doc_path(&request.id, query),
        ))
    }
}

impl HttpRequestFactory<PostDocumentRequest> for DocumentHttpRequestFactory {
    fn create(&self, request: &PostDocumentRequest) -> Result<HttpRequest> {
        ensure_not_blank("content", &request.content)?;
        let query = with_batch(QueryString::new(), request.batch)?;
        Ok(
            request_for::<PostDocumentRequest>(HttpMethod::Post, query.to_string())
                .with_json_content(request.content.clone()),
        )
    }
}

impl HttpRequestFactory<PutDocumentRequest> for DocumentHttpRequestFactory {
    fn create(&self, request: &PutDocumentRequest) -> Result<HttpRequest> {
        ensure_not_blank("id", &request.id)?;
        ensure_not_blank("content", &request.content)?;
        let query = with_batch(rev_query(request.rev.as_deref())?, request.batch)?;
        Ok(
            request_for::<PutDocumentRequest>(HttpMethod::Put, doc_path(&request.id, query))
                .with_json_content(request.content.clone()),
        )
    }
}

impl HttpRequestFactory<DeleteDocumentRequest> for DocumentHttpRequestFactory {
    fn create(&self, request: &DeleteDocumentRequest) -> Result<HttpRequest> {
        ensure_not_blank("id", &request.id)?;
        ensure_not_blank("rev", &request.rev)?;
        let query = with_batch(rev_query(Some(&request.rev))?, request.batch)?;
        Ok(request_for::<DeleteDocumentRequest>(
            HttpMethod::Delete,
            doc_path(&request.id, query),
        ))
    }
}

impl HttpRequestFactory<CopyDocumentRequest> for DocumentHttpRequestFactory {
    fn create(&self, request: &CopyDocumentRequest) -> Result<HttpRequest> {
        ensure_not_blank("src_id", &request.src_id)?;
        ensure_not_blank("new_id", &request.new_id)?;
        let destination = match request.new_rev.as_deref().filter(|r| !r.trim().is_empty()) {
            Some(rev) => format!("{}?rev={}", encode_doc_id(&request.new_id), UrlParam::encode(rev)),
            None => encode_doc_id(&request.new_id),
        };
        let path = doc_path(&request.src_id, rev_query(request.src_rev.as_deref())?);
        Ok(request_for::<CopyDocumentRequest>(HttpMethod::Copy, path)
            .with_header(headers::DESTINATION, destination))
    }
}
