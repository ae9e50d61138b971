use serde_json::json;

use super::{request_for, HttpRequestFactory};
use crate::error::{ensure_not_blank, Result};
use crate::http::{HttpMethod, HttpRequest};
use crate::query::QueryParameters;
use crate::requests::{QueryListRequest, QueryViewRequest, Request, ViewIdentity};
use crate::serialization::to_json;

/// Builds view queries. Without keys the query is a GET; with keys it is a
/// POST carrying `{"keys": [...]}`.
#[derive(Debug, Clone, Default)]
pub struct ViewHttpRequestFactory;

impl HttpRequestFactory<QueryViewRequest> for ViewHttpRequestFactory {
    fn create(&self, request: &QueryViewRequest) -> Result<HttpRequest> {
        let path = match &request.view {
            ViewIdentity::Design {
                design_document,
                name,
            } => {
                ensure_not_blank("design_document", design_document)?;
                ensure_not_blank("view_name", name)?;
                format!("/_design/{design_document}/_view/{name}")
            }
            ViewIdentity::AllDocs => "/_all_docs".to_string(),
        };
        keyed_query::<QueryViewRequest>(path, &request.params)
    }
}

/// Builds list-function queries; same GET/POST switch as views.
#[derive(Debug, Clone, Default)]
pub struct QueryListHttpRequestFactory;

impl HttpRequestFactory<QueryListRequest> for QueryListHttpRequestFactory {
    fn create(&self, request: &QueryListRequest) -> Result<HttpRequest> {
        ensure_not_blank("design_document", &request.list.design_document)?;
        ensure_not_blank("list_name", &request.list.name)?;
        ensure_not_blank("view_name", &request.view_name)?;

        let path = format!(
            "/_design/{}/_list/{}/{}",
            request.list.design_document, request.list.name, request.view_name
        );
        let http_request = keyed_query::<QueryListRequest>(path, &request.params)?;
        Ok(match &request.accept {
            Some(accept) => http_request.with_accept(accept),
            None => http_request,
        })
    }
}

fn keyed_query<R: Request>(path: String, params: &QueryParameters) -> Result<HttpRequest> {
    let url = format!("{path}{}", params.to_query_string()?);
    match &params.keys {
        Some(keys) if !keys.is_empty() => {
            let body = to_json(&json!({ "keys": keys }))?;
            Ok(request_for::<R>(HttpMethod::Post, url).with_json_content(body))
        }
        _ => Ok(request_for::<R>(HttpMethod::Get, url)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::headers;
    use serde_json::json;

    fn list_request() -> QueryListRequest {
        QueryListRequest::new("foodesigndoc", "barlistname", "barviewname")
    }

    fn create(request: &QueryListRequest) -> HttpRequest {
        QueryListHttpRequestFactory.create(request).unwrap()
    }

    #[test]
    fn list_path_is_relative_to_the_database() {
        let req = create(&QueryListRequest::new("my_design_doc", "my_list", "my_view"));
        assert_eq!(req.path, "/_design/my_design_doc/_list/my_list/my_view");
    }

    #[test]
    fn unconfigured_list_has_no_body_nor_query_string() {
        let req = create(&list_request());
        assert_eq!(req.method, HttpMethod::Get);
        assert!(req.body.is_none());
        assert!(!req.path.contains('?'));
    }

    #[test]
    fn keys_switch_to_post_with_json_body() {
        let mut request = list_request();
        request
            .configure()
            .keys(&[
                json!("fake_key"),
                json!("Two"),
                json!(1),
                json!(3.14),
                json!(true),
                json!(false),
                json!(["complex1", 42]),
            ])
            .unwrap();
        let req = create(&request);
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(
            req.body.as_deref(),
            Some(r#"{"keys":["fake_key","Two",1,3.14,true,false,["complex1",42]]}"#)
        );
        assert_eq!(req.header(headers::CONTENT_TYPE), Some("application/json"));
    }

    #[test]
    fn empty_keys_stay_get_without_body() {
        let mut request = list_request();
        request.params.keys = Some(Vec::new());
        let req = create(&request);
        assert_eq!(req.method, HttpMethod::Get);
        assert!(req.body.is_none());
    }

    #[test]
    fn request_type_header_is_attached() {
        let req = create(&list_request());
        assert_eq!(req.header(headers::REQUEST_TYPE), Some("QueryListRequest"));
    }

    #[test]
    fn accept_overrides_default_header() {
        let mut request = list_request();
        request.accept = Some("text/html".to_string());
        let req = create(&request);
        assert_eq!(req.header(headers::ACCEPT), Some("text/html"));
    }

    #[test]
    fn blank_view_name_is_rejected() {
        let request = QueryListRequest::new("ddoc", "list", " ");
        assert!(QueryListHttpRequestFactory.create(&request).is_err());
    }

    #[test]
    fn design_view_path() {
        let mut request = QueryViewRequest::new("artists", "by_name");
        request.configure().limit(2);
        let req = ViewHttpRequestFactory.create(&request).unwrap();
        assert_eq!(req.path, "/_design/artists/_view/by_name?limit=2");
        assert_eq!(req.header(headers::REQUEST_TYPE), Some("QueryViewRequest"));
    }

    #[test]
    fn all_docs_path() {
        let mut request = QueryViewRequest::all_docs();
        request.configure().include_docs(true);
        let req = ViewHttpRequestFactory.create(&request).unwrap();
        assert_eq!(req.path, "/_all_docs?include_docs=true");
    }
}
