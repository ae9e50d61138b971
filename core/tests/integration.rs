//! Document lifecycle test against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the request and
//! response factories over real HTTP using ureq. No `Connection` is
//! involved: the test plays the host that performs the I/O itself.

use chrono::{DateTime, TimeZone, Utc};
use couch_core::factories::{
    ChangesHttpRequestFactory, DatabaseHttpRequestFactory, DocumentHttpRequestFactory,
    HttpRequestFactory, ViewHttpRequestFactory,
};
use couch_core::responses::{
    ChangesResponseFactory, DocumentHeaderResponseFactory, DocumentResponseFactory,
    HeadDocumentResponseFactory, TextResponseFactory, ViewQueryResponseFactory,
};
use couch_core::{
    ChangesFeed, CopyDocumentRequest, DeleteDocumentRequest, GetChangesRequest,
    GetDocumentRequest, HeadDocumentRequest, HttpMethod, HttpRequest, HttpResponse,
    PostDocumentRequest, PutDatabaseRequest, PutDocumentRequest, QueryViewRequest,
    ResponseFactory,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, PartialEq)]
struct Album {
    title: String,
    released: DateTime<Utc>,
}

/// Execute an `HttpRequest` against `base` using ureq and return an
/// `HttpResponse`.
///
/// Disables ureq's automatic status-code-as-error behavior so 4xx/5xx
/// responses are returned as data rather than `Err`, letting the response
/// factories handle status interpretation.
fn execute(base: &str, req: HttpRequest) -> HttpResponse {
    let agent = ureq::Agent::config_builder()
        .http_status_as_error(false)
        .allow_non_standard_methods(true)
        .build()
        .new_agent();

    let mut builder = ureq::http::Request::builder()
        .method(req.method.as_str())
        .uri(req.url(base));
    for (name, value) in &req.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    let mut response = match req.body {
        Some(body) => agent.run(builder.body(body).unwrap()),
        None => agent.run(builder.body(()).unwrap()),
    }
    .expect("HTTP transport error");

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .map(|(name, value)| (name.to_string(), value.to_str().unwrap_or_default().to_string()))
        .collect();
    let body = response.body_mut().read_to_string().unwrap_or_default();

    HttpResponse {
        status,
        headers,
        body,
    }
}

fn start_mock() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_couch::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

fn put(base: &str, id: &str, content: &str) -> String {
    let req = DocumentHttpRequestFactory
        .create(&PutDocumentRequest::new(id, content))
        .unwrap();
    let res = DocumentHeaderResponseFactory::new()
        .create(execute(base, req))
        .unwrap();
    assert!(res.is_success(), "put {id}: {:?}", res.error);
    res.content.unwrap().rev
}

#[test]
fn document_lifecycle() {
    // Step 1: start mock server and create the database.
    let server = start_mock();
    let db = format!("{server}/albums");
    let req = DatabaseHttpRequestFactory::for_server(&server)
        .create(&PutDatabaseRequest::new("albums"))
        .unwrap();
    let res = TextResponseFactory.create(execute(&server, req)).unwrap();
    assert_eq!(res.status, 201);

    // Step 2: create a document with a server-assigned id.
    let album = Album {
        title: "Integration".to_string(),
        released: Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap(),
    };
    let req = DocumentHttpRequestFactory
        .create(&PostDocumentRequest::new(serde_json::to_string(&album).unwrap()))
        .unwrap();
    let created = DocumentHeaderResponseFactory::new()
        .create(execute(&db, req))
        .unwrap();
    assert_eq!(created.status, 201);
    let header = created.content.unwrap();
    assert!(header.rev.starts_with("1-"));
    let id = header.id;

    // Step 3: HEAD reads the revision from the ETag.
    let req = DocumentHttpRequestFactory
        .create(&HeadDocumentRequest::new(&id))
        .unwrap();
    assert_eq!(req.method, HttpMethod::Head);
    let head = HeadDocumentResponseFactory::new(&id)
        .create(execute(&db, req))
        .unwrap();
    assert_eq!(head.content.unwrap().rev, header.rev);

    // Step 4: GET returns the body with metadata.
    let req = DocumentHttpRequestFactory
        .create(&GetDocumentRequest::new(&id))
        .unwrap();
    let doc = DocumentResponseFactory.create(execute(&db, req)).unwrap();
    let doc = doc.content.unwrap();
    assert_eq!(doc.id, id);
    assert_eq!(doc.rev, header.rev);
    assert_eq!(doc.content_as::<Album>().unwrap(), album);

    // Step 5: an update without the current revision conflicts.
    let req = DocumentHttpRequestFactory
        .create(&PutDocumentRequest::new(&id, r#"{"title":"Stale"}"#))
        .unwrap();
    let conflict = DocumentHeaderResponseFactory::new()
        .create(execute(&db, req))
        .unwrap();
    assert!(!conflict.is_success());
    assert_eq!(conflict.status, 409);
    assert_eq!(conflict.error.as_deref(), Some("conflict"));
    assert!(conflict.content.is_none());

    // Step 6: update with the revision.
    let updated = serde_json::to_string(&Album {
        title: "Integration II".to_string(),
        ..album
    })
    .unwrap();
    let req = DocumentHttpRequestFactory
        .create(&PutDocumentRequest::new(&id, updated).with_rev(&header.rev))
        .unwrap();
    let res = DocumentHeaderResponseFactory::new()
        .create(execute(&db, req))
        .unwrap();
    let rev2 = res.content.unwrap().rev;
    assert!(rev2.starts_with("2-"));

    // Step 7: copy to a new id, including one that needs escaping.
    let req = DocumentHttpRequestFactory
        .create(&CopyDocumentRequest::new(&id, "copy"))
        .unwrap();
    let res = DocumentHeaderResponseFactory::new()
        .create(execute(&db, req))
        .unwrap();
    assert_eq!(res.content.unwrap().id, "copy");

    let req = DocumentHttpRequestFactory
        .create(&CopyDocumentRequest::new(&id, "copy of/1"))
        .unwrap();
    let res = DocumentHeaderResponseFactory::new()
        .create(execute(&db, req))
        .unwrap();
    assert_eq!(res.content.unwrap().id, "copy of/1");
    let req = DocumentHttpRequestFactory
        .create(&GetDocumentRequest::new("copy of/1"))
        .unwrap();
    let copied = DocumentResponseFactory.create(execute(&db, req)).unwrap();
    assert_eq!(copied.content.unwrap().content_as::<Album>().unwrap().title, "Integration II");

    // Step 8: delete, then the document is gone.
    let req = DocumentHttpRequestFactory
        .create(&DeleteDocumentRequest::new(&id, &rev2))
        .unwrap();
    let res = DocumentHeaderResponseFactory::new()
        .create(execute(&db, req))
        .unwrap();
    assert!(res.is_success());

    let req = DocumentHttpRequestFactory
        .create(&GetDocumentRequest::new(&id))
        .unwrap();
    let missing = DocumentResponseFactory.create(execute(&db, req)).unwrap();
    assert_eq!(missing.status, 404);
    assert_eq!(missing.error.as_deref(), Some("not_found"));
    assert_eq!(missing.reason.as_deref(), Some("deleted"));
}

#[test]
fn view_keyed_by_datetime() {
    let server = start_mock();
    let db = format!("{server}/albums");
    let req = DatabaseHttpRequestFactory::for_db(&server, "albums")
        .create(&PutDatabaseRequest::new("albums"))
        .unwrap();
    assert!(TextResponseFactory.create(execute(&server, req)).unwrap().is_success());

    put(&db, "_design/albums", r#"{"views":{"by_released":{"map":"function(doc){}"}}}"#);
    let dates = [
        Utc.with_ymd_and_hms(2001, 5, 1, 0, 0, 0).unwrap(),
        Utc.with_ymd_and_hms(2010, 8, 9, 12, 30, 0).unwrap(),
        Utc.with_ymd_and_hms(2020, 2, 29, 23, 59, 59).unwrap(),
    ];
    for (i, released) in dates.iter().enumerate() {
        let album = Album {
            title: format!("Album {i}"),
            released: *released,
        };
        put(&db, &format!("album-{i}"), &serde_json::to_string(&album).unwrap());
    }

    // Exact key.
    let mut query = QueryViewRequest::new("albums", "by_released");
    query.configure().key(&dates[1]).unwrap();
    let req = ViewHttpRequestFactory.create(&query).unwrap();
    let res = ViewQueryResponseFactory::new().create(execute(&db, req)).unwrap();
    let rows = res.content.unwrap().rows;
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id.as_deref(), Some("album-1"));

    // Range with docs included, newest first.
    let mut query = QueryViewRequest::new("albums", "by_released");
    query
        .configure()
        .start_key(&dates[2])
        .unwrap()
        .end_key(&dates[1])
        .unwrap()
        .descending(true)
        .include_docs(true);
    let req = ViewHttpRequestFactory.create(&query).unwrap();
    let res = ViewQueryResponseFactory::new().create(execute(&db, req)).unwrap();
    let rows = res.content.unwrap().rows;
    let titles: Vec<String> = rows
        .iter()
        .map(|row| row.doc_as::<Album>().unwrap().unwrap().title)
        .collect();
    assert_eq!(titles, ["Album 2", "Album 1"]);

    // Multiple keys switch to POST.
    let mut query = QueryViewRequest::new("albums", "by_released");
    query.configure().keys(&[dates[0], dates[2]]).unwrap();
    let req = ViewHttpRequestFactory.create(&query).unwrap();
    assert_eq!(req.method, HttpMethod::Post);
    let res = ViewQueryResponseFactory::new().create(execute(&db, req)).unwrap();
    assert_eq!(res.content.unwrap().rows.len(), 2);
}

#[test]
fn continuous_changes_feed() {
    let server = start_mock();
    let db = format!("{server}/feed");
    let req = DatabaseHttpRequestFactory::for_server(&server)
        .create(&PutDatabaseRequest::new("feed"))
        .unwrap();
    execute(&server, req);

    put(&db, "a", "{}");
    put(&db, "b", "{}");

    let mut changes = GetChangesRequest::new(ChangesFeed::Continuous);
    changes.since = Some("0".to_string());
    let req = ChangesHttpRequestFactory.create(&changes).unwrap();
    let res = ChangesResponseFactory::new(ChangesFeed::Continuous)
        .create(execute(&db, req))
        .unwrap();
    let result = res.content.unwrap();
    let ids: Vec<&str> = result.results.iter().map(|row| row.id.as_str()).collect();
    assert_eq!(ids, ["a", "b"]);
    assert_eq!(result.last_seq, serde_json::json!(2));
}
