use axum::http::{self, Request, StatusCode};
use axum::routing::RouterIntoService;
use http_body_util::BodyExt;
use mock_couch::app;
use serde_json::{json, Value};
use tower::{Service, ServiceExt};

type App = RouterIntoService<String>;

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn request(method: &str, uri: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

async fn send(app: &mut App, req: Request<String>) -> axum::response::Response {
    ServiceExt::ready(app).await.unwrap().call(req).await.unwrap()
}

async fn app_with_db(name: &str) -> App {
    let mut app = app().into_service();
    let resp = send(&mut app, request("PUT", &format!("/{name}"))).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    app
}

// --- server ---

#[tokio::test]
async fn root_welcomes() {
    let resp = app().oneshot(request("GET", "/")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["couchdb"], "Welcome");
}

// --- databases ---

#[tokio::test]
async fn database_lifecycle() {
    let mut app = app_with_db("artists").await;

    let resp = send(&mut app, request("PUT", "/artists")).await;
    assert_eq!(resp.status(), StatusCode::PRECONDITION_FAILED);
    assert_eq!(body_json(resp).await["error"], "file_exists");

    let resp = send(&mut app, request("HEAD", "/artists")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(&mut app, request("GET", "/artists")).await;
    let info = body_json(resp).await;
    assert_eq!(info["db_name"], "artists");
    assert_eq!(info["doc_count"], 0);

    let resp = send(&mut app, request("DELETE", "/artists")).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(&mut app, request("GET", "/artists")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        body_json(resp).await,
        json!({"error": "not_found", "reason": "Database does not exist."})
    );
}

#[tokio::test]
async fn illegal_database_name_is_rejected() {
    let resp = app().oneshot(request("PUT", "/Artists")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(resp).await["error"], "illegal_database_name");
}

#[tokio::test]
async fn compact_requires_json_content_type() {
    let mut app = app_with_db("db").await;
    let resp = send(&mut app, request("POST", "/db/_compact")).await;
    assert_eq!(resp.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);

    let resp = send(&mut app, json_request("POST", "/db/_compact", "{}")).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let resp = send(&mut app, json_request("POST", "/db/_view_cleanup", "{}")).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
}

// --- documents ---

#[tokio::test]
async fn document_lifecycle() {
    let mut app = app_with_db("db").await;

    let resp = send(&mut app, json_request("POST", "/db", r#"{"_id":"a1","name":"Fake"}"#)).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = body_json(resp).await;
    assert_eq!(created["id"], "a1");
    let rev1 = created["rev"].as_str().unwrap().to_string();
    assert!(rev1.starts_with("1-"));

    let resp = send(&mut app, request("GET", "/db/a1")).await;
    let etag = resp.headers().get(http::header::ETAG).unwrap().to_str().unwrap();
    assert_eq!(etag, format!("\"{rev1}\""));
    let doc = body_json(resp).await;
    assert_eq!(doc, json!({"_id": "a1", "_rev": rev1, "name": "Fake"}));

    let resp = send(&mut app, json_request("PUT", "/db/a1", r#"{"name":"Stale"}"#)).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(resp).await["error"], "conflict");

    let resp = send(
        &mut app,
        json_request("PUT", &format!("/db/a1?rev={rev1}"), r#"{"name":"Updated"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let rev2 = body_json(resp).await["rev"].as_str().unwrap().to_string();
    assert!(rev2.starts_with("2-"));

    let resp = send(&mut app, request("DELETE", "/db/a1")).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = send(&mut app, request("DELETE", &format!("/db/a1?rev={rev2}"))).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = send(&mut app, request("GET", "/db/a1")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(resp).await["reason"], "deleted");
}

#[tokio::test]
async fn head_document_has_etag_and_no_body() {
    let mut app = app_with_db("db").await;
    send(&mut app, json_request("PUT", "/db/a1", r#"{"n":1}"#)).await;

    let resp = send(&mut app, request("HEAD", "/db/a1")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(http::header::ETAG).is_some());
    assert!(body_bytes(resp).await.is_empty());

    let resp = send(&mut app, request("HEAD", "/db/missing")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn batch_post_is_accepted_without_rev() {
    let mut app = app_with_db("db").await;
    let resp = send(&mut app, json_request("POST", "/db?batch=ok", r#"{"n":1}"#)).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let body = body_json(resp).await;
    assert!(body["id"].is_string());
    assert!(body.get("rev").is_none());
}

#[tokio::test]
async fn copy_uses_destination_header() {
    let mut app = app_with_db("db").await;
    send(&mut app, json_request("PUT", "/db/src", r#"{"n":1}"#)).await;

    let copy = Request::builder()
        .method("COPY")
        .uri("/db/src")
        .header("destination", "dst")
        .body(String::new())
        .unwrap();
    let resp = send(&mut app, copy).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(body_json(resp).await["id"], "dst");

    let resp = send(&mut app, request("GET", "/db/dst")).await;
    assert_eq!(body_json(resp).await["n"], 1);
}

#[tokio::test]
async fn design_documents_are_addressable() {
    let mut app = app_with_db("db").await;
    let resp = send(
        &mut app,
        json_request("PUT", "/db/_design/app", r#"{"views":{"by_name":{"map":"x"}}}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let resp = send(&mut app, request("GET", "/db/_design/app")).await;
    assert_eq!(body_json(resp).await["_id"], "_design/app");
}

// --- queries ---

#[tokio::test]
async fn all_docs_with_keys() {
    let mut app = app_with_db("db").await;
    for id in ["a", "b", "c"] {
        send(&mut app, json_request("PUT", &format!("/db/{id}"), "{}")).await;
    }

    let resp = send(&mut app, request("GET", "/db/_all_docs?limit=2")).await;
    let result = body_json(resp).await;
    assert_eq!(result["total_rows"], 3);
    assert_eq!(result["rows"].as_array().unwrap().len(), 2);

    let resp = send(
        &mut app,
        json_request("POST", "/db/_all_docs?include_docs=true", r#"{"keys":["c","x"]}"#),
    )
    .await;
    let rows = body_json(resp).await["rows"].clone();
    assert_eq!(rows[0]["doc"]["_id"], "c");
    assert_eq!(rows[1]["error"], "not_found");
}

#[tokio::test]
async fn view_and_list_over_a_field() {
    let mut app = app_with_db("db").await;
    send(
        &mut app,
        json_request(
            "PUT",
            "/db/_design/app",
            r#"{"views":{"by_name":{"map":"x"}},"lists":{"plain":"function(){}"}}"#,
        ),
    )
    .await;
    send(&mut app, json_request("PUT", "/db/a", r#"{"name":"Zed"}"#)).await;
    send(&mut app, json_request("PUT", "/db/b", r#"{"name":"Amy"}"#)).await;

    let resp = send(&mut app, request("GET", "/db/_design/app/_view/by_name?key=%22Amy%22")).await;
    let result = body_json(resp).await;
    assert_eq!(result["rows"], json!([{"id": "b", "key": "Amy", "value": 1}]));

    let resp = send(&mut app, request("GET", "/db/_design/app/_list/plain/by_name")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let text = body_bytes(resp).await;
    assert_eq!(&text[..], b"b: \"Amy\"\na: \"Zed\"\n");

    let resp = send(&mut app, request("GET", "/db/_design/app/_view/nope")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn continuous_changes_are_line_delimited() {
    let mut app = app_with_db("db").await;
    send(&mut app, json_request("PUT", "/db/a", "{}")).await;
    send(&mut app, json_request("PUT", "/db/b", "{}")).await;

    let resp = send(&mut app, request("GET", "/db/_changes?feed=continuous&since=1")).await;
    let text = String::from_utf8(body_bytes(resp).await.to_vec()).unwrap();
    let lines: Vec<Value> = text.lines().map(|l| serde_json::from_str(l).unwrap()).collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["id"], "b");
    assert_eq!(lines[1], json!({"last_seq": 2}));
}

// --- indexes ---

#[tokio::test]
async fn index_lifecycle() {
    let mut app = app_with_db("db").await;
    let definition = r#"{"index":{"fields":[{"name":"asc"}]},"ddoc":"by-name","name":"name-idx","type":"json"}"#;

    let resp = send(&mut app, json_request("POST", "/db/_index", definition)).await;
    assert_eq!(
        body_json(resp).await,
        json!({"result": "created", "id": "_design/by-name", "name": "name-idx"})
    );
    let resp = send(&mut app, json_request("POST", "/db/_index", definition)).await;
    assert_eq!(body_json(resp).await["result"], "exists");

    let resp = send(&mut app, request("GET", "/db/_index")).await;
    let list = body_json(resp).await;
    assert_eq!(list["total_rows"], 2);
    assert_eq!(list["indexes"][1]["ddoc"], "_design/by-name");

    let resp = send(&mut app, request("DELETE", "/db/_index/by-name/json/name-idx")).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = send(&mut app, request("DELETE", "/db/_index/by-name/json/name-idx")).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn index_without_fields_is_bad_request() {
    let mut app = app_with_db("db").await;
    let resp = send(&mut app, json_request("POST", "/db/_index", r#"{"index":{"fields":[]}}"#)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- replication ---

#[tokio::test]
async fn replicate_into_created_target() {
    let mut app = app_with_db("source").await;
    send(&mut app, json_request("PUT", "/source/a", r#"{"n":1}"#)).await;

    let resp = send(
        &mut app,
        json_request("POST", "/_replicate", r#"{"source":"source","target":"copy"}"#),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send(
        &mut app,
        json_request(
            "POST",
            "/_replicate",
            r#"{"source":"source","target":"copy","create_target":true}"#,
        ),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_json(resp).await["history"][0]["docs_written"], 1);

    let resp = send(&mut app, request("GET", "/copy/a")).await;
    assert_eq!(body_json(resp).await["n"], 1);
}

#[tokio::test]
async fn continuous_replication_can_be_cancelled() {
    let mut app = app_with_db("source").await;
    send(&mut app, request("PUT", "/target")).await;
    let body = r#"{"source":"source","target":"target","continuous":true}"#;

    let resp = send(&mut app, json_request("POST", "/_replicate", body)).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    let local_id = body_json(resp).await["_local_id"].clone();

    let cancel = r#"{"source":"source","target":"target","continuous":true,"cancel":true}"#;
    let resp = send(&mut app, json_request("POST", "/_replicate", cancel)).await;
    assert_eq!(body_json(resp).await["_local_id"], local_id);
    let resp = send(&mut app, json_request("POST", "/_replicate", cancel)).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
