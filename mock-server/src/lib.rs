//! In-memory mock of the CouchDB HTTP API subset the client speaks.
//!
//! Databases, documents with revisions, `_all_docs`, views, list functions,
//! the changes feed, Mango index management, search and one-shot or
//! continuous `_replicate` between local databases. State lives for the
//! lifetime of the router.

pub mod query;
pub mod store;

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, delete, get, post},
    Json, Router,
};
use percent_encoding::percent_decode_str;
use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::net::TcpListener;
use tracing::{debug, info};
use uuid::Uuid;

use crate::query::ViewParams;
use crate::store::{strip_meta, valid_db_name, Couch, Failure};

pub type Shared = Arc<Couch>;
type Params = Query<HashMap<String, String>>;
type Reply = Result<Response, Failure>;

pub fn app() -> Router {
    let state: Shared = Arc::new(Couch::default());
    Router::new()
        .route("/", get(welcome))
        .route("/_replicate", post(replicate))
        .route(
            "/{db}",
            get(db_info).put(create_db).delete(delete_db).post(post_doc),
        )
        .route("/{db}/_compact", post(compact))
        .route("/{db}/_view_cleanup", post(compact))
        .route("/{db}/_all_docs", get(all_docs).post(all_docs))
        .route("/{db}/_changes", get(changes))
        .route("/{db}/_index", get(list_indexes).post(create_index))
        .route("/{db}/_index/{ddoc}/{kind}/{name}", delete(delete_index))
        .route("/{db}/_design/{ddoc}", any(design_doc))
        .route("/{db}/_design/{ddoc}/_view/{view}", get(query_view).post(query_view))
        .route(
            "/{db}/_design/{ddoc}/_list/{list}/{view}",
            get(query_list).post(query_list),
        )
        .route("/{db}/_design/{ddoc}/_search/{index}", get(search))
        .route("/{db}/{id}", any(document))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn reply(status: StatusCode, body: Value) -> Response {
    (status, Json(body)).into_response()
}

fn require_json(headers: &HeaderMap) -> Result<(), Failure> {
    let is_json = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/json"));
    if is_json {
        Ok(())
    } else {
        Err(Failure::new(
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            "bad_content_type",
            "Content-Type must be application/json",
        ))
    }
}

fn parse_object(body: &str) -> Result<Map<String, Value>, Failure> {
    match serde_json::from_str(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(Failure::bad_request("Document must be a JSON object")),
        Err(_) => Err(Failure::bad_request("invalid UTF-8 JSON")),
    }
}

async fn welcome() -> Json<Value> {
    Json(json!({ "couchdb": "Welcome", "version": "3.3.3", "vendor": { "name": "mock-couch" } }))
}

// --- databases ---

async fn db_info(State(couch): State<Shared>, Path(db): Path<String>) -> Reply {
    let dbs = couch.dbs.read().await;
    let database = dbs.get(&db).ok_or_else(Failure::missing_db)?;
    Ok(reply(StatusCode::OK, database.info(&db)))
}

async fn create_db(State(couch): State<Shared>, Path(db): Path<String>) -> Reply {
    if !valid_db_name(&db) {
        return Err(Failure::new(
            StatusCode::BAD_REQUEST,
            "illegal_database_name",
            format!("Name: '{db}'. Only lowercase characters (a-z), digits (0-9), and any of the characters _, $, (, ), +, -, and / are allowed. Must begin with a letter."),
        ));
    }
    let mut dbs = couch.dbs.write().await;
    if dbs.contains_key(&db) {
        return Err(Failure::new(
            StatusCode::PRECONDITION_FAILED,
            "file_exists",
            "The database could not be created, the file already exists.",
        ));
    }
    dbs.insert(db.clone(), Default::default());
    info!(db = %db, "database created");
    Ok(reply(StatusCode::CREATED, json!({ "ok": true })))
}

async fn delete_db(State(couch): State<Shared>, Path(db): Path<String>) -> Reply {
    let mut dbs = couch.dbs.write().await;
    dbs.remove(&db).ok_or_else(Failure::missing_db)?;
    info!(db = %db, "database deleted");
    Ok(reply(StatusCode::OK, json!({ "ok": true })))
}

/// `_compact` and `_view_cleanup`: accepted, nothing to do in memory.
async fn compact(State(couch): State<Shared>, Path(db): Path<String>, headers: HeaderMap) -> Reply {
    require_json(&headers)?;
    if !couch.dbs.read().await.contains_key(&db) {
        return Err(Failure::missing_db());
    }
    Ok(reply(StatusCode::ACCEPTED, json!({ "ok": true })))
}

// --- documents ---

async fn post_doc(
    State(couch): State<Shared>,
    Path(db): Path<String>,
    Query(params): Params,
    body: String,
) -> Reply {
    let (id, rev, content) = strip_meta(parse_object(&body)?);
    let id = id.unwrap_or_else(|| Uuid::new_v4().simple().to_string());
    let mut dbs = couch.dbs.write().await;
    let database = dbs.get_mut(&db).ok_or_else(Failure::missing_db)?;
    let rev = database.write(&id, rev.as_deref(), content)?;
    debug!(db = %db, id = %id, rev = %rev, "document created");
    if params.get("batch").is_some_and(|b| b == "ok") {
        return Ok(reply(StatusCode::ACCEPTED, json!({ "ok": true, "id": id })));
    }
    Ok(reply(StatusCode::CREATED, json!({ "ok": true, "id": id, "rev": rev })))
}

async fn design_doc(
    State(couch): State<Shared>,
    method: Method,
    Path((db, ddoc)): Path<(String, String)>,
    Query(params): Params,
    headers: HeaderMap,
    body: String,
) -> Reply {
    doc_op(&couch, method, &db, &format!("_design/{ddoc}"), &params, &headers, &body).await
}

async fn document(
    State(couch): State<Shared>,
    method: Method,
    Path((db, id)): Path<(String, String)>,
    Query(params): Params,
    headers: HeaderMap,
    body: String,
) -> Reply {
    doc_op(&couch, method, &db, &id, &params, &headers, &body).await
}

async fn doc_op(
    couch: &Couch,
    method: Method,
    db: &str,
    id: &str,
    params: &HashMap<String, String>,
    headers: &HeaderMap,
    body: &str,
) -> Reply {
    match method.as_str() {
        "GET" | "HEAD" => {
            let dbs = couch.dbs.read().await;
            let database = dbs.get(db).ok_or_else(Failure::missing_db)?;
            let doc = database.get(id)?;
            if params.get("rev").is_some_and(|rev| *rev != doc.rev) {
                return Err(Failure::not_found("missing"));
            }
            let etag = format!("\"{}\"", doc.rev);
            if method == Method::HEAD {
                return Ok((StatusCode::OK, [(header::ETAG, etag)]).into_response());
            }
            let mut json = doc.to_json(id);
            if params.get("conflicts").is_some_and(|c| c == "true") {
                json["_conflicts"] = json!([]);
            }
            Ok((StatusCode::OK, [(header::ETAG, etag)], Json(json)).into_response())
        }
        "PUT" => {
            let (_, body_rev, content) = strip_meta(parse_object(body)?);
            let rev = params.get("rev").cloned().or(body_rev);
            let mut dbs = couch.dbs.write().await;
            let database = dbs.get_mut(db).ok_or_else(Failure::missing_db)?;
            let rev = database.write(id, rev.as_deref(), content)?;
            debug!(db = %db, id = %id, rev = %rev, "document written");
            if params.get("batch").is_some_and(|b| b == "ok") {
                return Ok(reply(StatusCode::ACCEPTED, json!({ "ok": true, "id": id })));
            }
            Ok(reply(StatusCode::CREATED, json!({ "ok": true, "id": id, "rev": rev })))
        }
        "DELETE" => {
            let rev = params.get("rev").ok_or_else(Failure::conflict)?;
            let mut dbs = couch.dbs.write().await;
            let database = dbs.get_mut(db).ok_or_else(Failure::missing_db)?;
            let rev = database.delete(id, rev)?;
            debug!(db = %db, id = %id, "document deleted");
            Ok(reply(StatusCode::OK, json!({ "ok": true, "id": id, "rev": rev })))
        }
        "COPY" => {
            let destination = headers
                .get("destination")
                .and_then(|v| v.to_str().ok())
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Failure::bad_request("Destination header is mandatory for COPY."))?;
            let decode = |raw: &str| percent_decode_str(raw).decode_utf8_lossy().into_owned();
            let (new_id, new_rev) = match destination.split_once("?rev=") {
                Some((new_id, rev)) => (decode(new_id), Some(decode(rev))),
                None => (decode(destination), None),
            };
            let mut dbs = couch.dbs.write().await;
            let database = dbs.get_mut(db).ok_or_else(Failure::missing_db)?;
            let source = database.get(id)?;
            if params.get("rev").is_some_and(|rev| *rev != source.rev) {
                return Err(Failure::not_found("missing"));
            }
            let content = source.body.clone();
            let rev = database.write(&new_id, new_rev.as_deref(), content)?;
            Ok(reply(StatusCode::CREATED, json!({ "ok": true, "id": new_id, "rev": rev })))
        }
        _ => Err(Failure::new(
            StatusCode::METHOD_NOT_ALLOWED,
            "method_not_allowed",
            "Only DELETE,GET,HEAD,PUT,COPY allowed",
        )),
    }
}

// --- queries ---

async fn all_docs(
    State(couch): State<Shared>,
    Path(db): Path<String>,
    Query(params): Params,
    body: String,
) -> Reply {
    let view_params = ViewParams::parse(&params, &body)?;
    let dbs = couch.dbs.read().await;
    let database = dbs.get(&db).ok_or_else(Failure::missing_db)?;
    Ok(reply(StatusCode::OK, query::all_docs(database, &view_params)))
}

async fn query_view(
    State(couch): State<Shared>,
    Path((db, ddoc, view)): Path<(String, String, String)>,
    Query(params): Params,
    body: String,
) -> Reply {
    let view_params = ViewParams::parse(&params, &body)?;
    let dbs = couch.dbs.read().await;
    let database = dbs.get(&db).ok_or_else(Failure::missing_db)?;
    Ok(reply(StatusCode::OK, query::view(database, &ddoc, &view, &view_params)?))
}

async fn query_list(
    State(couch): State<Shared>,
    Path((db, ddoc, list, view)): Path<(String, String, String, String)>,
    Query(params): Params,
    body: String,
) -> Reply {
    let view_params = ViewParams::parse(&params, &body)?;
    let dbs = couch.dbs.read().await;
    let database = dbs.get(&db).ok_or_else(Failure::missing_db)?;
    let text = query::list(database, &ddoc, &list, &view, &view_params)?;
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, "text/plain")], text).into_response())
}

async fn changes(State(couch): State<Shared>, Path(db): Path<String>, Query(params): Params) -> Reply {
    let dbs = couch.dbs.read().await;
    let database = dbs.get(&db).ok_or_else(Failure::missing_db)?;
    let (rows, last_seq, pending) = query::changes(database, &params)?;

    if params.get("feed").is_some_and(|f| f == "continuous") {
        let mut out = String::new();
        for row in &rows {
            out.push_str(&row.to_string());
            out.push('\n');
        }
        out.push_str(&json!({ "last_seq": last_seq }).to_string());
        out.push('\n');
        return Ok((StatusCode::OK, [(header::CONTENT_TYPE, "application/json")], out).into_response());
    }
    Ok(reply(
        StatusCode::OK,
        json!({ "results": rows, "last_seq": last_seq, "pending": pending }),
    ))
}

async fn search(
    State(couch): State<Shared>,
    Path((db, ddoc, index)): Path<(String, String, String)>,
    Query(params): Params,
) -> Reply {
    let dbs = couch.dbs.read().await;
    let database = dbs.get(&db).ok_or_else(Failure::missing_db)?;
    Ok(reply(StatusCode::OK, query::search(database, &ddoc, &index, &params)?))
}

// --- indexes ---

#[derive(Deserialize)]
struct IndexDefinition {
    index: Option<Value>,
    ddoc: Option<String>,
    name: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

async fn create_index(
    State(couch): State<Shared>,
    Path(db): Path<String>,
    headers: HeaderMap,
    body: String,
) -> Reply {
    require_json(&headers)?;
    let definition: IndexDefinition =
        serde_json::from_str(&body).map_err(|_| Failure::bad_request("invalid UTF-8 JSON"))?;
    let fields = definition
        .index
        .as_ref()
        .and_then(|i| i.get("fields"))
        .filter(|f| f.as_array().is_some_and(|a| !a.is_empty()))
        .cloned()
        .ok_or_else(|| Failure::bad_request("Index definition must include a non-empty `fields` array."))?;

    let generated = Uuid::new_v4().simple().to_string();
    let ddoc = definition
        .ddoc
        .map(|d| d.strip_prefix("_design/").unwrap_or(&d).to_string())
        .unwrap_or_else(|| generated.clone());
    let name = definition.name.unwrap_or(generated);
    let kind = definition.kind.unwrap_or_else(|| "json".to_string());

    let mut dbs = couch.dbs.write().await;
    let database = dbs.get_mut(&db).ok_or_else(Failure::missing_db)?;
    let id = format!("_design/{ddoc}");
    if database.indexes.iter().any(|i| i.ddoc == ddoc && i.name == name) {
        return Ok(reply(StatusCode::OK, json!({ "result": "exists", "id": id, "name": name })));
    }
    database.indexes.push(store::Index {
        ddoc,
        name: name.clone(),
        kind,
        fields,
    });
    Ok(reply(StatusCode::OK, json!({ "result": "created", "id": id, "name": name })))
}

async fn list_indexes(State(couch): State<Shared>, Path(db): Path<String>) -> Reply {
    let dbs = couch.dbs.read().await;
    let database = dbs.get(&db).ok_or_else(Failure::missing_db)?;
    let mut indexes = vec![json!({
        "ddoc": null,
        "name": "_all_docs",
        "type": "special",
        "def": { "fields": [{ "_id": "asc" }] },
    })];
    indexes.extend(database.indexes.iter().map(|i| {
        json!({
            "ddoc": format!("_design/{}", i.ddoc),
            "name": i.name,
            "type": i.kind,
            "def": { "fields": i.fields },
        })
    }));
    Ok(reply(
        StatusCode::OK,
        json!({ "total_rows": indexes.len(), "indexes": indexes }),
    ))
}

async fn delete_index(
    State(couch): State<Shared>,
    Path((db, ddoc, kind, name)): Path<(String, String, String, String)>,
) -> Reply {
    let mut dbs = couch.dbs.write().await;
    let database = dbs.get_mut(&db).ok_or_else(Failure::missing_db)?;
    let before = database.indexes.len();
    database
        .indexes
        .retain(|i| !(i.ddoc == ddoc && i.kind == kind && i.name == name));
    if database.indexes.len() == before {
        return Err(Failure::not_found("Index not found"));
    }
    Ok(reply(StatusCode::OK, json!({ "ok": true })))
}

// --- replication ---

#[derive(Deserialize)]
struct Replication {
    source: String,
    target: String,
    #[serde(default)]
    create_target: bool,
    #[serde(default)]
    continuous: bool,
    #[serde(default)]
    cancel: bool,
    #[serde(default)]
    doc_ids: Vec<String>,
}

/// Replicates between local databases by name. A continuous replication
/// copies once and is remembered until cancelled.
async fn replicate(State(couch): State<Shared>, headers: HeaderMap, body: String) -> Reply {
    require_json(&headers)?;
    let request: Replication = serde_json::from_str(&body)
        .map_err(|_| Failure::bad_request("Replication request must have `source` and `target`."))?;
    let pair = format!("{}->{}", request.source, request.target);

    if request.cancel {
        let local_id = couch
            .replications
            .write()
            .await
            .remove(&pair)
            .ok_or_else(|| Failure::not_found("replication not found"))?;
        info!(replication = %pair, "continuous replication cancelled");
        return Ok(reply(StatusCode::OK, json!({ "ok": true, "_local_id": local_id })));
    }

    let mut dbs = couch.dbs.write().await;
    let source = dbs
        .get(&request.source)
        .ok_or_else(|| Failure::not_found(format!("Database {} does not exist.", request.source)))?;
    let docs: Vec<(String, store::Doc)> = source
        .docs
        .iter()
        .filter(|(id, _)| request.doc_ids.is_empty() || request.doc_ids.contains(id))
        .map(|(id, doc)| (id.clone(), doc.clone()))
        .collect();
    let source_seq = source.update_seq;

    if !dbs.contains_key(&request.target) {
        if !request.create_target || !valid_db_name(&request.target) {
            return Err(Failure::not_found(format!(
                "Database {} does not exist.",
                request.target
            )));
        }
        dbs.insert(request.target.clone(), Default::default());
    }
    let target = dbs.get_mut(&request.target).ok_or_else(Failure::missing_db)?;
    let written = docs.iter().filter(|(id, doc)| target.replicate(id, doc)).count();
    info!(replication = %pair, docs_written = written, "replication run");

    if request.continuous {
        let local_id = format!("{}+continuous", Uuid::new_v4().simple());
        couch.replications.write().await.insert(pair, local_id.clone());
        return Ok(reply(StatusCode::ACCEPTED, json!({ "ok": true, "_local_id": local_id })));
    }
    Ok(reply(
        StatusCode::OK,
        json!({
            "ok": true,
            "session_id": Uuid::new_v4().simple().to_string(),
            "source_last_seq": source_seq,
            "no_changes": written == 0,
            "history": [{ "docs_written": written, "docs_read": docs.len() }],
        }),
    ))
}
