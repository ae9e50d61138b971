//! In-memory databases, documents and revisions.

use std::collections::{BTreeMap, HashMap};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

/// A CouchDB-style error: `{"error": .., "reason": ..}` with a status.
#[derive(Debug, Clone, PartialEq)]
pub struct Failure {
    pub status: StatusCode,
    pub error: &'static str,
    pub reason: String,
}

impl Failure {
    pub fn new(status: StatusCode, error: &'static str, reason: impl Into<String>) -> Self {
        Self {
            status,
            error,
            reason: reason.into(),
        }
    }

    pub fn not_found(reason: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", reason)
    }

    pub fn missing_db() -> Self {
        Self::not_found("Database does not exist.")
    }

    pub fn conflict() -> Self {
        Self::new(StatusCode::CONFLICT, "conflict", "Document update conflict.")
    }

    pub fn bad_request(reason: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "bad_request", reason)
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(json!({ "error": self.error, "reason": self.reason })),
        )
            .into_response()
    }
}

#[derive(Debug, Clone)]
pub struct Doc {
    pub rev: String,
    pub body: Map<String, Value>,
    pub deleted: bool,
    pub seq: u64,
}

impl Doc {
    /// The stored body with `_id` and `_rev` put back.
    pub fn to_json(&self, id: &str) -> Value {
        let mut body = Map::new();
        body.insert("_id".to_string(), Value::from(id));
        body.insert("_rev".to_string(), Value::from(self.rev.as_str()));
        for (k, v) in &self.body {
            body.insert(k.clone(), v.clone());
        }
        Value::Object(body)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    pub ddoc: String,
    pub name: String,
    pub kind: String,
    pub fields: Value,
}

#[derive(Debug, Default)]
pub struct Database {
    pub docs: BTreeMap<String, Doc>,
    pub update_seq: u64,
    pub indexes: Vec<Index>,
}

fn next_rev(previous: Option<&str>) -> String {
    let generation = previous
        .and_then(|rev| rev.split('-').next())
        .and_then(|n| n.parse::<u64>().ok())
        .unwrap_or(0);
    format!("{}-{}", generation + 1, Uuid::new_v4().simple())
}

/// Splits `_id`/`_rev` off a document body; other `_` members are dropped.
pub fn strip_meta(body: Map<String, Value>) -> (Option<String>, Option<String>, Map<String, Value>) {
    let mut id = None;
    let mut rev = None;
    let mut rest = Map::new();
    for (k, v) in body {
        match k.as_str() {
            "_id" => id = v.as_str().map(str::to_string),
            "_rev" => rev = v.as_str().map(str::to_string),
            k if k.starts_with('_') && k != "_deleted" => {}
            _ => {
                rest.insert(k, v);
            }
        }
    }
    (id, rev, rest)
}

impl Database {
    pub fn info(&self, name: &str) -> Value {
        let live = self.docs.values().filter(|d| !d.deleted).count();
        json!({
            "db_name": name,
            "doc_count": live,
            "doc_del_count": self.docs.len() - live,
            "update_seq": self.update_seq,
        })
    }

    pub fn get(&self, id: &str) -> Result<&Doc, Failure> {
        match self.docs.get(id) {
            Some(doc) if doc.deleted => Err(Failure::not_found("deleted")),
            Some(doc) => Ok(doc),
            None => Err(Failure::not_found("missing")),
        }
    }

    pub fn live_docs(&self) -> impl Iterator<Item = (&String, &Doc)> {
        self.docs.iter().filter(|(_, d)| !d.deleted)
    }

    /// Creates or updates `id`. An update must name the current revision.
    pub fn write(
        &mut self,
        id: &str,
        rev: Option<&str>,
        body: Map<String, Value>,
    ) -> Result<String, Failure> {
        let previous = match self.docs.get(id) {
            Some(doc) if !doc.deleted => {
                if rev != Some(doc.rev.as_str()) {
                    return Err(Failure::conflict());
                }
                Some(doc.rev.clone())
            }
            Some(doc) => Some(doc.rev.clone()),
            None if rev.is_some() => return Err(Failure::conflict()),
            None => None,
        };
        let deleted = body.get("_deleted").and_then(Value::as_bool).unwrap_or(false);
        let mut body = body;
        body.remove("_deleted");
        Ok(self.store(id, next_rev(previous.as_deref()), body, deleted))
    }

    pub fn delete(&mut self, id: &str, rev: &str) -> Result<String, Failure> {
        let doc = self.get(id)?;
        if doc.rev != rev {
            return Err(Failure::conflict());
        }
        let new_rev = next_rev(Some(rev));
        Ok(self.store(id, new_rev, Map::new(), true))
    }

    /// Stores a replicated revision as-is, unless the target already has it.
    pub fn replicate(&mut self, id: &str, doc: &Doc) -> bool {
        if self.docs.get(id).is_some_and(|d| d.rev == doc.rev) {
            return false;
        }
        self.store(id, doc.rev.clone(), doc.body.clone(), doc.deleted);
        true
    }

    fn store(&mut self, id: &str, rev: String, body: Map<String, Value>, deleted: bool) -> String {
        self.update_seq += 1;
        self.docs.insert(
            id.to_string(),
            Doc {
                rev: rev.clone(),
                body,
                deleted,
                seq: self.update_seq,
            },
        );
        rev
    }
}

/// Server state shared by all handlers.
#[derive(Debug, Default)]
pub struct Couch {
    pub dbs: RwLock<HashMap<String, Database>>,
    /// Running continuous replications: `source->target` to replication id.
    pub replications: RwLock<HashMap<String, String>>,
}

/// `[a-z][a-z0-9_$()+/-]*`, as CouchDB requires.
pub fn valid_db_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || "_$()+/-".contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn revisions_increase_and_updates_need_current_rev() {
        let mut db = Database::default();
        let rev1 = db.write("a", None, body(json!({"n": 1}))).unwrap();
        assert!(rev1.starts_with("1-"));
        assert_eq!(db.write("a", None, body(json!({"n": 2}))), Err(Failure::conflict()));
        let rev2 = db.write("a", Some(&rev1), body(json!({"n": 2}))).unwrap();
        assert!(rev2.starts_with("2-"));
        assert_eq!(db.update_seq, 2);
    }

    #[test]
    fn deleted_documents_are_not_found() {
        let mut db = Database::default();
        let rev = db.write("a", None, Map::new()).unwrap();
        let tombstone = db.delete("a", &rev).unwrap();
        assert!(tombstone.starts_with("2-"));
        assert_eq!(db.get("a").unwrap_err().reason, "deleted");
        assert_eq!(db.get("b").unwrap_err().reason, "missing");
        assert!(db.write("a", None, Map::new()).unwrap().starts_with("3-"));
    }

    #[test]
    fn to_json_restores_metadata() {
        let mut db = Database::default();
        let rev = db.write("a", None, body(json!({"name": "x"}))).unwrap();
        let json = db.get("a").unwrap().to_json("a");
        assert_eq!(json, json!({"_id": "a", "_rev": rev, "name": "x"}));
    }

    #[test]
    fn strip_meta_splits_id_and_rev() {
        let (id, rev, rest) = strip_meta(body(json!({"_id": "a", "_rev": "1-x", "_attachments": {}, "k": 1})));
        assert_eq!(id.as_deref(), Some("a"));
        assert_eq!(rev.as_deref(), Some("1-x"));
        assert_eq!(Value::Object(rest), json!({"k": 1}));
    }

    #[test]
    fn db_name_rules() {
        assert!(valid_db_name("artists"));
        assert!(valid_db_name("a1_$()+-/b"));
        assert!(!valid_db_name("Artists"));
        assert!(!valid_db_name("1db"));
        assert!(!valid_db_name(""));
    }
}
