use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ResponseContent;
use crate::error::{CouchError, Result};

/// `{"id": .., "rev": ..}` as returned by writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentHeader {
    pub id: String,
    /// Empty for `batch=ok` writes, which are acknowledged before a revision exists.
    #[serde(default)]
    pub rev: String,
}

impl ResponseContent for DocumentHeader {
    fn is_empty(&self) -> bool {
        self.id.is_empty()
    }
}

/// A document as raw JSON plus the metadata pulled out of it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub id: String,
    pub rev: String,
    pub conflicts: Vec<String>,
    pub json: String,
}

impl Document {
    pub(crate) fn from_json(json: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct Meta {
            #[serde(rename = "_id")]
            id: String,
            #[serde(rename = "_rev")]
            rev: String,
            #[serde(rename = "_conflicts", default)]
            conflicts: Vec<String>,
        }

        let meta: Meta = crate::serialization::from_json(json)?;
        Ok(Self {
            id: meta.id,
            rev: meta.rev,
            conflicts: meta.conflicts,
            json: json.to_string(),
        })
    }

    /// Deserializes the document into `T`.
    pub fn content_as<T: DeserializeOwned>(&self) -> Result<T> {
        crate::serialization::from_json(&self.json)
    }
}

impl ResponseContent for Document {
    fn is_empty(&self) -> bool {
        self.json.trim().is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ViewRow {
    pub id: Option<String>,
    #[serde(default)]
    pub key: Value,
    #[serde(default)]
    pub value: Value,
    pub doc: Option<Value>,
    /// Set for rows of a keys query whose key matched nothing.
    pub error: Option<String>,
}

impl ViewRow {
    pub fn value_as<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.value.clone()).map_err(|e| CouchError::Mapping(e.to_string()))
    }

    pub fn doc_as<T: DeserializeOwned>(&self) -> Result<Option<T>> {
        self.doc
            .clone()
            .map(serde_json::from_value)
            .transpose()
            .map_err(|e| CouchError::Mapping(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ViewResult {
    pub total_rows: Option<u64>,
    pub offset: Option<u64>,
    pub update_seq: Option<Value>,
    pub rows: Vec<ViewRow>,
}

impl ResponseContent for ViewResult {
    fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ChangeRev {
    pub rev: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChangeRow {
    pub seq: Value,
    pub id: String,
    #[serde(default)]
    pub changes: Vec<ChangeRev>,
    #[serde(default)]
    pub deleted: bool,
    pub doc: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChangesResult {
    #[serde(default)]
    pub results: Vec<ChangeRow>,
    #[serde(default)]
    pub last_seq: Value,
    pub pending: Option<u64>,
}

impl ResponseContent for ChangesResult {
    fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReplicationResult {
    #[serde(default)]
    pub ok: bool,
    pub session_id: Option<String>,
    pub source_last_seq: Option<Value>,
    #[serde(default)]
    pub history: Vec<Value>,
    #[serde(default)]
    pub no_changes: bool,
    /// Id of a continuous replication, needed to cancel it.
    #[serde(rename = "_local_id")]
    pub local_id: Option<String>,
}

impl ResponseContent for ReplicationResult {}

/// Outcome of `POST /_index`: `result` is `created` or `exists`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IndexResult {
    pub result: String,
    pub id: Option<String>,
    pub name: Option<String>,
}

impl ResponseContent for IndexResult {}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexInfo {
    pub ddoc: Option<String>,
    pub name: String,
    #[serde(rename = "type")]
    pub index_type: String,
    #[serde(default)]
    pub def: Value,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IndexList {
    #[serde(default)]
    pub total_rows: u64,
    pub indexes: Vec<IndexInfo>,
}

impl ResponseContent for IndexList {
    fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchRow {
    pub id: String,
    #[serde(default)]
    pub order: Vec<Value>,
    #[serde(default)]
    pub fields: Value,
    pub doc: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub total_rows: u64,
    pub bookmark: Option<String>,
    #[serde(default)]
    pub rows: Vec<SearchRow>,
}

impl ResponseContent for SearchResult {
    fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn document_extracts_metadata() {
        let doc = Document::from_json(
            r#"{"_id":"a1","_rev":"2-b","_conflicts":["1-x"],"name":"Fake"}"#,
        )
        .unwrap();
        assert_eq!(doc.id, "a1");
        assert_eq!(doc.rev, "2-b");
        assert_eq!(doc.conflicts, vec!["1-x".to_string()]);
        let value: Value = doc.content_as().unwrap();
        assert_eq!(value["name"], "Fake");
    }

    #[test]
    fn document_without_id_is_a_mapping_error() {
        let err = Document::from_json(r#"{"name":"x"}"#).unwrap_err();
        assert!(matches!(err, CouchError::Mapping(_)));
    }

    #[test]
    fn view_row_typed_access() {
        let row: ViewRow = serde_json::from_value(json!({
            "id": "a1", "key": ["b", 1], "value": 3, "doc": {"n": 1}
        }))
        .unwrap();
        assert_eq!(row.value_as::<u32>().unwrap(), 3);
        let doc: Option<Value> = row.doc_as().unwrap();
        assert_eq!(doc, Some(json!({"n": 1})));
    }

    #[test]
    fn missing_key_row_carries_error() {
        let row: ViewRow = serde_json::from_value(json!({"key": "x", "error": "not_found"})).unwrap();
        assert!(row.id.is_none());
        assert_eq!(row.error.as_deref(), Some("not_found"));
    }
}
