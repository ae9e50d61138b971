//! View, changes and search evaluation over a [`Database`].
//!
//! Map functions are not executed. A view named `by_<field>` emits
//! `doc[field]` as key and `1` as value for every document that has the
//! field; a view whose definition carries a `reduce` sums those values. A
//! search query `field:value` matches documents whose field renders as
//! `value`; `*:*` matches everything.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde_json::{json, Value};

use crate::store::{Database, Doc, Failure};

/// CouchDB collation: null < false < true < numbers < strings < arrays < objects.
pub fn collate(a: &Value, b: &Value) -> Ordering {
    fn rank(v: &Value) -> u8 {
        match v {
            Value::Null => 0,
            Value::Bool(false) => 1,
            Value::Bool(true) => 2,
            Value::Number(_) => 3,
            Value::String(_) => 4,
            Value::Array(_) => 5,
            Value::Object(_) => 6,
        }
    }
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => x
            .iter()
            .zip(y.iter())
            .map(|(l, r)| collate(l, r))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or_else(|| x.len().cmp(&y.len())),
        _ => rank(a).cmp(&rank(b)),
    }
}

fn parse_json(name: &str, text: &str) -> Result<Value, Failure> {
    serde_json::from_str(text).map_err(|_| {
        Failure::new(
            axum::http::StatusCode::BAD_REQUEST,
            "query_parse_error",
            format!("Invalid JSON value for `{name}`."),
        )
    })
}

fn parse_bool(params: &HashMap<String, String>, name: &str) -> Option<bool> {
    params.get(name).map(|v| v == "true")
}

fn parse_number(params: &HashMap<String, String>, name: &str) -> Result<Option<usize>, Failure> {
    params
        .get(name)
        .map(|v| {
            v.parse::<usize>().map_err(|_| {
                Failure::new(
                    axum::http::StatusCode::BAD_REQUEST,
                    "query_parse_error",
                    format!("Invalid value for `{name}`."),
                )
            })
        })
        .transpose()
}

#[derive(Debug, Default)]
pub struct ViewParams {
    pub key: Option<Value>,
    pub keys: Option<Vec<Value>>,
    pub start_key: Option<Value>,
    pub end_key: Option<Value>,
    pub inclusive_end: bool,
    pub descending: bool,
    pub include_docs: bool,
    pub update_seq: bool,
    pub reduce: Option<bool>,
    pub group: bool,
    pub limit: Option<usize>,
    pub skip: usize,
}

impl ViewParams {
    /// Reads query-string options; `body` is a POSTed `{"keys": [...]}`.
    pub fn parse(params: &HashMap<String, String>, body: &str) -> Result<Self, Failure> {
        let json = |name: &str| params.get(name).map(|v| parse_json(name, v)).transpose();
        let mut keys = match json("keys")? {
            Some(Value::Array(keys)) => Some(keys),
            Some(_) => return Err(Failure::bad_request("`keys` must be an array")),
            None => None,
        };
        if !body.trim().is_empty() {
            let body = parse_json("body", body)?;
            match body.get("keys") {
                Some(Value::Array(k)) => keys = Some(k.clone()),
                _ => return Err(Failure::bad_request("`keys` body must be an array")),
            }
        }
        Ok(Self {
            key: json("key")?,
            keys,
            start_key: json("startkey")?,
            end_key: json("endkey")?,
            inclusive_end: parse_bool(params, "inclusive_end").unwrap_or(true),
            descending: parse_bool(params, "descending").unwrap_or(false),
            include_docs: parse_bool(params, "include_docs").unwrap_or(false),
            update_seq: parse_bool(params, "update_seq").unwrap_or(false),
            reduce: parse_bool(params, "reduce"),
            group: parse_bool(params, "group").unwrap_or(false),
            limit: parse_number(params, "limit")?,
            skip: parse_number(params, "skip")?.unwrap_or(0),
        })
    }

    fn in_range(&self, key: &Value) -> bool {
        let (low, high) = if self.descending {
            (&self.end_key, &self.start_key)
        } else {
            (&self.start_key, &self.end_key)
        };
        let (low_inclusive, high_inclusive) = if self.descending {
            (self.inclusive_end, true)
        } else {
            (true, self.inclusive_end)
        };
        let above = match low {
            Some(low) => match collate(key, low) {
                Ordering::Greater => true,
                Ordering::Equal => low_inclusive,
                Ordering::Less => false,
            },
            None => true,
        };
        let below = match high {
            Some(high) => match collate(key, high) {
                Ordering::Less => true,
                Ordering::Equal => high_inclusive,
                Ordering::Greater => false,
            },
            None => true,
        };
        above && below
    }
}

#[derive(Debug, Clone)]
pub struct Row {
    pub id: String,
    pub key: Value,
    pub value: Value,
    pub doc: Value,
}

impl Row {
    fn to_json(&self, include_docs: bool) -> Value {
        let mut row = json!({ "id": self.id, "key": self.key, "value": self.value });
        if include_docs {
            row["doc"] = self.doc.clone();
        }
        row
    }
}

/// Sorts, filters and pages `rows`. Returns the page and its offset.
fn select(mut rows: Vec<Row>, params: &ViewParams) -> (Vec<Row>, usize) {
    rows.sort_by(|a, b| collate(&a.key, &b.key).then_with(|| a.id.cmp(&b.id)));
    if params.descending {
        rows.reverse();
    }
    let total = rows.len();
    let selected: Vec<Row> = match (&params.keys, &params.key) {
        (Some(keys), _) => keys
            .iter()
            .flat_map(|k| rows.iter().filter(move |r| collate(&r.key, k) == Ordering::Equal))
            .cloned()
            .collect(),
        (None, Some(key)) => rows
            .iter()
            .filter(|r| collate(&r.key, key) == Ordering::Equal)
            .cloned()
            .collect(),
        (None, None) => rows.iter().filter(|r| params.in_range(&r.key)).cloned().collect(),
    };
    let offset = selected
        .first()
        .and_then(|first| rows.iter().position(|r| r.id == first.id && r.key == first.key))
        .unwrap_or(total)
        + params.skip;
    let page = selected
        .into_iter()
        .skip(params.skip)
        .take(params.limit.unwrap_or(usize::MAX))
        .collect();
    (page, offset.min(total))
}

fn view_result(db: &Database, total: usize, offset: usize, rows: Vec<Value>, params: &ViewParams) -> Value {
    let mut result = json!({ "total_rows": total, "offset": offset, "rows": rows });
    if params.update_seq {
        result["update_seq"] = Value::from(db.update_seq);
    }
    result
}

/// `_all_docs`: one row per live document keyed by id. With `keys`, a key
/// that matches nothing yields `{"key": .., "error": "not_found"}`.
pub fn all_docs(db: &Database, params: &ViewParams) -> Value {
    let rows: Vec<Row> = db
        .live_docs()
        .map(|(id, doc)| Row {
            id: id.clone(),
            key: Value::from(id.as_str()),
            value: json!({ "rev": doc.rev }),
            doc: doc.to_json(id),
        })
        .collect();
    let total = rows.len();

    if let Some(keys) = &params.keys {
        let found: Vec<Value> = keys
            .iter()
            .map(|key| {
                rows.iter()
                    .find(|r| &r.key == key)
                    .map(|r| r.to_json(params.include_docs))
                    .unwrap_or_else(|| json!({ "key": key, "error": "not_found" }))
            })
            .collect();
        return view_result(db, total, 0, found, params);
    }

    let (page, offset) = select(rows, params);
    let rows = page.iter().map(|r| r.to_json(params.include_docs)).collect();
    view_result(db, total, offset, rows, params)
}

fn design_doc<'a>(db: &'a Database, ddoc: &str) -> Result<&'a Doc, Failure> {
    db.get(&format!("_design/{ddoc}"))
}

/// `_design/{ddoc}/_view/{view}`.
pub fn view(db: &Database, ddoc: &str, view: &str, params: &ViewParams) -> Result<Value, Failure> {
    let definition = design_doc(db, ddoc)?
        .body
        .get("views")
        .and_then(|views| views.get(view))
        .ok_or_else(|| Failure::not_found("missing_named_view"))?;

    let field = view.strip_prefix("by_").unwrap_or(view);
    let rows: Vec<Row> = db
        .live_docs()
        .filter(|(id, _)| !id.starts_with("_design/"))
        .filter_map(|(id, doc)| {
            doc.body.get(field).map(|key| Row {
                id: id.clone(),
                key: key.clone(),
                value: Value::from(1),
                doc: doc.to_json(id),
            })
        })
        .collect();
    let total = rows.len();

    let reduces = definition.get("reduce").is_some() && params.reduce != Some(false);
    if reduces {
        let (page, _) = select(rows, &clone_range(params));
        let rows = if params.group {
            let mut groups: Vec<(Value, u64)> = Vec::new();
            for row in page {
                match groups.last_mut() {
                    Some((key, count)) if *key == row.key => *count += 1,
                    _ => groups.push((row.key, 1)),
                }
            }
            groups
                .into_iter()
                .map(|(key, count)| json!({ "key": key, "value": count }))
                .collect()
        } else {
            vec![json!({ "key": null, "value": page.len() })]
        };
        return Ok(json!({ "rows": rows }));
    }

    let (page, offset) = select(rows, params);
    let rows = page.iter().map(|r| r.to_json(params.include_docs)).collect();
    Ok(view_result(db, total, offset, rows, params))
}

/// The key selection of `params` without paging, for reductions.
fn clone_range(params: &ViewParams) -> ViewParams {
    ViewParams {
        key: params.key.clone(),
        keys: params.keys.clone(),
        start_key: params.start_key.clone(),
        end_key: params.end_key.clone(),
        inclusive_end: params.inclusive_end,
        descending: params.descending,
        ..ViewParams::default()
    }
}

/// `_design/{ddoc}/_list/{list}/{view}`: one `id: key` line per row.
pub fn list(
    db: &Database,
    ddoc: &str,
    list: &str,
    view_name: &str,
    params: &ViewParams,
) -> Result<String, Failure> {
    design_doc(db, ddoc)?
        .body
        .get("lists")
        .and_then(|lists| lists.get(list))
        .ok_or_else(|| Failure::not_found("missing list function"))?;
    let result = view(db, ddoc, view_name, params)?;
    let mut out = String::new();
    if let Some(rows) = result["rows"].as_array() {
        for row in rows {
            out.push_str(&format!("{}: {}\n", row["id"].as_str().unwrap_or(""), row["key"]));
        }
    }
    Ok(out)
}

/// The `since` sequence; `now` means the current update sequence.
pub fn since(db: &Database, params: &HashMap<String, String>) -> Result<u64, Failure> {
    match params.get("since").map(String::as_str) {
        None => Ok(0),
        Some("now") => Ok(db.update_seq),
        Some(seq) => seq
            .parse()
            .map_err(|_| Failure::bad_request("Malformed sequence supplied in 'since' parameter.")),
    }
}

/// Latest change per document after `since`, oldest first unless `descending`.
pub fn changes(db: &Database, params: &HashMap<String, String>) -> Result<(Vec<Value>, u64, usize), Failure> {
    let since = since(db, params)?;
    let include_docs = parse_bool(params, "include_docs").unwrap_or(false);
    let limit = parse_number(params, "limit")?.unwrap_or(usize::MAX);

    let mut changed: Vec<(&String, &Doc)> = db.docs.iter().filter(|(_, d)| d.seq > since).collect();
    changed.sort_by_key(|(_, d)| d.seq);
    if parse_bool(params, "descending").unwrap_or(false) {
        changed.reverse();
    }
    let pending = changed.len().saturating_sub(limit);

    let rows: Vec<Value> = changed
        .into_iter()
        .take(limit)
        .map(|(id, doc)| {
            let mut row = json!({ "seq": doc.seq, "id": id, "changes": [{ "rev": doc.rev }] });
            if doc.deleted {
                row["deleted"] = Value::Bool(true);
            }
            if include_docs {
                row["doc"] = doc.to_json(id);
            }
            row
        })
        .collect();
    let last_seq = rows
        .last()
        .and_then(|r| r["seq"].as_u64())
        .unwrap_or(db.update_seq);
    Ok((rows, last_seq, pending))
}

/// `_design/{ddoc}/_search/{index}`. The bookmark is the next offset.
pub fn search(db: &Database, ddoc: &str, index: &str, params: &HashMap<String, String>) -> Result<Value, Failure> {
    design_doc(db, ddoc)?
        .body
        .get("indexes")
        .and_then(|indexes| indexes.get(index))
        .ok_or_else(|| Failure::not_found("missing search index"))?;
    let q = params
        .get("q")
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| Failure::bad_request("Query must include a 'q' or 'query' argument"))?;
    let (field, expected) = q.split_once(':').unwrap_or(("*", "*"));
    let include_docs = parse_bool(params, "include_docs").unwrap_or(false);
    let limit = parse_number(params, "limit")?.unwrap_or(25);
    let start = params
        .get("bookmark")
        .and_then(|b| b.parse::<usize>().ok())
        .unwrap_or(0);

    let matched: Vec<(&String, &Doc)> = db
        .live_docs()
        .filter(|(id, _)| !id.starts_with("_design/"))
        .filter(|(_, doc)| {
            (field == "*" && expected == "*")
                || doc.body.get(field).is_some_and(|v| match v {
                    Value::String(s) => s == expected,
                    other => other.to_string() == expected,
                })
        })
        .collect();
    let rows: Vec<Value> = matched
        .iter()
        .enumerate()
        .skip(start)
        .take(limit)
        .map(|(i, (id, doc))| {
            let mut row = json!({ "id": id, "order": [1.0, i], "fields": {} });
            if include_docs {
                row["doc"] = doc.to_json(id);
            }
            row
        })
        .collect();
    let bookmark = (start + rows.len()).to_string();
    Ok(json!({ "total_rows": matched.len(), "bookmark": bookmark, "rows": rows }))
}
