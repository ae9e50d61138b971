//! View query options and the fluent configurator that fills them.
//!
//! `QueryParameters` is shared by view and list queries. Its query string is
//! emitted in a fixed order regardless of the order options were set, with
//! caller-supplied additional parameters appended last.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ensure_has_items, ensure_not_blank, CouchError, Result};
use crate::serialization::to_value;
use crate::url::QueryString;

/// Allow results from a stale view to be used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stale {
    Ok,
    UpdateAfter,
}

impl Stale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stale::Ok => "ok",
            Stale::UpdateAfter => "update_after",
        }
    }
}

pub(crate) mod key_names {
    pub const INCLUDE_DOCS: &str = "include_docs";
    pub const DESCENDING: &str = "descending";
    pub const REDUCE: &str = "reduce";
    pub const INCLUSIVE_END: &str = "inclusive_end";
    pub const UPDATE_SEQ: &str = "update_seq";
    pub const GROUP: &str = "group";
    pub const GROUP_LEVEL: &str = "group_level";
    pub const STALE: &str = "stale";
    pub const KEY: &str = "key";
    pub const START_KEY: &str = "startkey";
    pub const START_KEY_DOC_ID: &str = "startkey_docid";
    pub const END_KEY: &str = "endkey";
    pub const END_KEY_DOC_ID: &str = "endkey_docid";
    pub const LIMIT: &str = "limit";
    pub const SKIP: &str = "skip";
}

/// Optional view query options. `None` means "omit from the query string".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryParameters {
    pub include_docs: Option<bool>,
    pub descending: Option<bool>,
    pub reduce: Option<bool>,
    pub inclusive_end: Option<bool>,
    pub update_seq: Option<bool>,
    pub group: Option<bool>,
    pub group_level: Option<u32>,
    pub stale: Option<Stale>,
    pub key: Option<Value>,
    pub keys: Option<Vec<Value>>,
    pub start_key: Option<Value>,
    pub start_key_doc_id: Option<String>,
    pub end_key: Option<Value>,
    pub end_key_doc_id: Option<String>,
    pub limit: Option<u64>,
    pub skip: Option<u64>,
    /// Extra parameters, emitted after all recognized ones in insertion order.
    pub additional: Vec<(String, Value)>,
}

impl QueryParameters {
    pub fn configure(&mut self) -> QueryParametersConfigurator<'_> {
        QueryParametersConfigurator::new(self)
    }

    pub fn has_keys(&self) -> bool {
        self.keys.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Renders every populated option as `?k=v&...`, or an empty string.
    pub fn to_query_string(&self) -> Result<String> {
        use key_names::*;

        let mut qs = QueryString::new();
        let flags = [
            (INCLUDE_DOCS, self.include_docs),
            (DESCENDING, self.descending),
            (REDUCE, self.reduce),
            (INCLUSIVE_END, self.inclusive_end),
            (UPDATE_SEQ, self.update_seq),
            (GROUP, self.group),
        ];
        for (name, flag) in flags {
            if let Some(flag) = flag {
                qs.push_json(name, &Value::Bool(flag))?;
            }
        }
        if let Some(level) = self.group_level {
            qs.push_json(GROUP_LEVEL, &Value::from(level))?;
        }
        if let Some(stale) = self.stale {
            qs.push_raw(STALE, stale.as_str())?;
        }
        if let Some(key) = &self.key {
            qs.push_json(KEY, key)?;
        }
        if let Some(start_key) = &self.start_key {
            qs.push_json(START_KEY, start_key)?;
        }
        if let Some(doc_id) = non_blank(&self.start_key_doc_id) {
            qs.push_raw(START_KEY_DOC_ID, doc_id)?;
        }
        if let Some(end_key) = &self.end_key {
            qs.push_json(END_KEY, end_key)?;
        }
        if let Some(doc_id) = non_blank(&self.end_key_doc_id) {
            qs.push_raw(END_KEY_DOC_ID, doc_id)?;
        }
        if let Some(limit) = self.limit {
            qs.push_json(LIMIT, &Value::from(limit))?;
        }
        if let Some(skip) = self.skip {
            qs.push_json(SKIP, &Value::from(skip))?;
        }
        for (name, value) in &self.additional {
            qs.push_json(name, value)?;
        }
        Ok(qs.to_string())
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Fluent, validating writer over a borrowed [`QueryParameters`].
///
/// Setters that cannot fail return `&mut Self`; validating setters return
/// `Result<&mut Self>` so a chain continues with `?`:
///
/// ```
/// # use couch_core::{QueryParameters, Stale};
/// # fn main() -> couch_core::Result<()> {
/// let mut params = QueryParameters::default();
/// params
///     .configure()
///     .stale(Stale::UpdateAfter)
///     .complex_start_key(&["artist", "a"])?
///     .limit(10);
/// assert_eq!(params.limit, Some(10));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct QueryParametersConfigurator<'a> {
    parameters: &'a mut QueryParameters,
}

impl<'a> QueryParametersConfigurator<'a> {
    pub fn new(parameters: &'a mut QueryParameters) -> Self {
        Self { parameters }
    }

    pub fn stale(&mut self, value: Stale) -> &mut Self {
        self.parameters.stale = Some(value);
        self
    }

    /// Include the full content of the documents in the result.
    pub fn include_docs(&mut self, value: bool) -> &mut Self {
        self.parameters.include_docs = Some(value);
        self
    }

    pub fn descending(&mut self, value: bool) -> &mut Self {
        self.parameters.descending = Some(value);
        self
    }

    /// Return only rows matching `value`.
    pub fn key<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<&mut Self> {
        let value = scalar_key(value)?;
        self.set_key(value)
    }

    /// Return only rows matching the complex key `value`.
    pub fn complex_key<T: Serialize>(&mut self, value: &[T]) -> Result<&mut Self> {
        ensure_has_items("value", value)?;
        self.set_key(to_value(value)?)
    }

    /// Return only rows matching any of `values`.
    pub fn keys<T: Serialize>(&mut self, values: &[T]) -> Result<&mut Self> {
        ensure_has_items("value", values)?;
        let keys = values.iter().map(to_value).collect::<Result<Vec<_>>>()?;
        self.parameters.keys = Some(keys);
        Ok(self)
    }

    pub fn start_key<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<&mut Self> {
        let value = scalar_key(value)?;
        self.set_start_key(value)
    }

    pub fn complex_start_key<T: Serialize>(&mut self, value: &[T]) -> Result<&mut Self> {
        ensure_has_items("value", value)?;
        self.set_start_key(to_value(value)?)
    }

    pub fn start_key_doc_id(&mut self, value: &str) -> Result<&mut Self> {
        ensure_not_blank("value", value)?;
        self.parameters.start_key_doc_id = Some(value.to_string());
        Ok(self)
    }

    /// Stop returning rows once `value` is reached.
    pub fn end_key<T: Serialize + ?Sized>(&mut self, value: &T) -> Result<&mut Self> {
        let value = scalar_key(value)?;
        self.set_end_key(value)
    }

    pub fn complex_end_key<T: Serialize>(&mut self, value: &[T]) -> Result<&mut Self> {
        ensure_has_items("value", value)?;
        self.set_end_key(to_value(value)?)
    }

    pub fn end_key_doc_id(&mut self, value: &str) -> Result<&mut Self> {
        ensure_not_blank("value", value)?;
        self.parameters.end_key_doc_id = Some(value.to_string());
        Ok(self)
    }

    /// Whether the end key itself is part of the result.
    pub fn inclusive_end(&mut self, value: bool) -> &mut Self {
        self.parameters.inclusive_end = Some(value);
        self
    }

    pub fn skip(&mut self, value: u64) -> &mut Self {
        self.parameters.skip = Some(value);
        self
    }

    pub fn limit(&mut self, value: u64) -> &mut Self {
        self.parameters.limit = Some(value);
        self
    }

    pub fn reduce(&mut self, value: bool) -> &mut Self {
        self.parameters.reduce = Some(value);
        self
    }

    /// Include the update sequence in the result.
    pub fn update_seq(&mut self, value: bool) -> &mut Self {
        self.parameters.update_seq = Some(value);
        self
    }

    /// Reduce to a set of distinct keys rather than a single row.
    pub fn group(&mut self, value: bool) -> &mut Self {
        self.parameters.group = Some(value);
        self
    }

    pub fn group_level(&mut self, value: u32) -> &mut Self {
        self.parameters.group_level = Some(value);
        self
    }

    /// Appends a parameter the server understands but this type does not model.
    pub fn additional<T: Serialize + ?Sized>(&mut self, key: &str, value: &T) -> Result<&mut Self> {
        ensure_not_blank("key", key)?;
        let value = to_value(value)?;
        self.parameters.additional.push((key.to_string(), value));
        Ok(self)
    }

    fn set_key(&mut self, value: Value) -> Result<&mut Self> {
        self.parameters.key = Some(not_null(value)?);
        Ok(self)
    }

    fn set_start_key(&mut self, value: Value) -> Result<&mut Self> {
        self.parameters.start_key = Some(not_null(value)?);
        Ok(self)
    }

    fn set_end_key(&mut self, value: Value) -> Result<&mut Self> {
        self.parameters.end_key = Some(not_null(value)?);
        Ok(self)
    }
}

fn scalar_key<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    let value = to_value(value)?;
    match &value {
        Value::String(s) => ensure_not_blank("value", s)?,
        Value::Array(items) if items.is_empty() => {
            return Err(CouchError::invalid("value", "must contain at least one item"));
        }
        _ => {}
    }
    Ok(value)
}

fn not_null(value: Value) -> Result<Value> {
    if value.is_null() {
        return Err(CouchError::invalid("value", "must not be null"));
    }
    Ok(value)
}
