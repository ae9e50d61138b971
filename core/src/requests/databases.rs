use serde::Serialize;
use serde_json::Value;

macro_rules! db_request {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $name {
            pub db_name: String,
        }

        impl $name {
            pub fn new(db_name: impl Into<String>) -> Self {
                Self {
                    db_name: db_name.into(),
                }
            }
        }
    };
}

db_request!(
    /// Checks that a database exists.
    HeadDatabaseRequest
);
db_request!(
    /// Reads database information (doc count, update sequence, sizes).
    GetDatabaseRequest
);
db_request!(PutDatabaseRequest);
db_request!(DeleteDatabaseRequest);
db_request!(CompactDatabaseRequest);
db_request!(
    /// Removes index files no longer required by any design document.
    ViewCleanupRequest
);

/// Body of `POST /_replicate`.
///
/// Setting `cancel` on a request identical to a running continuous
/// replication stops it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicateDatabaseRequest {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub source: String,
    pub target: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create_target: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub continuous: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cancel: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub doc_ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proxy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query_params: Option<Value>,
}

impl ReplicateDatabaseRequest {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            id: None,
            source: source.into(),
            target: target.into(),
            create_target: None,
            continuous: None,
            cancel: None,
            doc_ids: Vec::new(),
            proxy: None,
            filter: None,
            query_params: None,
        }
    }
}
