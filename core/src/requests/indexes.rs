use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// One field of a Mango index, serialized as `{"<name>": "asc"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexField {
    pub name: String,
    pub sort: SortDirection,
}

impl IndexField {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sort: SortDirection::Asc,
        }
    }

    pub fn desc(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sort: SortDirection::Desc,
        }
    }
}

impl Serialize for IndexField {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;

        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry(&self.name, &self.sort)?;
        map.end()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    Json,
    Text,
}

impl IndexType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexType::Json => "json",
            IndexType::Text => "text",
        }
    }
}

/// Creates a Mango index via `POST /_index`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostIndexRequest {
    /// Must contain at least one field.
    pub fields: Vec<IndexField>,
    pub design_document: Option<String>,
    pub index_type: Option<IndexType>,
    pub name: Option<String>,
}

impl PostIndexRequest {
    pub fn new(fields: Vec<IndexField>) -> Self {
        Self {
            fields,
            design_document: None,
            index_type: None,
            name: None,
        }
    }
}

/// Lists all Mango indexes of the database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetIndexesRequest;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteIndexRequest {
    pub design_document: String,
    pub name: String,
    pub index_type: IndexType,
}

impl DeleteIndexRequest {
    pub fn new(design_document: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            design_document: design_document.into(),
            name: name.into(),
            index_type: IndexType::Json,
        }
    }
}
