use crate::query::Stale;

/// Addresses a Cloudant search index in a design document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchIndexIdentity {
    pub design_document: String,
    pub name: String,
}

/// Queries a search index with a Lucene expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchIndexRequest {
    pub index: SearchIndexIdentity,
    pub expression: Option<String>,
    pub stale: Option<Stale>,
    /// Paging token from a previous result. A page past the end comes back
    /// with no rows and the same bookmark.
    pub bookmark: Option<String>,
    /// Sort expressions, e.g. `-year<number>`.
    pub sort: Vec<String>,
    pub include_docs: Option<bool>,
    pub limit: Option<u64>,
}

impl SearchIndexRequest {
    pub fn new(design_document: impl Into<String>, index_name: impl Into<String>) -> Self {
        Self {
            index: SearchIndexIdentity {
                design_document: design_document.into(),
                name: index_name.into(),
            },
            expression: None,
            stale: None,
            bookmark: None,
            sort: Vec::new(),
            include_docs: None,
            limit: None,
        }
    }

    pub fn expression(mut self, expression: impl Into<String>) -> Self {
        self.expression = Some(expression.into());
        self
    }
}
