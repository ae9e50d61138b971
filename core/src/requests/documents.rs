/// Checks whether a document exists and reads its current revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadDocumentRequest {
    pub id: String,
    pub rev: Option<String>,
}

impl HeadDocumentRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rev: None,
        }
    }

    pub fn with_rev(mut self, rev: impl Into<String>) -> Self {
        self.rev = Some(rev.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GetDocumentRequest {
    pub id: String,
    pub rev: Option<String>,
    /// Ask for the `_conflicts` member.
    pub conflicts: Option<bool>,
}

impl GetDocumentRequest {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rev: None,
            conflicts: None,
        }
    }

    pub fn with_rev(mut self, rev: impl Into<String>) -> Self {
        self.rev = Some(rev.into());
        self
    }
}

/// Creates a document with a server-assigned id (unless the JSON carries `_id`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDocumentRequest {
    pub content: String,
    /// `batch=ok`: the server acknowledges with 202 before the write is durable.
    pub batch: bool,
}

impl PostDocumentRequest {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            batch: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutDocumentRequest {
    pub id: String,
    pub rev: Option<String>,
    pub content: String,
    pub batch: bool,
}

impl PutDocumentRequest {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rev: None,
            content: content.into(),
            batch: false,
        }
    }

    pub fn with_rev(mut self, rev: impl Into<String>) -> Self {
        self.rev = Some(rev.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteDocumentRequest {
    pub id: String,
    pub rev: String,
    pub batch: bool,
}

impl DeleteDocumentRequest {
    pub fn new(id: impl Into<String>, rev: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            rev: rev.into(),
            batch: false,
        }
    }
}

/// Server-side copy of `src_id` to `new_id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyDocumentRequest {
    pub src_id: String,
    pub src_rev: Option<String>,
    pub new_id: String,
    /// Revision of an existing target document to overwrite.
    pub new_rev: Option<String>,
}

impl CopyDocumentRequest {
    pub fn new(src_id: impl Into<String>, new_id: impl Into<String>) -> Self {
        Self {
            src_id: src_id.into(),
            src_rev: None,
            new_id: new_id.into(),
            new_rev: None,
        }
    }
}
