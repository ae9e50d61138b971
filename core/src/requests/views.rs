use crate::query::{QueryParameters, QueryParametersConfigurator};

/// Addresses a view: either one defined in a design document or `_all_docs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewIdentity {
    Design {
        design_document: String,
        name: String,
    },
    AllDocs,
}

impl ViewIdentity {
    pub fn new(design_document: impl Into<String>, name: impl Into<String>) -> Self {
        ViewIdentity::Design {
            design_document: design_document.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryViewRequest {
    pub view: ViewIdentity,
    pub params: QueryParameters,
}

impl QueryViewRequest {
    pub fn new(design_document: impl Into<String>, view_name: impl Into<String>) -> Self {
        Self {
            view: ViewIdentity::new(design_document, view_name),
            params: QueryParameters::default(),
        }
    }

    pub fn all_docs() -> Self {
        Self {
            view: ViewIdentity::AllDocs,
            params: QueryParameters::default(),
        }
    }

    pub fn configure(&mut self) -> QueryParametersConfigurator<'_> {
        self.params.configure()
    }
}

/// Addresses a list function in a design document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListIdentity {
    pub design_document: String,
    pub name: String,
}

/// Runs a list function over a view.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryListRequest {
    pub list: ListIdentity,
    pub view_name: String,
    pub params: QueryParameters,
    /// Overrides the `accept` header; list functions often render HTML.
    pub accept: Option<String>,
}

impl QueryListRequest {
    pub fn new(
        design_document: impl Into<String>,
        list_name: impl Into<String>,
        view_name: impl Into<String>,
    ) -> Self {
        Self {
            list: ListIdentity {
                design_document: design_document.into(),
                name: list_name.into(),
            },
            view_name: view_name.into(),
            params: QueryParameters::default(),
            accept: None,
        }
    }

    pub fn configure(&mut self) -> QueryParametersConfigurator<'_> {
        self.params.configure()
    }
}
