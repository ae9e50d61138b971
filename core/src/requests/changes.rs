use serde::{Deserialize, Serialize};

/// How the server delivers the changes feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangesFeed {
    #[default]
    Normal,
    /// Waits for at least one change before answering.
    Longpoll,
    /// One JSON object per line until `timeout` elapses.
    Continuous,
}

impl ChangesFeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangesFeed::Normal => "normal",
            ChangesFeed::Longpoll => "longpoll",
            ChangesFeed::Continuous => "continuous",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GetChangesRequest {
    pub feed: ChangesFeed,
    /// Sequence to start after; `"now"` is accepted by the server.
    pub since: Option<String>,
    pub limit: Option<u64>,
    pub descending: Option<bool>,
    pub include_docs: Option<bool>,
    /// Milliseconds between empty lines on long-running feeds.
    pub heartbeat: Option<u64>,
    /// Milliseconds before a long-running feed is closed.
    pub timeout: Option<u64>,
    /// `design_doc/filter_name`.
    pub filter: Option<String>,
}

impl GetChangesRequest {
    pub fn new(feed: ChangesFeed) -> Self {
        Self {
            feed,
            ..Self::default()
        }
    }
}
