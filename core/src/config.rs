use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::url::join;

/// Connection settings, usually read from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientConfig {
    #[serde(default = "default_address")]
    pub address: String,
    #[serde(default)]
    pub db_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_address() -> String {
    "http://localhost:5984".to_string()
}

fn default_timeout_secs() -> u64 {
    100
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            db_name: None,
            username: None,
            password: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl ClientConfig {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    pub fn with_db(mut self, db_name: impl Into<String>) -> Self {
        self.db_name = Some(db_name.into());
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    pub fn load(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = serde_json::from_str(&contents)?;
        Ok(config)
    }

    /// `{address}/{db_name}`, or the bare address when no database is set.
    pub fn db_address(&self) -> String {
        match self.db_name.as_deref().filter(|db| !db.trim().is_empty()) {
            Some(db) => join(&self.address, db),
            None => self.address.trim_end_matches('/').to_string(),
        }
    }
}
