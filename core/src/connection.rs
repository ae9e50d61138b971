//! The transport seam between contexts and the network.

use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use crate::config::ClientConfig;
use crate::error::{CouchError, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Executes one HTTP exchange. Any status, including 4xx/5xx, is a
/// successful exchange; `Err` means the transport itself failed.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Base address that relative request paths are resolved against.
    fn address(&self) -> &str;

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// `reqwest`-backed connection.
pub struct HttpConnection {
    address: String,
    client: reqwest::Client,
    credentials: Option<(String, String)>,
}

impl HttpConnection {
    pub fn new(address: impl Into<String>, config: &ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| CouchError::Transport(Box::new(e)))?;
        let credentials = match (&config.username, &config.password) {
            (Some(user), Some(pass)) => Some((user.clone(), pass.clone())),
            _ => None,
        };
        Ok(Self {
            address: address.into().trim_end_matches('/').to_string(),
            client,
            credentials,
        })
    }

    /// Connection bound to the configured database.
    pub fn for_db(config: &ClientConfig) -> Result<Self> {
        Self::new(config.db_address(), config)
    }

    /// Connection bound to the server root.
    pub fn for_server(config: &ClientConfig) -> Result<Self> {
        Self::new(config.address.clone(), config)
    }
}

fn to_method(method: HttpMethod) -> Result<reqwest::Method> {
    reqwest::Method::from_bytes(method.as_str().as_bytes())
        .map_err(|e| CouchError::Transport(Box::new(e)))
}

#[async_trait]
impl Connection for HttpConnection {
    fn address(&self) -> &str {
        &self.address
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let url = request.url(&self.address);
        trace!(method = %request.method, %url, "sending request");

        let mut builder = self.client.request(to_method(request.method)?, &url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some((user, pass)) = &self.credentials {
            builder = builder.basic_auth(user, Some(pass));
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| CouchError::Transport(Box::new(e)))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| CouchError::Transport(Box::new(e)))?;
        trace!(status, bytes = body.len(), "received response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}
