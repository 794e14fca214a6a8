//! Remote calls against a module's HTTP control endpoint
//!
//! [`ModuleApi`] is the request/response primitive the console runs on;
//! [`ModuleClient`] implements it over `reqwest`.

use std::future::Future;

use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use tracing::trace;

use crate::core::ConfigDescriptor;

/// Errors from a single remote call
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("module answered {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// The module endpoints the console consumes
pub trait ModuleApi: Clone + Send + Sync + 'static {
    /// Current cumulative counters
    fn stats(&self) -> impl Future<Output = Result<Value, TransportError>> + Send;

    fn get_config(&self) -> impl Future<Output = Result<ConfigDescriptor, TransportError>> + Send;

    /// Write the full config; the response carries nothing of interest
    fn save_config(
        &self,
        config: &ConfigDescriptor,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    /// Make the module reload its config from its backing source
    fn reload_config(&self) -> impl Future<Output = Result<(), TransportError>> + Send;

    fn get_encodings(&self) -> impl Future<Output = Result<Vec<String>, TransportError>> + Send;
}

/// HTTP client bound to one module's base URL
#[derive(Debug, Clone)]
pub struct ModuleClient {
    base_url: String,
    http: Client,
}

impl ModuleClient {
    /// `base_url` e.g. `"http://127.0.0.1:8080/"`; the trailing slash is optional
    pub fn new(base_url: &str) -> Self {
        Self::with_http(base_url, Client::new())
    }

    /// Same, over a caller-built `reqwest` client (proxy, timeouts)
    pub fn with_http(base_url: &str, http: Client) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    async fn get_json(&self, endpoint: &str) -> Result<Value, TransportError> {
        trace!(endpoint, "GET");
        let response = self.http.get(self.url(endpoint)).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

/// Map a non-2xx answer to [`TransportError::Status`]
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(TransportError::Status {
        status: status.as_u16(),
        body,
    })
}

impl ModuleApi for ModuleClient {
    async fn stats(&self) -> Result<Value, TransportError> {
        self.get_json("stats").await
    }

    async fn get_config(&self) -> Result<ConfigDescriptor, TransportError> {
        let value = self.get_json("getConfig").await?;
        ConfigDescriptor::from_json(&value)
            .ok_or_else(|| TransportError::Malformed("config is not a JSON object".into()))
    }

    async fn save_config(&self, config: &ConfigDescriptor) -> Result<(), TransportError> {
        trace!(fields = config.len(), "POST saveConfig");
        let response = self
            .http
            .post(self.url("saveConfig"))
            .json(&config.to_json())
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }

    async fn reload_config(&self) -> Result<(), TransportError> {
        trace!("POST reloadConfig");
        let response = self.http.post(self.url("reloadConfig")).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn get_encodings(&self) -> Result<Vec<String>, TransportError> {
        let value = self.get_json("getEncodings").await?;
        serde_json::from_value(value).map_err(|e| TransportError::Malformed(e.to_string()))
    }
}
