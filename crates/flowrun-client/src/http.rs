//! HTTP client for the remote backend.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::BackendClient;

/// HTTP client for the backend REST API.
pub struct HttpClient {
    inner: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpClient {
    /// Create a new HTTP client from a configuration.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            inner,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
        })
    }

    /// Check if the backend is reachable.
    pub async fn health(&self) -> Result<bool, ClientError> {
        let url = format!("{}/health", self.base_url);
        debug!(url = %url, "Checking health");

        let response = self.inner.get(&url).send().await?;
        Ok(response.status().is_success())
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn into_json(&self, response: Response, path: &str) -> Result<Value, ClientError> {
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(ClientError::Backend {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }
        response
            .json()
            .await
            .map_err(|e| ClientError::Serialization(e.to_string()))
    }
}

#[async_trait]
impl BackendClient for HttpClient {
    async fn create_object(&self, path: &str, payload: Value) -> Result<Value, ClientError> {
        let url = self.url(path);
        debug!(url = %url, "POST request");

        let request = self.authorize(self.inner.post(&url)).json(&payload);
        let response = request.send().await?;
        self.into_json(response, path).await
    }

    async fn read_object(&self, path: &str) -> Result<Value, ClientError> {
        let url = self.url(path);
        debug!(url = %url, "GET request");

        let request = self.authorize(self.inner.get(&url));
        let response = request.send().await?;
        self.into_json(response, path).await
    }

    async fn update_object(&self, path: &str, payload: Value) -> Result<Value, ClientError> {
        let url = self.url(path);
        debug!(url = %url, "PUT request");

        let request = self.authorize(self.inner.put(&url)).json(&payload);
        let response = request.send().await?;
        self.into_json(response, path).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trimmed() {
        let client = HttpClient::new(ClientConfig {
            base_url: "http://backend:8080/".to_string(),
            ..ClientConfig::default()
        })
        .unwrap();
        assert_eq!(client.url("/api/v1/runs"), "http://backend:8080/api/v1/runs");
    }
}
