//! Client configuration.

/// Backend client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL.
    pub base_url: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,

    /// Bearer token, if the backend requires authentication.
    pub token: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 60,
            token: None,
        }
    }
}
