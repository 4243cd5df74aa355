//! Client configuration

use std::time::Duration;

/// Connection settings for a Studyhall server
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// e.g. `http://localhost:3000`
    pub base_url: String,
    /// Bearer token issued by the identity provider
    pub token: Option<String>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("http://localhost:3000")
    }
}
