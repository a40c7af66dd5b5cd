//! API endpoint configuration shared by every client a factory creates.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Path prefix every backend resource lives under.
pub const API_PATH: &str = "api";

/// Default `User-Agent` sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("restbind/", env!("RESTBIND_VERSION"));

/// Where the backend lives and how to talk to it.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiConfig {
    base_url: String,
    user_agent: String,
    timeout: Option<Duration>,
    default_headers: Vec<(String, String)>,
}

impl ApiConfig {
    /// Configuration for an explicit base URL, e.g. `http://127.0.0.1:1234/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: None,
            default_headers: Vec::new(),
        }
    }

    /// Configuration following the `https://api.<host>/api` convention.
    pub fn for_host(host: &str) -> Self {
        Self::new(format!(
            "https://api.{}/{}",
            host.trim_matches('/'),
            API_PATH
        ))
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Total time allowed for one request, connection included.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Header sent on every request unless the call sets the same name.
    pub fn with_default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.default_headers.push((name.into(), value.into()));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn default_headers(&self) -> &[(String, String)] {
        &self.default_headers
    }

    /// Builds the `reqwest` client described by this configuration.
    pub(crate) fn build_client(&self) -> Result<reqwest::Client> {
        let mut headers = HeaderMap::new();
        for (name, value) in &self.default_headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .with_context(|| format!("Invalid header name: {:?}", name))?;
            let value = HeaderValue::from_str(value)
                .with_context(|| format!("Invalid value for header {}", name))?;
            headers.insert(name, value);
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(self.user_agent.as_str())
            .default_headers(headers);
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }

        builder.build().context("Failed to build HTTP client")
    }
}
