//! The single error shape every resource client call fails with.

use serde_json::Value;

use crate::http::{HttpResponse, Method, TransportFailure};

/// The request an error belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestConfig {
    pub method: Method,
    pub url: String,
}

/// Error body the backend sends with 4xx/5xx responses.
#[derive(Debug, Clone, Default)]
pub struct ServerErrorBody {
    pub name: Option<String>,
    pub message: Option<String>,
}

impl ServerErrorBody {
    /// Parses the body leniently. Each field is taken only when it is a
    /// string; a malformed one never discards the other.
    pub fn parse(body: &[u8]) -> Self {
        let Ok(value) = serde_json::from_slice::<Value>(body) else {
            return Self::default();
        };
        let field = |key: &str| value.get(key).and_then(Value::as_str).map(String::from);
        Self {
            name: field("name"),
            message: field("message"),
        }
    }
}

/// A failed call, normalized.
///
/// Status fields are present only when a response arrived; server fields
/// only when its body carried them. `message` is always set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub status_code: Option<u16>,
    pub status_text: Option<String>,
    pub server_error_code: Option<String>,
    pub server_error_message: Option<String>,
    pub message: String,
    request: Option<RequestConfig>,
}

impl ApiError {
    /// A response arrived with a non-2xx status.
    pub fn from_response(response: &HttpResponse, request: RequestConfig) -> Self {
        let server = ServerErrorBody::parse(&response.body);
        Self {
            status_code: Some(response.status),
            status_text: response.status_text.clone(),
            server_error_code: server.name,
            server_error_message: server.message,
            message: format!("Request failed with status code {}", response.status),
            request: Some(request),
        }
    }

    /// No response arrived.
    pub fn from_failure(failure: TransportFailure, request: RequestConfig) -> Self {
        Self::unexpected(failure.message, Some(request))
    }

    /// Anything else that went wrong around the call: building the body,
    /// decoding the response.
    pub fn unexpected(message: impl Into<String>, request: Option<RequestConfig>) -> Self {
        Self {
            status_code: None,
            status_text: None,
            server_error_code: None,
            server_error_message: None,
            message: message.into(),
            request,
        }
    }

    /// The request that failed, when known.
    pub fn request(&self) -> Option<&RequestConfig> {
        self.request.as_ref()
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status_code == Some(401)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status_code == Some(403)
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code == Some(404)
    }

    pub fn is_conflict(&self) -> bool {
        self.status_code == Some(409)
    }

    /// Best message for a user: the server's, then our own, then `fallback`.
    pub fn error_message<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.server_error_message
            .as_deref()
            .filter(|m| !m.is_empty())
            .or_else(|| Some(self.message.as_str()).filter(|m| !m.is_empty()))
            .unwrap_or(fallback)
    }
}
