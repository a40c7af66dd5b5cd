use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::client::RequestOptions;
use crate::error::ApiError;

mod call;
pub mod config;

pub use call::{call, upload};

/// Which resource and endpoint a command addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub resource: String,
    pub uri: String,
    /// Raw `key=value` pairs; a repeated key becomes a list.
    pub query: Vec<String>,
}

impl Target {
    pub fn request_options(&self) -> Result<RequestOptions> {
        let mut options = RequestOptions::new();
        for raw in &self.query {
            let (name, value) = raw
                .split_once('=')
                .with_context(|| format!("Invalid query {:?}. Expected 'key=value'.", raw))?;
            if name.is_empty() {
                bail!("Invalid query {:?}: key cannot be empty.", raw);
            }
            options.params.append(name, value);
        }
        Ok(options)
    }
}

/// Keeps the typed error reachable while leading with a one-line summary.
pub(crate) fn api_failure(error: ApiError) -> anyhow::Error {
    let summary = match (error.status_code, error.status_text.as_deref()) {
        (Some(code), Some(text)) => format!("HTTP {} {}: {}", code, text, error.error_message("")),
        (Some(code), None) => format!("HTTP {}: {}", code, error.error_message("")),
        (None, _) => error.error_message("Request failed").to_string(),
    };
    anyhow::Error::new(error).context(summary)
}

/// Prints a response body as pretty JSON; nothing for an empty body.
pub fn print_response(value: Option<&Value>) -> Result<()> {
    if let Some(value) = value {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}
