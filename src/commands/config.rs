use anyhow::{Context, Result, bail};
use log::debug;
use std::time::Duration;

use crate::config::ApiConfig;

/// Builds the API configuration from CLI flags.
///
/// `--base-url` wins over `--host` when both are given.
pub fn api_config(
    host: Option<&str>,
    base_url: Option<&str>,
    timeout_secs: Option<u64>,
    headers: &[String],
) -> Result<ApiConfig> {
    let mut config = match (base_url, host) {
        (Some(url), _) => ApiConfig::new(url),
        (None, Some(host)) => ApiConfig::for_host(host),
        (None, None) => bail!("No API endpoint configured. Pass --host or --base-url."),
    };

    if let Some(secs) = timeout_secs {
        config = config.with_timeout(Duration::from_secs(secs));
    }

    for header in headers {
        let (name, value) = parse_header(header)?;
        config = config.with_default_header(name, value);
    }

    debug!("Using API base URL {}", config.base_url());
    Ok(config)
}

/// Parses `Name: value`.
fn parse_header(raw: &str) -> Result<(&str, &str)> {
    let (name, value) = raw
        .split_once(':')
        .with_context(|| format!("Invalid header {:?}. Expected 'Name: value'.", raw))?;
    let name = name.trim();
    if name.is_empty() {
        bail!("Invalid header {:?}: name cannot be empty.", raw);
    }
    Ok((name, value.trim()))
}
