use anyhow::{Context, Result};
use log::info;
use serde_json::Value;
use std::path::PathBuf;

use crate::client::RequestOptions;
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::factory::ClientFactory;
use crate::http::{Blob, Method};

use super::{Target, api_failure};

/// Issues one JSON request and returns the decoded response, if any.
#[tracing::instrument(skip(config, data))]
pub async fn call(
    config: ApiConfig,
    method: Method,
    target: &Target,
    data: Option<&str>,
) -> Result<Option<Value>> {
    let factory = ClientFactory::new(config)?;
    let client = factory.create(&target.resource);
    let options = target.request_options()?;

    info!("{} {}", method, client.url_for(&target.uri));

    let result: Result<Option<Value>, ApiError> = match method {
        Method::Get => client.get(&target.uri, &options).await,
        Method::Delete => client.delete(&target.uri, &options).await,
        Method::Post | Method::Put | Method::Patch => {
            let body = parse_data(data)?;
            match method {
                Method::Post => client.post(&target.uri, &body, &options).await,
                Method::Put => client.put(&target.uri, &body, &options).await,
                _ => client.patch(&target.uri, &body, &options).await,
            }
        }
    };

    result.map_err(api_failure)
}

/// Uploads `files` under `field` as one multipart request.
#[tracing::instrument(skip(config))]
pub async fn upload(
    config: ApiConfig,
    target: &Target,
    field: &str,
    files: &[PathBuf],
) -> Result<Option<Value>> {
    let blobs = files
        .iter()
        .map(|path| Blob::from_path(path))
        .collect::<Result<Vec<_>>>()?;

    let factory = ClientFactory::new(config)?;
    let client = factory.create(&target.resource);
    let options: RequestOptions = target.request_options()?;

    info!(
        "Uploading {} file(s) to {}",
        blobs.len(),
        client.url_for(&target.uri)
    );

    client
        .upload(&target.uri, field, blobs, &options)
        .await
        .map_err(api_failure)
}

/// `--data` is JSON; no `--data` sends an explicit `null`.
fn parse_data(data: Option<&str>) -> Result<Value> {
    match data {
        Some(raw) => serde_json::from_str(raw).context("Invalid JSON in --data"),
        None => Ok(Value::Null),
    }
}
