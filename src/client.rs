//! Client bound to one backend resource.
//!
//! Every operation resolves to the decoded response payload or fails with
//! an [`ApiError`]; raw transport errors never reach the caller.

use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, RequestConfig};
use crate::http::{
    Blob, Body, Headers, HttpRequest, HttpResponse, Method, Params, QueryValue, ReqwestTransport,
    Transport,
};
use crate::interceptor;

/// Per-call query parameters and headers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    pub params: Params,
    pub headers: Headers,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, name: impl Into<String>, value: impl Into<QueryValue>) -> Self {
        self.params.insert(name, value);
        self
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }
}

/// Request operations against `<base_url>/<uri>`.
#[derive(Clone)]
pub struct ResourceClient<T: Transport = ReqwestTransport> {
    base_url: String,
    transport: T,
}

impl<T: Transport> ResourceClient<T> {
    pub fn new(base_url: impl Into<String>, transport: T) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            transport,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Joins `uri` onto the bound base with exactly one `/`.
    pub fn url_for(&self, uri: &str) -> String {
        let uri = uri.trim_start_matches('/');
        if uri.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}/{}", self.base_url, uri)
        }
    }

    #[tracing::instrument(skip(self, options))]
    pub async fn get<R: DeserializeOwned>(
        &self,
        uri: &str,
        options: &RequestOptions,
    ) -> Result<R, ApiError> {
        self.request(Method::Get, uri, Body::Absent, options).await
    }

    #[tracing::instrument(skip(self, options))]
    pub async fn delete<R: DeserializeOwned>(
        &self,
        uri: &str,
        options: &RequestOptions,
    ) -> Result<R, ApiError> {
        self.request(Method::Delete, uri, Body::Absent, options).await
    }

    #[tracing::instrument(skip(self, body, options))]
    pub async fn post<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        uri: &str,
        body: &B,
        options: &RequestOptions,
    ) -> Result<R, ApiError> {
        let body = self.json_body(Method::Post, uri, body)?;
        self.request(Method::Post, uri, body, options).await
    }

    #[tracing::instrument(skip(self, body, options))]
    pub async fn put<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        uri: &str,
        body: &B,
        options: &RequestOptions,
    ) -> Result<R, ApiError> {
        let body = self.json_body(Method::Put, uri, body)?;
        self.request(Method::Put, uri, body, options).await
    }

    #[tracing::instrument(skip(self, body, options))]
    pub async fn patch<B: Serialize + ?Sized, R: DeserializeOwned>(
        &self,
        uri: &str,
        body: &B,
        options: &RequestOptions,
    ) -> Result<R, ApiError> {
        let body = self.json_body(Method::Patch, uri, body)?;
        self.request(Method::Patch, uri, body, options).await
    }

    /// POSTs a multipart form with every blob appended under `field`, in order.
    #[tracing::instrument(skip(self, blobs, options), fields(blobs = blobs.len()))]
    pub async fn upload<R: DeserializeOwned>(
        &self,
        uri: &str,
        field: &str,
        blobs: Vec<Blob>,
        options: &RequestOptions,
    ) -> Result<R, ApiError> {
        let body = Body::Multipart {
            field: field.to_string(),
            blobs,
        };
        self.request(Method::Post, uri, body, options).await
    }

    /// Sends a request and returns the successful response undecoded.
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        body: Body,
        options: &RequestOptions,
    ) -> Result<HttpResponse, ApiError> {
        let request = HttpRequest {
            method,
            url: self.url_for(uri),
            query: options.params.to_pairs(),
            headers: options.headers.to_pairs(),
            body,
        };
        let config = RequestConfig {
            method,
            url: request.url.clone(),
        };

        debug!("{} {}", method, config.url);
        let result = self.transport.execute(request).await;
        interceptor::intercept(result, &config)
    }

    async fn request<R: DeserializeOwned>(
        &self,
        method: Method,
        uri: &str,
        body: Body,
        options: &RequestOptions,
    ) -> Result<R, ApiError> {
        let response = self.send_raw(method, uri, body, options).await?;
        decode(&response).map_err(|e| {
            ApiError::unexpected(
                format!("Failed to parse response body: {}", e),
                Some(RequestConfig {
                    method,
                    url: self.url_for(uri),
                }),
            )
        })
    }

    fn json_body<B: Serialize + ?Sized>(
        &self,
        method: Method,
        uri: &str,
        body: &B,
    ) -> Result<Body, ApiError> {
        serde_json::to_value(body).map(Body::Json).map_err(|e| {
            ApiError::unexpected(
                format!("Failed to serialize request body: {}", e),
                Some(RequestConfig {
                    method,
                    url: self.url_for(uri),
                }),
            )
        })
    }
}

/// An empty body decodes as JSON `null`, so `()` and `Option<_>` accept it.
fn decode<R: DeserializeOwned>(response: &HttpResponse) -> serde_json::Result<R> {
    if response.body.iter().all(u8::is_ascii_whitespace) {
        serde_json::from_value(serde_json::Value::Null)
    } else {
        serde_json::from_slice(&response.body)
    }
}
