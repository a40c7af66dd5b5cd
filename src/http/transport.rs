//! `reqwest`-backed transport.

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use reqwest::multipart::{Form, Part};

use super::{Blob, Body, HttpRequest, HttpResponse, Transport, TransportFailure};

/// Sends requests with a shared `reqwest::Client`.
///
/// Holds no per-call state, so one instance serves any number of
/// concurrent requests.
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    /// Creates a new transport wrapping the given reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[tracing::instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportFailure> {
        let mut builder = self
            .client
            .request(request.method.into(), &request.url)
            .query(&request.query);

        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        builder = match request.body {
            Body::Absent => builder,
            Body::Json(value) => builder.json(&value),
            Body::Multipart { field, blobs } => builder.multipart(build_form(&field, blobs)?),
        };

        let response = builder.send().await?;
        let status = response.status();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        // A status arrived; an unreadable body is still a response.
        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                warn!("Failed to read body of {} {} ({}): {}", request.method, request.url, status, e);
                Vec::new()
            }
        };

        debug!("{} {} -> {} ({} bytes)", request.method, request.url, status, body.len());

        Ok(HttpResponse {
            status: status.as_u16(),
            status_text: status.canonical_reason().map(str::to_string),
            headers,
            body,
        })
    }
}

/// Appends every blob under `field`, preserving order.
fn build_form(field: &str, blobs: Vec<Blob>) -> Result<Form, TransportFailure> {
    let mut form = Form::new();
    for blob in blobs {
        let mut part = Part::bytes(blob.bytes);
        if let Some(file_name) = blob.file_name {
            part = part.file_name(file_name);
        }
        if let Some(mime_type) = blob.mime_type {
            part = part.mime_str(&mime_type)?;
        }
        form = form.part(field.to_string(), part);
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;
    use mockito::Matcher;

    fn request(method: Method, url: String) -> HttpRequest {
        HttpRequest {
            method,
            url,
            query: Vec::new(),
            headers: Vec::new(),
            body: Body::Absent,
        }
    }

    #[tokio::test]
    async fn test_execute_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/users/1")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":1}"#)
            .create_async()
            .await;

        let transport = ReqwestTransport::new(Client::new());
        let response = transport
            .execute(request(Method::Get, format!("{}/users/1", server.url())))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 200);
        assert_eq!(response.status_text.as_deref(), Some("OK"));
        assert_eq!(response.body, br#"{"id":1}"#);
        assert!(
            response
                .headers
                .iter()
                .any(|(n, v)| n == "content-type" && v == "application/json")
        );
    }

    #[tokio::test]
    async fn test_execute_returns_error_statuses_as_responses() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/users/1")
            .with_status(409)
            .with_body("conflict")
            .create_async()
            .await;

        let transport = ReqwestTransport::new(Client::new());
        let response = transport
            .execute(request(Method::Delete, format!("{}/users/1", server.url())))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 409);
        assert_eq!(response.status_text.as_deref(), Some("Conflict"));
        assert_eq!(response.body, b"conflict");
    }

    #[tokio::test]
    async fn test_execute_sends_query_headers_and_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/users/1?fields=name&fields=email")
            .match_header("x-request-id", "abc")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(serde_json::json!({"name": "B"})))
            .with_status(204)
            .create_async()
            .await;

        let transport = ReqwestTransport::new(Client::new());
        let mut req = request(Method::Patch, format!("{}/users/1", server.url()));
        req.query = vec![
            ("fields".to_string(), "name".to_string()),
            ("fields".to_string(), "email".to_string()),
        ];
        req.headers = vec![("X-Request-Id".to_string(), "abc".to_string())];
        req.body = Body::Json(serde_json::json!({"name": "B"}));

        let response = transport.execute(req).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 204);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_execute_sends_explicit_null_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/jobs")
            .match_body("null")
            .with_status(201)
            .create_async()
            .await;

        let transport = ReqwestTransport::new(Client::new());
        let mut req = request(Method::Post, format!("{}/jobs", server.url()));
        req.body = Body::Json(serde_json::Value::Null);

        let response = transport.execute(req).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 201);
    }

    #[tokio::test]
    async fn test_execute_sends_multipart_in_order() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/upload")
            .match_header(
                "content-type",
                Matcher::Regex("^multipart/form-data; boundary=".to_string()),
            )
            .match_body(Matcher::Regex(
                r#"(?s)name="files"; filename="a.txt".*first.*name="files"; filename="b.txt".*second"#
                    .to_string(),
            ))
            .with_status(200)
            .create_async()
            .await;

        let transport = ReqwestTransport::new(Client::new());
        let mut req = request(Method::Post, format!("{}/upload", server.url()));
        req.body = Body::Multipart {
            field: "files".to_string(),
            blobs: vec![
                Blob::new("first").with_file_name("a.txt"),
                Blob::new("second")
                    .with_file_name("b.txt")
                    .with_mime_type("text/plain"),
            ],
        };

        transport.execute(req).await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_execute_rejects_invalid_mime_type() {
        let transport = ReqwestTransport::new(Client::new());
        let mut req = request(Method::Post, "http://127.0.0.1:9/upload".to_string());
        req.body = Body::Multipart {
            field: "files".to_string(),
            blobs: vec![Blob::new("x").with_mime_type("not a mime")],
        };

        let failure = transport.execute(req).await.unwrap_err();
        assert!(!failure.message.is_empty());
    }

    #[tokio::test]
    async fn test_execute_connection_refused() {
        // Grab a free port, then close it so nothing is listening
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let transport = ReqwestTransport::new(Client::new());
        let failure = transport
            .execute(request(Method::Get, format!("http://127.0.0.1:{}/", port)))
            .await
            .unwrap_err();

        assert!(failure.message.contains("error sending request"));
    }

    #[tokio::test]
    async fn test_execute_keeps_status_when_body_is_truncated() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(b"HTTP/1.1 404 Not Found\r\nContent-Length: 100\r\n\r\nshort")
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let transport = ReqwestTransport::new(Client::new());
        let response = transport
            .execute(request(Method::Get, format!("http://{}/users/9", addr)))
            .await
            .unwrap();
        server.await.unwrap();

        assert_eq!(response.status, 404);
        assert_eq!(response.status_text.as_deref(), Some("Not Found"));
        assert!(response.body.is_empty());
        assert!(!response.is_success());
    }
}
