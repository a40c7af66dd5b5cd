//! Factory for creating per-resource clients.
//!
//! One factory holds the validated [`ApiConfig`] and the HTTP client built
//! from it; every [`ResourceClient`] it creates is bound to
//! `<base-url>/<resource>`.

use anyhow::Result;
use log::debug;

use crate::client::ResourceClient;
use crate::config::ApiConfig;
use crate::http::{ReqwestTransport, Transport};

pub struct ClientFactory {
    config: ApiConfig,
    transport: ReqwestTransport,
}

impl ClientFactory {
    /// Validates the configuration and builds the shared HTTP client.
    pub fn new(config: ApiConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.build_client()?);
        Ok(Self { config, transport })
    }

    pub fn base_url(&self) -> &str {
        self.config.base_url()
    }

    /// Creates a client for `resource` over the factory's HTTP client.
    pub fn create(&self, resource: &str) -> ResourceClient<ReqwestTransport> {
        self.create_with(resource, self.transport.clone())
    }

    /// Creates a client for `resource` over a caller-provided transport.
    pub fn create_with<T: Transport>(&self, resource: &str, transport: T) -> ResourceClient<T> {
        let url = self.resource_url(resource);
        debug!("Creating client for {}", url);
        ResourceClient::new(url, transport)
    }

    fn resource_url(&self, resource: &str) -> String {
        let resource = resource.trim_matches('/');
        if resource.is_empty() {
            self.config.base_url().to_string()
        } else {
            format!("{}/{}", self.config.base_url(), resource)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::RequestOptions;
    use crate::http::{HttpResponse, Method, MockTransport};
    use serde_json::{Value, json};

    fn make_test_factory() -> ClientFactory {
        ClientFactory::new(ApiConfig::for_host("example.com")).unwrap()
    }

    #[test]
    fn test_create_binds_resource_path() {
        let factory = make_test_factory();
        let users = factory.create("users");
        assert_eq!(users.base_url(), "https://api.example.com/api/users");
        assert_eq!(users.url_for("/1"), "https://api.example.com/api/users/1");
    }

    #[test]
    fn test_create_trims_slashes() {
        let factory = make_test_factory();
        assert_eq!(
            factory.create("/billing/invoices/").base_url(),
            "https://api.example.com/api/billing/invoices"
        );
    }

    #[test]
    fn test_new_rejects_invalid_default_header() {
        let config = ApiConfig::new("http://localhost").with_default_header("X-Bad", "a\nb");
        assert!(ClientFactory::new(config).is_err());
    }

    #[tokio::test]
    async fn test_create_with_injected_transport() {
        let mut transport = MockTransport::new();
        transport
            .expect_execute()
            .withf(|req| req.method == Method::Get && req.url == "http://test/api/orders/5")
            .times(1)
            .returning(|_| {
                Ok(HttpResponse {
                    status: 200,
                    body: br#"{"id":5}"#.to_vec(),
                    ..Default::default()
                })
            });

        let factory = ClientFactory::new(ApiConfig::new("http://test/api")).unwrap();
        let orders = factory.create_with("orders", transport);
        let order: Value = orders.get("5", &RequestOptions::new()).await.unwrap();

        assert_eq!(order, json!({"id": 5}));
    }

    #[test_log::test(tokio::test)]
    async fn test_clients_from_one_factory_are_independent() {
        let mut server = mockito::Server::new_async().await;
        let users_mock = server
            .mock("GET", "/api/users/1")
            .match_header("x-tenant", "acme")
            .with_status(200)
            .with_body(r#"{"id":1,"name":"A"}"#)
            .create_async()
            .await;
        let teams_mock = server
            .mock("DELETE", "/api/teams/3")
            .match_header("x-tenant", "acme")
            .with_status(403)
            .with_body(r#"{"name":"Forbidden","message":"not a team admin"}"#)
            .create_async()
            .await;

        let config = ApiConfig::new(format!("{}/api", server.url()))
            .with_default_header("X-Tenant", "acme");
        let factory = ClientFactory::new(config).unwrap();
        let users = factory.create("users");
        let teams = factory.create("teams");

        let user: Value = users.get("/1", &RequestOptions::new()).await.unwrap();
        let err = teams
            .delete::<()>("/3", &RequestOptions::new())
            .await
            .unwrap_err();

        users_mock.assert_async().await;
        teams_mock.assert_async().await;
        assert_eq!(user["name"], "A");
        assert!(err.is_forbidden());
        assert_eq!(err.error_message("fallback"), "not a team admin");
    }

    #[tokio::test]
    async fn test_per_call_header_overrides_default() {
        let mut server = mockito::Server::new_async().await;
        let default_mock = server
            .mock("GET", "/api/users/1")
            .match_header("x-tenant", "acme")
            .with_status(200)
            .expect(0)
            .create_async()
            .await;
        let override_mock = server
            .mock("GET", "/api/users/1")
            .match_header("x-tenant", "override")
            .with_status(200)
            .with_body(r#"{"id":1}"#)
            .create_async()
            .await;

        let config = ApiConfig::new(format!("{}/api", server.url()))
            .with_default_header("X-Tenant", "acme");
        let factory = ClientFactory::new(config).unwrap();
        let user: Value = factory
            .create("users")
            .get("/1", &RequestOptions::new().header("X-Tenant", "override"))
            .await
            .unwrap();

        default_mock.assert_async().await;
        override_mock.assert_async().await;
        assert_eq!(user, json!({"id": 1}));
    }
}
