//! Typed HTTP client for a backend REST API.
//!
//! A [`ClientFactory`] binds [`ResourceClient`]s to `<base-url>/<resource>`.
//! Every client operation either returns the decoded payload or fails with
//! one normalized [`ApiError`].

pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod factory;
pub mod http;
pub mod interceptor;

pub use client::{RequestOptions, ResourceClient};
pub use config::ApiConfig;
pub use error::ApiError;
pub use factory::ClientFactory;
