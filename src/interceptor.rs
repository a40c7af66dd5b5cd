//! Hooks applied to every settled transport call.
//!
//! Successful responses pass through untouched. Everything else, error
//! statuses and responseless failures alike, leaves here as an [`ApiError`].

use log::warn;

use crate::error::{ApiError, RequestConfig};
use crate::http::{HttpResponse, TransportFailure};

/// Success hook. Intentionally a pass-through.
pub fn on_success(response: HttpResponse) -> HttpResponse {
    response
}

/// Failure hook: normalizes whatever went wrong.
pub fn on_failure(failure: Failure, request: RequestConfig) -> ApiError {
    let (method, url) = (request.method, request.url.clone());
    let error = match failure {
        Failure::Status(response) => ApiError::from_response(&response, request),
        Failure::Transport(failure) => ApiError::from_failure(failure, request),
    };
    warn!("{} {} failed: {}", method, url, error.error_message("unknown error"));
    error
}

/// What the failure hook receives.
#[derive(Debug)]
pub enum Failure {
    /// A response arrived, but not a 2xx one.
    Status(HttpResponse),
    /// No response at all.
    Transport(TransportFailure),
}

/// Routes a settled transport call through the two hooks.
pub fn intercept(
    result: Result<HttpResponse, TransportFailure>,
    request: &RequestConfig,
) -> Result<HttpResponse, ApiError> {
    match result {
        Ok(response) if response.is_success() => Ok(on_success(response)),
        Ok(response) => Err(on_failure(Failure::Status(response), request.clone())),
        Err(failure) => Err(on_failure(Failure::Transport(failure), request.clone())),
    }
}
