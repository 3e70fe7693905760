//! Outgoing HTTP transport.
//!
//! # Responsibilities
//! - Send an `HttpRequest` to a remote server and collect the `HttpResponse`
//! - Serve `file://` URIs from captured response dumps
//!
//! # Design Decisions
//! - Blocking client; callers on an async runtime wrap calls in
//!   `spawn_blocking`
//! - Redirects are followed and TLS certificates verified

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::AUTHORIZATION;

use crate::http::error::OutgoingRequestError;
use crate::http::method::Method;
use crate::http::request::{encode_basic_auth, HttpRequest};
use crate::http::response::HttpResponse;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_REDIRECTS: usize = 10;

/// Client for sending requests to remote servers.
#[derive(Debug, Clone)]
pub struct OutgoingClient {
    client: Client,
    timeout: Duration,
}

impl OutgoingClient {
    /// Build a client with the default timeout.
    pub fn new() -> Result<Self, OutgoingRequestError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, OutgoingRequestError> {
        let client = Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send `request` and return the remote response.
    pub fn send(&self, request: &HttpRequest) -> Result<HttpResponse, OutgoingRequestError> {
        if let Some(path) = request.uri().file_path() {
            tracing::debug!(path = %path.display(), "Serving response from file");
            return Ok(HttpResponse::from_file(path)?);
        }

        let method = request.method();
        tracing::debug!(
            method = %method,
            uri = %request.uri(),
            "Sending outgoing request"
        );

        let mut builder = self
            .client
            .request(method.into(), request.uri().as_url().clone());
        for (name, value) in request.headers().iter() {
            builder = builder.header(name, value);
        }
        if let Some((user, pass)) = request.explicit_credentials() {
            builder = builder.header(AUTHORIZATION, encode_basic_auth(user, pass));
        }
        if method == Method::Post {
            if let Some(content) = request.content() {
                builder = builder.body(content.to_vec());
            }
        }

        let remote = builder.send()?;

        let mut response = HttpResponse::default();
        response.set_status_code(remote.status().as_u16())?;
        for (name, value) in remote.headers() {
            match value.to_str() {
                Ok(value) => response.set_header(name.as_str(), value),
                Err(_) => tracing::warn!(header = %name, "Dropping non-text response header"),
            }
        }
        response.set_content(remote.bytes()?.to_vec());

        tracing::debug!(status = response.status_code(), "Outgoing request completed");
        Ok(response)
    }
}
