//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router with a single catch-all handler
//! - Wire up middleware (tracing, timeouts)
//! - Bind server to listener
//! - Turn each request into an `HttpRequest` and run the `RestService`
//! - Map service errors and routing misses onto JSON error responses

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{Body, Bytes},
    extract::{Request, State},
    http::{header, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use http_body_util::LengthLimitError;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ServiceConfig;
use crate::http::error::{ResponseError, ServiceError};
use crate::http::incoming::HyperIncoming;
use crate::http::request::HttpRequest;
use crate::http::response::HttpResponse;

/// Application code that turns a request into a response.
///
/// Runs on the blocking pool, so implementations may do synchronous I/O
/// such as `OutgoingClient::send`.
pub trait RestService: Send + Sync + 'static {
    fn handle(&self, request: &mut HttpRequest) -> Result<HttpResponse, ServiceError>;
}

impl<F> RestService for F
where
    F: Fn(&mut HttpRequest) -> Result<HttpResponse, ServiceError> + Send + Sync + 'static,
{
    fn handle(&self, request: &mut HttpRequest) -> Result<HttpResponse, ServiceError> {
        self(request)
    }
}

/// Build the fallback response after all routes of a request were tried.
///
/// Returns `405` with an `Allow` header when the request method was never
/// offered, `404` when no pattern matched, and `None` when a route handled
/// the request.
pub fn default_response(request: &HttpRequest) -> Result<Option<HttpResponse>, ResponseError> {
    let mut outcome = None;
    request.match_rest_default(|methods, pattern_matched| {
        if !methods.contains(&request.method()) {
            let allow: Vec<&str> = methods.iter().map(|m| m.as_str()).collect();
            outcome = Some((405, Some(allow.join(","))));
        } else if !pattern_matched {
            outcome = Some((404, None));
        }
    });

    let Some((status, allow)) = outcome else {
        return Ok(None);
    };

    let mut response = HttpResponse::new(status, "application/json")?;
    let body = match allow {
        Some(allow) => {
            response.set_header("Allow", allow);
            error_body("method_not_allowed", "request method not allowed")
        }
        None => error_body("not_found", "resource not found"),
    };
    response.set_content(body);
    Ok(Some(response))
}

/// JSON body of the form `{"error":…,"error_description":…}`.
pub fn error_body(error: &str, description: &str) -> String {
    json!({ "error": error, "error_description": description }).to_string()
}

/// Application state injected into handlers.
#[derive(Clone)]
struct AppState {
    service: Arc<dyn RestService>,
    max_body_size: usize,
}

/// HTTP server for a REST service.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server running `service` for every request.
    pub fn new<S: RestService>(config: ServiceConfig, service: S) -> Self {
        let state = AppState {
            service: Arc::new(service),
            max_body_size: config.limits.max_body_size,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(dispatch))
            .route("/", any(dispatch))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}

/// Catch-all handler: buffer the body, run the service, convert the result.
async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let method = parts.method.clone();
    let path = parts.uri.path().to_string();

    let bytes = match collect_body(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(status) => {
            let body = if status == StatusCode::PAYLOAD_TOO_LARGE {
                error_body("request_too_large", "request body too large")
            } else {
                error_body("bad_request", "unable to read request body")
            };
            tracing::warn!(method = %method, path = %path, status = %status, "Rejected request body");
            return json_error(status, body);
        }
    };

    let incoming = HyperIncoming::new(parts, bytes.to_vec(), "http");
    let service = state.service.clone();
    let outcome = tokio::task::spawn_blocking(move || -> Result<HttpResponse, ServiceError> {
        let mut request = HttpRequest::from_incoming(&incoming)?;
        service.handle(&mut request)
    })
    .await;

    match outcome {
        Ok(Ok(response)) => {
            tracing::debug!(
                method = %method,
                path = %path,
                status = response.status_code(),
                "Request handled"
            );
            into_axum_response(response).await
        }
        Ok(Err(e)) => {
            tracing::error!(method = %method, path = %path, error = %e, "Service error");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("internal_server_error", &e.to_string()),
            )
        }
        Err(e) => {
            tracing::error!(method = %method, path = %path, error = %e, "Service task failed");
            json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                error_body("internal_server_error", "request handler failed"),
            )
        }
    }
}

/// Buffer a request body up to `limit` bytes. Exceeding the limit is a
/// `413`; any other read failure is a `400`.
async fn collect_body(body: Body, limit: usize) -> Result<Bytes, StatusCode> {
    axum::body::to_bytes(body, limit).await.map_err(|e| {
        if is_length_limit(&e) {
            StatusCode::PAYLOAD_TOO_LARGE
        } else {
            tracing::debug!(error = %e, "Failed to read request body");
            StatusCode::BAD_REQUEST
        }
    })
}

fn is_length_limit(err: &axum::Error) -> bool {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(e) = source {
        if e.is::<LengthLimitError>() {
            return true;
        }
        source = e.source();
    }
    false
}

fn json_error(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

/// Convert an `HttpResponse` into an Axum response.
async fn into_axum_response(response: HttpResponse) -> Response {
    let mut x_sendfile = None;
    let body = match response.content_file() {
        Some(path) if response.use_x_sendfile() => {
            x_sendfile = Some(path.display().to_string());
            Body::empty()
        }
        Some(path) => match tokio::fs::read(path).await {
            Ok(data) => Body::from(data),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Unable to read content file");
                return json_error(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    error_body("internal_server_error", "unable to read content file"),
                );
            }
        },
        None => Body::from(response.content().map(<[u8]>::to_vec).unwrap_or_default()),
    };

    let mut out = Response::new(body);
    *out.status_mut() =
        StatusCode::from_u16(response.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let headers = response
        .headers()
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .chain(x_sendfile.map(|p| ("X-Sendfile".to_string(), p)));
    for (name, value) in headers {
        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&value),
        ) {
            (Ok(name), Ok(value)) => {
                out.headers_mut().insert(name, value);
            }
            _ => tracing::warn!(header = %name, "Dropping invalid response header"),
        }
    }
    out
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
