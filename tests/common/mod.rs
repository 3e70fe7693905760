//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::body::Bytes;
use axum::extract::Request;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Router;
use serde_json::json;
use tokio::net::TcpListener;

use rest_service::config::ServiceConfig;
use rest_service::http::{default_response, HttpRequest, HttpResponse, HttpServer};
use rest_service::{Method, ServiceError};

/// Path of a fixture under `tests/data`.
#[allow(dead_code)]
pub fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// Start a mock backend that answers every request with a JSON description
/// of what it received.
///
/// Runs on its own thread and runtime so blocking clients can call it from
/// plain `#[test]` functions.
#[allow(dead_code)]
pub fn start_echo_backend() -> SocketAddr {
    let (tx, rx) = std::sync::mpsc::channel();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            let app = Router::new().fallback(echo);
            axum::serve(listener, app).await.unwrap();
        });
    });
    rx.recv().unwrap()
}

async fn echo(request: Request) -> impl IntoResponse {
    let (parts, body) = request.into_parts();
    let body: Bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();
    let header = |name: &str| {
        parts
            .headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };

    let status = if parts.uri.path() == "/missing" {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::OK
    };
    let description = json!({
        "method": parts.method.as_str(),
        "path": parts.uri.path(),
        "query": parts.uri.query(),
        "authorization": header("authorization"),
        "content_type": header("content-type"),
        "x_test": header("x-test"),
        "body": String::from_utf8_lossy(&body),
    });
    (
        status,
        [("content-type", "application/json"), ("x-echo", "yes")],
        description.to_string(),
    )
}

/// The hello-world service used by the server tests.
#[allow(dead_code)]
pub fn hello_service(request: &mut HttpRequest) -> Result<HttpResponse, ServiceError> {
    let mut response: Option<Result<HttpResponse, ServiceError>> = None;

    request.match_rest(Method::Get, Some("/hello/:str"), |args| {
        response = Some(json_response(json!({ "type": "GET", "response": format!("hello {}", args[0]) })));
    })?;

    request.match_rest(Method::Post, Some("/hello/:str"), |args| {
        response = Some(if args[0] == "foo" {
            Err(ServiceError::handler("you cannot say 'foo'!"))
        } else {
            json_response(json!({ "type": "POST", "response": format!("hello {}", args[0]) }))
        });
    })?;

    request.match_rest(Method::Get, Some("/files/:path+"), |args| {
        response = Some(json_response(json!({ "path": args[0] })));
    })?;

    let query = request.query_parameter("q");
    let form = request.post_parameter("name").ok().flatten();
    request.match_rest(Method::Post, Some("/form"), |_| {
        response = Some(json_response(json!({ "q": query, "name": form })));
    })?;

    match response {
        Some(result) => result,
        None => Ok(default_response(request)?.unwrap_or_default()),
    }
}

fn json_response(value: serde_json::Value) -> Result<HttpResponse, ServiceError> {
    let mut response = HttpResponse::new(200, "application/json")?;
    response.set_content(value.to_string());
    Ok(response)
}

/// Start an `HttpServer` running `hello_service` on an ephemeral port.
#[allow(dead_code)]
pub async fn start_hello_server(mut config: ServiceConfig) -> SocketAddr {
    config.listener.bind_address = "127.0.0.1:0".to_string();
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config, hello_service);
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });
    addr
}
