//! Hello-world REST service.
//!
//! ```text
//! GET  /hello/:str  → 200 {"type":"GET","response":"hello <str>"}
//! POST /hello/:str  → 200 {"type":"POST","response":"hello <str>"}
//! POST /hello/foo   → 500 {"error":"internal_server_error",…}
//! other methods     → 405 with Allow: GET,POST
//! other paths       → 404
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use rest_service::config::{load_config, ServiceConfig};
use rest_service::http::default_response;
use rest_service::observability::init_logging;
use rest_service::utils::json;
use rest_service::{HttpRequest, HttpResponse, HttpServer, Method, ServiceError};

#[derive(Parser)]
#[command(name = "rest-service")]
#[command(about = "Example REST service", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listener bind address.
    #[arg(short, long)]
    bind: Option<String>,
}

fn hello(kind: &str, name: &str) -> Result<HttpResponse, ServiceError> {
    let mut response = HttpResponse::new(200, "application/json")?;
    response.set_content(json::encode(&serde_json::json!({
        "type": kind,
        "response": format!("hello {}", name),
    }))?);
    Ok(response)
}

fn hello_service(request: &mut HttpRequest) -> Result<HttpResponse, ServiceError> {
    let mut response = None;

    request.match_rest(Method::Get, Some("/hello/:str"), |args| {
        response = Some(hello("GET", &args[0]));
    })?;

    request.match_rest(Method::Post, Some("/hello/:str"), |args| {
        response = Some(if args[0] == "foo" {
            Err(ServiceError::handler("you cannot say 'foo'!"))
        } else {
            hello("POST", &args[0])
        });
    })?;

    match response {
        Some(result) => result,
        None => Ok(default_response(request)?.unwrap_or_default()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ServiceConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }

    init_logging(&config.observability);
    tracing::info!("rest-service v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    let server = HttpServer::new(config, hello_service);
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
