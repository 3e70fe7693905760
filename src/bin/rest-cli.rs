use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};

use rest_service::http::{HttpRequest, Method, OutgoingClient};

#[derive(Parser)]
#[command(name = "rest-cli")]
#[command(about = "Send requests to a REST service", long_about = None)]
struct Cli {
    /// Basic-auth user.
    #[arg(short, long)]
    user: Option<String>,

    /// Basic-auth password.
    #[arg(short, long, requires = "user")]
    pass: Option<String>,

    /// Extra request header, as `Name: value`. May be repeated.
    #[arg(short = 'H', long = "header")]
    headers: Vec<String>,

    /// Request timeout in seconds.
    #[arg(short, long, default_value_t = 10)]
    timeout: u64,

    /// Print the full request and response dumps.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a GET request
    Get { uri: String },
    /// Send a POST request with form parameters (`key=value`)
    Post {
        uri: String,
        #[arg(short, long = "param")]
        params: Vec<String>,
    },
    /// Send a DELETE request
    Delete { uri: String },
}

fn split_pair(input: &str, separator: char) -> Result<(String, String), String> {
    input
        .split_once(separator)
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .ok_or_else(|| format!("expected '{}' in '{}'", separator, input))
}

fn build_request(cli: &Cli) -> Result<HttpRequest, Box<dyn std::error::Error>> {
    let mut request = match &cli.command {
        Commands::Get { uri } => HttpRequest::with_method(uri, Method::Get)?,
        Commands::Delete { uri } => HttpRequest::with_method(uri, Method::Delete)?,
        Commands::Post { uri, params } => {
            let mut request = HttpRequest::with_method(uri, Method::Post)?;
            let pairs = params
                .iter()
                .map(|p| split_pair(p, '='))
                .collect::<Result<Vec<_>, _>>()?;
            request.set_post_parameters(pairs)?;
            request
        }
    };

    for header in &cli.headers {
        let (name, value) = split_pair(header, ':')?;
        request.set_header(name, value);
    }
    request.set_basic_auth_user(cli.user.clone());
    request.set_basic_auth_pass(cli.pass.clone());
    Ok(request)
}

fn run(cli: &Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let request = build_request(cli)?;
    if cli.verbose {
        eprintln!("{}", request);
    }

    let client = OutgoingClient::with_timeout(Duration::from_secs(cli.timeout))?;
    let response = client.send(&request)?;

    if cli.verbose {
        println!("{}", response);
    } else {
        println!("{}", response.status_line());
        if let Some(content) = response.content() {
            println!("{}", String::from_utf8_lossy(content));
        }
    }
    Ok(response.status_code() < 400)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
