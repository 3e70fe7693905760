//! Incoming request adapters.
//!
//! # Responsibilities
//! - Expose transport-specific request data through one trait
//! - Rebuild the absolute request URI from CGI-style server variables
//! - Normalise CGI header variables (`HTTP_USER_AGENT` → `User-Agent`)
//!
//! # Design Decisions
//! - Adapters only read; they never validate methods or URIs. That happens
//!   in `HttpRequest::from_incoming`
//! - Basic-auth credentials prefer what the web server already decoded
//!   (`PHP_AUTH_USER`/`PHP_AUTH_PW`) and fall back to the `Authorization`
//!   header, which CGI hosts usually strip
//! - Path info is percent-decoded, matching what CGI hosts hand over in
//!   `PATH_INFO`

use std::collections::HashMap;
use std::io::Read;
use std::net::Ipv6Addr;

use axum::http::request::Parts;
use percent_encoding::percent_decode_str;

use crate::http::error::IncomingRequestError;
use crate::http::request::decode_basic_auth;

/// Read access to a request as delivered by some transport.
pub trait IncomingRequest {
    fn request_method(&self) -> &str;

    /// The absolute request URI.
    fn request_uri(&self) -> String;

    /// The part of the path used for routing.
    fn path_info(&self) -> Option<&str>;

    fn request_headers(&self) -> Vec<(String, String)>;

    fn content(&self) -> Option<Vec<u8>>;

    fn basic_auth_user(&self) -> Option<String> {
        self.basic_auth().map(|(user, _)| user)
    }

    fn basic_auth_pass(&self) -> Option<String> {
        self.basic_auth().map(|(_, pass)| pass)
    }

    fn basic_auth(&self) -> Option<(String, String)> {
        self.request_headers()
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("authorization"))
            .and_then(|(_, v)| decode_basic_auth(v))
    }
}

const REQUIRED_VARIABLES: [&str; 4] = ["HTTP_HOST", "SERVER_PORT", "REQUEST_URI", "REQUEST_METHOD"];

const AUTH_USER_VARIABLE: &str = "PHP_AUTH_USER";
const AUTH_PASS_VARIABLE: &str = "PHP_AUTH_PW";

/// Turn a CGI header variable name into a header name.
///
/// `HTTP_USER_AGENT` becomes `User-Agent`; `CONTENT_TYPE` becomes
/// `Content-Type`. Returns `None` for variables that are not headers.
pub fn normalize_header_key(variable: &str) -> Option<String> {
    let name = match variable.strip_prefix("HTTP_") {
        Some(rest) => rest,
        None if variable == "CONTENT_TYPE" || variable == "CONTENT_LENGTH" => variable,
        None => return None,
    };

    let words: Vec<String> = name
        .split('_')
        .map(|word| {
            let lower = word.to_ascii_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();
    Some(words.join("-"))
}

/// A request described by CGI-style server variables.
#[derive(Debug, Clone)]
pub struct ServerVariables {
    vars: HashMap<String, String>,
    body: Vec<u8>,
}

impl ServerVariables {
    /// Wrap server variables and the raw request body.
    pub fn new(vars: HashMap<String, String>, body: Vec<u8>) -> Result<Self, IncomingRequestError> {
        let missing: Vec<&'static str> = REQUIRED_VARIABLES
            .into_iter()
            .filter(|k| vars.get(*k).map_or(true, |v| v.is_empty()))
            .collect();
        if !missing.is_empty() {
            return Err(IncomingRequestError::MissingVariables(missing));
        }
        Ok(Self { vars, body })
    }

    /// Read variables from the process environment and the body from stdin.
    pub fn from_env() -> Result<Self, IncomingRequestError> {
        let vars: HashMap<String, String> = std::env::vars().collect();

        let length = vars
            .get("CONTENT_LENGTH")
            .and_then(|l| l.parse::<u64>().ok())
            .unwrap_or(0);
        let mut body = Vec::new();
        if length > 0 {
            std::io::stdin().take(length).read_to_end(&mut body)?;
        }

        Self::new(vars, body)
    }

    fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    fn var_or_empty(&self, key: &str) -> &str {
        self.var(key).unwrap_or_default()
    }
}

impl IncomingRequest for ServerVariables {
    fn request_method(&self) -> &str {
        self.var_or_empty("REQUEST_METHOD")
    }

    fn request_uri(&self) -> String {
        let https = self
            .var("HTTPS")
            .is_some_and(|v| !v.is_empty() && v != "off");
        let forwarded_tls = !https && self.var("HTTP_X_FORWARDED_PROTO") == Some("https");
        let scheme = if https || forwarded_tls { "https" } else { "http" };

        let host = self.var_or_empty("HTTP_HOST");
        let name = if host.parse::<Ipv6Addr>().is_ok() {
            format!("[{}]", host)
        } else {
            host.to_string()
        };

        let port = self.var_or_empty("SERVER_PORT");
        let default_port = (port == "80" && (scheme == "http" || forwarded_tls))
            || (port == "443" && scheme == "https");
        let port = if default_port {
            String::new()
        } else {
            format!(":{}", port)
        };

        format!("{}://{}{}{}", scheme, name, port, self.var_or_empty("REQUEST_URI"))
    }

    fn path_info(&self) -> Option<&str> {
        self.var("PATH_INFO")
    }

    fn basic_auth_user(&self) -> Option<String> {
        match self.var(AUTH_USER_VARIABLE) {
            Some(user) => Some(user.to_string()),
            None => self.basic_auth().map(|(user, _)| user),
        }
    }

    fn basic_auth_pass(&self) -> Option<String> {
        match self.var(AUTH_PASS_VARIABLE) {
            Some(pass) => Some(pass.to_string()),
            None => self.basic_auth().map(|(_, pass)| pass),
        }
    }

    fn request_headers(&self) -> Vec<(String, String)> {
        let mut headers: Vec<(String, String)> = self
            .vars
            .iter()
            .filter_map(|(k, v)| normalize_header_key(k).map(|name| (name, v.clone())))
            .collect();
        headers.sort();
        headers
    }

    fn content(&self) -> Option<Vec<u8>> {
        let method = self.request_method();
        if method != "POST" && method != "PUT" {
            return None;
        }
        let length = self
            .var("CONTENT_LENGTH")
            .and_then(|l| l.parse::<u64>().ok())
            .unwrap_or(0);
        if length == 0 {
            return None;
        }
        Some(self.body.clone())
    }
}

/// A request received by the HTTP server.
#[derive(Debug)]
pub struct HyperIncoming {
    parts: Parts,
    body: Vec<u8>,
    uri: String,
    path_info: String,
}

impl HyperIncoming {
    /// Wrap request parts and the collected body. `scheme` is used when the
    /// request line carries only a path.
    pub fn new(parts: Parts, body: Vec<u8>, scheme: &str) -> Self {
        let uri = if parts.uri.scheme().is_some() {
            parts.uri.to_string()
        } else {
            let host = parts
                .headers
                .get(axum::http::header::HOST)
                .and_then(|h| h.to_str().ok())
                .unwrap_or("localhost");
            let path = parts
                .uri
                .path_and_query()
                .map(|pq| pq.as_str())
                .unwrap_or("/");
            format!("{}://{}{}", scheme, host, path)
        };
        let path_info = decode_path(parts.uri.path());
        Self {
            parts,
            body,
            uri,
            path_info,
        }
    }
}

/// Percent-decode a request path. Sequences that do not form valid UTF-8
/// are replaced rather than rejected.
fn decode_path(path: &str) -> String {
    percent_decode_str(path).decode_utf8_lossy().into_owned()
}

impl IncomingRequest for HyperIncoming {
    fn request_method(&self) -> &str {
        self.parts.method.as_str()
    }

    fn request_uri(&self) -> String {
        self.uri.clone()
    }

    fn path_info(&self) -> Option<&str> {
        Some(&self.path_info)
    }

    fn request_headers(&self) -> Vec<(String, String)> {
        self.parts
            .headers
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect()
    }

    fn content(&self) -> Option<Vec<u8>> {
        if self.body.is_empty() {
            None
        } else {
            Some(self.body.clone())
        }
    }
}
