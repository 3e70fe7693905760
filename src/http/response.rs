//! Response value.
//!
//! # Responsibilities
//! - Hold status, headers and body of a response
//! - Restrict status codes to the known reason-phrase table
//! - Parse captured `curl -i` dumps back into responses
//!
//! # Design Decisions
//! - Defaults to `200` with `Content-Type: text/html` and no body
//! - A content file takes precedence over inline content when sending;
//!   with X-Sendfile enabled only the header is emitted

use std::fmt;
use std::path::{Path, PathBuf};

use crate::http::error::ResponseError;
use crate::http::headers::HeaderStore;

/// Reason phrase for a supported status code.
pub fn reason_phrase(code: u16) -> Option<&'static str> {
    let reason = match code {
        100 => "Continue",
        101 => "Switching Protocols",
        200 => "OK",
        201 => "Created",
        202 => "Accepted",
        203 => "Non-Authoritative Information",
        204 => "No Content",
        205 => "Reset Content",
        206 => "Partial Content",
        300 => "Multiple Choices",
        301 => "Moved Permanently",
        302 => "Found",
        303 => "See Other",
        304 => "Not Modified",
        305 => "Use Proxy",
        306 => "(Unused)",
        307 => "Temporary Redirect",
        400 => "Bad Request",
        401 => "Unauthorized",
        402 => "Payment Required",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        406 => "Not Acceptable",
        407 => "Proxy Authentication Required",
        408 => "Request Timeout",
        409 => "Conflict",
        410 => "Gone",
        411 => "Length Required",
        412 => "Precondition Failed",
        413 => "Request Entity Too Large",
        414 => "Request-URI Too Long",
        415 => "Unsupported Media Type",
        416 => "Requested Range Not Satisfiable",
        417 => "Expectation Failed",
        500 => "Internal Server Error",
        501 => "Not Implemented",
        502 => "Bad Gateway",
        503 => "Service Unavailable",
        504 => "Gateway Timeout",
        505 => "HTTP Version Not Supported",
        _ => return None,
    };
    Some(reason)
}

/// An HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    status_code: u16,
    headers: HeaderStore,
    content: Option<Vec<u8>>,
    content_file: Option<PathBuf>,
    use_x_sendfile: bool,
}

impl Default for HttpResponse {
    fn default() -> Self {
        let mut headers = HeaderStore::new();
        headers.set("Content-Type", "text/html");
        Self {
            status_code: 200,
            headers,
            content: None,
            content_file: None,
            use_x_sendfile: false,
        }
    }
}

impl HttpResponse {
    /// Create a response with the given status and content type.
    pub fn new(status_code: u16, content_type: &str) -> Result<Self, ResponseError> {
        let mut response = Self::default();
        response.set_status_code(status_code)?;
        response.set_content_type(content_type);
        Ok(response)
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn set_status_code(&mut self, code: u16) -> Result<(), ResponseError> {
        if reason_phrase(code).is_none() {
            return Err(ResponseError::InvalidStatus(code));
        }
        self.status_code = code;
        Ok(())
    }

    pub fn status_reason(&self) -> &'static str {
        reason_phrase(self.status_code).unwrap_or_default()
    }

    /// e.g. `HTTP/1.1 200 OK`
    pub fn status_line(&self) -> String {
        format!("HTTP/1.1 {} {}", self.status_code, self.status_reason())
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.set(name, value);
    }

    pub fn set_headers<I, K, V>(&mut self, headers: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.headers.merge(headers);
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    pub fn headers(&self) -> &HeaderStore {
        &self.headers
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("Content-Type")
    }

    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.headers.set("Content-Type", content_type);
    }

    pub fn content(&self) -> Option<&[u8]> {
        self.content.as_deref()
    }

    /// The body as text, `None` when absent or not UTF-8.
    pub fn content_str(&self) -> Option<&str> {
        self.content
            .as_deref()
            .and_then(|c| std::str::from_utf8(c).ok())
    }

    pub fn set_content(&mut self, content: impl Into<Vec<u8>>) {
        self.content = Some(content.into());
    }

    pub fn content_file(&self) -> Option<&Path> {
        self.content_file.as_deref()
    }

    pub fn set_content_file(&mut self, path: Option<PathBuf>) {
        self.content_file = path;
    }

    pub fn use_x_sendfile(&self) -> bool {
        self.use_x_sendfile
    }

    /// Deliver the content file through an `X-Sendfile` header instead of
    /// reading it.
    pub fn set_use_x_sendfile(&mut self, enabled: bool) {
        self.use_x_sendfile = enabled;
    }

    /// Parse a response dump captured with `curl -i`.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ResponseError> {
        let data = std::fs::read_to_string(path)?;
        Self::from_raw(&data)
    }

    /// Parse a raw response: status line, headers, blank line, body.
    pub fn from_raw(data: &str) -> Result<Self, ResponseError> {
        let (head, body) = data
            .split_once("\r\n\r\n")
            .or_else(|| data.split_once("\n\n"))
            .unwrap_or((data, ""));

        let mut lines = head.lines();
        let status_line = lines
            .next()
            .ok_or_else(|| ResponseError::Malformed("empty response".to_string()))?;
        let code = status_line
            .split_whitespace()
            .nth(1)
            .and_then(|c| c.parse::<u16>().ok())
            .ok_or_else(|| ResponseError::Malformed(format!("bad status line '{}'", status_line)))?;

        let mut response = Self::default();
        response.set_status_code(code)?;
        for line in lines {
            if let Some((name, value)) = line.split_once(':') {
                response.set_header(name.trim(), value.trim());
            }
        }
        response.set_content(body);
        Ok(response)
    }
}

impl fmt::Display for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "*HttpResponse*")?;
        writeln!(f, "Status:")?;
        writeln!(f, "\t{}", self.status_line())?;
        writeln!(f, "Headers:")?;
        write!(f, "{}", self.headers)?;
        writeln!(f, "Content:")?;
        if let Some(content) = &self.content {
            write!(f, "{}", String::from_utf8_lossy(content))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let h = HttpResponse::default();
        assert_eq!(h.status_code(), 200);
        assert_eq!(h.content_type(), Some("text/html"));
        assert_eq!(h.content(), None);
        assert_eq!(h.header("Foo"), None);
        assert_eq!(h.status_line(), "HTTP/1.1 200 OK");
    }

    #[test]
    fn test_invalid_status() {
        assert!(matches!(
            HttpResponse::new(999, "text/plain"),
            Err(ResponseError::InvalidStatus(999))
        ));
        let mut h = HttpResponse::default();
        assert!(h.set_status_code(418).is_err());
        assert_eq!(h.status_code(), 200);
    }

    #[test]
    fn test_reason_phrases() {
        assert_eq!(reason_phrase(306), Some("(Unused)"));
        assert_eq!(reason_phrase(405), Some("Method Not Allowed"));
        assert_eq!(reason_phrase(308), None);
    }

    #[test]
    fn test_from_raw() {
        let raw = "HTTP/1.1 401 Unauthorized\r\n\
                   Content-Type: application/json\r\n\
                   WWW-Authenticate: Bearer realm=\"VOOT Proxy\",error=\"invalid_token\"\r\n\
                   \r\n\
                   {\"error\":\"invalid_token\"}";
        let h = HttpResponse::from_raw(raw).unwrap();
        assert_eq!(h.status_code(), 401);
        assert_eq!(h.content_type(), Some("application/json"));
        assert_eq!(
            h.header("www-authenticate"),
            Some("Bearer realm=\"VOOT Proxy\",error=\"invalid_token\"")
        );
        assert_eq!(h.content_str(), Some("{\"error\":\"invalid_token\"}"));
    }

    #[test]
    fn test_from_raw_keeps_colons_in_values() {
        let h = HttpResponse::from_raw("HTTP/1.1 200 OK\r\nLocation: http://x/y\r\n\r\n").unwrap();
        assert_eq!(h.header("Location"), Some("http://x/y"));
        assert_eq!(h.content_str(), Some(""));
    }

    #[test]
    fn test_from_raw_rejects_garbage() {
        assert!(matches!(
            HttpResponse::from_raw("not a response"),
            Err(ResponseError::Malformed(_))
        ));
        assert!(matches!(
            HttpResponse::from_raw(""),
            Err(ResponseError::Malformed(_))
        ));
    }

    #[test]
    fn test_from_missing_file() {
        assert!(matches!(
            HttpResponse::from_file("/nonexistent/dump.txt"),
            Err(ResponseError::Io(_))
        ));
    }

    #[test]
    fn test_display() {
        let mut h = HttpResponse::new(404, "application/json").unwrap();
        h.set_content("{}");
        let dump = h.to_string();
        assert!(dump.contains("\tHTTP/1.1 404 Not Found"));
        assert!(dump.contains("\tContent-Type: application/json"));
        assert!(dump.ends_with("Content:\n{}"));
    }
}
