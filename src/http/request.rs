//! Request value and per-request routing.
//!
//! # Responsibilities
//! - Hold the method, URI, headers, body, path info and credentials of one request
//! - Decode query and form parameters
//! - Expose first-match-wins routing over the request's path info
//!
//! # Design Decisions
//! - The method is validated at construction; unsupported methods never
//!   reach routing
//! - Empty parameter values read back as `None`, same as missing ones
//! - Path info is stored verbatim; routing sees exactly what was supplied

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use url::form_urlencoded;

use crate::http::error::RequestError;
use crate::http::headers::HeaderStore;
use crate::http::incoming::IncomingRequest;
use crate::http::method::Method;
use crate::http::uri::Uri;
use crate::routing::{PatternError, RequestRouter};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// An HTTP request, incoming or about to be sent.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    uri: Uri,
    method: Method,
    headers: HeaderStore,
    content: Option<Vec<u8>>,
    path_info: Option<String>,
    basic_auth_user: Option<String>,
    basic_auth_pass: Option<String>,
    router: RequestRouter,
}

impl HttpRequest {
    /// Create a request, validating both the URI and the method.
    pub fn new(uri: &str, method: &str) -> Result<Self, RequestError> {
        let method = method.parse()?;
        Self::with_method(uri, method)
    }

    /// Create a request with an already validated method.
    pub fn with_method(uri: &str, method: Method) -> Result<Self, RequestError> {
        Ok(Self {
            uri: Uri::parse(uri)?,
            method,
            headers: HeaderStore::new(),
            content: None,
            path_info: None,
            basic_auth_user: None,
            basic_auth_pass: None,
            router: RequestRouter::new(),
        })
    }

    /// Build a request from an incoming-request adapter.
    pub fn from_incoming<I>(incoming: &I) -> Result<Self, RequestError>
    where
        I: IncomingRequest + ?Sized,
    {
        let mut request = Self::new(&incoming.request_uri(), incoming.request_method())?;
        request.headers.merge(incoming.request_headers());
        request.content = incoming.content();
        request.path_info = incoming.path_info().map(str::to_string);
        request.basic_auth_user = incoming.basic_auth_user();
        request.basic_auth_pass = incoming.basic_auth_pass();
        Ok(request)
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn uri_mut(&mut self) -> &mut Uri {
        &mut self.uri
    }

    pub fn set_uri(&mut self, uri: Uri) {
        self.uri = uri;
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn set_method(&mut self, method: Method) {
        self.method = method;
    }

    // --- Parameters ---

    /// Decoded query parameters in order of appearance.
    pub fn query_parameters(&self) -> Vec<(String, String)> {
        match self.uri.query() {
            Some(query) => decode_pairs(query.as_bytes()),
            None => Vec::new(),
        }
    }

    /// A query parameter value. Empty values read as `None`; the last
    /// occurrence of a repeated key wins.
    pub fn query_parameter(&self, key: &str) -> Option<String> {
        non_empty_value(self.query_parameters(), key)
    }

    /// Encode `parameters` as a form body. Only valid on POST requests.
    pub fn set_post_parameters<I, K, V>(&mut self, parameters: I) -> Result<(), RequestError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.require_post()?;
        let body = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(parameters)
            .finish();
        self.set_content_type(FORM_CONTENT_TYPE);
        self.content = Some(body.into_bytes());
        Ok(())
    }

    /// Decoded form parameters from the body. Only valid on POST requests.
    pub fn post_parameters(&self) -> Result<Vec<(String, String)>, RequestError> {
        self.require_post()?;
        Ok(self.content.as_deref().map(decode_pairs).unwrap_or_default())
    }

    pub fn post_parameter(&self, key: &str) -> Result<Option<String>, RequestError> {
        Ok(non_empty_value(self.post_parameters()?, key))
    }

    fn require_post(&self) -> Result<(), RequestError> {
        if self.method != Method::Post {
            return Err(RequestError::NotPost);
        }
        Ok(())
    }

    // --- Headers ---

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

    // --- Body ---

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

    pub fn clear_content(&mut self) {
        self.content = None;
    }

    // --- Path info & credentials ---

    pub fn path_info(&self) -> Option<&str> {
        self.path_info.as_deref()
    }

    pub fn set_path_info(&mut self, path_info: impl Into<String>) {
        self.path_info = Some(path_info.into());
    }

    /// The basic-auth user, explicit or decoded from an `Authorization` header.
    pub fn basic_auth_user(&self) -> Option<String> {
        self.basic_auth_user
            .clone()
            .or_else(|| self.authorization_credentials().map(|(user, _)| user))
    }

    pub fn basic_auth_pass(&self) -> Option<String> {
        self.basic_auth_pass
            .clone()
            .or_else(|| self.authorization_credentials().map(|(_, pass)| pass))
    }

    pub fn set_basic_auth_user(&mut self, user: Option<String>) {
        self.basic_auth_user = user;
    }

    pub fn set_basic_auth_pass(&mut self, pass: Option<String>) {
        self.basic_auth_pass = pass;
    }

    /// Credentials set explicitly, ignoring any `Authorization` header.
    pub(crate) fn explicit_credentials(&self) -> Option<(&str, &str)> {
        let user = self.basic_auth_user.as_deref()?;
        Some((user, self.basic_auth_pass.as_deref().unwrap_or_default()))
    }

    fn authorization_credentials(&self) -> Option<(String, String)> {
        self.headers.get("Authorization").and_then(decode_basic_auth)
    }

    // --- Routing ---

    /// Try one route against this request.
    ///
    /// Runs `handler` with the captured path values and returns `Ok(true)`
    /// if `method` and `pattern` match and no earlier route matched.
    /// `None` as pattern matches any path.
    pub fn match_rest<F>(
        &mut self,
        method: Method,
        pattern: Option<&str>,
        handler: F,
    ) -> Result<bool, PatternError>
    where
        F: FnOnce(&[String]),
    {
        self.router
            .try_route(self.method, self.path_info.as_deref(), method, pattern, handler)
    }

    /// Report the methods tried and whether any route matched.
    pub fn match_rest_default<F>(&self, callback: F)
    where
        F: FnOnce(&[Method], bool),
    {
        self.router.resolve_default(callback);
    }

    pub fn router(&self) -> &RequestRouter {
        &self.router
    }

    /// Replace the router, e.g. to use a dedicated pattern cache.
    pub fn set_router(&mut self, router: RequestRouter) {
        self.router = router;
    }
}

impl fmt::Display for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        writeln!(f, "*HttpRequest*")?;
        writeln!(f, "Request Method: {}", self.method)?;
        writeln!(f, "Request URI: {}", self.uri)?;
        writeln!(f, "Headers:")?;
        write!(f, "{}", self.headers)?;
        writeln!(f, "Content:")?;
        if let Some(content) = &self.content {
            write!(f, "{}", String::from_utf8_lossy(content))?;
        }
        Ok(())
    }
}

fn decode_pairs(input: &[u8]) -> Vec<(String, String)> {
    form_urlencoded::parse(input).into_owned().collect()
}

fn non_empty_value(pairs: Vec<(String, String)>, key: &str) -> Option<String> {
    pairs
        .into_iter()
        .rfind(|(k, _)| k == key)
        .map(|(_, v)| v)
        .filter(|v| !v.is_empty())
}

/// Decode an `Authorization: Basic ...` value into user and password.
pub(crate) fn decode_basic_auth(header: &str) -> Option<(String, String)> {
    let (scheme, encoded) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user, pass) = decoded.split_once(':')?;
    Some((user.to_string(), pass.to_string()))
}

/// Encode user and password as an `Authorization: Basic ...` value.
pub(crate) fn encode_basic_auth(user: &str, pass: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{}:{}", user, pass)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_post_parameters() {
        let mut h = HttpRequest::new("http://www.example.com/request", "POST").unwrap();
        h.set_post_parameters([("id", "5"), ("action", "help")]).unwrap();
        assert_eq!(h.uri().as_str(), "http://www.example.com/request");
        assert_eq!(h.method(), Method::Post);
        assert_eq!(h.content_str(), Some("id=5&action=help"));
        assert_eq!(h.header("Content-type"), Some(FORM_CONTENT_TYPE));
        assert_eq!(h.post_parameters().unwrap(), pairs(&[("id", "5"), ("action", "help")]));
        assert_eq!(h.post_parameter("id").unwrap().as_deref(), Some("5"));
    }

    #[test]
    fn test_query_parameters() {
        let h = HttpRequest::new("http://www.example.com/request?action=foo&method=bar", "GET")
            .unwrap();
        assert_eq!(h.query_parameters(), pairs(&[("action", "foo"), ("method", "bar")]));

        let h = HttpRequest::new("http://www.example.com/request", "GET").unwrap();
        assert!(h.query_parameters().is_empty());
    }

    #[test]
    fn test_query_and_post_are_separate() {
        let mut h = HttpRequest::new("http://www.example.com/request?action=foo&method=bar", "POST")
            .unwrap();
        h.set_post_parameters([("id", "5"), ("action", "help")]).unwrap();
        assert_eq!(h.query_parameter("action").as_deref(), Some("foo"));
        assert_eq!(h.post_parameter("action").unwrap().as_deref(), Some("help"));
    }

    #[test]
    fn test_empty_query_value_is_none() {
        let h = HttpRequest::new("http://www.example.com/request?foo=&bar=&foobar=xyz", "GET")
            .unwrap();
        assert_eq!(h.query_parameter("foo"), None);
        assert_eq!(h.query_parameter("bar"), None);
        assert_eq!(h.query_parameter("foobar").as_deref(), Some("xyz"));
        assert_eq!(h.query_parameter("missing"), None);
    }

    #[test]
    fn test_repeated_query_key_last_wins() {
        let h = HttpRequest::new("http://example.org/?limit=10&limit=20", "GET").unwrap();
        assert_eq!(h.query_parameter("limit").as_deref(), Some("20"));
    }

    #[test]
    fn test_post_accessors_require_post() {
        let mut h = HttpRequest::new("http://www.example.com/request", "GET").unwrap();
        assert!(matches!(h.post_parameters(), Err(RequestError::NotPost)));
        assert!(matches!(
            h.set_post_parameters([("action", "test")]),
            Err(RequestError::NotPost)
        ));
    }

    #[test]
    fn test_invalid_construction() {
        assert!(matches!(
            HttpRequest::new("foo", "GET"),
            Err(RequestError::Uri(_))
        ));
        assert!(matches!(
            HttpRequest::new("http://www.example.com/request", "FOO"),
            Err(RequestError::UnsupportedMethod(_))
        ));
    }

    #[test]
    fn test_headers() {
        let mut h = HttpRequest::new("http://www.example.com/request", "GET").unwrap();
        assert_eq!(h.header("Authorization"), None);
        h.set_header("Authorization", "Bla");
        assert!(h.header("authorization").is_some());
        h.set_content_type("application/json");
        assert_eq!(h.content_type(), Some("application/json"));
    }

    #[test]
    fn test_basic_auth_from_header() {
        let mut h = HttpRequest::new("http://www.example.org", "GET").unwrap();
        h.set_header("Authorization", encode_basic_auth("foo", "bar"));
        assert_eq!(h.basic_auth_user().as_deref(), Some("foo"));
        assert_eq!(h.basic_auth_pass().as_deref(), Some("bar"));
        assert!(h.explicit_credentials().is_none());

        h.set_basic_auth_user(Some("explicit".into()));
        assert_eq!(h.basic_auth_user().as_deref(), Some("explicit"));
    }

    #[test]
    fn test_decode_basic_auth() {
        assert_eq!(
            decode_basic_auth("Basic dXNlcjpwYXNzOndvcmQ="),
            Some(("user".to_string(), "pass:word".to_string()))
        );
        assert_eq!(decode_basic_auth("Bearer xyz"), None);
        assert_eq!(decode_basic_auth("Basic !!!"), None);
    }

    #[test]
    fn test_match_rest() {
        let mut h = HttpRequest::new("http://www.example.org/api", "GET").unwrap();
        h.set_path_info("/foo/bar/baz");
        let mut args = Vec::new();
        assert!(h
            .match_rest(Method::Get, Some("/:one/:two/:three"), |a| args = a.to_vec())
            .unwrap());
        assert_eq!(args, vec!["foo", "bar", "baz"]);
    }

    #[test]
    fn test_match_rest_empty_resource() {
        let mut h = HttpRequest::new("http://www.example.org/api", "GET").unwrap();
        h.set_path_info("/foo/");
        assert!(!h.match_rest(Method::Get, Some("/foo/:bar"), |_| {}).unwrap());
        h.match_rest_default(|methods, matched| {
            assert_eq!(methods, [Method::Get]);
            assert!(!matched);
        });
    }

    #[test]
    fn test_display() {
        let mut h = HttpRequest::new("http://www.example.org/", "POST").unwrap();
        h.set_header("A", "B");
        h.set_content("body");
        let dump = h.to_string();
        assert!(dump.contains("Request Method: POST"));
        assert!(dump.contains("\tA: B"));
        assert!(dump.ends_with("Content:\nbody"));
    }
}
