//! Outgoing client tests against fixture dumps and a live echo backend.

use rest_service::http::{HttpRequest, Method, OutgoingClient, OutgoingRequestError};
use serde_json::Value;

mod common;

fn file_uri(name: &str) -> String {
    format!("file://{}", common::fixture(name).display())
}

fn echo_body(response: &rest_service::HttpResponse) -> Value {
    serde_json::from_slice(response.content().unwrap()).unwrap()
}

#[test]
fn test_simple_file_request() {
    let request = HttpRequest::new(&file_uri("simple.txt"), "GET").unwrap();
    let response = OutgoingClient::new().unwrap().send(&request).unwrap();
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.content_str(), Some("Hello World"));
    assert_eq!(response.content_type(), Some("text/plain"));
}

#[test]
fn test_bearer_file_request() {
    let request = HttpRequest::new(&file_uri("bearer.txt"), "GET").unwrap();
    let response = OutgoingClient::new().unwrap().send(&request).unwrap();
    assert_eq!(response.status_code(), 401);
    assert!(response
        .header("WWW-Authenticate")
        .unwrap()
        .starts_with("Bearer realm=\"API\""));
    let body: Value = serde_json::from_slice(response.content().unwrap()).unwrap();
    assert_eq!(body["error"], "invalid_token");
}

#[test]
fn test_empty_response_file() {
    let request = HttpRequest::new(&file_uri("empty_response.txt"), "GET").unwrap();
    let response = OutgoingClient::new().unwrap().send(&request).unwrap();
    assert_eq!(response.status_code(), 204);
    assert_eq!(response.content_str(), Some(""));
}

#[test]
fn test_get_with_query_and_headers() {
    let addr = common::start_echo_backend();
    let mut request =
        HttpRequest::with_method(&format!("http://{}/items?limit=5", addr), Method::Get).unwrap();
    request.set_header("X-Test", "42");

    let response = OutgoingClient::new().unwrap().send(&request).unwrap();
    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("X-Echo"), Some("yes"));

    let body = echo_body(&response);
    assert_eq!(body["method"], "GET");
    assert_eq!(body["path"], "/items");
    assert_eq!(body["query"], "limit=5");
    assert_eq!(body["x_test"], "42");
    assert_eq!(body["authorization"], Value::Null);
}

#[test]
fn test_post_sends_form_body() {
    let addr = common::start_echo_backend();
    let mut request =
        HttpRequest::with_method(&format!("http://{}/items", addr), Method::Post).unwrap();
    request
        .set_post_parameters([("id", "5"), ("action", "help")])
        .unwrap();

    let response = OutgoingClient::new().unwrap().send(&request).unwrap();
    let body = echo_body(&response);
    assert_eq!(body["method"], "POST");
    assert_eq!(body["body"], "id=5&action=help");
    assert_eq!(body["content_type"], "application/x-www-form-urlencoded");
}

#[test]
fn test_basic_auth_header() {
    let addr = common::start_echo_backend();
    let mut request =
        HttpRequest::with_method(&format!("http://{}/secure", addr), Method::Get).unwrap();
    request.set_basic_auth_user(Some("foo".into()));
    request.set_basic_auth_pass(Some("bar".into()));

    let response = OutgoingClient::new().unwrap().send(&request).unwrap();
    assert_eq!(echo_body(&response)["authorization"], "Basic Zm9vOmJhcg==");
}

#[test]
fn test_error_status_is_returned() {
    let addr = common::start_echo_backend();
    let request = HttpRequest::new(&format!("http://{}/missing", addr), "GET").unwrap();
    let response = OutgoingClient::new().unwrap().send(&request).unwrap();
    assert_eq!(response.status_code(), 404);
}

#[test]
fn test_connection_refused() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let request = HttpRequest::new(&format!("http://{}/", addr), "GET").unwrap();
    let err = OutgoingClient::new().unwrap().send(&request).unwrap_err();
    assert!(matches!(err, OutgoingRequestError::Transport(_)));
}
