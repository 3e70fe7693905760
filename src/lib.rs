//! REST request routing library.
//!
//! Requests are matched against `(method, pattern)` rules in call order;
//! the first matching rule runs its handler with the captured path values
//! and later rules are ignored. Patterns use `:name` for one path segment,
//! `:name+` for a greedy multi-segment capture and `( … )` for optional parts.
//!
//! ```text
//!     HttpRequest::match_rest(method, pattern, handler)
//!         → routing::RequestRouter (first match wins, methods recorded)
//!         → routing::PatternCache → CompiledPattern
//!         → routing::match_path → captures → handler
//! ```

pub mod config;
pub mod http;
pub mod observability;
pub mod routing;
pub mod utils;

pub use config::schema::ServiceConfig;
pub use http::{HttpRequest, HttpResponse, HttpServer, Method, RestService, ServiceError};
pub use routing::{PatternError, RequestRouter};
