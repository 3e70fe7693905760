//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, body buffering)
//!     → incoming.rs (transport view of the request)
//!     → request.rs (HttpRequest: method, URI, headers, body, path info)
//!     → RestService (application routes via HttpRequest::match_rest)
//!     → response.rs (HttpResponse → Axum response)
//!     → Send to client
//!
//! Outgoing:
//!     HttpRequest → outgoing.rs (reqwest) → HttpResponse
//! ```

pub mod error;
pub mod headers;
pub mod incoming;
pub mod method;
pub mod outgoing;
pub mod request;
pub mod response;
pub mod server;
pub mod uri;

pub use error::{
    IncomingRequestError, OutgoingRequestError, RequestError, ResponseError, ServiceError,
    UriError,
};
pub use headers::HeaderStore;
pub use incoming::{HyperIncoming, IncomingRequest, ServerVariables};
pub use method::Method;
pub use outgoing::OutgoingClient;
pub use request::HttpRequest;
pub use response::HttpResponse;
pub use server::{default_response, HttpServer, RestService};
pub use uri::Uri;
