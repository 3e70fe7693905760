//! Error types for the HTTP subsystem.

use thiserror::Error;

/// Errors raised while building a URI.
#[derive(Debug, Error)]
pub enum UriError {
    /// The string is not an absolute URI.
    #[error("the uri is malformed: {0}")]
    Malformed(#[from] url::ParseError),

    /// The URI parsed but is missing a part its scheme requires.
    #[error("the uri '{0}' has no host")]
    MissingHost(String),
}

/// Errors raised by request construction and accessors.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid or unsupported request method '{0}'")]
    UnsupportedMethod(String),

    /// A POST-only accessor was used on another method.
    #[error("request method should be POST")]
    NotPost,

    #[error(transparent)]
    Uri(#[from] UriError),
}

/// Errors raised by response construction and parsing.
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("invalid status code {0}")]
    InvalidStatus(u16),

    #[error("malformed response dump: {0}")]
    Malformed(String),

    #[error("unable to read file: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by incoming request adapters.
#[derive(Debug, Error)]
pub enum IncomingRequestError {
    #[error("missing (one or more) required environment variables: {0:?}")]
    MissingVariables(Vec<&'static str>),

    #[error("unable to read request body: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised when sending a request to a remote server.
#[derive(Debug, Error)]
pub enum OutgoingRequestError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error(transparent)]
    Uri(#[from] UriError),
}

/// Errors returned by a REST service while handling a request.
///
/// Every variant is reported to the client as `500 Internal Server Error`.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The handler rejected the request.
    #[error("{0}")]
    Handler(String),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Response(#[from] ResponseError),

    #[error(transparent)]
    Pattern(#[from] crate::routing::PatternError),

    #[error(transparent)]
    Outgoing(#[from] OutgoingRequestError),

    #[error(transparent)]
    Json(#[from] crate::utils::json::JsonError),
}

impl ServiceError {
    pub fn handler(message: impl Into<String>) -> Self {
        ServiceError::Handler(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RequestError::UnsupportedMethod("FOO".into());
        assert_eq!(err.to_string(), "invalid or unsupported request method 'FOO'");

        assert_eq!(RequestError::NotPost.to_string(), "request method should be POST");
        assert_eq!(ResponseError::InvalidStatus(999).to_string(), "invalid status code 999");
    }

    #[test]
    fn test_uri_error_converts() {
        let parse_err = url::Url::parse("foo").unwrap_err();
        let err: RequestError = UriError::from(parse_err).into();
        assert!(matches!(err, RequestError::Uri(UriError::Malformed(_))));
    }

    #[test]
    fn test_service_error_messages() {
        assert_eq!(
            ServiceError::handler("you cannot say 'foo'!").to_string(),
            "you cannot say 'foo'!"
        );
        let err: ServiceError = RequestError::NotPost.into();
        assert_eq!(err.to_string(), "request method should be POST");
    }
}
