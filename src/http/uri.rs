//! Absolute URI value with validation.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::http::error::UriError;

/// A validated absolute URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Uri {
    inner: Url,
}

impl Uri {
    /// Parse and validate a URI.
    pub fn parse(input: &str) -> Result<Self, UriError> {
        let inner = Url::parse(input)?;
        Self::validate(inner)
    }

    fn validate(inner: Url) -> Result<Self, UriError> {
        if inner.is_special() && inner.scheme() != "file" && inner.host_str().is_none() {
            return Err(UriError::MissingHost(inner.to_string()));
        }
        Ok(Self { inner })
    }

    pub fn scheme(&self) -> &str {
        self.inner.scheme()
    }

    pub fn user(&self) -> Option<&str> {
        Some(self.inner.username()).filter(|u| !u.is_empty())
    }

    pub fn password(&self) -> Option<&str> {
        self.inner.password()
    }

    pub fn host(&self) -> Option<&str> {
        self.inner.host_str()
    }

    /// Explicit port, `None` when absent or the scheme default.
    pub fn port(&self) -> Option<u16> {
        self.inner.port()
    }

    pub fn path(&self) -> &str {
        self.inner.path()
    }

    pub fn query(&self) -> Option<&str> {
        self.inner.query()
    }

    pub fn set_query(&mut self, query: Option<&str>) {
        self.inner.set_query(query);
    }

    /// Append `query` to the existing query, joined with `&`.
    pub fn append_query(&mut self, query: &str) {
        let joined = match self.inner.query() {
            Some(existing) => format!("{}&{}", existing, query),
            None => query.to_string(),
        };
        self.inner.set_query(Some(&joined));
    }

    pub fn fragment(&self) -> Option<&str> {
        self.inner.fragment()
    }

    pub fn set_fragment(&mut self, fragment: Option<&str>) {
        self.inner.set_fragment(fragment);
    }

    pub fn as_str(&self) -> &str {
        self.inner.as_str()
    }

    pub fn as_url(&self) -> &Url {
        &self.inner
    }

    /// Local filesystem path for `file://` URIs.
    pub fn file_path(&self) -> Option<std::path::PathBuf> {
        if self.scheme() != "file" {
            return None;
        }
        self.inner.to_file_path().ok()
    }
}

impl FromStr for Uri {
    type Err = UriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uri::parse(s)
    }
}

impl fmt::Display for Uri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.inner.as_str())
    }
}
