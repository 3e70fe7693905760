//! Per-request route dispatch.
//!
//! # Responsibilities
//! - Evaluate registered (method, pattern) rules in call order
//! - Invoke the handler of the first rule that matches, then freeze
//! - Record every method seen before the freeze for the `Allow` header
//!
//! # Design Decisions
//! - One router per request; never shared across threads
//! - First match wins; once closed, later calls return `false` without
//!   recording their method
//! - The router reports facts (methods seen, pattern matched) and leaves
//!   the 404/405 decision to the caller

use std::sync::Arc;

use crate::http::Method;
use crate::routing::cache::PatternCache;
use crate::routing::matcher::match_path;
use crate::routing::pattern::PatternError;

/// Matching state of a router.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    /// No rule has matched yet.
    Open,
    /// A rule matched; all further attempts are ignored.
    Closed,
}

/// Stateful first-match-wins router owned by a single request.
#[derive(Debug, Clone)]
pub struct RequestRouter {
    matched_methods: Vec<Method>,
    pattern_matched: bool,
    cache: Arc<PatternCache>,
}

impl Default for RequestRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl RequestRouter {
    /// Create a router backed by the process-wide pattern cache.
    pub fn new() -> Self {
        Self::with_cache(PatternCache::global())
    }

    /// Create a router backed by the given pattern cache.
    pub fn with_cache(cache: Arc<PatternCache>) -> Self {
        Self {
            matched_methods: Vec::new(),
            pattern_matched: false,
            cache,
        }
    }

    /// Try one rule against the request.
    ///
    /// `request_method` and `request_path` describe the incoming request;
    /// `method` and `pattern` describe the rule. A `None` pattern matches any
    /// path. Returns `Ok(true)` when the rule matched and `handler` ran with
    /// the captured values in pattern order.
    pub fn try_route<F>(
        &mut self,
        request_method: Method,
        request_path: Option<&str>,
        method: Method,
        pattern: Option<&str>,
        handler: F,
    ) -> Result<bool, PatternError>
    where
        F: FnOnce(&[String]),
    {
        if self.pattern_matched {
            return Ok(false);
        }

        if !self.matched_methods.contains(&method) {
            self.matched_methods.push(method);
        }
        if method != request_method {
            return Ok(false);
        }

        let Some(pattern) = pattern else {
            tracing::debug!(method = %method, "Matched wildcard route");
            self.pattern_matched = true;
            handler(&[]);
            return Ok(true);
        };

        let Some(path) = request_path.filter(|p| p.starts_with('/')) else {
            return Ok(false);
        };
        if !pattern.starts_with('/') {
            return Ok(false);
        }

        let compiled = self.cache.get_or_compile(pattern)?;
        let result = match_path(&compiled, path);
        if !result.matched {
            tracing::trace!(method = %method, pattern, path, "Route did not match");
            return Ok(false);
        }

        tracing::debug!(
            method = %method,
            pattern,
            path,
            captures = result.captures.len(),
            "Matched route"
        );
        self.pattern_matched = true;
        handler(&result.captures);
        Ok(true)
    }

    /// Report the methods seen and whether any pattern matched.
    pub fn resolve_default<F>(&self, callback: F)
    where
        F: FnOnce(&[Method], bool),
    {
        callback(&self.matched_methods, self.pattern_matched);
    }

    /// Methods registered before the router closed, in first-seen order.
    pub fn matched_methods(&self) -> &[Method] {
        &self.matched_methods
    }

    pub fn pattern_matched(&self) -> bool {
        self.pattern_matched
    }

    pub fn state(&self) -> RouterState {
        if self.pattern_matched {
            RouterState::Closed
        } else {
            RouterState::Open
        }
    }
}
