//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Caller registers (method, pattern, handler) on a request
//!     → router.rs (freeze check, method bookkeeping, method filter)
//!     → cache.rs (compile pattern once, share the result)
//!     → pattern.rs (tokenize, build anchored program)
//!     → matcher.rs (evaluate program against the path)
//!     → handler(captures...) on match, router closes
//!
//! After registration:
//!     router.resolve_default(methods_seen, pattern_matched)
//!     → caller renders 404 / 405 + Allow
//! ```
//!
//! # Design Decisions
//! - Linear scan in registration order, first match wins
//! - Compiled patterns are immutable and shared between requests
//! - Routing mismatches are not errors; only unbuildable patterns are

pub mod cache;
pub mod matcher;
pub mod pattern;
pub mod router;

pub use cache::PatternCache;
pub use matcher::{match_path, MatchResult};
pub use pattern::{CompiledPattern, PatternError, PatternToken};
pub use router::{RequestRouter, RouterState};
