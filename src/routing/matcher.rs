//! Route matching logic.
//!
//! # Responsibilities
//! - Evaluate a compiled pattern against a request path
//! - Return captured values in pattern order
//!
//! # Design Decisions
//! - Pure function of pattern and path; no shared state
//! - Matching is anchored at both ends
//! - The regex engine guarantees linear-time evaluation, no backtracking
//! - A capture inside an absent optional group yields an empty string when a
//!   later capture participated; trailing absent captures are dropped

use crate::routing::pattern::{CompiledPattern, Program};

/// Outcome of matching one path against one pattern.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchResult {
    pub matched: bool,
    pub captures: Vec<String>,
}

impl MatchResult {
    /// A failed match.
    pub fn no_match() -> Self {
        Self::default()
    }

    fn matched(captures: Vec<String>) -> Self {
        Self {
            matched: true,
            captures,
        }
    }
}

/// Match `path` against `pattern`.
pub fn match_path(pattern: &CompiledPattern, path: &str) -> MatchResult {
    match pattern.program() {
        Program::Exact(expected) => {
            if expected == path {
                MatchResult::matched(Vec::new())
            } else {
                MatchResult::no_match()
            }
        }
        Program::Expression(regex) => {
            let Some(caps) = regex.captures(path) else {
                return MatchResult::no_match();
            };

            let groups: Vec<Option<&str>> = (1..=pattern.capture_names().len())
                .map(|i| caps.get(i).map(|m| m.as_str()))
                .collect();
            let participating = groups.iter().rposition(Option::is_some).map_or(0, |i| i + 1);

            let captures = groups
                .into_iter()
                .take(participating)
                .map(|g| g.unwrap_or_default().to_string())
                .collect();
            MatchResult::matched(captures)
        }
    }
}
