//! Case-insensitive header storage.
//!
//! # Responsibilities
//! - Store header name/value pairs in insertion order
//! - Resolve names case-insensitively, and also across `-`/`_` spelling
//! - Keep one entry per folded name
//!
//! # Design Decisions
//! - Lookup is two-phase: lowercase comparison first, then lowercase with
//!   dashes turned into underscores on both sides. CGI-style transports
//!   surface `CONTENT_TYPE` where clients send `Content-Type`.
//! - Re-setting a header keeps the stored name and replaces the value
//! - No removal; headers are only ever set or merged

use std::fmt;

/// Ordered, case-insensitive header map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderStore {
    entries: Vec<(String, String)>,
}

/// Lowercase a header name.
fn fold_case(name: &str) -> String {
    name.to_ascii_lowercase()
}

/// Lowercase a header name and unify separator style.
fn fold_separators(name: &str) -> String {
    name.to_ascii_lowercase().replace('-', "_")
}

impl HeaderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Position of the stored entry matching `name`, if any.
    fn position(&self, name: &str) -> Option<usize> {
        let wanted = fold_case(name);
        if let Some(i) = self.entries.iter().position(|(k, _)| fold_case(k) == wanted) {
            return Some(i);
        }

        let wanted = fold_separators(name);
        self.entries
            .iter()
            .position(|(k, _)| fold_separators(k) == wanted)
    }

    /// Set a header, overwriting the value of an existing entry.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(i) => self.entries[i].1 = value,
            None => self.entries.push((name, value)),
        }
    }

    /// Set every header from `headers`, in order.
    pub fn merge<I, K, V>(&mut self, headers: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in headers {
            self.set(k, v);
        }
    }

    /// Look up a header value.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.entries[i].1.as_str())
    }

    /// The stored name for `name`, as it was first set.
    pub fn stored_name(&self, name: &str) -> Option<&str> {
        self.position(name).map(|i| self.entries[i].0.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// All entries in insertion order.
    pub fn entries(&self) -> &[(String, String)] {
        &self.entries
    }

    /// All entries rendered as `Name: value` lines.
    pub fn formatted(&self) -> Vec<String> {
        self.entries
            .iter()
            .map(|(k, v)| format!("{}: {}", k, v))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for HeaderStore
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut store = HeaderStore::new();
        store.merge(iter);
        store
    }
}

impl fmt::Display for HeaderStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (k, v) in &self.entries {
            writeln!(f, "\t{}: {}", k, v)?;
        }
        Ok(())
    }
}
