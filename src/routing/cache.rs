//! Shared cache of compiled patterns.
//!
//! Compiled patterns are immutable, so one compilation serves every request
//! that registers the same pattern source. The first compilation of a source
//! holds the map entry, which serialises concurrent compilers of that source.
//! Failed compilations are not cached.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use std::sync::Arc;

use crate::routing::pattern::{CompiledPattern, PatternError};

static GLOBAL: Lazy<Arc<PatternCache>> = Lazy::new(|| Arc::new(PatternCache::new()));

/// Concurrent map from pattern source to compiled pattern.
#[derive(Debug, Default)]
pub struct PatternCache {
    compiled: DashMap<String, Arc<CompiledPattern>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache used by routers built without an explicit one.
    pub fn global() -> Arc<PatternCache> {
        Arc::clone(&GLOBAL)
    }

    /// Return the compiled form of `source`, compiling it on first use.
    pub fn get_or_compile(&self, source: &str) -> Result<Arc<CompiledPattern>, PatternError> {
        if let Some(hit) = self.compiled.get(source) {
            return Ok(Arc::clone(hit.value()));
        }

        match self.compiled.entry(source.to_string()) {
            Entry::Occupied(entry) => Ok(Arc::clone(entry.get())),
            Entry::Vacant(entry) => {
                let compiled = Arc::new(CompiledPattern::compile(source)?);
                entry.insert(Arc::clone(&compiled));
                tracing::debug!(pattern = source, "Cached compiled pattern");
                Ok(compiled)
            }
        }
    }

    /// Number of cached patterns.
    pub fn len(&self) -> usize {
        self.compiled.len()
    }

    pub fn is_empty(&self) -> bool {
        self.compiled.is_empty()
    }

    pub fn clear(&self) {
        self.compiled.clear();
    }
}
