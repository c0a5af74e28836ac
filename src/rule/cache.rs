//! Rule parsing cache with fast hashing

use ahash::AHashMap;
use parking_lot::RwLock;

use crate::diagnostics::{CollectingSink, Diagnostic, DiagnosticSink};
use crate::rule::ast::RuleNode;
use crate::rule::parser;

/// Default number of distinct rule strings kept
pub const DEFAULT_CACHE_CAPACITY: usize = 2048;

/// Bounded cache of built trees keyed by the exact rule string.
///
/// Absent results are cached too, along with the diagnostics their build
/// produced so that every lookup reports them again. When full, the cache is
/// cleared before the next insert.
#[derive(Debug)]
pub struct RuleCache {
    entries: RwLock<AHashMap<String, CachedBuild>>,
    capacity: usize,
}

#[derive(Debug, Clone)]
struct CachedBuild {
    ast: Option<RuleNode>,
    diagnostics: Vec<Diagnostic>,
}

impl Default for RuleCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CACHE_CAPACITY)
    }
}

impl RuleCache {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: RwLock::new(AHashMap::with_capacity(capacity.min(DEFAULT_CACHE_CAPACITY))),
            capacity,
        }
    }

    /// Get or build a rule, reporting the build's diagnostics to `sink`
    /// whether or not the tree came from the cache.
    #[inline]
    pub fn get_or_build(&self, rule: &str, sink: &dyn DiagnosticSink) -> Option<RuleNode> {
        // Fast path: check read lock first
        {
            let cache = self.entries.read();
            if let Some(entry) = cache.get(rule) {
                replay(&entry.diagnostics, sink);
                return entry.ast.clone();
            }
        }

        let collected = CollectingSink::new();
        let ast = parser::build(rule, &collected);
        let diagnostics = collected.take();
        replay(&diagnostics, sink);

        if self.capacity > 0 {
            let mut cache = self.entries.write();
            if cache.len() >= self.capacity {
                tracing::debug!(capacity = self.capacity, "rule cache full, clearing");
                cache.clear();
            }
            cache.insert(
                rule.to_string(),
                CachedBuild {
                    ast: ast.clone(),
                    diagnostics,
                },
            );
        }

        ast
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}

fn replay(diagnostics: &[Diagnostic], sink: &dyn DiagnosticSink) {
    for diagnostic in diagnostics {
        sink.report(diagnostic.clone());
    }
}
