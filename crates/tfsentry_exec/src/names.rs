//! Unique temporary-file names.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Generates unique file names from a monotonic counter.
///
/// Clones share the counter. Inject a sequence with a fixed starting
/// point for deterministic test output.
#[derive(Debug, Clone)]
pub struct NameSeq {
    counter: Arc<AtomicU64>,
}

impl Default for NameSeq {
    fn default() -> Self {
        Self::new()
    }
}

impl NameSeq {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    /// Start the sequence at a fixed value, for deterministic tests.
    pub fn starting_at(value: u64) -> Self {
        Self {
            counter: Arc::new(AtomicU64::new(value)),
        }
    }

    /// Produce the next name, e.g. `rule-7.rego`.
    pub fn next(&self, stem: &str, extension: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::Relaxed);
        format!("{stem}-{n}.{extension}")
    }
}
