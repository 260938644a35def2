//! Execution results.

use std::fmt;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Measurement counts keyed by bitstring.
///
/// Character `i` of every bitstring is classical bit `i`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    counts: FxHashMap<String, u64>,
}

impl Counts {
    /// Create empty counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `count` observations of `bitstring`.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.counts.entry(bitstring.into()).or_insert(0) += count;
    }

    /// Get the count for a bitstring.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// Total number of recorded shots.
    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct bitstrings.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Check whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// The most frequent bitstring; ties resolve to the lexicographically
    /// smallest one.
    pub fn most_frequent(&self) -> Option<(&str, u64)> {
        self.counts
            .iter()
            .min_by(|(a, ca), (b, cb)| cb.cmp(ca).then_with(|| a.cmp(b)))
            .map(|(s, &c)| (s.as_str(), c))
    }

    /// Bitstrings sorted by descending count.
    pub fn sorted(&self) -> Vec<(&str, u64)> {
        let mut entries: Vec<_> = self.counts.iter().map(|(s, &c)| (s.as_str(), c)).collect();
        entries.sort_by(|(a, ca), (b, cb)| cb.cmp(ca).then_with(|| a.cmp(b)));
        entries
    }

    /// Iterate over `(bitstring, count)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(s, &c)| (s.as_str(), c))
    }
}

impl fmt::Display for Counts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .sorted()
            .into_iter()
            .map(|(s, c)| format!("{s}: {c}"))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// Result of executing a circuit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Measurement counts.
    pub counts: Counts,
    /// Number of shots executed.
    pub shots: u32,
    /// Wall-clock execution time in milliseconds, if measured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

impl ExecutionResult {
    /// Create a new result.
    pub fn new(counts: Counts, shots: u32) -> Self {
        Self {
            counts,
            shots,
            execution_time_ms: None,
        }
    }

    /// Attach the execution time.
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }
}
