//! Execution results.
//!
//! Bitstrings are fixed width with classical bit 0 as the rightmost
//! character, so parsing a bitstring as a binary integer gives the index of the
//! corresponding basis state.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::job::JobId;

/// Widest classical register a result can carry.
///
/// Counts are zero-filled over every bitstring, so a result over `n` bits
/// holds `2^n` entries.
pub const MAX_CLASSICAL_BITS: usize = 20;

/// `2^num_bits` when `num_bits` is within [`MAX_CLASSICAL_BITS`].
pub fn outcome_space(num_bits: usize) -> Option<usize> {
    if num_bits > MAX_CLASSICAL_BITS {
        return None;
    }
    1usize.checked_shl(u32::try_from(num_bits).ok()?)
}

/// Measurement counts keyed by bitstring.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Counts {
    counts: BTreeMap<String, u64>,
}

impl Counts {
    /// Create empty counts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts with every `2^num_bits` bitstring present at zero.
    ///
    /// Registers wider than [`MAX_CLASSICAL_BITS`] are left empty.
    pub fn zero_filled(num_bits: usize) -> Self {
        let size = outcome_space(num_bits).unwrap_or(0);
        let counts = (0..size)
            .map(|index| (format_bitstring(index, num_bits), 0))
            .collect();
        Self { counts }
    }

    /// Tally a list of per-shot bitstrings.
    pub fn from_memory(memory: &[String], num_bits: usize) -> Self {
        let mut counts = Self::zero_filled(num_bits);
        for bitstring in memory {
            counts.insert(bitstring.clone(), 1);
        }
        counts
    }

    /// Add `count` occurrences of a bitstring.
    pub fn insert(&mut self, bitstring: impl Into<String>, count: u64) {
        *self.counts.entry(bitstring.into()).or_insert(0) += count;
    }

    /// Count of a bitstring, zero when absent.
    pub fn get(&self, bitstring: &str) -> u64 {
        self.counts.get(bitstring).copied().unwrap_or(0)
    }

    /// Total number of shots.
    pub fn total_shots(&self) -> u64 {
        self.counts.values().sum()
    }

    /// Number of distinct bitstrings.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// Whether no bitstrings are recorded.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Bitstrings and counts in lexicographic (= basis index) order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &u64)> {
        self.counts.iter()
    }

    /// The most frequent bitstring.
    pub fn most_frequent(&self) -> Option<(&String, &u64)> {
        self.counts.iter().max_by_key(|(_, c)| *c)
    }

    /// Relative frequencies indexed by basis state over `num_bits` bits.
    ///
    /// Bitstrings of another width, or unparsable ones, are ignored. Empty
    /// when `num_bits` exceeds [`MAX_CLASSICAL_BITS`].
    pub fn probabilities(&self, num_bits: usize) -> Vec<f64> {
        let Some(size) = outcome_space(num_bits) else {
            return Vec::new();
        };
        let mut probs = vec![0.0; size];
        let total = self.total_shots();
        if total == 0 {
            return probs;
        }
        for (bitstring, &count) in &self.counts {
            if bitstring.len() != num_bits {
                continue;
            }
            if let Ok(index) = usize::from_str_radix(bitstring, 2) {
                probs[index] += count as f64 / total as f64;
            }
        }
        probs
    }
}

/// Format a basis index as a fixed-width bitstring.
pub fn format_bitstring(index: usize, num_bits: usize) -> String {
    if num_bits == 0 {
        return String::new();
    }
    format!("{index:0num_bits$b}")
}

/// Result of one execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    /// Job identifier.
    pub job_id: JobId,
    /// Name of the executed circuit.
    pub circuit: String,
    /// Backend that produced the result.
    pub backend: String,
    /// When the job was created.
    pub created_on: DateTime<Utc>,
    /// Shots requested.
    pub shots_requested: u32,
    /// Shots actually executed.
    pub shots_done: u32,
    /// Aggregated counts, zero-filled over all bitstrings.
    pub counts: Counts,
    /// Per-shot bitstrings, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<Vec<String>>,
    /// Wall-clock execution time in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<u64>,
}

impl ExecutionResult {
    /// Create a result for `shots` completed shots.
    pub fn new(counts: Counts, shots: u32) -> Self {
        Self {
            job_id: JobId::generate(),
            circuit: String::new(),
            backend: String::new(),
            created_on: Utc::now(),
            shots_requested: shots,
            shots_done: shots,
            counts,
            memory: None,
            execution_time_ms: None,
        }
    }

    /// Attach the circuit name.
    pub fn with_circuit(mut self, name: impl Into<String>) -> Self {
        self.circuit = name.into();
        self
    }

    /// Attach the backend name.
    pub fn with_backend(mut self, name: impl Into<String>) -> Self {
        self.backend = name.into();
        self
    }

    /// Attach per-shot memory.
    pub fn with_memory(mut self, memory: Vec<String>) -> Self {
        self.memory = Some(memory);
        self
    }

    /// Attach the execution time.
    pub fn with_execution_time(mut self, ms: u64) -> Self {
        self.execution_time_ms = Some(ms);
        self
    }

    /// Relative frequencies over the counted bit width.
    pub fn probabilities(&self) -> Vec<f64> {
        let width = self.counts.iter().next().map_or(0, |(k, _)| k.len());
        self.counts.probabilities(width)
    }
}
