//! Turn message sets into per-stage latencies and summary statistics.
//!
//! Latencies are in milliseconds. Entry `i` of a set's latency table is the
//! time from chain position `i - 1` to position `i`; entry 0 is always zero.

use serde::Serialize;

use super::chain::TargetChain;
use super::matcher::MessageSet;
use crate::error::AnalysisError;

const NANOS_PER_MS: f64 = 1e6;

/// Relative latencies (ms) for one set.
pub fn latencies_for_set(set: &MessageSet<'_>) -> Vec<f64> {
    let stamps: Vec<i64> = set.timestamps().collect();
    stamps
        .iter()
        .enumerate()
        .map(|(i, &ts)| {
            let previous = if i == 0 { ts } else { stamps[i - 1] };
            ts.saturating_sub(previous) as f64 / NANOS_PER_MS
        })
        .collect()
}

/// Relative latencies (ms) for each set, in order.
pub fn latencies_for_sets(sets: &[MessageSet<'_>]) -> Vec<Vec<f64>> {
    sets.iter().map(latencies_for_set).collect()
}

/// Offsets (ms) of every event from the set's first event.
pub fn offsets_for_set(set: &MessageSet<'_>) -> Vec<f64> {
    let Some(first) = set.timestamps().next() else {
        return Vec::new();
    };
    set.timestamps()
        .map(|ts| ts.saturating_sub(first) as f64 / NANOS_PER_MS)
        .collect()
}

/// Percent change of `a` relative to `b`.
///
/// Zero when the values are equal (including both zero); `+inf` when `b` is
/// zero and `a` is not.
pub fn percent_change(a: f64, b: f64) -> f64 {
    if a == b {
        return 0.0;
    }
    if b == 0.0 {
        return f64::INFINITY;
    }
    (a - b).abs() / b * 100.0
}

/// Split sets into those with the chain's arity and those without.
///
/// Mismatched sets are logged with their event names so they can be traced
/// back to the capture.
pub fn partition_by_arity<'s, 'e>(
    sets: &'s [MessageSet<'e>],
    chain_len: usize,
) -> (Vec<&'s MessageSet<'e>>, Vec<&'s MessageSet<'e>>) {
    sets.iter().partition(|set| {
        let complete = set.len() == chain_len;
        if !complete {
            log::warn!("Not a complete set: {:?}", set.names());
        }
        complete
    })
}

/// Index of the set shown as "the" example run: the middle one.
pub fn representative_index(set_count: usize) -> Option<usize> {
    (set_count > 0).then_some(set_count / 2)
}

/// Contiguous, inclusive range of chain positions covering the code under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BenchmarkWindow {
    pub start: usize,
    pub end: usize,
}

impl BenchmarkWindow {
    pub fn new(start: usize, end: usize) -> Result<Self, AnalysisError> {
        if start > end {
            return Err(AnalysisError::InvalidWindow { start, end });
        }
        Ok(Self { start, end })
    }

    /// Every position of a chain.
    pub fn whole(chain_len: usize) -> Self {
        Self {
            start: 0,
            end: chain_len.saturating_sub(1),
        }
    }

    /// Window between two stages, looked up by disambiguated label.
    ///
    /// `start_label` marks the end of the input stage and `end_label` the
    /// start of the output stage; both positions are included.
    pub fn from_markers(
        chain: &TargetChain,
        start_label: &str,
        end_label: &str,
    ) -> Result<Self, AnalysisError> {
        let position = |label: &str| {
            chain
                .position_of(label)
                .ok_or_else(|| AnalysisError::UnknownWindowMarker {
                    marker: label.to_string(),
                })
        };
        Self::new(position(start_label)?, position(end_label)?)
    }

    pub fn indices(&self) -> Vec<usize> {
        (self.start..=self.end).collect()
    }
}

/// Mean, root-mean-square, minimum, maximum of a sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub mean: f64,
    pub rms: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    /// `None` for an empty sample.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        if samples.is_empty() {
            return None;
        }
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let rms = (samples.iter().map(|x| x * x).sum::<f64>() / n).sqrt();
        let min = samples.iter().copied().fold(f64::INFINITY, f64::min);
        let max = samples.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        Some(Self {
            mean,
            rms,
            min,
            max,
        })
    }
}

/// One scalar per set: the sum of the selected positions, or of every
/// position when `indices` is `None` or empty.
///
/// Tables whose length differs from `chain_len` are excluded.
pub fn set_sums(tables: &[Vec<f64>], chain_len: usize, indices: Option<&[usize]>) -> Vec<f64> {
    tables
        .iter()
        .filter(|table| {
            let complete = table.len() == chain_len;
            if !complete {
                log::warn!(
                    "Excluding latency table with {} entries (chain has {})",
                    table.len(),
                    chain_len
                );
            }
            complete
        })
        .filter_map(|table| match indices {
            Some(indices) if !indices.is_empty() => indices
                .iter()
                .map(|&i| table.get(i).copied())
                .sum::<Option<f64>>(),
            _ => Some(table.iter().sum()),
        })
        .collect()
}

/// Reduce per-set sums to a [`Summary`].
pub fn summarize(
    tables: &[Vec<f64>],
    chain_len: usize,
    indices: Option<&[usize]>,
) -> Option<Summary> {
    Summary::from_samples(&set_sums(tables, chain_len, indices))
}

/// Per-position mean latency across complete tables.
pub fn average_latencies(tables: &[Vec<f64>], chain_len: usize) -> Option<Vec<f64>> {
    let complete: Vec<&Vec<f64>> = tables.iter().filter(|t| t.len() == chain_len).collect();
    if complete.is_empty() {
        return None;
    }
    let n = complete.len() as f64;
    Some(
        (0..chain_len)
            .map(|i| complete.iter().map(|t| t[i]).sum::<f64>() / n)
            .collect(),
    )
}

/// Headline numbers for one batch of runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Statistics {
    /// Over the benchmark window only
    pub benchmark: Summary,
    /// Over the whole chain
    pub total: Summary,
}

impl Statistics {
    pub fn compute(
        tables: &[Vec<f64>],
        chain_len: usize,
        window: &BenchmarkWindow,
    ) -> Option<Self> {
        let indices = window.indices();
        Some(Self {
            benchmark: summarize(tables, chain_len, Some(&indices))?,
            total: summarize(tables, chain_len, None)?,
        })
    }
}
