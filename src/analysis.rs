//! One full latency analysis: match, aggregate, summarize.

use serde_json::json;

use crate::error::AnalysisError;
use crate::trace::latency::{latencies_for_set, partition_by_arity, representative_index};
use crate::trace::{
    BenchmarkWindow, EventSource, MatchReport, MatcherOptions, MessageSet, Statistics,
    TargetChain, TraceEvent, match_events,
};

/// Result of analysing one event stream.
#[derive(Debug, Clone)]
pub struct Analysis<'e> {
    pub report: MatchReport<'e>,
    /// Relative latencies (ms) of each complete set, in set order
    pub tables: Vec<Vec<f64>>,
    pub statistics: Statistics,
}

impl<'e> Analysis<'e> {
    /// The middle set, shown as the example run.
    pub fn representative(&self) -> Option<&MessageSet<'e>> {
        representative_index(self.report.sets.len()).and_then(|i| self.report.sets.get(i))
    }

    /// Machine-readable form for `--json`.
    pub fn to_json(&self, chain: &TargetChain, window: &BenchmarkWindow) -> serde_json::Value {
        let stages: Vec<&str> = chain.stages().iter().map(|s| s.disambiguated_name()).collect();
        json!({
            "chain": stages,
            "window": { "start": window.start, "end": window.end },
            "sets": self.report.sets.len(),
            "chain_events": self.report.chain_events,
            "resets": self.report.resets,
            "undos": self.report.undos,
            "foreign": self.report.foreign,
            "incomplete_tail": self.report.incomplete_tail,
            "statistics": self.statistics,
            "latencies_ms": self.tables,
        })
    }
}

/// Match `events` against `chain` and compute latency statistics.
///
/// Fails with [`AnalysisError::EmptyResult`] when no complete set exists.
pub fn analyze<'e>(
    chain: &TargetChain,
    events: &'e [TraceEvent],
    options: MatcherOptions,
    window: &BenchmarkWindow,
    source: &EventSource,
) -> Result<Analysis<'e>, AnalysisError> {
    chain.validate()?;
    let report = match_events(chain, events, options);

    let (complete, _) = partition_by_arity(&report.sets, chain.len());
    let tables: Vec<Vec<f64>> = complete.into_iter().map(latencies_for_set).collect();

    let Some(statistics) = Statistics::compute(&tables, chain.len(), window) else {
        return Err(AnalysisError::EmptyResult {
            source_desc: source.to_string(),
            chain_events: report.chain_events,
        });
    };

    Ok(Analysis {
        report,
        tables,
        statistics,
    })
}
