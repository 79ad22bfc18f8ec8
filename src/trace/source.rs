//! Event sources: one trace, or two traces merged on the timestamp axis.

use std::fmt;
use std::path::{Path, PathBuf};

use super::chain::TargetChain;
use super::parse::{ParsedLine, TraceEvent, parse_line};
use crate::error::AnalysisError;

/// Where events come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventSource {
    Single(PathBuf),
    /// Two independently recorded traces, e.g. a CPU trace and an FPGA trace
    Dual(PathBuf, PathBuf),
}

impl EventSource {
    pub fn is_dual(&self) -> bool {
        matches!(self, EventSource::Dual(..))
    }

    /// Read every event, sorted by timestamp.
    pub fn read(&self) -> Result<Vec<TraceEvent>, AnalysisError> {
        match self {
            EventSource::Single(path) => {
                let mut events = read_trace(path)?;
                sort_events(&mut events);
                Ok(events)
            }
            EventSource::Dual(first, second) => {
                let mut a = read_trace(first)?;
                let mut b = read_trace(second)?;
                sort_events(&mut a);
                sort_events(&mut b);
                Ok(merge_sorted(a, b))
            }
        }
    }

    /// Read events and keep only the ones the chain can match.
    pub fn read_for_chain(&self, chain: &TargetChain) -> Result<Vec<TraceEvent>, AnalysisError> {
        let mut events = self.read()?;
        let total = events.len();
        events.retain(|e| chain.contains(&e.name));
        log::debug!(
            "{}: kept {} of {} events named in the chain",
            self,
            events.len(),
            total
        );
        Ok(events)
    }
}

impl fmt::Display for EventSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventSource::Single(path) => write!(f, "{}", path.display()),
            EventSource::Dual(a, b) => write!(f, "{} + {}", a.display(), b.display()),
        }
    }
}

/// Read one trace export from disk.
///
/// Lines that are neither events nor comments are skipped and counted; the
/// trace reader upstream occasionally emits warnings into its output.
pub fn read_trace(path: &Path) -> Result<Vec<TraceEvent>, AnalysisError> {
    let content = std::fs::read_to_string(path).map_err(|source| AnalysisError::TraceRead {
        path: path.to_path_buf(),
        source,
    })?;

    let mut events = Vec::new();
    let mut invalid = 0usize;
    for (idx, line) in content.lines().enumerate() {
        match parse_line(line) {
            ParsedLine::Event(event) => events.push(event),
            ParsedLine::Ignored => {}
            ParsedLine::Invalid(reason) => {
                invalid += 1;
                log::debug!("{}:{}: skipping line: {}", path.display(), idx + 1, reason);
            }
        }
    }

    if invalid > 0 {
        log::warn!(
            "{}: skipped {} unparseable line(s), read {} event(s)",
            path.display(),
            invalid,
            events.len()
        );
    }
    Ok(events)
}

/// Stable sort by timestamp: equal timestamps keep file order.
pub fn sort_events(events: &mut [TraceEvent]) {
    events.sort_by_key(|e| e.timestamp_ns);
}

/// Merge two timestamp-sorted streams. On ties the first stream wins.
pub fn merge_sorted(first: Vec<TraceEvent>, second: Vec<TraceEvent>) -> Vec<TraceEvent> {
    let mut merged = Vec::with_capacity(first.len() + second.len());
    let mut a = first.into_iter().peekable();
    let mut b = second.into_iter().peekable();

    loop {
        let take_first = match (a.peek(), b.peek()) {
            (Some(x), Some(y)) => x.timestamp_ns <= y.timestamp_ns,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_first { a.next() } else { b.next() };
        merged.extend(next);
    }

    merged
}
