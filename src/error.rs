//! Typed analysis errors
//!
//! - **`AnalysisError`** - domain errors that can be pattern-matched and tested.
//!   Use `.into()` to convert to `anyhow::Error`; main.rs downcasts to pick the
//!   exit code and styled display.
//!
//! Arity mismatches, unparseable lines and subprocess timeouts are recovered
//! where they occur and only surface as warnings.

use std::path::PathBuf;

use crate::styling::{ERROR, ERROR_EMOJI, HINT, HINT_EMOJI};

/// Exit code for a run that produced no message sets.
pub const EMPTY_RESULT_EXIT_CODE: i32 = 3;

#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// No complete message set was found in the whole trace
    #[error("no message sets found in {source_desc}")]
    EmptyResult {
        /// Human-readable description of what was read (paths)
        source_desc: String,
        /// Number of chain events seen, to tell "nothing matched" from "nothing read"
        chain_events: usize,
    },

    #[error("target chain needs at least 2 stages, found {len}")]
    ChainTooShort { len: usize },

    /// A benchmark window marker is not a disambiguated stage name
    #[error("benchmark window marker '{marker}' is not in the target chain")]
    UnknownWindowMarker { marker: String },

    #[error("benchmark window starts at position {start} but ends at {end}")]
    InvalidWindow { start: usize, end: usize },

    #[error("failed to read trace {}", path.display())]
    TraceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AnalysisError {
    /// Styled message with emoji and an optional hint.
    pub fn styled(&self) -> String {
        let hint = match self {
            AnalysisError::EmptyResult {
                chain_events: 0, ..
            } => Some("No chain tracepoints were read; check the trace path and stage names"),
            AnalysisError::EmptyResult { .. } => {
                Some("Chain events were read but never completed; run with -v to see resets")
            }
            AnalysisError::UnknownWindowMarker { .. } => {
                Some("Window markers refer to the stage's `disambiguated` label")
            }
            _ => None,
        };

        let mut out = format!("{ERROR_EMOJI} {ERROR}{self}{ERROR:#}");
        if let Some(hint) = hint {
            out.push_str(&format!("\n\n{HINT_EMOJI} {HINT}{hint}{HINT:#}"));
        }
        out
    }
}

/// Exit code for an error returned from a command.
pub fn exit_code(err: &anyhow::Error) -> i32 {
    if is_empty_result(err) {
        EMPTY_RESULT_EXIT_CODE
    } else {
        1
    }
}

/// Check if error is EmptyResult
pub fn is_empty_result(err: &anyhow::Error) -> bool {
    err.downcast_ref::<AnalysisError>()
        .is_some_and(|e| matches!(e, AnalysisError::EmptyResult { .. }))
}
