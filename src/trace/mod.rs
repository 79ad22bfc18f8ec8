//! Trace parsing, chain matching and latency analysis.
//!
//! Pipeline:
//!
//! 1. [`source`] reads one or two trace exports into a timestamp-sorted stream
//!    of [`TraceEvent`]s (lines are parsed by [`parse`]).
//! 2. [`matcher`] walks the stream and extracts [`MessageSet`]s that follow
//!    the [`TargetChain`] in order.
//! 3. [`latency`] turns sets into per-stage latencies and [`Statistics`].
//! 4. [`display`] renders timelines, statistics and markdown tables.
//!
//! # Usage
//!
//! ```ignore
//! use tracechain::trace::{EventSource, MatcherOptions, match_events};
//!
//! let events = EventSource::Single(path).read_for_chain(&chain)?;
//! let report = match_events(&chain, &events, MatcherOptions::default());
//! println!("{}", display::render_match_summary(&report));
//! ```

pub mod chain;
pub mod display;
pub mod latency;
pub mod matcher;
pub mod parse;
pub mod source;

pub use chain::{ChainStage, MarkerShape, TargetChain};
pub use latency::{BenchmarkWindow, Statistics, Summary, percent_change};
pub use matcher::{
    CallbackPair, ChainMatcher, Classification, MatchReport, MatcherOptions, MessageSet,
    match_events,
};
pub use parse::{ParsedLine, TraceEvent, parse_line};
pub use source::EventSource;
