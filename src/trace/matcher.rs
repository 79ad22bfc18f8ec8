//! Classify a sorted event stream into complete message sets.
//!
//! The matcher walks the stream once with a cursor into the target chain.
//! Each on-chain event either starts a set, advances it, completes it, undoes
//! a spurious callback start, or breaks the expected order and resets it.
//!
//! With process anchoring enabled, the first event of a set pins its process
//! id and events from other processes are ignored until the set completes or
//! resets. This separates pipeline instances running in different processes.
//! It does not separate several nodes or a multithreaded executor sharing one
//! process; events from those interleave into the same set.

use serde::{Deserialize, Serialize};

use super::chain::TargetChain;
use super::parse::TraceEvent;

/// Tracepoints that bracket every callback execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CallbackPair {
    pub start: String,
    pub end: String,
}

impl Default for CallbackPair {
    fn default() -> Self {
        Self {
            start: "ros2:callback_start".to_string(),
            end: "ros2:callback_end".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatcherOptions {
    /// Pin each set to the process id of its first event
    pub anchor_process: bool,
    pub callback_pair: CallbackPair,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self {
            anchor_process: true,
            callback_pair: CallbackPair::default(),
        }
    }
}

/// One complete traversal of the chain, one event per position.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSet<'e> {
    events: Vec<&'e TraceEvent>,
}

impl<'e> MessageSet<'e> {
    /// Build a set from events already in chain order.
    pub fn new(events: Vec<&'e TraceEvent>) -> Self {
        Self { events }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn events(&self) -> &[&'e TraceEvent] {
        &self.events
    }

    pub fn names(&self) -> Vec<&'e str> {
        self.events.iter().map(|e| e.name.as_str()).collect()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = i64> + '_ {
        self.events.iter().map(|e| e.timestamp_ns)
    }

    /// Process id of the first event.
    pub fn process_id(&self) -> Option<u64> {
        self.events.first().and_then(|e| e.process_id)
    }
}

/// What the matcher did with one event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Name is not in the chain
    OffChain,
    /// On-chain event while waiting for the first stage
    Idle,
    /// From a process other than the current set's anchor
    Foreign,
    Started,
    Advanced,
    Completed,
    /// Spurious callback start removed from the current set
    Undone,
    /// Out-of-order event; the current set was discarded
    Reset,
}

/// Everything a matching run produced.
#[derive(Debug, Clone, Default)]
pub struct MatchReport<'e> {
    pub sets: Vec<MessageSet<'e>>,
    /// Events whose name appears in the chain
    pub chain_events: usize,
    pub off_chain: usize,
    pub foreign: usize,
    pub undos: usize,
    /// Sets discarded because an event broke the expected order
    pub resets: usize,
    /// Length of the partial set abandoned at end of stream, if any
    pub incomplete_tail: Option<usize>,
}

impl MatchReport<'_> {
    /// Started sets that never completed.
    pub fn dropped_attempts(&self) -> usize {
        self.resets + usize::from(self.incomplete_tail.is_some())
    }
}

/// Incremental matcher state. Construct a fresh one per analysis run.
pub struct ChainMatcher<'c, 'e> {
    chain: &'c TargetChain,
    options: MatcherOptions,
    chain_index: usize,
    current: Vec<&'e TraceEvent>,
    anchor: Option<Option<u64>>,
    report: MatchReport<'e>,
}

impl<'c, 'e> ChainMatcher<'c, 'e> {
    /// The chain must have at least two stages (see [`TargetChain::validate`]).
    pub fn new(chain: &'c TargetChain, options: MatcherOptions) -> Self {
        debug_assert!(chain.len() >= 2, "chain must be validated before matching");
        Self {
            chain,
            options,
            chain_index: 0,
            current: Vec::with_capacity(chain.len()),
            anchor: None,
            report: MatchReport::default(),
        }
    }

    /// Classify the next event. Events must arrive in timestamp order.
    pub fn feed(&mut self, event: &'e TraceEvent) -> Classification {
        if !self.chain.contains(&event.name) {
            self.report.off_chain += 1;
            return Classification::OffChain;
        }
        self.report.chain_events += 1;

        let last = self.chain.len() - 1;
        let expected = self.expected(self.chain_index);
        log::debug!(
            "new: {} expected: {} chain_index: {}",
            event.name,
            expected,
            self.chain_index
        );

        if self.chain_index == 0 {
            if event.name != expected {
                return Classification::Idle;
            }
            self.current.push(event);
            self.anchor = Some(event.process_id);
            self.chain_index = 1;
            log::debug!("found: {} - {:?}", event.name, self.current_names());
            return Classification::Started;
        }

        if self.options.anchor_process && self.anchor != Some(event.process_id) {
            self.report.foreign += 1;
            return Classification::Foreign;
        }

        if event.name == expected {
            if self.chain_index < last {
                self.current.push(event);
                self.chain_index += 1;
                log::debug!("found: {}", event.name);
                return Classification::Advanced;
            }

            // Final position: the set must already hold the penultimate stage
            if self
                .current
                .last()
                .is_some_and(|prev| prev.name == self.expected(last - 1))
            {
                self.current.push(event);
                let set = MessageSet::new(std::mem::take(&mut self.current));
                log::debug!("found: {} - {:?}", event.name, set.names());
                self.report.sets.push(set);
                self.restart();
                return Classification::Completed;
            }
        } else if event.name == self.options.callback_pair.end
            && self.expected(self.chain_index - 1) == self.options.callback_pair.start
        {
            // A callback ended right after starting: it belonged to some other
            // callback, so forget its start and wait for the next one.
            self.current.pop();
            self.chain_index -= 1;
            self.report.undos += 1;
            if self.chain_index == 0 {
                self.anchor = None;
            }
            log::debug!("undo: {} at chain_index {}", event.name, self.chain_index);
            return Classification::Undone;
        }

        self.current.push(event);
        log::debug!("altered order: {:?}, restarting", self.current_names());
        self.report.resets += 1;
        self.restart();
        Classification::Reset
    }

    /// Finish the stream; a partially built set is dropped but counted.
    pub fn finish(mut self) -> MatchReport<'e> {
        if !self.current.is_empty() {
            log::debug!(
                "trace ended mid-chain, dropping partial set: {:?}",
                self.current_names()
            );
            self.report.incomplete_tail = Some(self.current.len());
        }
        self.report
    }

    fn expected(&self, index: usize) -> &'c str {
        self.chain.name_at(index).unwrap_or_default()
    }

    fn current_names(&self) -> Vec<&str> {
        self.current.iter().map(|e| e.name.as_str()).collect()
    }

    fn restart(&mut self) {
        self.current.clear();
        self.chain_index = 0;
        self.anchor = None;
    }
}

/// Match a whole sorted stream against the chain.
pub fn match_events<'e>(
    chain: &TargetChain,
    events: &'e [TraceEvent],
    options: MatcherOptions,
) -> MatchReport<'e> {
    let mut matcher = ChainMatcher::new(chain, options);
    for event in events {
        matcher.feed(event);
    }
    let report = matcher.finish();
    log::info!(
        "matched {} set(s) from {} chain event(s); {} reset(s), {} undo(s), {} foreign",
        report.sets.len(),
        report.chain_events,
        report.resets,
        report.undos,
        report.foreign
    );
    report
}
