//! Parse trace exports into [`TraceEvent`]s.
//!
//! Two line formats are recognised, per line:
//!
//! ```text
//! [1658841000.000012345] (+0.000001200) host ros2:callback_start: { cpu_id = 3 }, { vpid = 4242, vtid = 4243 }
//! {"name": "ros2:callback_start", "timestamp_ns": 1658841000000012345, "process_id": 4242}
//! ```
//!
//! The first is babeltrace's text output (`--clock-seconds`, or the default
//! `HH:MM:SS.nnnnnnnnn` clock); the second is JSON Lines. Blank lines and `#`
//! comments produce nothing.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// One observed tracepoint occurrence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceEvent {
    pub name: String,
    /// Nanoseconds from the trace origin
    pub timestamp_ns: i64,
    /// Emitting process (`vpid`), when the trace records one
    #[serde(default)]
    pub process_id: Option<u64>,
}

impl TraceEvent {
    pub fn new(name: impl Into<String>, timestamp_ns: i64, process_id: Option<u64>) -> Self {
        Self {
            name: name.into(),
            timestamp_ns,
            process_id,
        }
    }
}

/// Result of parsing one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    Event(TraceEvent),
    /// Blank line or comment
    Ignored,
    /// Looked like neither format
    Invalid(String),
}

static BABELTRACE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\[(?P<clock>[0-9:]+)\.(?P<frac>\d{1,9})\]\s+(?:\(\+[^)]*\)\s+)?(?:\S+\s+)?(?P<name>\S+):(?:\s+(?P<rest>.*))?$",
    )
    .unwrap()
});

static VPID_FIELD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\bvpid\s*=\s*(\d+)").unwrap());

const NANOS_PER_SEC: i64 = 1_000_000_000;

/// Parse a single line of a trace export.
pub fn parse_line(line: &str) -> ParsedLine {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return ParsedLine::Ignored;
    }

    if line.starts_with('{') {
        return match serde_json::from_str::<TraceEvent>(line) {
            Ok(event) => ParsedLine::Event(event),
            Err(e) => ParsedLine::Invalid(format!("invalid JSON event: {e}")),
        };
    }

    let Some(caps) = BABELTRACE_LINE.captures(line) else {
        return ParsedLine::Invalid("unrecognised trace line".to_string());
    };

    let Some(timestamp_ns) = parse_clock(&caps["clock"], &caps["frac"]) else {
        return ParsedLine::Invalid(format!("invalid timestamp '{}'", &caps["clock"]));
    };

    let process_id = caps
        .name("rest")
        .and_then(|rest| VPID_FIELD.captures(rest.as_str()))
        .and_then(|c| c[1].parse().ok());

    ParsedLine::Event(TraceEvent {
        name: caps["name"].to_string(),
        timestamp_ns,
        process_id,
    })
}

/// `secs` or `HH:MM:SS`, plus a fraction of up to nine digits.
fn parse_clock(clock: &str, frac: &str) -> Option<i64> {
    let secs = match clock.split(':').collect::<Vec<_>>().as_slice() {
        [secs] => secs.parse::<i64>().ok()?,
        [h, m, s] => {
            let (h, m, s): (i64, i64, i64) = (h.parse().ok()?, m.parse().ok()?, s.parse().ok()?);
            if m >= 60 || s >= 60 {
                return None;
            }
            h.checked_mul(3600)?.checked_add(m * 60 + s)?
        }
        _ => return None,
    };

    // Right-pad so ".5" means 500ms, not 5ns
    let nanos: i64 = format!("{frac:0<9}").parse().ok()?;
    secs.checked_mul(NANOS_PER_SEC)?.checked_add(nanos)
}
