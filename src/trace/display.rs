//! Text rendering for matched sets and their statistics.

use std::fmt::Write as _;

use super::chain::TargetChain;
use super::latency::{Statistics, Summary, average_latencies, latencies_for_set, offsets_for_set};
use super::matcher::{MatchReport, MessageSet};
use crate::styling::{ERROR, HINT, StyledLine, TIMELINE_TOTAL, WARNING, stage_style};

/// Timeline of one set: each stage with the time since the previous stage.
///
/// ```text
/// raw image  → ros2:callback_start (0.000 ms)  → robotperf:input (0.412 ms)  → total (3.220 ms)
/// ```
pub fn render_timeline(chain: &TargetChain, set: &MessageSet<'_>) -> StyledLine {
    let latencies = latencies_for_set(set);
    let total = offsets_for_set(set).last().copied().unwrap_or_default();
    timeline_line(chain, set.names().into_iter().zip(latencies), total)
}

/// Timeline of per-position averages across all complete sets.
///
/// Only the total is meaningful when runs vary a lot; per-stage averages can
/// hide which stage a slow run spent its time in.
pub fn render_average_timeline(chain: &TargetChain, tables: &[Vec<f64>]) -> Option<StyledLine> {
    let averages = average_latencies(tables, chain.len())?;
    let total = averages.iter().sum();
    let names = chain.stages().iter().map(|s| s.name.as_str());
    Some(timeline_line(chain, names.zip(averages), total))
}

fn timeline_line<'a>(
    chain: &TargetChain,
    stages: impl Iterator<Item = (&'a str, f64)>,
    total: f64,
) -> StyledLine {
    let mut line = StyledLine::new();
    line.push_raw("raw image ");
    for (i, (name, ms)) in stages.enumerate() {
        let color = chain
            .stage(i)
            .map(|s| s.foreground_color.as_str())
            .unwrap_or_default();
        line.push_raw(" → ");
        line.push_styled(format!("{name} ({ms:.3} ms) "), stage_style(color));
    }
    line.push_raw(" → ");
    line.push_styled(format!("total ({total:.3} ms) "), TIMELINE_TOTAL);
    line
}

/// Whole-chain and benchmark-window statistics, one per line.
pub fn render_statistics(stats: &Statistics) -> String {
    let mut out = String::new();
    write_summary(&mut out, "", &stats.total);
    write_summary(&mut out, " benchmark", &stats.benchmark);
    out
}

fn write_summary(out: &mut String, suffix: &str, summary: &Summary) {
    writeln!(out, "{WARNING}mean{suffix}: {:.3} ms{WARNING:#}", summary.mean).unwrap();
    writeln!(out, "rms{suffix}: {:.3} ms", summary.rms).unwrap();
    writeln!(out, "min{suffix}: {:.3} ms", summary.min).unwrap();
    writeln!(out, "{ERROR}max{suffix}: {:.3} ms{ERROR:#}", summary.max).unwrap();
}

/// One line describing how matching went.
pub fn render_match_summary(report: &MatchReport<'_>) -> String {
    let mut out = format!(
        "Matched {} message set(s) from {} chain event(s)",
        report.sets.len(),
        report.chain_events
    );
    let dropped = report.dropped_attempts();
    if dropped > 0 {
        write!(
            out,
            " {HINT}({} dropped: {} out of order{}){HINT:#}",
            dropped,
            report.resets,
            if report.incomplete_tail.is_some() {
                ", 1 incomplete at end of trace"
            } else {
                ""
            }
        )
        .unwrap();
    }
    out
}

const TABLE_HEADERS: [&str; 9] = [
    " ",
    "Benchmark Mean",
    "Benchmark RMS",
    "Benchmark Max",
    "Benchmark Min",
    "Mean",
    "RMS",
    "Max",
    "Min",
];

/// Markdown table of statistics, one row per named batch.
///
/// The first row is the baseline and is rendered bold. With `from_baseline`,
/// every cell also shows its percent change from the baseline, flagged with
/// a red triangle when it is larger.
pub fn render_markdown_table(rows: &[(String, Statistics)], from_baseline: bool) -> String {
    let mut out = String::new();
    writeln!(out, "| {} |", TABLE_HEADERS.join(" | ")).unwrap();
    writeln!(out, "|{}", " --- |".repeat(TABLE_HEADERS.len())).unwrap();

    let Some((_, baseline)) = rows.first() else {
        return out;
    };
    let baseline = table_values(baseline);

    for (row_index, (name, stats)) in rows.iter().enumerate() {
        let cells: Vec<String> = table_values(stats)
            .iter()
            .zip(&baseline)
            .map(|(&value, &base)| {
                let number = if row_index == 0 {
                    format!("**{value:.2}** ms")
                } else {
                    format!("{value:.2} ms")
                };
                if !from_baseline {
                    return number;
                }
                let change = super::latency::percent_change(value, base);
                if value > base {
                    format!("{number} (:small_red_triangle_down: `{change:.2}`%)")
                } else {
                    format!("{number} (`{change:.2}`%)")
                }
            })
            .collect();
        writeln!(out, "| {} | {} |", name, cells.join(" | ")).unwrap();
    }
    out
}

/// Column order of the markdown table.
fn table_values(stats: &Statistics) -> [f64; 8] {
    [
        stats.benchmark.mean,
        stats.benchmark.rms,
        stats.benchmark.max,
        stats.benchmark.min,
        stats.total.mean,
        stats.total.rms,
        stats.total.max,
        stats.total.min,
    ]
}
