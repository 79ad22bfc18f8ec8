use std::path::PathBuf;

use anyhow::Context;
use tracechain::analyze;
use tracechain::config::AnalysisConfig;
use tracechain::styling::print;
use tracechain::trace::EventSource;
use tracechain::trace::display::render_markdown_table;

/// Analyze each `NAME=TRACE` batch separately and tabulate them.
///
/// Batches are single-source; anchoring follows the config.
pub(crate) fn handle_compare(
    config: &AnalysisConfig,
    batches: Vec<(String, PathBuf)>,
    from_baseline: bool,
) -> anyhow::Result<()> {
    let chain = config.target_chain();
    let window = config.benchmark_window()?;

    let mut rows = Vec::with_capacity(batches.len());
    for (name, path) in batches {
        let source = EventSource::Single(path);
        let events = source.read_for_chain(&chain)?;
        let analysis = analyze(
            &chain,
            &events,
            config.matcher_options(false),
            &window,
            &source,
        )
        .with_context(|| format!("Batch '{name}'"))?;
        log::info!("{name}: {} set(s)", analysis.report.sets.len());
        rows.push((name, analysis.statistics));
    }

    print!("{}", render_markdown_table(&rows, from_baseline));
    Ok(())
}
