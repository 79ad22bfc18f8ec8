use std::path::PathBuf;

use tracechain::analyze;
use tracechain::config::AnalysisConfig;
use tracechain::styling::{print, println};
use tracechain::trace::display::{
    render_average_timeline, render_markdown_table, render_match_summary, render_statistics,
    render_timeline,
};

pub(crate) struct AnalyzeOptions {
    pub trace: Option<PathBuf>,
    pub second_trace: Option<PathBuf>,
    /// Timeline for every set instead of the middle one
    pub all: bool,
    pub json: bool,
}

pub(crate) fn handle_analyze(config: &AnalysisConfig, opts: AnalyzeOptions) -> anyhow::Result<()> {
    let chain = config.target_chain();
    let window = config.benchmark_window()?;
    let source = config.event_source(opts.trace, opts.second_trace);
    let events = source.read_for_chain(&chain)?;
    let analysis = analyze(
        &chain,
        &events,
        config.matcher_options(source.is_dual()),
        &window,
        &source,
    )?;

    if opts.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&analysis.to_json(&chain, &window))?
        );
        return Ok(());
    }

    println!("{}", render_match_summary(&analysis.report));
    println!();
    if opts.all {
        for set in &analysis.report.sets {
            println!("{}", render_timeline(&chain, set).render());
        }
    } else if let Some(set) = analysis.representative() {
        println!("{}", render_timeline(&chain, set).render());
    }
    if let Some(line) = render_average_timeline(&chain, &analysis.tables) {
        println!("{}", line.render());
    }
    println!();
    println!("{}", render_statistics(&analysis.statistics));
    print!(
        "{}",
        render_markdown_table(&[(config.benchmark.clone(), analysis.statistics)], false)
    );
    Ok(())
}
