use std::path::{Path, PathBuf};

use tracechain::analyze;
use tracechain::config::AnalysisConfig;
use tracechain::results::{ResultContext, ResultRecord, publish};
use tracechain::shell_exec::DEFAULT_TIMEOUT;
use tracechain::styling::{
    HINT, HINT_EMOJI, SUCCESS, SUCCESS_EMOJI, WARNING, WARNING_EMOJI, eprintln, println,
};
use tracechain::utils::get_now;

pub(crate) fn handle_publish(
    config: &AnalysisConfig,
    repo: &Path,
    trace: Option<PathBuf>,
    second_trace: Option<PathBuf>,
    context: ResultContext,
) -> anyhow::Result<()> {
    let chain = config.target_chain();
    let window = config.benchmark_window()?;
    let source = config.event_source(trace, second_trace);
    let events = source.read_for_chain(&chain)?;
    let analysis = analyze(
        &chain,
        &events,
        config.matcher_options(source.is_dual()),
        &window,
        &source,
    )?;

    let record = ResultRecord::new(&analysis.statistics, &context, get_now());
    println!("{}", serde_json::to_string_pretty(&record)?);

    let outcome = publish(repo, &config.benchmark, &record, &context, DEFAULT_TIMEOUT)?;
    match outcome.commit_summary {
        Some(summary) => {
            println!(
                "{SUCCESS_EMOJI} {SUCCESS}Committed result on branch {}{SUCCESS:#}",
                outcome.branch
            );
            println!("{summary}");
        }
        None => eprintln!(
            "{WARNING_EMOJI} {WARNING}git timed out; {} may be uncommitted{WARNING:#}",
            outcome.results_file.display()
        ),
    }
    println!(
        "{HINT_EMOJI} {HINT}Push with: git -C {} push origin {}{HINT:#}",
        repo.display(),
        outcome.branch
    );
    Ok(())
}
