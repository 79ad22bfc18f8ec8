use std::process;

use clap::Parser;
use tracechain::config::AnalysisConfig;
use tracechain::error::{AnalysisError, exit_code};
use tracechain::styling::{ERROR, ERROR_EMOJI, eprintln};

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::analyze::AnalyzeOptions;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        match e.downcast_ref::<AnalysisError>() {
            Some(err) => eprintln!("{}", err.styled()),
            None => eprintln!("{ERROR_EMOJI} {ERROR}{e:#}{ERROR:#}"),
        }
        process::exit(exit_code(&e));
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AnalysisConfig::load(&cli.config)?;

    match cli.command {
        Commands::Analyze { traces, all, json } => commands::handle_analyze(
            &config,
            AnalyzeOptions {
                trace: traces.trace,
                second_trace: traces.second_trace,
                all,
                json,
            },
        ),
        Commands::Compare {
            batches,
            no_baseline,
        } => commands::handle_compare(&config, batches, !no_baseline),
        Commands::Publish {
            repo,
            traces,
            context,
        } => commands::handle_publish(
            &config,
            &repo,
            traces.trace,
            traces.second_trace,
            context.into(),
        ),
    }
}

/// `warn` by default, `debug` with `-v`; `RUST_LOG` overrides both.
fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .format_target(false)
        .init();
}
