use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracechain::config::DEFAULT_CONFIG_FILE;
use tracechain::results::ResultContext;

#[derive(Parser)]
#[command(name = "tracechain")]
#[command(about = "Reconstruct per-request latency chains from trace exports", long_about = None)]
#[command(version)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Show debug logs (RUST_LOG takes precedence)
    #[arg(short = 'v', long = "verbose", visible_alias = "debug", global = true)]
    pub verbose: bool,

    /// Chain configuration file
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Match a trace against the chain and print latencies
    ///
    /// Without TRACE, reads the configured default trace (merged with the
    /// configured FPGA trace when `device = "fpga"`).
    Analyze {
        #[command(flatten)]
        traces: TraceArgs,

        /// Print the timeline of every set, not just the middle one
        #[arg(long)]
        all: bool,

        /// Print machine-readable JSON instead of text
        #[arg(long, conflicts_with = "all")]
        json: bool,
    },

    /// Compare batches of runs in one markdown table
    ///
    /// The first batch is the baseline; other rows show percent change from it.
    Compare {
        /// Batch as NAME=TRACE
        #[arg(required = true, value_parser = parse_batch)]
        batches: Vec<(String, PathBuf)>,

        /// Omit percent change from the baseline
        #[arg(long)]
        no_baseline: bool,
    },

    /// Analyze, then commit the result into a results repository
    Publish {
        /// Results repository (a git checkout)
        #[arg(long)]
        repo: PathBuf,

        #[command(flatten)]
        traces: TraceArgs,

        #[command(flatten)]
        context: ContextArgs,
    },
}

#[derive(Args)]
pub struct TraceArgs {
    /// Trace export (babeltrace text or JSON Lines)
    pub trace: Option<PathBuf>,

    /// Second trace to merge with the first, e.g. an FPGA trace
    #[arg(long)]
    pub second_trace: Option<PathBuf>,
}

/// Describes the run being published
#[derive(Args)]
pub struct ContextArgs {
    #[arg(long, env = "HARDWARE", default_value = "")]
    pub hardware: String,

    #[arg(long, env = "CATEGORY", default_value = "")]
    pub category: String,

    /// Dataset the pipeline was fed with
    #[arg(long, env = "ROSBAG", default_value = "")]
    pub datasource: String,

    #[arg(long, env = "CI_PIPELINE_URL", hide = true)]
    pub ci_pipeline_url: Option<String>,

    #[arg(long, env = "CI_JOB_URL", hide = true)]
    pub ci_job_url: Option<String>,
}

impl From<ContextArgs> for ResultContext {
    fn from(args: ContextArgs) -> Self {
        Self {
            hardware: args.hardware,
            category: args.category,
            datasource: args.datasource,
            ci_pipeline_url: args.ci_pipeline_url,
            ci_job_url: args.ci_job_url,
        }
    }
}

fn parse_batch(s: &str) -> Result<(String, PathBuf), String> {
    match s.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected NAME=TRACE, got '{s}'")),
    }
}
