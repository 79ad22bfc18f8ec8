//! Result records and publishing them into a results repository.
//!
//! A results repository is a git checkout holding one JSON Lines file per
//! benchmark under `results/`. Publishing creates a branch named
//! `<benchmark>-<n>` (n = number of stored results), appends a record and
//! commits. Pushing
//! is left to whoever runs the pipeline.

use std::ffi::OsStr;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};

use crate::shell_exec::{CommandOutput, run_with_timeout};
use crate::trace::Statistics;
use crate::utils::format_result_timestamp;

/// Describes where and how a trace was captured. Supplied by the caller,
/// normally from `HARDWARE`, `CATEGORY`, `ROSBAG` and the CI variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultContext {
    pub hardware: String,
    pub category: String,
    pub datasource: String,
    pub ci_pipeline_url: Option<String>,
    pub ci_job_url: Option<String>,
}

/// One stored benchmark result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub hardware: String,
    pub category: String,
    pub timestamp: String,
    /// Benchmark-window mean latency, ms
    pub value: f64,
    pub note: String,
    pub datasource: String,
}

impl ResultRecord {
    pub fn new(stats: &Statistics, context: &ResultContext, timestamp: u64) -> Self {
        let b = &stats.benchmark;
        Self {
            hardware: context.hardware.clone(),
            category: context.category.clone(),
            timestamp: format_result_timestamp(timestamp),
            value: b.mean,
            note: format!(
                "mean_benchmark {}, rms_benchmark {}, max_benchmark {}, min_benchmark {}",
                b.mean, b.rms, b.max, b.min
            ),
            datasource: context.datasource.clone(),
        }
    }
}

/// What `publish` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishOutcome {
    pub results_file: PathBuf,
    pub branch: String,
    /// `git log -1` after committing; `None` if git timed out along the way
    pub commit_summary: Option<String>,
}

impl PublishOutcome {
    fn uncommitted(results_file: PathBuf, branch: String) -> Self {
        Self {
            results_file,
            branch,
            commit_summary: None,
        }
    }
}

fn results_path(repo: &Path, benchmark: &str) -> PathBuf {
    repo.join("results").join(format!("{benchmark}.jsonl"))
}

fn stored_records(path: &Path) -> anyhow::Result<usize> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(contents.lines().filter(|l| !l.trim().is_empty()).count()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(0),
        Err(e) => Err(e).with_context(|| format!("Failed to read {}", path.display())),
    }
}

fn write_record(path: &Path, record: &ResultRecord) -> anyhow::Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    writeln!(file, "{}", serde_json::to_string(record)?)
        .with_context(|| format!("Failed to write {}", path.display()))
}

/// Put the results file back to `previous_len` bytes, or remove it if it
/// did not exist.
fn restore_results_file(path: &Path, previous_len: Option<u64>) -> anyhow::Result<()> {
    match previous_len {
        Some(len) => OpenOptions::new()
            .write(true)
            .open(path)
            .and_then(|file| file.set_len(len)),
        None => std::fs::remove_file(path),
    }
    .with_context(|| format!("Failed to restore {}", path.display()))
}

/// Store `record` in the results repository and commit it on a new branch.
///
/// The branch is created before the file is touched. If staging or
/// committing fails, the file is restored so a retry doesn't count the
/// record twice.
pub fn publish(
    repo: &Path,
    benchmark: &str,
    record: &ResultRecord,
    context: &ResultContext,
    timeout: Duration,
) -> anyhow::Result<PublishOutcome> {
    if !repo.is_dir() {
        bail!("Results repository {} does not exist", repo.display());
    }

    let results_file = results_path(repo, benchmark);
    let previous_len = std::fs::metadata(&results_file).ok().map(|m| m.len());
    let count = stored_records(&results_file)? + 1;
    let branch = format!("{benchmark}-{count}");

    let checkout = [OsStr::new("checkout"), OsStr::new("-b"), OsStr::new(&branch)];
    if !git_step(repo, &checkout, timeout)? {
        return Ok(PublishOutcome::uncommitted(results_file, branch));
    }

    write_record(&results_file, record)?;
    log::info!("Appended result #{count} to {}", results_file.display());

    let relative = results_file
        .strip_prefix(repo)
        .unwrap_or(&results_file)
        .to_path_buf();
    let message = commit_message(benchmark, record, context);
    let committed = match commit_results(repo, &relative, &message, timeout) {
        Ok(committed) => committed,
        Err(e) => {
            restore_results_file(&results_file, previous_len)?;
            let unstage = [
                OsStr::new("reset"),
                OsStr::new("-q"),
                OsStr::new("--"),
                relative.as_os_str(),
            ];
            if let Err(reset) = git(repo, &unstage, timeout) {
                log::warn!("Failed to unstage {}: {reset:#}", relative.display());
            }
            return Err(e);
        }
    };
    if !committed {
        return Ok(PublishOutcome::uncommitted(results_file, branch));
    }

    let commit_summary = git(repo, &[OsStr::new("log"), OsStr::new("-1")], timeout)?
        .and_then(|output| output.stdout);
    Ok(PublishOutcome {
        results_file,
        branch,
        commit_summary,
    })
}

/// `git add` then `git commit`. `Ok(false)` if either timed out.
fn commit_results(
    repo: &Path,
    relative: &Path,
    message: &str,
    timeout: Duration,
) -> anyhow::Result<bool> {
    let add = [OsStr::new("add"), OsStr::new("--"), relative.as_os_str()];
    let commit = [OsStr::new("commit"), OsStr::new("-m"), OsStr::new(message)];
    Ok(git_step(repo, &add, timeout)? && git_step(repo, &commit, timeout)?)
}

/// Run one git step. `Ok(false)` on timeout, an error if git fails.
fn git_step(repo: &Path, args: &[&OsStr], timeout: Duration) -> anyhow::Result<bool> {
    let Some(output) = git(repo, args, timeout)? else {
        log::warn!("git {} timed out after {timeout:?}", args[0].to_string_lossy());
        return Ok(false);
    };
    if !output.success() {
        bail!(
            "git {} failed: {}",
            args[0].to_string_lossy(),
            output.stderr.or(output.stdout).unwrap_or_default()
        );
    }
    Ok(true)
}

fn commit_message(benchmark: &str, record: &ResultRecord, context: &ResultContext) -> String {
    let mut message = format!(
        "{benchmark} results for {} ({})",
        record.hardware, record.value
    );
    if let Some(url) = &context.ci_pipeline_url {
        message.push_str(&format!("\n\n- CI_PIPELINE_URL: {url}"));
    }
    if let Some(url) = &context.ci_job_url {
        if context.ci_pipeline_url.is_none() {
            message.push('\n');
        }
        message.push_str(&format!("\n- CI_JOB_URL: {url}"));
    }
    message
}

fn git(
    repo: &Path,
    args: &[&OsStr],
    timeout: Duration,
) -> anyhow::Result<Option<CommandOutput>> {
    let mut cmd = Command::new("git");
    cmd.arg("-C").arg(repo).args(args);
    log::debug!("$ git {:?} [{}]", args, repo.display());
    run_with_timeout(cmd, timeout).context("Failed to run git")
}
