//! `tracechain publish`

use std::path::Path;
use std::process::Command;

use super::{stderr, stdout, testdata, tracechain};

fn git(repo: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .arg("-C")
        .arg(repo)
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success(), "git {args:?}: {}", stderr(&output));
    stdout(&output).trim().to_string()
}

fn init_repo(repo: &Path) {
    git(repo, &["init", "-q", "-b", "main"]);
    git(repo, &["config", "user.name", "Test"]);
    git(repo, &["config", "user.email", "test@example.com"]);
    git(repo, &["config", "commit.gpgsign", "false"]);
    git(repo, &["commit", "-q", "--allow-empty", "-m", "init"]);
}

#[test]
fn test_publish_commits_result() {
    let repo = tempfile::tempdir().unwrap();
    init_repo(repo.path());

    let output = tracechain()
        .arg("--config")
        .arg(testdata("chain.toml"))
        .arg("publish")
        .arg("--repo")
        .arg(repo.path())
        .arg(testdata("cpu_trace.txt"))
        .env("HARDWARE", "kr260")
        .env("CATEGORY", "perception")
        .env("ROSBAG", "perception/image")
        .env("CI_JOB_URL", "https://ci.example.com/jobs/42")
        .env("SOURCE_DATE_EPOCH", "1735689600")
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    assert!(stdout(&output).contains("Committed result on branch a5_resize-1"));

    let stored = std::fs::read_to_string(repo.path().join("results/a5_resize.jsonl")).unwrap();
    let record: serde_json::Value = serde_json::from_str(stored.trim()).unwrap();
    assert_eq!(record["hardware"], "kr260");
    assert_eq!(record["category"], "perception");
    assert_eq!(record["datasource"], "perception/image");
    assert_eq!(record["timestamp"], "2025-01-01 00:00:00");
    let value = record["value"].as_f64().unwrap();
    assert!((value - 32.0 / 3.0).abs() < 1e-9, "{value}");

    assert_eq!(git(repo.path(), &["rev-parse", "--abbrev-ref", "HEAD"]), "a5_resize-1");
    let message = git(repo.path(), &["log", "-1", "--format=%B"]);
    assert!(message.starts_with("a5_resize results for kr260 (10.666"), "{message}");
    assert!(message.contains("- CI_JOB_URL: https://ci.example.com/jobs/42"), "{message}");
}

#[test]
fn test_publish_second_result_gets_next_branch() {
    let repo = tempfile::tempdir().unwrap();
    init_repo(repo.path());

    let publish = || {
        tracechain()
            .arg("--config")
            .arg(testdata("chain.toml"))
            .arg("publish")
            .arg("--repo")
            .arg(repo.path())
            .arg(testdata("cpu_trace.txt"))
            .output()
            .unwrap()
    };
    assert!(publish().status.success());
    let second = publish();
    assert!(second.status.success(), "{}", stderr(&second));
    assert_eq!(git(repo.path(), &["rev-parse", "--abbrev-ref", "HEAD"]), "a5_resize-2");
}

#[test]
fn test_publish_missing_repo_fails_before_writing() {
    let output = tracechain()
        .arg("--config")
        .arg(testdata("chain.toml"))
        .args(["publish", "--repo", "/nonexistent/results"])
        .arg(testdata("cpu_trace.txt"))
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("does not exist"));
}
