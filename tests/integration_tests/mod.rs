use std::path::{Path, PathBuf};
use std::process::{Command, Output};

mod analyze;
mod compare;
mod publish;

/// `tracechain` with a clean environment: no colour, no inherited result
/// context, no log filter.
pub fn tracechain() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_tracechain"));
    cmd.env("NO_COLOR", "1");
    for var in [
        "RUST_LOG",
        "HARDWARE",
        "CATEGORY",
        "ROSBAG",
        "CI_PIPELINE_URL",
        "CI_JOB_URL",
        "CLICOLOR_FORCE",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

pub fn testdata(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("testdata")
        .join(name)
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}
