//! `tracechain analyze`

use std::io::Write;

use super::{stderr, stdout, testdata, tracechain};

#[test]
fn test_analyze_sample_trace() {
    let output = tracechain()
        .arg("--config")
        .arg(testdata("chain.toml"))
        .arg("analyze")
        .arg(testdata("cpu_trace.txt"))
        .output()
        .unwrap();
    let out = stdout(&output);
    assert!(output.status.success(), "{}", stderr(&output));

    assert!(
        out.starts_with(
            "Matched 3 message set(s) from 19 chain event(s) \
             (2 dropped: 1 out of order, 1 incomplete at end of trace)"
        ),
        "{out}"
    );
    // Middle set
    assert!(
        out.contains(
            "raw image  → robotperf_benchmarks:robotperf_image_input_cb_init (0.000 ms)  \
             → robotperf_benchmarks:robotperf_image_input_cb_fini (1.000 ms)  \
             → ros2_image_pipeline:image_proc_resize_cb_init (3.000 ms)  \
             → ros2_image_pipeline:image_proc_resize_cb_fini (6.000 ms)  \
             → robotperf_benchmarks:robotperf_image_output_cb_init (2.000 ms)  \
             → total (12.000 ms)"
        ),
        "{out}"
    );
    // Averages
    assert!(out.contains("ros2_image_pipeline:image_proc_resize_cb_fini (6.333 ms)"), "{out}");

    for expected in [
        "mean: 12.000 ms",
        "rms: 12.111 ms",
        "min: 10.000 ms",
        "max: 14.000 ms",
        "mean benchmark: 10.667 ms",
        "min benchmark: 9.000 ms",
        "max benchmark: 12.000 ms",
    ] {
        assert!(out.contains(expected), "missing {expected:?} in:\n{out}");
    }
    assert!(out.contains("| a5_resize | **10.67** ms | "), "{out}");
    assert!(!out.contains('\u{1b}'), "NO_COLOR output must be plain");
}

#[test]
fn test_analyze_all_prints_every_timeline() {
    let output = tracechain()
        .arg("--config")
        .arg(testdata("chain.toml"))
        .args(["analyze", "--all"])
        .arg(testdata("cpu_trace.txt"))
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    // Three sets plus the average line
    assert_eq!(stdout(&output).matches("raw image").count(), 4);
    assert!(stdout(&output).contains("total (10.000 ms)"));
    assert!(stdout(&output).contains("total (14.000 ms)"));
}

#[test]
fn test_analyze_json() {
    let output = tracechain()
        .arg("--config")
        .arg(testdata("chain.toml"))
        .args(["analyze", "--json"])
        .arg(testdata("cpu_trace.txt"))
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["sets"], 3);
    assert_eq!(value["resets"], 1);
    assert_eq!(value["foreign"], 1);
    assert_eq!(value["incomplete_tail"], 1);
    assert_eq!(value["window"]["start"], 2);
    assert_eq!(value["window"]["end"], 4);
    assert_eq!(
        value["latencies_ms"][1],
        serde_json::json!([0.0, 1.0, 3.0, 6.0, 2.0])
    );
    assert_eq!(value["statistics"]["total"]["mean"], 12.0);
    assert_eq!(value["statistics"]["benchmark"]["max"], 12.0);
}

#[test]
fn test_analyze_no_sets_exits_3() {
    let mut trace = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        trace,
        "[1.000000000] robot ros2_image_pipeline:image_proc_resize_cb_init: {{ vpid = 1 }}"
    )
    .unwrap();
    writeln!(trace, "[1.500000000] robot ros2:rcl_publish: {{ vpid = 1 }}").unwrap();

    let output = tracechain()
        .arg("--config")
        .arg(testdata("chain.toml"))
        .arg("analyze")
        .arg(trace.path())
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(3));
    let err = stderr(&output);
    assert!(err.contains("no message sets found in"), "{err}");
    assert!(err.contains("never completed"), "{err}");
}

#[test]
fn test_analyze_missing_trace_exits_1() {
    let output = tracechain()
        .arg("--config")
        .arg(testdata("chain.toml"))
        .args(["analyze", "/nonexistent/trace.txt"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("failed to read trace /nonexistent/trace.txt"));
}

#[test]
fn test_missing_config_exits_1() {
    let output = tracechain()
        .args(["--config", "/nonexistent/tracechain.toml", "analyze"])
        .output()
        .unwrap();
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("Failed to read config file"));
}

/// FPGA runs merge the CPU trace with a kernel trace; kernel events carry no
/// process id, so anchoring is off by default.
#[test]
fn test_analyze_fpga_merges_default_traces() {
    let dir = tempfile::tempdir().unwrap();
    let cpu = dir.path().join("cpu.jsonl");
    let fpga = dir.path().join("fpga.jsonl");
    std::fs::write(
        &cpu,
        concat!(
            r#"{"name": "app:input", "timestamp_ns": 0, "process_id": 7}"#,
            "\n",
            r#"{"name": "app:output", "timestamp_ns": 9000000, "process_id": 7}"#,
            "\n",
            r#"{"name": "app:input", "timestamp_ns": 100000000, "process_id": 7}"#,
            "\n",
            r#"{"name": "app:output", "timestamp_ns": 105000000, "process_id": 7}"#,
            "\n",
        ),
    )
    .unwrap();
    std::fs::write(
        &fpga,
        "[0.001000000] kernel:vadd_start:\n\
         [0.008000000] kernel:vadd_end:\n\
         [0.101000000] kernel:vadd_start:\n\
         [0.104000000] kernel:vadd_end:\n",
    )
    .unwrap();

    let config = dir.path().join("tracechain.toml");
    std::fs::write(
        &config,
        format!(
            r#"
benchmark = "vadd"
device = "fpga"

[traces]
primary = "{}"
secondary = "{}"

[[stage]]
name = "app:input"
[[stage]]
name = "kernel:vadd_start"
[[stage]]
name = "kernel:vadd_end"
[[stage]]
name = "app:output"
"#,
            cpu.display(),
            fpga.display()
        ),
    )
    .unwrap();

    let output = tracechain()
        .arg("--config")
        .arg(&config)
        .args(["analyze", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["sets"], 2);
    assert_eq!(value["statistics"]["total"]["max"], 9.0);
    assert_eq!(value["statistics"]["total"]["min"], 5.0);
}
