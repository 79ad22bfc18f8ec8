//! `tracechain compare`

use super::{stderr, stdout, testdata, tracechain};

/// One set with every latency doubled relative to the sample trace's middle set.
fn slow_trace(dir: &std::path::Path) -> std::path::PathBuf {
    let names = [
        "robotperf_benchmarks:robotperf_image_input_cb_init",
        "robotperf_benchmarks:robotperf_image_input_cb_fini",
        "ros2_image_pipeline:image_proc_resize_cb_init",
        "ros2_image_pipeline:image_proc_resize_cb_fini",
        "robotperf_benchmarks:robotperf_image_output_cb_init",
    ];
    let offsets_ms = [0, 2, 8, 20, 24];
    let lines: Vec<String> = names
        .iter()
        .zip(offsets_ms)
        .map(|(name, ms)| {
            format!(
                r#"{{"name": "{name}", "timestamp_ns": {}, "process_id": 1}}"#,
                ms * 1_000_000
            )
        })
        .collect();
    let path = dir.join("slow.jsonl");
    std::fs::write(&path, lines.join("\n")).unwrap();
    path
}

#[test]
fn test_compare_against_baseline() {
    let dir = tempfile::tempdir().unwrap();
    let slow = slow_trace(dir.path());

    let output = tracechain()
        .arg("--config")
        .arg(testdata("chain.toml"))
        .arg("compare")
        .arg(format!("cpu={}", testdata("cpu_trace.txt").display()))
        .arg(format!("slow={}", slow.display()))
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));

    let out = stdout(&output);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 4, "{out}");
    assert!(lines[0].contains("Benchmark Mean"));
    assert!(lines[2].starts_with("| cpu | **10.67** ms (`0.00`%) |"), "{out}");
    // Total mean 24 vs 12
    assert!(
        lines[3].contains("24.00 ms (:small_red_triangle_down: `100.00`%)"),
        "{out}"
    );
}

#[test]
fn test_compare_without_baseline() {
    let output = tracechain()
        .arg("--config")
        .arg(testdata("chain.toml"))
        .args(["compare", "--no-baseline"])
        .arg(format!("cpu={}", testdata("cpu_trace.txt").display()))
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", stderr(&output));
    let out = stdout(&output);
    assert!(out.contains("| cpu | **10.67** ms | "), "{out}");
    assert!(!out.contains('%'), "{out}");
}

#[test]
fn test_compare_rejects_malformed_batch() {
    let output = tracechain()
        .arg("--config")
        .arg(testdata("chain.toml"))
        .args(["compare", "just-a-path"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(stderr(&output).contains("expected NAME=TRACE"));
}
