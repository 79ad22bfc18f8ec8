//! Analysis configuration
//!
//! A benchmark is described by a TOML file, `tracechain.toml` by default:
//!
//! ```toml
//! benchmark = "a1_perception_2nodes"
//! device = "cpu"
//!
//! [window]
//! start = "ros2:callback_end"
//! end = "robotperf_benchmarks:robotperf_image_output_cb_init"
//!
//! [[stage]]
//! name = "robotperf_benchmarks:robotperf_image_input_cb_init"
//! color = "blue"
//!
//! [[stage]]
//! name = "ros2:callback_start"
//! color = "yellow"
//! ```
//!
//! Stages are matched in file order. Fields that identify the run rather than
//! the chain (hardware, category, datasource) come from the environment; see
//! [`crate::results::ResultContext`].

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::trace::{
    BenchmarkWindow, CallbackPair, ChainStage, EventSource, MatcherOptions, TargetChain,
};

/// Default configuration file, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "tracechain.toml";

/// Which kind of device ran the pipeline.
///
/// FPGA runs record kernel events in a second trace, so the default source
/// for `fpga` is the CPU trace merged with the FPGA trace.
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum DeviceType {
    #[default]
    Cpu,
    Fpga,
}

/// Benchmark window given as disambiguated stage labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowMarkers {
    pub start: String,
    pub end: String,
}

/// Where traces are read from when none are given on the command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TracePaths {
    pub primary: PathBuf,
    /// Merged with `primary` for FPGA runs
    pub secondary: PathBuf,
}

impl Default for TracePaths {
    fn default() -> Self {
        Self {
            primary: PathBuf::from("/tmp/analysis/trace/trace_cpu_ctf"),
            secondary: PathBuf::from("/tmp/analysis/trace/trace_fpga_vtf_ctf_fix"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Benchmark identifier; names the results file and publish branch
    pub benchmark: String,

    #[serde(default)]
    pub device: DeviceType,

    /// Force process anchoring on or off. Unset: on for one trace, off for two.
    #[serde(default)]
    pub anchor_process: Option<bool>,

    #[serde(default)]
    pub callback: CallbackPair,

    /// Unset: the whole chain is the benchmark window
    #[serde(default)]
    pub window: Option<WindowMarkers>,

    #[serde(default)]
    pub traces: TracePaths,

    #[serde(default, rename = "stage")]
    pub stages: Vec<ChainStage>,
}

impl AnalysisConfig {
    /// Load and validate a configuration file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config = Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        log::debug!(
            "Loaded {} ({} stages) from {}",
            config.benchmark,
            config.stages.len(),
            path.display()
        );
        Ok(config)
    }

    /// Parse from TOML text, checking the chain and window are usable.
    pub fn parse(contents: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.benchmark_window()?;
        Ok(config)
    }

    /// The chain, in stage order.
    pub fn target_chain(&self) -> TargetChain {
        self.stages.iter().cloned().collect()
    }

    pub fn benchmark_window(&self) -> anyhow::Result<BenchmarkWindow> {
        let chain = self.target_chain();
        chain.validate()?;
        let window = match &self.window {
            Some(markers) => BenchmarkWindow::from_markers(&chain, &markers.start, &markers.end)?,
            None => BenchmarkWindow::whole(chain.len()),
        };
        Ok(window)
    }

    pub fn matcher_options(&self, dual_source: bool) -> MatcherOptions {
        MatcherOptions {
            anchor_process: self.anchor_process.unwrap_or(!dual_source),
            callback_pair: self.callback.clone(),
        }
    }

    /// Resolve the event source from command-line paths, falling back to the
    /// configured defaults for this device type.
    pub fn event_source(&self, trace: Option<PathBuf>, second_trace: Option<PathBuf>) -> EventSource {
        match (trace, second_trace) {
            (Some(first), Some(second)) => EventSource::Dual(first, second),
            (Some(first), None) => EventSource::Single(first),
            (None, second) => {
                let primary = self.traces.primary.clone();
                match (self.device, second) {
                    (_, Some(second)) => EventSource::Dual(primary, second),
                    (DeviceType::Fpga, None) => {
                        EventSource::Dual(primary, self.traces.secondary.clone())
                    }
                    (DeviceType::Cpu, None) => EventSource::Single(primary),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;
    use crate::trace::MarkerShape;

    const SAMPLE: &str = r#"
benchmark = "a1_perception_2nodes"

[window]
start = "ros2:callback_end"
end = "output"

[[stage]]
name = "input"
color = "blue"

[[stage]]
name = "ros2:callback_start"
layer = "rclcpp"
marker = "plus"

[[stage]]
name = "ros2:callback_end"

[[stage]]
name = "output"
color-alt = "bright-red"
"#;

    #[test]
    fn test_parse_sample() {
        let config = AnalysisConfig::parse(SAMPLE).unwrap();
        assert_eq!(config.benchmark, "a1_perception_2nodes");
        assert_eq!(config.device, DeviceType::Cpu);
        assert_eq!(config.callback, CallbackPair::default());

        let chain = config.target_chain();
        assert_eq!(chain.len(), 4);
        assert_eq!(chain.stage(0).unwrap().foreground_color, "blue");
        assert_eq!(chain.stage(1).unwrap().layer, "rclcpp");
        assert_eq!(chain.stage(1).unwrap().marker_shape, MarkerShape::Plus);
        assert_eq!(
            chain.stage(3).unwrap().foreground_color_alt_palette.as_deref(),
            Some("bright-red")
        );

        let window = config.benchmark_window().unwrap();
        assert_eq!(window, BenchmarkWindow { start: 2, end: 3 });
    }

    #[test]
    fn test_window_defaults_to_whole_chain() {
        let config = AnalysisConfig::parse(
            r#"
benchmark = "b"
[[stage]]
name = "a"
[[stage]]
name = "b"
[[stage]]
name = "c"
"#,
        )
        .unwrap();
        assert_eq!(
            config.benchmark_window().unwrap(),
            BenchmarkWindow { start: 0, end: 2 }
        );
    }

    #[test]
    fn test_unknown_window_marker_rejected() {
        let err = AnalysisConfig::parse(
            r#"
benchmark = "b"
window = { start = "a", end = "nope" }
[[stage]]
name = "a"
[[stage]]
name = "b"
"#,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::UnknownWindowMarker { .. })
        ));
    }

    #[test]
    fn test_short_chain_rejected() {
        let err = AnalysisConfig::parse("benchmark = \"b\"\n[[stage]]\nname = \"a\"\n").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AnalysisError>(),
            Some(AnalysisError::ChainTooShort { len: 1 })
        ));
    }

    #[test]
    fn test_unknown_field_rejected() {
        assert!(AnalysisConfig::parse("benchmark = \"b\"\nbogus = 1\n").is_err());
    }

    #[test]
    fn test_matcher_options_anchor_defaults() {
        let mut config = AnalysisConfig::parse(SAMPLE).unwrap();
        assert!(config.matcher_options(false).anchor_process);
        assert!(!config.matcher_options(true).anchor_process);

        config.anchor_process = Some(true);
        assert!(config.matcher_options(true).anchor_process);
        config.anchor_process = Some(false);
        assert!(!config.matcher_options(false).anchor_process);
    }

    #[test]
    fn test_custom_callback_pair() {
        let config = AnalysisConfig::parse(
            r#"
benchmark = "b"
callback = { start = "cb:in", end = "cb:out" }
[[stage]]
name = "a"
[[stage]]
name = "b"
"#,
        )
        .unwrap();
        let options = config.matcher_options(false);
        assert_eq!(options.callback_pair.start, "cb:in");
        assert_eq!(options.callback_pair.end, "cb:out");
    }

    #[test]
    fn test_event_source_resolution() {
        let mut config = AnalysisConfig::parse(SAMPLE).unwrap();
        let a = PathBuf::from("a.txt");
        let b = PathBuf::from("b.txt");

        assert_eq!(
            config.event_source(Some(a.clone()), None),
            EventSource::Single(a.clone())
        );
        assert_eq!(
            config.event_source(Some(a.clone()), Some(b.clone())),
            EventSource::Dual(a.clone(), b.clone())
        );
        assert_eq!(
            config.event_source(None, None),
            EventSource::Single(PathBuf::from("/tmp/analysis/trace/trace_cpu_ctf"))
        );

        config.device = DeviceType::Fpga;
        assert!(config.event_source(None, None).is_dual());
        assert_eq!(
            config.event_source(None, Some(b.clone())),
            EventSource::Dual(PathBuf::from("/tmp/analysis/trace/trace_cpu_ctf"), b)
        );
    }

    #[test]
    fn test_device_type_from_str() {
        assert_eq!("FPGA".parse::<DeviceType>().unwrap(), DeviceType::Fpga);
        assert_eq!(DeviceType::Cpu.to_string(), "cpu");
    }

    #[test]
    fn test_load_reports_path() {
        let err = AnalysisConfig::load(Path::new("/nonexistent/tracechain.toml")).unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/tracechain.toml"));
    }
}
