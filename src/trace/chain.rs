//! Target chain definition: the ordered stages one pipeline execution emits.

use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Marker drawn at a stage's timestamp in timeline views.
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
pub enum MarkerShape {
    #[default]
    Diamond,
    Plus,
}

/// One expected tracepoint in the chain, plus how to present it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ChainStage {
    /// Tracepoint name as emitted (e.g. `ros2:callback_start`)
    pub name: String,
    /// Unique label for this position; tracepoint names may recur in a chain
    #[serde(default, rename = "disambiguated")]
    disambiguated_name: Option<String>,
    /// Terminal colour name (`blue`, `bright-green`, ...)
    #[serde(default = "default_color", rename = "color")]
    pub foreground_color: String,
    /// Colour in the chart palette, usually a hex string
    #[serde(default, rename = "color-alt")]
    pub foreground_color_alt_palette: Option<String>,
    /// Timeline row the stage is drawn on (`rclcpp`, `userland`, ...)
    #[serde(default)]
    pub layer: String,
    /// Timeline row used for the stage's label
    #[serde(default)]
    pub label_layer: String,
    #[serde(default, rename = "marker")]
    pub marker_shape: MarkerShape,
}

fn default_color() -> String {
    "white".to_string()
}

impl ChainStage {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            disambiguated_name: None,
            foreground_color: default_color(),
            foreground_color_alt_palette: None,
            layer: String::new(),
            label_layer: String::new(),
            marker_shape: MarkerShape::default(),
        }
    }

    pub fn disambiguated(mut self, label: impl Into<String>) -> Self {
        self.disambiguated_name = Some(label.into());
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.foreground_color = color.into();
        self
    }

    /// Label for this position, falling back to the tracepoint name.
    pub fn disambiguated_name(&self) -> &str {
        self.disambiguated_name.as_deref().unwrap_or(&self.name)
    }
}

/// Ordered, append-only list of stages.
///
/// Matching is positional: the same tracepoint name may appear at several
/// positions (e.g. paired `callback_start` / `callback_end`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TargetChain {
    stages: Vec<ChainStage>,
}

impl TargetChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a stage at the end of the chain.
    pub fn push_stage(&mut self, stage: ChainStage) {
        self.stages.push(stage);
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stages(&self) -> &[ChainStage] {
        &self.stages
    }

    pub fn stage(&self, index: usize) -> Option<&ChainStage> {
        self.stages.get(index)
    }

    /// Tracepoint name expected at `index`.
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.stages.get(index).map(|s| s.name.as_str())
    }

    /// Whether any position expects this tracepoint.
    pub fn contains(&self, name: &str) -> bool {
        self.stages.iter().any(|s| s.name == name)
    }

    /// First position whose disambiguated label equals `label`.
    pub fn position_of(&self, label: &str) -> Option<usize> {
        self.stages
            .iter()
            .position(|s| s.disambiguated_name() == label)
    }

    /// A chain needs a first and a last stage to delimit a set.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        if self.stages.len() < 2 {
            return Err(AnalysisError::ChainTooShort {
                len: self.stages.len(),
            });
        }
        Ok(())
    }
}

impl FromIterator<ChainStage> for TargetChain {
    fn from_iter<I: IntoIterator<Item = ChainStage>>(iter: I) -> Self {
        Self {
            stages: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a TargetChain {
    type Item = &'a ChainStage;
    type IntoIter = std::slice::Iter<'a, ChainStage>;

    fn into_iter(self) -> Self::IntoIter {
        self.stages.iter()
    }
}
