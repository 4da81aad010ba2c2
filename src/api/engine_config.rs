use serde::{Deserialize, Serialize};

use crate::core::{LayoutHeuristics, Orientation};
use crate::error::{ChartError, ChartResult};

/// Public layout engine configuration.
///
/// Serializable so host applications can persist tuning next to their own
/// chart settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub heuristics: LayoutHeuristics,
    /// Skips the orientation heuristic when set.
    pub orientation: Option<Orientation>,
    pub rotate_labels: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            heuristics: LayoutHeuristics::default(),
            orientation: None,
            rotate_labels: true,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_heuristics(mut self, heuristics: LayoutHeuristics) -> Self {
        self.heuristics = heuristics;
        self
    }

    #[must_use]
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = Some(orientation);
        self
    }

    #[must_use]
    pub fn with_rotate_labels(mut self, enabled: bool) -> Self {
        self.rotate_labels = enabled;
        self
    }

    pub fn validate(self) -> ChartResult<Self> {
        self.heuristics.validate()?;
        Ok(self)
    }

    /// Serializes config to pretty JSON.
    pub fn to_json_pretty(self) -> ChartResult<String> {
        serde_json::to_string_pretty(&self)
            .map_err(|e| ChartError::InvalidConfig(format!("failed to serialize config: {e}")))
    }

    /// Deserializes config from JSON. Missing fields take their defaults.
    pub fn from_json_str(input: &str) -> ChartResult<Self> {
        let config: Self = serde_json::from_str(input)
            .map_err(|e| ChartError::InvalidConfig(format!("failed to parse config: {e}")))?;
        config.validate()
    }
}
