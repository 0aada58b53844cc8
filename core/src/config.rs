//! Configuration for the translation workflow.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::languages::LanguagePair;
use crate::paginator::DEFAULT_LINES_PER_PAGE;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GateOptions {
    pub tick_interval_ms: u64,
    /// Percent added per tick.
    pub step_percent: f32,
}

impl Default for GateOptions {
    fn default() -> Self {
        Self {
            tick_interval_ms: 40,
            step_percent: 0.4,
        }
    }
}

impl GateOptions {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }

    /// Step in hundredths of a percent, at least one.
    pub fn step_hundredths(&self) -> u32 {
        let step = (self.step_percent * 100.0).round();
        if step.is_finite() && step >= 1.0 {
            step.min(10_000.0) as u32
        } else {
            1
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewerOptions {
    pub lines_per_page: usize,
    pub preview_lines: usize,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            lines_per_page: DEFAULT_LINES_PER_PAGE,
            preview_lines: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulatorOptions {
    pub latency_ms: u64,
}

impl Default for SimulatorOptions {
    fn default() -> Self {
        Self { latency_ms: 2_000 }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowConfig {
    #[serde(default)]
    pub gate: GateOptions,
    #[serde(default = "default_cancel_return_delay_ms")]
    pub cancel_return_delay_ms: u64,
    #[serde(default)]
    pub viewer: ViewerOptions,
    #[serde(default)]
    pub simulator: SimulatorOptions,
    #[serde(default = "default_source_language")]
    pub source_language: String,
    #[serde(default = "default_target_language")]
    pub target_language: String,
}

fn default_cancel_return_delay_ms() -> u64 {
    1_000
}

fn default_source_language() -> String {
    "en".to_string()
}

fn default_target_language() -> String {
    "ar".to_string()
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            gate: GateOptions::default(),
            cancel_return_delay_ms: default_cancel_return_delay_ms(),
            viewer: ViewerOptions::default(),
            simulator: SimulatorOptions::default(),
            source_language: default_source_language(),
            target_language: default_target_language(),
        }
    }
}

impl WorkflowConfig {
    pub fn cancel_return_delay(&self) -> Duration {
        Duration::from_millis(self.cancel_return_delay_ms)
    }

    /// Initial language pair. Unknown codes fall back to the catalog default.
    pub fn language_pair(&self) -> LanguagePair {
        match LanguagePair::from_codes(&self.source_language, &self.target_language) {
            Ok(pair) => pair,
            Err(code) => {
                log::warn!("unknown language code '{code}' in config, using default pair");
                LanguagePair::default()
            }
        }
    }

    /// Load configuration from YAML file
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self, String> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        serde_yaml::from_str(&content).map_err(|e| format!("Failed to parse config: {}", e))
    }

    /// Save configuration to YAML file
    pub fn to_yaml_file<P: AsRef<Path>>(&self, path: P) -> Result<(), String> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| format!("Failed to serialize config: {}", e))?;

        fs::write(path, content).map_err(|e| format!("Failed to write config file: {}", e))
    }

    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| format!("Failed to parse JSON config: {}", e))
    }

    pub fn to_json(&self) -> Result<String, String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| format!("Failed to serialize to JSON: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WorkflowConfig::default();
        assert_eq!(config.gate.tick_interval_ms, 40);
        assert_eq!(config.gate.step_hundredths(), 40);
        assert_eq!(config.cancel_return_delay(), Duration::from_millis(1_000));
        assert_eq!(config.viewer.lines_per_page, 30);
        assert_eq!(config.viewer.preview_lines, 8);
        assert_eq!(config.simulator.latency_ms, 2_000);
        assert_eq!(config.language_pair(), LanguagePair::default());
    }

    #[test]
    fn test_json_roundtrip_keeps_values() {
        let mut config = WorkflowConfig::default();
        config.viewer.lines_per_page = 12;
        config.source_language = "ar".into();
        let json = config.to_json().unwrap();
        assert!(json.contains("\"linesPerPage\": 12"));

        let parsed = WorkflowConfig::from_json(&json).unwrap();
        assert_eq!(parsed.viewer.lines_per_page, 12);
        assert_eq!(parsed.language_pair().source.code, "ar");
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workflow.yaml");
        fs::write(&path, "cancelReturnDelayMs: 250\ngate:\n  tickIntervalMs: 10\n  stepPercent: 5\n")
            .unwrap();

        let config = WorkflowConfig::from_yaml_file(&path).unwrap();
        assert_eq!(config.cancel_return_delay_ms, 250);
        assert_eq!(config.gate.step_hundredths(), 500);
        assert_eq!(config.viewer.lines_per_page, 30);
        assert_eq!(config.target_language, "ar");
    }

    #[test]
    fn test_yaml_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.yaml");
        let mut config = WorkflowConfig::default();
        config.simulator.latency_ms = 5;
        config.to_yaml_file(&path).unwrap();

        let loaded = WorkflowConfig::from_yaml_file(&path).unwrap();
        assert_eq!(loaded.simulator.latency_ms, 5);
    }

    #[test]
    fn test_missing_file_reports_error() {
        let err = WorkflowConfig::from_yaml_file("/nonexistent/workflow.yaml").unwrap_err();
        assert!(err.starts_with("Failed to read config file"));
    }

    #[test]
    fn test_unknown_language_falls_back() {
        let config = WorkflowConfig {
            target_language: "xx".into(),
            ..WorkflowConfig::default()
        };
        assert_eq!(config.language_pair(), LanguagePair::default());
    }

    #[test]
    fn test_step_is_never_zero() {
        let gate = GateOptions {
            tick_interval_ms: 0,
            step_percent: 0.0,
        };
        assert_eq!(gate.step_hundredths(), 1);
        assert_eq!(gate.tick_interval(), Duration::from_millis(1));
    }
}
