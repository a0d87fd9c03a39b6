use crate::error::Result;
use crate::roadmap::RoadmapConfig;
use crate::scoring::ScoringPolicy;
use std::path::Path;
use tracing::debug;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ProjectContext
// ---------------------------------------------------------------------------

/// What the engine knows about the project under analysis. Feeds the
/// familiarity discount in effort scoring and roadmap metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectContext {
    #[serde(default)]
    pub name: String,
    /// Primary implementation language, lowercase ("rust", "python").
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub frameworks: Vec<String>,
}

// ---------------------------------------------------------------------------
// AnalyzerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Claims verifying at or above this accuracy are not reported as gaps.
    #[serde(default = "default_accuracy_threshold")]
    pub accuracy_threshold: u32,
    /// Parse candidate files for function outlines instead of relying on
    /// filename similarity alone.
    #[serde(default = "default_deep_verification")]
    pub deep_verification: bool,
    /// Deep verification only runs when the filename pass narrowed the claim
    /// to at most this many candidate files.
    #[serde(default = "default_max_deep_candidates")]
    pub max_deep_candidates: usize,
    #[serde(default = "default_max_filename_matches")]
    pub max_filename_matches: usize,
}

fn default_accuracy_threshold() -> u32 {
    70
}

fn default_deep_verification() -> bool {
    true
}

fn default_max_deep_candidates() -> usize {
    5
}

fn default_max_filename_matches() -> usize {
    25
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            accuracy_threshold: default_accuracy_threshold(),
            deep_verification: default_deep_verification(),
            max_deep_candidates: default_max_deep_candidates(),
            max_filename_matches: default_max_filename_matches(),
        }
    }
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// Top-level configuration, loaded from `gapscan.yaml` at the project root.
/// Every section and every field is optional; omissions fall back to the
/// documented defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub project: ProjectContext,
    #[serde(default)]
    pub analyzer: AnalyzerConfig,
    #[serde(default)]
    pub scoring: ScoringPolicy,
    #[serde(default)]
    pub roadmap: RoadmapConfig,
    #[serde(default)]
    pub velocity: crate::progress::VelocityConfig,
}

pub const CONFIG_FILE: &str = "gapscan.yaml";

impl EngineConfig {
    /// Load from `<root>/gapscan.yaml`; an absent file means defaults, a
    /// malformed file is an error.
    pub fn load(root: &Path) -> Result<Self> {
        let path = root.join(CONFIG_FILE);
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: EngineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = EngineConfig::load(dir.path()).unwrap();
        assert_eq!(config.analyzer.accuracy_threshold, 70);
        assert!(config.analyzer.deep_verification);
        assert_eq!(config.roadmap.team_size, 2);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "project:\n  name: demo\n  language: rust\nanalyzer:\n  accuracy_threshold: 80\n",
        )
        .unwrap();
        let config = EngineConfig::load(dir.path()).unwrap();
        assert_eq!(config.project.name, "demo");
        assert_eq!(config.analyzer.accuracy_threshold, 80);
        // Untouched sections keep defaults.
        assert_eq!(config.analyzer.max_deep_candidates, 5);
        assert_eq!(config.scoring.priority_thresholds, (7.75, 5.5, 3.25));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "analyzer: [not, a, map]").unwrap();
        assert!(EngineConfig::load(dir.path()).is_err());
    }
}
