//! Gate configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AuditError, AuditResult};
use crate::playwright::PlaywrightConfig;
use crate::scanner::ConformanceTag;

/// Top-level configuration, usually loaded from `a11y-gate.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Directory holding `audit_<checkpoint>.json` artifacts and the run report
    pub results_dir: PathBuf,

    /// Directory searched for journey YAML files
    pub journeys_dir: PathBuf,

    /// Conformance tags every audit runs with
    pub tags: Vec<ConformanceTag>,

    /// Browser driver settings
    pub playwright: PlaywrightConfig,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("test-results"),
            journeys_dir: PathBuf::from("journeys"),
            tags: ConformanceTag::DEFAULT.to_vec(),
            playwright: PlaywrightConfig::default(),
        }
    }
}

impl GateConfig {
    /// Load configuration from file, falling back to defaults if it is missing
    pub fn load(path: &Path) -> AuditResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            if config.tags.is_empty() {
                return Err(AuditError::EmptyTagSet);
            }
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Path of the JSON run report
    pub fn report_path(&self) -> PathBuf {
        self.results_dir.join("a11y-results.json")
    }
}
