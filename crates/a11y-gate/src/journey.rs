//! Declarative YAML user journeys

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::checkpoint::CheckpointName;
use crate::error::{AuditError, AuditResult};

/// A user journey parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Journey {
    /// Unique name for this journey
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering journeys
    #[serde(default)]
    pub tags: Vec<String>,

    /// Steps to execute in order
    pub steps: Vec<JourneyStep>,
}

/// A single step in a journey
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum JourneyStep {
    /// Load a URL
    Navigate { url: String },

    /// Type text with keyboard simulation
    Type { selector: String, text: String },

    /// Click an element
    Click { selector: String },

    /// Wait for an element to appear
    Wait { selector: String },

    /// Check that the page is showing the expected URL
    ExpectUrl { url: String },

    /// Audit the page at a named checkpoint
    Audit {
        checkpoint: CheckpointName,
        #[serde(default)]
        disable_rules: Vec<String>,
    },
}

impl JourneyStep {
    /// Short label used in logs and reports
    pub fn label(&self) -> String {
        match self {
            JourneyStep::Navigate { url } => format!("navigate:{}", url),
            JourneyStep::Type { selector, .. } => format!("type:{}", selector),
            JourneyStep::Click { selector } => format!("click:{}", selector),
            JourneyStep::Wait { selector } => format!("wait:{}", selector),
            JourneyStep::ExpectUrl { url } => format!("expect_url:{}", url),
            JourneyStep::Audit { checkpoint, .. } => format!("audit:{}", checkpoint),
        }
    }
}

impl Journey {
    /// Parse a journey from a YAML string
    pub fn from_yaml(yaml: &str) -> AuditResult<Self> {
        let journey: Self = serde_yaml::from_str(yaml)?;
        journey.validate()?;
        Ok(journey)
    }

    /// Parse a journey from a YAML file
    pub fn from_file(path: &Path) -> AuditResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
            .map_err(|e| AuditError::JourneyParse(format!("{}: {}", path.display(), e)))
    }

    /// Load all journeys from a directory, sorted by name
    pub fn load_all(dir: &Path) -> AuditResult<Vec<Self>> {
        let mut journeys = Vec::new();

        for entry in walkdir::WalkDir::new(dir)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            journeys.push(Self::from_file(entry.path())?);
        }

        journeys.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(journeys)
    }

    /// Checkpoints audited by this journey, in step order
    pub fn checkpoints(&self) -> Vec<&CheckpointName> {
        self.steps
            .iter()
            .filter_map(|step| match step {
                JourneyStep::Audit { checkpoint, .. } => Some(checkpoint),
                _ => None,
            })
            .collect()
    }

    /// Two audits sharing a checkpoint would overwrite each other's artifact
    fn validate(&self) -> AuditResult<()> {
        let mut seen = HashSet::new();
        for checkpoint in self.checkpoints() {
            if !seen.insert(checkpoint) {
                return Err(AuditError::JourneyParse(format!(
                    "journey '{}' audits checkpoint '{}' more than once",
                    self.name, checkpoint
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const HAPPY_PATH: &str = r#"
name: happy-path
description: Plan search from zip code to household
tags:
  - smoke
steps:
  - action: navigate
    url: https://www.healthcare.gov/see-plans
  - action: type
    selector: .ds-c-field
    text: "60647"
  - action: wait
    selector: .ds-c-autocomplete__list-item
  - action: audit
    checkpoint: happy_path_landing
  - action: click
    selector: .ds-c-autocomplete__list-item
  - action: expect_url
    url: https://www.healthcare.gov/see-plans/#/steps
  - action: audit
    checkpoint: happy_path_steps
    disable_rules: [region]
"#;

    #[test]
    fn test_parse_journey() {
        let journey = Journey::from_yaml(HAPPY_PATH).unwrap();
        assert_eq!(journey.name, "happy-path");
        assert_eq!(journey.steps.len(), 7);
        assert_eq!(
            journey.checkpoints().iter().map(|c| c.as_str()).collect::<Vec<_>>(),
            vec!["happy_path_landing", "happy_path_steps"]
        );
        match &journey.steps[6] {
            JourneyStep::Audit { disable_rules, .. } => assert_eq!(disable_rules, &["region"]),
            other => panic!("unexpected step {:?}", other),
        }
        assert_eq!(journey.steps[3].label(), "audit:happy_path_landing");
    }

    #[test]
    fn test_rejects_duplicate_checkpoints() {
        let yaml = r#"
name: dup
steps:
  - action: audit
    checkpoint: landing
  - action: audit
    checkpoint: landing
"#;
        assert!(matches!(
            Journey::from_yaml(yaml),
            Err(AuditError::JourneyParse(_))
        ));
    }

    #[test]
    fn test_rejects_unsafe_checkpoint() {
        let yaml = r#"
name: bad
steps:
  - action: audit
    checkpoint: ../../etc
"#;
        assert!(Journey::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_rejects_unknown_action() {
        let yaml = r#"
name: chatty
steps:
  - action: log
    message: hello
"#;
        assert!(matches!(Journey::from_yaml(yaml), Err(AuditError::Yaml(_))));
    }

    #[test]
    fn test_load_all_sorted() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("b.yaml"), "name: zeta\nsteps: []\n").unwrap();
        std::fs::write(dir.path().join("a.yml"), "name: alpha\nsteps: []\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let journeys = Journey::load_all(dir.path()).unwrap();
        let names: Vec<_> = journeys.iter().map(|j| j.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
    }
}
