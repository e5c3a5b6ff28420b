//! Error types for accessibility audits

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuditError {
    /// A checkpoint had violations. This is the expected negative outcome,
    /// the details live in the artifact rather than in the message.
    #[error("See {} for a11y violations", artifact.display())]
    Findings { checkpoint: String, artifact: PathBuf },

    #[error("Expected page URL {expected}, found {actual}")]
    UrlMismatch { expected: String, actual: String },

    #[error("Invalid checkpoint name '{0}': use letters, digits, '_', '-' or '.'")]
    InvalidCheckpoint(String),

    #[error("Conformance tag set must not be empty")]
    EmptyTagSet,

    #[error("Accessibility scan failed: {0}")]
    Scan(String),

    #[error("Playwright driver unavailable: {0}")]
    DriverUnavailable(String),

    #[error("Playwright error: {0}")]
    Playwright(String),

    #[error("Failed to write audit results to {}: {source}", path.display())]
    ArtifactWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to delete audit results at {}: {source}", path.display())]
    ArtifactDelete {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Journey parse error: {0}")]
    JourneyParse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),
}

/// How a failure should be reported.
///
/// `Audit` failures are normal negative results of a run (violations found,
/// the journey did not reach the expected page). `Tooling` failures mean the
/// gate itself could not do its job and its verdict cannot be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Audit,
    Tooling,
}

impl AuditError {
    pub fn kind(&self) -> FailureKind {
        match self {
            AuditError::Findings { .. } | AuditError::UrlMismatch { .. } => FailureKind::Audit,
            _ => FailureKind::Tooling,
        }
    }

    /// Artifact path for a findings failure
    pub fn artifact(&self) -> Option<&std::path::Path> {
        match self {
            AuditError::Findings { artifact, .. } => Some(artifact),
            _ => None,
        }
    }
}

pub type AuditResult<T> = Result<T, AuditError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_findings_message_points_at_artifact() {
        let err = AuditError::Findings {
            checkpoint: "steps".to_string(),
            artifact: PathBuf::from("test-results/audit_steps.json"),
        };
        assert_eq!(err.to_string(), "See test-results/audit_steps.json for a11y violations");
        assert_eq!(err.kind(), FailureKind::Audit);
    }

    #[test]
    fn test_io_failures_are_tooling() {
        let err = AuditError::ArtifactDelete {
            path: PathBuf::from("x.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.kind(), FailureKind::Tooling);
        assert!(err.artifact().is_none());
        assert_eq!(AuditError::Scan("detached".into()).kind(), FailureKind::Tooling);
    }
}
