//! Audit artifact reconciliation
//!
//! Each checkpoint owns at most one findings file,
//! `<results_dir>/audit_<checkpoint>.json`. After a scan the file is made to
//! match the result: written when there are violations, removed when there
//! are none. The state on disk is a function of the latest scan only.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::checkpoint::CheckpointName;
use crate::error::{AuditError, AuditResult};
use crate::scanner::ViolationRecord;

/// Owns the lifecycle of findings artifacts in a results directory
#[derive(Debug, Clone)]
pub struct AuditReconciler {
    results_dir: PathBuf,
}

impl AuditReconciler {
    pub fn new(results_dir: impl Into<PathBuf>) -> Self {
        Self {
            results_dir: results_dir.into(),
        }
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    /// Where the artifact for a checkpoint lives
    pub fn artifact_path(&self, checkpoint: &CheckpointName) -> PathBuf {
        self.results_dir.join(format!("audit_{}.json", checkpoint))
    }

    /// Bring the checkpoint's artifact in line with `violations`.
    ///
    /// Returns the artifact path when violations were written, `None` when
    /// the checkpoint is clean. The file operation has completed by the time
    /// this returns; write and delete failures are returned, never dropped.
    pub async fn reconcile(
        &self,
        checkpoint: &CheckpointName,
        violations: &[ViolationRecord],
    ) -> AuditResult<Option<PathBuf>> {
        let path = self.artifact_path(checkpoint);

        if violations.is_empty() {
            self.remove_stale(checkpoint, &path).await?;
            return Ok(None);
        }

        if let Err(source) = self.write_artifact(&path, violations).await {
            error!("Error writing audit results to {}: {}", path.display(), source);
            return Err(AuditError::ArtifactWrite { path, source });
        }

        info!(
            "Checkpoint '{}': {} violation(s) written to {}",
            checkpoint,
            violations.len(),
            path.display()
        );
        Ok(Some(path))
    }

    async fn write_artifact(
        &self,
        path: &Path,
        violations: &[ViolationRecord],
    ) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(violations)?;
        tokio::fs::create_dir_all(&self.results_dir).await?;
        tokio::fs::write(path, json).await
    }

    async fn remove_stale(&self, checkpoint: &CheckpointName, path: &Path) -> AuditResult<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => {
                info!(
                    "Checkpoint '{}' is clean, removed stale {}",
                    checkpoint,
                    path.display()
                );
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("Checkpoint '{}' is clean", checkpoint);
                Ok(())
            }
            Err(source) => {
                error!("Error deleting audit results at {}: {}", path.display(), source);
                Err(AuditError::ArtifactDelete {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }
}
