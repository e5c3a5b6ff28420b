//! Audit assertion: scan, reconcile, and turn the result into pass/fail

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::checkpoint::CheckpointName;
use crate::error::{AuditError, AuditResult};
use crate::reconciler::AuditReconciler;
use crate::scanner::{ConformanceTag, ExclusionSet, ScanRequest, Scanner};

/// Test-failure signal for a reconcile result: a message pointing at the
/// artifact, or `None` when the checkpoint is clean.
pub fn failure_message(artifact: Option<&Path>) -> Option<String> {
    artifact.map(|path| format!("See {} for a11y violations", path.display()))
}

/// Runs checkpoint audits with a fixed tag set
pub struct AuditGate<S> {
    scanner: S,
    reconciler: AuditReconciler,
    tags: Vec<ConformanceTag>,
}

impl<S: Scanner> AuditGate<S> {
    /// Gate using the default conformance tags
    pub fn new(scanner: S, reconciler: AuditReconciler) -> Self {
        Self {
            scanner,
            reconciler,
            tags: ConformanceTag::DEFAULT.to_vec(),
        }
    }

    /// Gate with an explicit tag set, which must not be empty
    pub fn with_tags(
        scanner: S,
        reconciler: AuditReconciler,
        tags: Vec<ConformanceTag>,
    ) -> AuditResult<Self> {
        if tags.is_empty() {
            return Err(AuditError::EmptyTagSet);
        }
        Ok(Self {
            scanner,
            reconciler,
            tags,
        })
    }

    pub fn scanner(&self) -> &S {
        &self.scanner
    }

    pub fn reconciler(&self) -> &AuditReconciler {
        &self.reconciler
    }

    pub fn tags(&self) -> &[ConformanceTag] {
        &self.tags
    }

    /// Scan the page and reconcile the checkpoint's artifact.
    ///
    /// `excluded` is passed to the scanner exactly as given.
    pub async fn run_audit(
        &self,
        page: &S::Page,
        checkpoint: &CheckpointName,
        excluded: ExclusionSet,
    ) -> AuditResult<Option<PathBuf>> {
        let request = ScanRequest::new(self.tags.clone(), excluded);
        debug!(
            "Auditing checkpoint '{}' ({} tag(s), {} rule(s) excluded)",
            checkpoint,
            request.tags.len(),
            request.excluded.len()
        );

        let violations = self.scanner.scan(page, &request).await?;
        self.reconciler.reconcile(checkpoint, &violations).await
    }

    /// Fail with [`AuditError::Findings`] if the checkpoint has violations.
    ///
    /// `extra_exclusions` is unioned with the baseline exclusions.
    pub async fn assert_clean<I, R>(
        &self,
        page: &S::Page,
        checkpoint: &CheckpointName,
        extra_exclusions: I,
    ) -> AuditResult<()>
    where
        I: IntoIterator<Item = R>,
        R: Into<String>,
    {
        let excluded = ExclusionSet::with_baseline(extra_exclusions);
        match self.run_audit(page, checkpoint, excluded).await? {
            None => Ok(()),
            Some(artifact) => {
                warn!("Checkpoint '{}' has a11y violations", checkpoint);
                Err(AuditError::Findings {
                    checkpoint: checkpoint.to_string(),
                    artifact,
                })
            }
        }
    }
}
