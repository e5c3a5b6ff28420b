//! Journey runner: drives a page through journeys and audits each checkpoint

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, error, info, warn};

use crate::error::{AuditError, AuditResult, FailureKind};
use crate::gate::AuditGate;
use crate::journey::{Journey, JourneyStep};
use crate::page::Page;
use crate::scanner::Scanner;

/// Result of executing a single step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepResult {
    pub step_name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Result of running one journey
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JourneyResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepResult>,

    /// Checkpoints audited clean
    pub clean_checkpoints: Vec<String>,

    /// Artifact written by the failing audit, if that is why the journey stopped
    pub findings: Option<PathBuf>,

    pub error: Option<String>,
    pub failure_kind: Option<FailureKind>,
}

impl JourneyResult {
    /// Result for a journey that could not get as far as its first step
    pub fn aborted(name: &str, err: &AuditError) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            duration_ms: 0,
            steps: vec![],
            clean_checkpoints: vec![],
            findings: None,
            error: Some(err.to_string()),
            failure_kind: Some(err.kind()),
        }
    }
}

/// Result of running a set of journeys
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub started_at: DateTime<Utc>,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub results: Vec<JourneyResult>,
}

impl SuiteResult {
    pub fn from_results(started_at: DateTime<Utc>, duration_ms: u64, results: Vec<JourneyResult>) -> Self {
        let passed = results.iter().filter(|r| r.success).count();
        Self {
            started_at,
            total: results.len(),
            passed,
            failed: results.len() - passed,
            duration_ms,
            results,
        }
    }

    /// Whether any journey failed because the tooling broke
    pub fn has_tooling_failures(&self) -> bool {
        self.results
            .iter()
            .any(|r| r.failure_kind == Some(FailureKind::Tooling))
    }

    /// Write the report as pretty JSON
    pub fn write(&self, path: &Path) -> AuditResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        info!("Results written to: {}", path.display());
        Ok(())
    }
}

/// Executes journeys against a page and audit gate
pub struct JourneyRunner<S> {
    gate: AuditGate<S>,
}

impl<S> JourneyRunner<S>
where
    S: Scanner,
    S::Page: Page + Sized,
{
    pub fn new(gate: AuditGate<S>) -> Self {
        Self { gate }
    }

    pub fn gate(&self) -> &AuditGate<S> {
        &self.gate
    }

    /// Run a journey to completion or to its first failing step
    pub async fn run_journey(&self, page: &mut S::Page, journey: &Journey) -> JourneyResult {
        let start = Instant::now();
        info!("Running journey: {}", journey.name);

        let mut steps = Vec::new();
        let mut clean_checkpoints = Vec::new();
        let mut failure: Option<AuditError> = None;

        for step in &journey.steps {
            let step_start = Instant::now();
            let step_name = step.label();
            debug!("Executing step: {}", step_name);

            let outcome = self.execute_step(page, step).await;
            let duration_ms = step_start.elapsed().as_millis() as u64;

            match outcome {
                Ok(()) => {
                    if let JourneyStep::Audit { checkpoint, .. } = step {
                        clean_checkpoints.push(checkpoint.to_string());
                    }
                    steps.push(StepResult {
                        step_name,
                        success: true,
                        duration_ms,
                        error: None,
                    });
                }
                Err(e) => {
                    steps.push(StepResult {
                        step_name,
                        success: false,
                        duration_ms,
                        error: Some(e.to_string()),
                    });
                    failure = Some(e);
                    break; // Stop on first failure
                }
            }
        }

        let duration_ms = start.elapsed().as_millis() as u64;
        match &failure {
            None => info!("✓ {} ({} ms)", journey.name, duration_ms),
            Some(e) if e.kind() == FailureKind::Audit => warn!("✗ {} - {}", journey.name, e),
            Some(e) => error!("✗ {} - tooling failure: {}", journey.name, e),
        }

        JourneyResult {
            name: journey.name.clone(),
            success: failure.is_none(),
            duration_ms,
            steps,
            clean_checkpoints,
            findings: failure.as_ref().and_then(|e| e.artifact()).map(Path::to_path_buf),
            error: failure.as_ref().map(|e| e.to_string()),
            failure_kind: failure.as_ref().map(AuditError::kind),
        }
    }

    /// Run several journeys, each on a page produced by `new_page`
    pub async fn run_all<F>(&self, journeys: &[Journey], mut new_page: F) -> SuiteResult
    where
        F: FnMut() -> AuditResult<S::Page>,
    {
        let started_at = Utc::now();
        let start = Instant::now();
        let mut results = Vec::new();

        info!("Running {} journey(s)...", journeys.len());

        for journey in journeys {
            let result = match new_page() {
                Ok(mut page) => self.run_journey(&mut page, journey).await,
                Err(e) => {
                    error!("✗ {} - {}", journey.name, e);
                    JourneyResult::aborted(&journey.name, &e)
                }
            };
            results.push(result);
        }

        let suite = SuiteResult::from_results(started_at, start.elapsed().as_millis() as u64, results);
        info!(
            "Results: {} passed, {} failed ({} ms)",
            suite.passed, suite.failed, suite.duration_ms
        );
        suite
    }

    async fn execute_step(&self, page: &mut S::Page, step: &JourneyStep) -> AuditResult<()> {
        match step {
            JourneyStep::Navigate { url } => page.navigate(url).await,
            JourneyStep::Type { selector, text } => page.type_text(selector, text).await,
            JourneyStep::Click { selector } => page.click(selector).await,
            JourneyStep::Wait { selector } => page.wait_for_selector(selector).await,
            JourneyStep::ExpectUrl { url } => {
                let actual = page.current_url().await?;
                if &actual == url {
                    Ok(())
                } else {
                    Err(AuditError::UrlMismatch {
                        expected: url.clone(),
                        actual,
                    })
                }
            }
            JourneyStep::Audit {
                checkpoint,
                disable_rules,
            } => {
                self.gate
                    .assert_clean(page, checkpoint, disable_rules.iter().cloned())
                    .await
            }
        }
    }
}
