//! Accessibility regression gate
//!
//! Drives a browser through a user journey, audits the page at named
//! checkpoints, and keeps exactly one findings artifact per failing
//! checkpoint. A checkpoint that comes back clean has its stale artifact
//! removed, so the results directory always reflects the latest run.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                JourneyRunner (YAML journeys)                │
//! │    navigate / type / click / wait / expect_url / audit      │
//! ├─────────────────────────────────────────────────────────────┤
//! │  AuditGate                                                  │
//! │    ├── assert_clean(page, checkpoint, extra) -> Result<()>  │
//! │    └── run_audit(page, checkpoint, excluded) -> Option<Path>│
//! ├──────────────────────────────┬──────────────────────────────┤
//! │  Scanner (trait)             │  AuditReconciler             │
//! │    └── AxeScanner            │    └── audit_<cp>.json       │
//! ├──────────────────────────────┴──────────────────────────────┤
//! │  Page (trait)                                               │
//! │    └── PlaywrightPage (replayed Node.js scripts)            │
//! └─────────────────────────────────────────────────────────────┘
//! ```

pub mod checkpoint;
pub mod config;
pub mod error;
pub mod gate;
pub mod journey;
pub mod page;
pub mod playwright;
pub mod reconciler;
pub mod runner;
pub mod scanner;

pub use checkpoint::CheckpointName;
pub use error::{AuditError, AuditResult, FailureKind};
pub use gate::{failure_message, AuditGate};
pub use journey::{Journey, JourneyStep};
pub use page::Page;
pub use reconciler::AuditReconciler;
pub use runner::JourneyRunner;
pub use scanner::{ConformanceTag, ExclusionSet, ScanRequest, Scanner, ViolationRecord};
