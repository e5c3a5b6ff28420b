//! Checkpoint names

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{AuditError, AuditResult};

static CHECKPOINT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.\-]*$").expect("static regex"));

/// A named point in a user journey where an audit is taken.
///
/// Used verbatim in the artifact file name, so it must be a single
/// filesystem-safe path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CheckpointName(String);

impl CheckpointName {
    pub fn new(name: impl Into<String>) -> AuditResult<Self> {
        let name = name.into();
        if CHECKPOINT_RE.is_match(&name) {
            Ok(Self(name))
        } else {
            Err(AuditError::InvalidCheckpoint(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CheckpointName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for CheckpointName {
    type Error = AuditError;

    fn try_from(value: String) -> AuditResult<Self> {
        Self::new(value)
    }
}

impl TryFrom<&str> for CheckpointName {
    type Error = AuditError;

    fn try_from(value: &str) -> AuditResult<Self> {
        Self::new(value)
    }
}

impl From<CheckpointName> for String {
    fn from(value: CheckpointName) -> Self {
        value.0
    }
}
