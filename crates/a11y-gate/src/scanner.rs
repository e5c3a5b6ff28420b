//! Scanner adapter: the accessibility engine seam

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::AuditResult;
use crate::page::Page;

/// Rules that are always suppressed on top of whatever the caller excludes.
pub const BASELINE_EXCLUSIONS: [&str; 2] = ["duplicate-id", "heading-order"];

/// Rule family selector understood by the accessibility engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConformanceTag {
    #[serde(rename = "wcag2a")]
    Wcag2A,
    #[serde(rename = "wcag2aa")]
    Wcag2AA,
    #[serde(rename = "wcag21a")]
    Wcag21A,
    #[serde(rename = "wcag21aa")]
    Wcag21AA,
    #[serde(rename = "section508")]
    Section508,
    #[serde(rename = "best-practice")]
    BestPractice,
    #[serde(rename = "experimental")]
    Experimental,
}

impl ConformanceTag {
    /// The tag set every audit runs with unless configured otherwise
    pub const DEFAULT: [ConformanceTag; 7] = [
        ConformanceTag::Wcag2A,
        ConformanceTag::Wcag2AA,
        ConformanceTag::Wcag21A,
        ConformanceTag::Wcag21AA,
        ConformanceTag::Section508,
        ConformanceTag::BestPractice,
        ConformanceTag::Experimental,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConformanceTag::Wcag2A => "wcag2a",
            ConformanceTag::Wcag2AA => "wcag2aa",
            ConformanceTag::Wcag21A => "wcag21a",
            ConformanceTag::Wcag21AA => "wcag21aa",
            ConformanceTag::Section508 => "section508",
            ConformanceTag::BestPractice => "best-practice",
            ConformanceTag::Experimental => "experimental",
        }
    }
}

impl fmt::Display for ConformanceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of rule IDs to suppress for one scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExclusionSet(BTreeSet<String>);

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Caller exclusions unioned with [`BASELINE_EXCLUSIONS`]
    pub fn with_baseline<I, S>(extra: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set: Self = extra.into_iter().collect();
        set.0.extend(BASELINE_EXCLUSIONS.iter().map(|r| r.to_string()));
        set
    }

    pub fn contains(&self, rule: &str) -> bool {
        self.0.contains(rule)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for ExclusionSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// One violation as reported by the engine.
///
/// Kept as the engine's raw JSON so artifacts contain exactly what the
/// scanner produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViolationRecord(serde_json::Value);

impl ViolationRecord {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn into_value(self) -> serde_json::Value {
        self.0
    }
}

impl From<serde_json::Value> for ViolationRecord {
    fn from(value: serde_json::Value) -> Self {
        Self(value)
    }
}

/// What to scan for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub tags: Vec<ConformanceTag>,
    pub excluded: ExclusionSet,
}

impl ScanRequest {
    pub fn new(tags: impl Into<Vec<ConformanceTag>>, excluded: ExclusionSet) -> Self {
        Self {
            tags: tags.into(),
            excluded,
        }
    }
}

/// An accessibility engine bound to a page type.
///
/// Scanning is read-only: the page is borrowed shared. Failures propagate to
/// the caller as-is; implementations must not retry or return partial
/// results.
#[async_trait]
pub trait Scanner: Send + Sync {
    type Page: Page + ?Sized;

    async fn scan(
        &self,
        page: &Self::Page,
        request: &ScanRequest,
    ) -> AuditResult<Vec<ViolationRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(vec!["x"], &["duplicate-id", "heading-order", "x"] ; "single extra")]
    #[test_case(vec!["x", "x", "duplicate-id"], &["duplicate-id", "heading-order", "x"] ; "duplicates collapse")]
    #[test_case(vec![], &["duplicate-id", "heading-order"] ; "baseline only")]
    fn test_with_baseline(extra: Vec<&str>, expected: &[&str]) {
        let set = ExclusionSet::with_baseline(extra);
        assert_eq!(set.iter().collect::<Vec<_>>(), expected);
    }

    #[test]
    fn test_default_tags_serialize_as_engine_names() {
        let json = serde_json::to_string(&ConformanceTag::DEFAULT).unwrap();
        assert_eq!(
            json,
            r#"["wcag2a","wcag2aa","wcag21a","wcag21aa","section508","best-practice","experimental"]"#
        );
    }

    #[test]
    fn test_violation_record_is_transparent() {
        let raw = serde_json::json!({"id": "color-contrast", "impact": "serious", "nodes": []});
        let record = ViolationRecord::new(raw.clone());
        assert_eq!(serde_json::to_value(&record).unwrap(), raw);
    }
}
