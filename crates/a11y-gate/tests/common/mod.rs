//! In-memory page and scanner shared by the integration tests

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use a11y_gate::{AuditError, AuditResult, Page, ScanRequest, Scanner, ViolationRecord};
use async_trait::async_trait;
use serde_json::json;

/// A page whose DOM is a set of selectors; clicking a link selector moves to
/// another URL.
#[derive(Debug, Default)]
pub struct FakePage {
    url: String,
    elements: HashMap<String, HashSet<String>>,
    links: HashMap<String, String>,
    typed: Vec<(String, String)>,
}

impl FakePage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selectors present while `url` is showing
    pub fn with_elements(mut self, url: &str, selectors: &[&str]) -> Self {
        self.elements
            .entry(url.to_string())
            .or_default()
            .extend(selectors.iter().map(|s| s.to_string()));
        self
    }

    /// Clicking `selector` navigates to `target`
    pub fn with_link(mut self, selector: &str, target: &str) -> Self {
        self.links.insert(selector.to_string(), target.to_string());
        self
    }

    pub fn at(mut self, url: &str) -> Self {
        self.url = url.to_string();
        self
    }

    pub fn typed(&self) -> &[(String, String)] {
        &self.typed
    }

    fn has(&self, selector: &str) -> bool {
        self.elements
            .get(&self.url)
            .map_or(false, |set| set.contains(selector))
    }

    fn require(&self, selector: &str) -> AuditResult<()> {
        if self.has(selector) {
            Ok(())
        } else {
            Err(AuditError::Playwright(format!(
                "Timeout waiting for selector {}",
                selector
            )))
        }
    }
}

#[async_trait]
impl Page for FakePage {
    async fn navigate(&mut self, url: &str) -> AuditResult<()> {
        self.url = url.to_string();
        Ok(())
    }

    async fn type_text(&mut self, selector: &str, text: &str) -> AuditResult<()> {
        self.require(selector)?;
        self.typed.push((selector.to_string(), text.to_string()));
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> AuditResult<()> {
        self.require(selector)?;
        if let Some(target) = self.links.get(selector) {
            self.url = target.clone();
        }
        Ok(())
    }

    async fn wait_for_selector(&mut self, selector: &str) -> AuditResult<()> {
        self.require(selector)
    }

    async fn query_selector(&self, selector: &str) -> AuditResult<bool> {
        Ok(self.has(selector))
    }

    async fn current_url(&self) -> AuditResult<String> {
        Ok(self.url.clone())
    }
}

/// Scanner that answers from a table keyed by the page URL and records every
/// request it receives.
#[derive(Default)]
pub struct FakeScanner {
    findings: HashMap<String, Vec<ViolationRecord>>,
    broken: HashSet<String>,
    requests: Mutex<Vec<ScanRequest>>,
}

impl FakeScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Violations reported while `url` is showing
    pub fn with_findings(mut self, url: &str, rules: &[&str]) -> Self {
        self.findings
            .insert(url.to_string(), rules.iter().map(|r| violation(r)).collect());
        self
    }

    /// Scanning `url` fails as if the engine could not be injected
    pub fn broken_at(mut self, url: &str) -> Self {
        self.broken.insert(url.to_string());
        self
    }

    pub fn requests(&self) -> Vec<ScanRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Scanner for FakeScanner {
    type Page = FakePage;

    async fn scan(
        &self,
        page: &FakePage,
        request: &ScanRequest,
    ) -> AuditResult<Vec<ViolationRecord>> {
        self.requests.lock().unwrap().push(request.clone());

        let url = page.current_url().await?;
        if self.broken.contains(&url) {
            return Err(AuditError::Scan(format!("axe injection failed on {}", url)));
        }

        Ok(self
            .findings
            .get(&url)
            .map(|violations| {
                violations
                    .iter()
                    .filter(|v| !request.excluded.contains(rule_of(v)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub fn violation(rule: &str) -> ViolationRecord {
    ViolationRecord::new(json!({
        "id": rule,
        "impact": "serious",
        "description": format!("{} check failed", rule),
        "help": format!("Fix {}", rule),
        "nodes": [{"target": [".ds-c-button"], "html": "<button class=\"ds-c-button\"></button>"}],
    }))
}

fn rule_of(v: &ViolationRecord) -> &str {
    v.as_value()["id"].as_str().unwrap_or_default()
}
