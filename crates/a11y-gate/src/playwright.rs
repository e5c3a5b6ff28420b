//! Playwright browser automation and the axe scanner
//!
//! A [`PlaywrightPage`] records the actions taken on it. Each time the page
//! has to be observed (query, current URL, accessibility scan) a Node.js
//! script is generated that launches a fresh browser, replays every recorded
//! action, runs the probe and prints its result on a sentinel line.
//! Interactions are replayed immediately as well, so a bad selector fails the
//! step that introduced it.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::{Command, Stdio};
use tokio::process::Command as TokioCommand;
use tracing::{debug, info};

use crate::error::{AuditError, AuditResult};
use crate::page::Page;
use crate::scanner::{ScanRequest, Scanner, ViolationRecord};

const RESULT_SENTINEL: &str = "__A11Y_GATE_RESULT__";

static RESULT_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?m)^{} (.*)$", RESULT_SENTINEL)).expect("static regex")
});

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

impl std::str::FromStr for Browser {
    type Err = AuditError;

    fn from_str(s: &str) -> AuditResult<Self> {
        match s {
            "chromium" => Ok(Browser::Chromium),
            "firefox" => Ok(Browser::Firefox),
            "webkit" => Ok(Browser::Webkit),
            other => Err(AuditError::DriverUnavailable(format!(
                "unknown browser '{}'",
                other
            ))),
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,

    /// Node.js executable
    pub node_binary: PathBuf,

    /// Directory whose `node_modules` provides `playwright` and
    /// `@axe-core/playwright`
    pub project_dir: PathBuf,

    /// Default timeout for Playwright waits and actions
    pub timeout_ms: u64,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            node_binary: PathBuf::from("node"),
            project_dir: PathBuf::from("."),
            timeout_ms: 30_000,
        }
    }
}

/// An interaction recorded on a [`PlaywrightPage`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PageAction {
    Navigate { url: String },
    Type { selector: String, text: String },
    Click { selector: String },
    Wait { selector: String },
}

impl PageAction {
    fn label(&self) -> String {
        match self {
            PageAction::Navigate { url } => format!("navigate:{}", url),
            PageAction::Type { selector, .. } => format!("type:{}", selector),
            PageAction::Click { selector } => format!("click:{}", selector),
            PageAction::Wait { selector } => format!("wait:{}", selector),
        }
    }

    fn to_js(&self) -> String {
        match self {
            PageAction::Navigate { url } => format!("    await page.goto({});", js_str(url)),
            PageAction::Type { selector, text } => {
                format!("    await page.type({}, {});", js_str(selector), js_str(text))
            }
            PageAction::Click { selector } => format!("    await page.click({});", js_str(selector)),
            PageAction::Wait { selector } => {
                format!("    await page.waitForSelector({});", js_str(selector))
            }
        }
    }
}

/// What a generated script reports back once the actions are replayed
#[derive(Debug, Clone)]
pub enum Probe<'a> {
    /// Replay only
    Replay,
    QuerySelector(&'a str),
    CurrentUrl,
    Axe(&'a ScanRequest),
}

impl Probe<'_> {
    fn to_js(&self) -> String {
        match self {
            Probe::Replay => "    const result = true;".to_string(),
            Probe::QuerySelector(selector) => {
                format!("    const result = (await page.$({})) !== null;", js_str(selector))
            }
            Probe::CurrentUrl => "    const result = page.url();".to_string(),
            Probe::Axe(request) => {
                let tags: Vec<&str> = request.tags.iter().map(|t| t.as_str()).collect();
                let excluded: Vec<&str> = request.excluded.iter().collect();
                format!(
                    r#"    const axe = load('@axe-core/playwright');
    const AxeBuilder = axe.default || axe.AxeBuilder || axe;
    const results = await new AxeBuilder({{ page }})
      .withTags({tags})
      .disableRules({excluded})
      .analyze();
    const result = results.violations;"#,
                    tags = js_json(&tags),
                    excluded = js_json(&excluded),
                )
            }
        }
    }
}

fn js_str(s: &str) -> String {
    js_json(&s)
}

fn js_json<T: Serialize + ?Sized>(value: &T) -> String {
    // JSON serialization of strings and arrays of strings cannot fail
    serde_json::to_string(value).unwrap_or_else(|_| "null".to_string())
}

/// Build the Node script that replays `actions` and then runs `probe`
pub fn build_script(config: &PlaywrightConfig, actions: &[PageAction], probe: &Probe<'_>) -> String {
    let mut script = format!(
        r#"
const load = (name) => require(require.resolve(name, {{ paths: [process.cwd()] }}));
const playwright = load('playwright');

(async () => {{
  const browser = await playwright['{browser}'].launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}
  }});
  const page = await context.newPage();
  page.setDefaultTimeout({timeout});

  try {{
"#,
        browser = config.browser.as_str(),
        headless = config.headless,
        width = config.viewport_width,
        height = config.viewport_height,
        timeout = config.timeout_ms,
    );

    for (i, action) in actions.iter().enumerate() {
        script.push_str(&format!("\n    // Step {}: {}\n", i + 1, action.label()));
        script.push_str(&action.to_js());
        script.push('\n');
    }

    script.push_str("\n    // Probe\n");
    script.push_str(&probe.to_js());
    script.push_str(&format!(
        r#"
    console.log('{sentinel} ' + JSON.stringify(result));
  }} catch (error) {{
    console.error(JSON.stringify({{ success: false, error: error.message, stack: error.stack }}));
    process.exitCode = 1;
  }} finally {{
    await browser.close();
  }}
}})();
"#,
        sentinel = RESULT_SENTINEL,
    ));

    script
}

/// Pull the probe result out of a script's stdout
pub fn extract_result(stdout: &str) -> AuditResult<serde_json::Value> {
    let line = RESULT_LINE
        .captures_iter(stdout)
        .last()
        .and_then(|c| c.get(1))
        .ok_or_else(|| AuditError::Playwright("script produced no result line".to_string()))?;
    Ok(serde_json::from_str(line.as_str())?)
}

/// Page handle backed by replayed Playwright scripts
pub struct PlaywrightPage {
    config: PlaywrightConfig,
    actions: Vec<PageAction>,
}

impl PlaywrightPage {
    /// Create a page after checking that Node can load the driver modules
    pub fn new(config: PlaywrightConfig) -> AuditResult<Self> {
        Self::check_driver_installed(&config)?;
        Ok(Self {
            config,
            actions: Vec::new(),
        })
    }

    pub fn config(&self) -> &PlaywrightConfig {
        &self.config
    }

    /// Actions recorded so far
    pub fn actions(&self) -> &[PageAction] {
        &self.actions
    }

    fn check_driver_installed(config: &PlaywrightConfig) -> AuditResult<()> {
        let probe = "const p = [process.cwd()]; \
                     require.resolve('playwright', { paths: p }); \
                     require.resolve('@axe-core/playwright', { paths: p });";
        let status = Command::new(&config.node_binary)
            .args(["-e", probe])
            .current_dir(&config.project_dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match status {
            Ok(status) if status.success() => Ok(()),
            Ok(_) => Err(AuditError::DriverUnavailable(format!(
                "playwright and @axe-core/playwright must be installed under {}. \
                 Install with: npm install playwright @axe-core/playwright && npx playwright install",
                config.project_dir.display()
            ))),
            Err(e) => Err(AuditError::DriverUnavailable(format!(
                "cannot run {}: {}",
                config.node_binary.display(),
                e
            ))),
        }
    }

    /// Replay the recorded actions, run `probe`, and return its result
    pub async fn run_probe(&self, probe: &Probe<'_>) -> AuditResult<serde_json::Value> {
        let script = build_script(&self.config, &self.actions, probe);
        let stdout = self.run_script(&script).await?;
        extract_result(&stdout)
    }

    async fn run_script(&self, script: &str) -> AuditResult<String> {
        let temp_dir = tempfile::tempdir()?;
        let script_path = temp_dir.path().join("a11y-gate.js");
        tokio::fs::write(&script_path, script).await?;

        debug!("Running Playwright script: {}", script_path.display());

        let output = TokioCommand::new(&self.config.node_binary)
            .arg(&script_path)
            .current_dir(&self.config.project_dir)
            .output()
            .await
            .map_err(|e| {
                AuditError::DriverUnavailable(format!(
                    "cannot run {}: {}",
                    self.config.node_binary.display(),
                    e
                ))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AuditError::Playwright(format!(
                "Script failed:\nstdout: {}\nstderr: {}",
                stdout, stderr
            )));
        }

        Ok(stdout)
    }

    /// Record an action and replay the journey so far; the action is dropped
    /// again if the replay fails.
    async fn perform(&mut self, action: PageAction) -> AuditResult<()> {
        debug!("Performing {}", action.label());
        self.actions.push(action);
        if let Err(e) = self.run_probe(&Probe::Replay).await {
            self.actions.pop();
            return Err(e);
        }
        Ok(())
    }
}

#[async_trait]
impl Page for PlaywrightPage {
    async fn navigate(&mut self, url: &str) -> AuditResult<()> {
        self.perform(PageAction::Navigate { url: url.to_string() }).await
    }

    async fn type_text(&mut self, selector: &str, text: &str) -> AuditResult<()> {
        self.perform(PageAction::Type {
            selector: selector.to_string(),
            text: text.to_string(),
        })
        .await
    }

    async fn click(&mut self, selector: &str) -> AuditResult<()> {
        self.perform(PageAction::Click { selector: selector.to_string() }).await
    }

    async fn wait_for_selector(&mut self, selector: &str) -> AuditResult<()> {
        self.perform(PageAction::Wait { selector: selector.to_string() }).await
    }

    async fn query_selector(&self, selector: &str) -> AuditResult<bool> {
        match self.run_probe(&Probe::QuerySelector(selector)).await? {
            serde_json::Value::Bool(found) => Ok(found),
            other => Err(AuditError::Playwright(format!(
                "querySelector returned {}",
                other
            ))),
        }
    }

    async fn current_url(&self) -> AuditResult<String> {
        match self.run_probe(&Probe::CurrentUrl).await? {
            serde_json::Value::String(url) => Ok(url),
            other => Err(AuditError::Playwright(format!("page.url() returned {}", other))),
        }
    }
}

/// Runs axe-core against a [`PlaywrightPage`] through `@axe-core/playwright`
#[derive(Debug, Clone, Default)]
pub struct AxeScanner;

impl AxeScanner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Scanner for AxeScanner {
    type Page = PlaywrightPage;

    async fn scan(
        &self,
        page: &PlaywrightPage,
        request: &ScanRequest,
    ) -> AuditResult<Vec<ViolationRecord>> {
        let value = page
            .run_probe(&Probe::Axe(request))
            .await
            .map_err(|e| AuditError::Scan(e.to_string()))?;

        let violations: Vec<ViolationRecord> = serde_json::from_value(value)
            .map_err(|e| AuditError::Scan(format!("unexpected axe output: {}", e)))?;

        info!("axe reported {} violation(s)", violations.len());
        Ok(violations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{ConformanceTag, ExclusionSet};

    fn journey() -> Vec<PageAction> {
        vec![
            PageAction::Navigate { url: "https://www.healthcare.gov/see-plans".into() },
            PageAction::Type { selector: ".ds-c-field".into(), text: "60647".into() },
            PageAction::Wait { selector: ".ds-c-autocomplete__list-item".into() },
        ]
    }

    #[test]
    fn test_script_replays_actions_in_order() {
        let script = build_script(&PlaywrightConfig::default(), &journey(), &Probe::Replay);

        let goto = script.find("page.goto(\"https://www.healthcare.gov/see-plans\")").unwrap();
        let typed = script.find("page.type(\".ds-c-field\", \"60647\")").unwrap();
        let wait = script.find("page.waitForSelector(\".ds-c-autocomplete__list-item\")").unwrap();
        assert!(goto < typed && typed < wait);
        assert!(script.contains("playwright['chromium'].launch({ headless: true })"));
        assert!(script.contains("page.setDefaultTimeout(30000)"));
    }

    #[test]
    fn test_axe_probe_passes_tags_and_exclusions() {
        let request = ScanRequest::new(
            vec![ConformanceTag::Wcag2A, ConformanceTag::BestPractice],
            ExclusionSet::with_baseline(["region"]),
        );
        let script = build_script(&PlaywrightConfig::default(), &journey(), &Probe::Axe(&request));

        assert!(script.contains(r#".withTags(["wcag2a","best-practice"])"#));
        assert!(script.contains(r#".disableRules(["duplicate-id","heading-order","region"])"#));
        assert!(script.contains("load('@axe-core/playwright')"));
    }

    #[test]
    fn test_selectors_are_escaped() {
        let actions = vec![PageAction::Click { selector: "button[aria-label='it\"s']".into() }];
        let script = build_script(&PlaywrightConfig::default(), &actions, &Probe::Replay);
        assert!(script.contains(r#"page.click("button[aria-label='it\"s']")"#));
    }

    #[test]
    fn test_extract_result_takes_sentinel_line() {
        let stdout = "noise\n__A11Y_GATE_RESULT__ [{\"id\":\"color-contrast\"}]\n";
        let value = extract_result(stdout).unwrap();
        assert_eq!(value, serde_json::json!([{"id": "color-contrast"}]));
    }

    #[test]
    fn test_extract_result_requires_sentinel() {
        assert!(matches!(
            extract_result("{\"success\":true}\n"),
            Err(AuditError::Playwright(_))
        ));
    }

    #[test]
    fn test_browser_from_str() {
        assert_eq!("webkit".parse::<Browser>().unwrap(), Browser::Webkit);
        assert!("netscape".parse::<Browser>().is_err());
    }
}
