//! Page capability consumed by scanners and journeys

use async_trait::async_trait;

use crate::error::AuditResult;

/// A live browser page.
///
/// Interaction methods take `&mut self`; anything that only observes the page
/// (querying, scanning) borrows it shared.
#[async_trait]
pub trait Page: Send + Sync {
    /// Load a URL
    async fn navigate(&mut self, url: &str) -> AuditResult<()>;

    /// Type text into an element, keystroke by keystroke
    async fn type_text(&mut self, selector: &str, text: &str) -> AuditResult<()>;

    /// Click an element
    async fn click(&mut self, selector: &str) -> AuditResult<()>;

    /// Wait until an element matching the selector is present
    async fn wait_for_selector(&mut self, selector: &str) -> AuditResult<()>;

    /// Whether an element matching the selector currently exists
    async fn query_selector(&self, selector: &str) -> AuditResult<bool>;

    /// URL the page is currently showing
    async fn current_url(&self) -> AuditResult<String>;
}
