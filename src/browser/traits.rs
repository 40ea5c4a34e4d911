use async_trait::async_trait;
use std::path::Path;

use crate::errors::DriverError;
use crate::selectors::Locator;

/// The opaque browser capability every action is written against.
///
/// Each operation suspends until the browser has rendered (or failed to
/// render) the requested state, and each carries its own failure mode; the
/// action layer maps these into the infrastructure error class. Waits take
/// explicit timeouts so nothing can hang a scenario past its budget.
#[async_trait]
pub trait BrowserDriver: Send + Sync {
    /// Backend name for logging ("chromium", "fake", ...).
    fn name(&self) -> &str;

    async fn goto(&self, url: &str) -> Result<(), DriverError>;

    async fn current_url(&self) -> Result<String, DriverError>;

    async fn click(&self, locator: &Locator) -> Result<(), DriverError>;

    /// Click the nth (0-based) element matching `locator`, in render order.
    async fn click_nth(&self, locator: &Locator, index: usize) -> Result<(), DriverError>;

    async fn fill(&self, locator: &Locator, text: &str) -> Result<(), DriverError>;

    /// Text content of the first matching element.
    async fn text_of(&self, locator: &Locator) -> Result<String, DriverError>;

    /// Text content of every matching element, in render order.
    async fn texts_of(&self, locator: &Locator) -> Result<Vec<String>, DriverError>;

    async fn is_visible(&self, locator: &Locator) -> Result<bool, DriverError>;

    /// Wait until the element is present, failing with `Timeout` otherwise.
    async fn wait_for(&self, locator: &Locator, timeout_ms: u64) -> Result<(), DriverError>;

    /// Wait until the element is absent, failing with `Timeout` otherwise.
    async fn wait_for_gone(&self, locator: &Locator, timeout_ms: u64) -> Result<(), DriverError>;

    /// Choose a `<select>` option by its visible label.
    async fn select_option(&self, locator: &Locator, label: &str) -> Result<(), DriverError>;

    /// Wait for the document to finish loading.
    async fn wait_for_load(&self, timeout_ms: u64) -> Result<(), DriverError>;

    async fn screenshot(&self, path: &Path) -> Result<(), DriverError>;

    /// Persist an execution trace, when the backend records one.
    async fn save_trace(&self, _path: &Path) -> Result<(), DriverError> {
        Err(DriverError::Unsupported("trace capture"))
    }

    async fn close(&self) -> Result<(), DriverError> {
        Ok(())
    }
}
