//! Playwright-backed implementation of the browser capability.

use async_trait::async_trait;
use playwright::api::{Browser, BrowserContext, Page, Viewport};
use playwright::Playwright;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::browser::traits::BrowserDriver;
use crate::errors::{ConfigError, DriverError};
use crate::selectors::Locator;

/// Target browser engine.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BrowserKind {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl BrowserKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BrowserKind::Chromium => "chromium",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Webkit => "webkit",
        }
    }
}

impl FromStr for BrowserKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chromium" => Ok(BrowserKind::Chromium),
            "firefox" => Ok(BrowserKind::Firefox),
            "webkit" => Ok(BrowserKind::Webkit),
            other => Err(ConfigError::InvalidOption(format!(
                "unknown browser '{other}' (expected chromium, firefox or webkit)"
            ))),
        }
    }
}

/// Web driver configuration.
#[derive(Debug, Clone)]
pub struct WebDriverConfig {
    pub browser: BrowserKind,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for WebDriverConfig {
    fn default() -> Self {
        Self {
            browser: BrowserKind::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
        }
    }
}

/// Browser capability implemented over Playwright.
pub struct WebDriver {
    #[allow(dead_code)]
    playwright: Arc<Playwright>,
    browser: Arc<Browser>,
    #[allow(dead_code)]
    context: Arc<BrowserContext>,
    page: Arc<Mutex<Page>>,
    kind: BrowserKind,
}

fn backend(e: impl std::fmt::Display) -> DriverError {
    DriverError::Backend(e.to_string())
}

impl WebDriver {
    pub async fn new(config: WebDriverConfig) -> Result<Self, DriverError> {
        let playwright = Playwright::initialize().await.map_err(backend)?;

        let browser = match config.browser {
            BrowserKind::Chromium => {
                let chromium = playwright.chromium();
                let mut launcher = chromium.launcher().headless(config.headless);
                // Allow a pre-installed browser binary, e.g. in CI images.
                let executable_path = std::env::var("PLAYWRIGHT_CHROMIUM_EXECUTABLE_PATH").ok();
                if let Some(path) = executable_path.as_deref() {
                    launcher = launcher.executable(Path::new(path));
                }
                launcher.launch().await.map_err(backend)?
            }
            BrowserKind::Firefox => playwright
                .firefox()
                .launcher()
                .headless(config.headless)
                .launch()
                .await
                .map_err(backend)?,
            BrowserKind::Webkit => playwright
                .webkit()
                .launcher()
                .headless(config.headless)
                .launch()
                .await
                .map_err(backend)?,
        };

        let context = browser.context_builder().build().await.map_err(backend)?;
        let page = context.new_page().await.map_err(backend)?;
        page.set_viewport_size(Viewport {
            width: config.viewport_width as i32,
            height: config.viewport_height as i32,
        })
        .await
        .map_err(backend)?;

        Ok(Self {
            playwright: Arc::new(playwright),
            browser: Arc::new(browser),
            context: Arc::new(context),
            page: Arc::new(Mutex::new(page)),
            kind: config.browser,
        })
    }
}

#[async_trait]
impl BrowserDriver for WebDriver {
    fn name(&self) -> &str {
        self.kind.as_str()
    }

    async fn goto(&self, url: &str) -> Result<(), DriverError> {
        let page = self.page.lock().await;
        page.goto_builder(url)
            .goto()
            .await
            .map_err(|e| DriverError::Navigation {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        let page = self.page.lock().await;
        let url: String = page
            .evaluate("() => window.location.href", ())
            .await
            .map_err(backend)?;
        Ok(url)
    }

    async fn click(&self, locator: &Locator) -> Result<(), DriverError> {
        let page = self.page.lock().await;
        page.click_builder(locator.as_str())
            .click()
            .await
            .map_err(|_| DriverError::ElementNotFound(locator.to_string()))?;
        Ok(())
    }

    async fn click_nth(&self, locator: &Locator, index: usize) -> Result<(), DriverError> {
        let page = self.page.lock().await;
        let elements = page
            .query_selector_all(locator.as_str())
            .await
            .map_err(backend)?;
        let element = elements
            .get(index)
            .ok_or_else(|| DriverError::ElementNotFound(format!("{locator} [{index}]")))?;
        element
            .click_builder()
            .click()
            .await
            .map_err(|_| DriverError::ElementNotFound(format!("{locator} [{index}]")))?;
        Ok(())
    }

    async fn fill(&self, locator: &Locator, text: &str) -> Result<(), DriverError> {
        let page = self.page.lock().await;
        let element = page
            .query_selector(locator.as_str())
            .await
            .map_err(backend)?
            .ok_or_else(|| DriverError::ElementNotFound(locator.to_string()))?;
        element.fill_builder(text).fill().await.map_err(backend)?;
        Ok(())
    }

    async fn text_of(&self, locator: &Locator) -> Result<String, DriverError> {
        let page = self.page.lock().await;
        let element = page
            .query_selector(locator.as_str())
            .await
            .map_err(backend)?
            .ok_or_else(|| DriverError::ElementNotFound(locator.to_string()))?;
        let text = element.inner_text().await.map_err(backend)?;
        Ok(text.trim().to_string())
    }

    async fn texts_of(&self, locator: &Locator) -> Result<Vec<String>, DriverError> {
        let page = self.page.lock().await;
        let elements = page
            .query_selector_all(locator.as_str())
            .await
            .map_err(backend)?;
        let mut texts = Vec::with_capacity(elements.len());
        for element in elements {
            let text = element.inner_text().await.map_err(backend)?;
            texts.push(text.trim().to_string());
        }
        Ok(texts)
    }

    async fn is_visible(&self, locator: &Locator) -> Result<bool, DriverError> {
        let page = self.page.lock().await;
        match page
            .query_selector(locator.as_str())
            .await
            .map_err(backend)?
        {
            Some(element) => element.is_visible().await.map_err(backend),
            None => Ok(false),
        }
    }

    async fn wait_for(&self, locator: &Locator, timeout_ms: u64) -> Result<(), DriverError> {
        let page = self.page.lock().await;
        page.wait_for_selector_builder(locator.as_str())
            .timeout(timeout_ms as f64)
            .wait_for_selector()
            .await
            .map_err(|_| DriverError::Timeout {
                locator: locator.to_string(),
                timeout_ms,
            })?;
        Ok(())
    }

    async fn wait_for_gone(&self, locator: &Locator, timeout_ms: u64) -> Result<(), DriverError> {
        let start = std::time::Instant::now();
        while start.elapsed().as_millis() < timeout_ms as u128 {
            if !self.is_visible(locator).await? {
                return Ok(());
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
        Err(DriverError::Timeout {
            locator: format!("absence of {locator}"),
            timeout_ms,
        })
    }

    async fn select_option(&self, locator: &Locator, label: &str) -> Result<(), DriverError> {
        let page = self.page.lock().await;
        let arg = serde_json::json!({ "sel": locator.as_str(), "label": label });
        let js = r#"({ sel, label }) => {
            const select = document.querySelector(sel);
            if (!select) return false;
            const option = Array.from(select.options)
                .find(o => o.textContent.trim() === label);
            if (!option) return false;
            select.value = option.value;
            select.dispatchEvent(new Event('change', { bubbles: true }));
            return true;
        }"#;
        let selected: bool = page.evaluate(js, arg).await.map_err(backend)?;
        if !selected {
            return Err(DriverError::ElementNotFound(format!(
                "{locator} option '{label}'"
            )));
        }
        Ok(())
    }

    async fn wait_for_load(&self, timeout_ms: u64) -> Result<(), DriverError> {
        let start = std::time::Instant::now();
        while start.elapsed().as_millis() < timeout_ms as u128 {
            let page = self.page.lock().await;
            let state: String = page
                .evaluate("() => document.readyState", ())
                .await
                .map_err(backend)?;
            drop(page);
            if state == "complete" {
                return Ok(());
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
        Err(DriverError::Timeout {
            locator: "document load".to_string(),
            timeout_ms,
        })
    }

    async fn screenshot(&self, path: &Path) -> Result<(), DriverError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let page = self.page.lock().await;
        page.screenshot_builder()
            .path(path.to_path_buf())
            .screenshot()
            .await
            .map_err(backend)?;
        Ok(())
    }

    async fn close(&self) -> Result<(), DriverError> {
        self.browser.close().await.map_err(backend)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn browser_kind_parses_recognized_options() {
        assert_eq!(BrowserKind::from_str("chromium").unwrap(), BrowserKind::Chromium);
        assert_eq!(BrowserKind::from_str("Firefox").unwrap(), BrowserKind::Firefox);
        assert_eq!(BrowserKind::from_str("webkit").unwrap(), BrowserKind::Webkit);
        assert!(BrowserKind::from_str("ie6").is_err());
    }
}
