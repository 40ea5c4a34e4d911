//! Cross-cutting helpers: page-load waits, ad-hoc screenshots, error banner
//! dismissal.

use std::path::{Path, PathBuf};

use chrono::Utc;

use super::ActionCtx;
use crate::browser::BrowserDriver;
use crate::errors::ActionError;
use crate::fixtures::FixtureSet;
use crate::selectors::{Page, SelectorRegistry};

/// Filesystem-safe UTC timestamp for artifact names.
pub(crate) fn timestamp_slug() -> String {
    Utc::now().format("%Y-%m-%dT%H-%M-%S%.3f").to_string()
}

fn sanitize_label(label: &str) -> String {
    label
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub struct CommonActions<'a> {
    ctx: ActionCtx<'a>,
    output_dir: PathBuf,
}

impl<'a> CommonActions<'a> {
    pub fn new(
        driver: &'a dyn BrowserDriver,
        selectors: &'a SelectorRegistry,
        fixtures: &'a FixtureSet,
        timeout_ms: u64,
        output_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            ctx: ActionCtx {
                driver,
                selectors,
                fixtures,
                timeout_ms,
            },
            output_dir: output_dir.into(),
        }
    }

    /// Wait until the document reports itself fully loaded.
    pub async fn wait_for_page_load(&self) -> Result<(), ActionError> {
        self.ctx.driver.wait_for_load(self.ctx.timeout_ms).await?;
        Ok(())
    }

    /// Capture a labelled screenshot into the run's output directory and
    /// return the written path.
    pub async fn take_screenshot(&self, label: &str) -> Result<PathBuf, ActionError> {
        let file = format!("{}_{}.png", sanitize_label(label), timestamp_slug());
        let path = self.output_dir.join(file);
        self.ctx.driver.screenshot(&path).await?;
        Ok(path)
    }

    /// Close a visible error banner, if any. Returns whether one was shown.
    pub async fn dismiss_error_banner(&self) -> Result<bool, ActionError> {
        let banner = self.ctx.selectors.resolve(Page::Login, "error_message")?;
        if !self.ctx.driver.is_visible(banner).await? {
            return Ok(false);
        }
        let close = self
            .ctx
            .selectors
            .resolve(Page::Login, "error_close_button")?;
        self.ctx.driver.click(close).await?;
        self.ctx
            .driver
            .wait_for_gone(banner, self.ctx.timeout_ms)
            .await?;
        Ok(true)
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
