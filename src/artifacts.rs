//! Artifact capture: screenshots and traces taken when a scenario ends, kept
//! under a per-run reports directory.
//!
//! Capture is strictly best-effort. A failed screenshot must never mask the
//! scenario outcome that triggered it, so every capture error is logged and
//! swallowed.

use std::path::{Path, PathBuf};

use crate::actions::common::timestamp_slug;
use crate::browser::BrowserDriver;
use crate::errors::DriverError;

/// What the runner observed about a finished scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    Passed,
    /// `worth_capturing` is false for startup-class failures that abort
    /// before the page renders anything useful.
    Failed { worth_capturing: bool },
}

pub struct ArtifactCapture {
    run_dir: PathBuf,
    always_capture: bool,
}

impl ArtifactCapture {
    pub fn new(output_root: &Path, run_id: &str, always_capture: bool) -> Self {
        Self {
            run_dir: output_root.join(run_id),
            always_capture,
        }
    }

    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// React to a scenario outcome: on a capture-worthy failure take a
    /// screenshot plus a trace when the driver supports one; on a pass only
    /// when always-capture is on. Returns the artifacts actually written.
    pub async fn observe(
        &self,
        driver: &dyn BrowserDriver,
        scenario: &str,
        observation: Observation,
    ) -> Vec<PathBuf> {
        let (screenshot, trace) = match observation {
            Observation::Failed {
                worth_capturing: true,
            } => (true, true),
            Observation::Failed {
                worth_capturing: false,
            } => (false, false),
            Observation::Passed => (self.always_capture, false),
        };

        let mut written = Vec::new();
        let stamp = timestamp_slug();

        if screenshot {
            let path = self.run_dir.join(format!("{scenario}_{stamp}.png"));
            match driver.screenshot(&path).await {
                Ok(()) => written.push(path),
                Err(e) => log::warn!("screenshot capture failed for '{scenario}': {e}"),
            }
        }
        if trace {
            let path = self.run_dir.join(format!("{scenario}_{stamp}.trace.zip"));
            match driver.save_trace(&path).await {
                Ok(()) => written.push(path),
                Err(DriverError::Unsupported(_)) => {
                    log::debug!("driver '{}' has no trace support", driver.name())
                }
                Err(e) => log::warn!("trace capture failed for '{scenario}': {e}"),
            }
        }
        written
    }
}
