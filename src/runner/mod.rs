//! Sequential scenario execution for one group: a shared driver, one retry
//! for retryable failures, artifact capture, and a run summary on disk.

pub mod events;
pub mod state;

pub use events::{ConsoleEventListener, EventEmitter, TestEvent};
pub use state::{RunReport, RunState, RunSummary, ScenarioReport, ScenarioState, ScenarioStatus};

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::sync::broadcast;

use crate::artifacts::{ArtifactCapture, Observation};
use crate::browser::{BrowserDriver, BrowserKind};
use crate::errors::{DriverError, SessionError};
use crate::fixtures::FixtureSet;
use crate::selectors::SelectorRegistry;
use crate::session::Session;

pub type ScenarioFuture<'a> =
    Pin<Box<dyn Future<Output = Result<(), SessionError>> + Send + 'a>>;

/// A scenario body. Plain function pointers keep the catalog a static table.
pub type ScenarioFn = for<'a> fn(&'a mut Session) -> ScenarioFuture<'a>;

#[derive(Clone, Copy)]
pub struct Scenario {
    pub name: &'static str,
    pub tags: &'static [&'static str],
    pub run: ScenarioFn,
}

impl Scenario {
    /// An empty filter selects everything; otherwise any tag overlap counts.
    pub fn matches(&self, filter: &[String]) -> bool {
        filter.is_empty() || filter.iter().any(|t| self.tags.contains(&t.as_str()))
    }
}

#[derive(Debug, Clone)]
pub struct RunConfig {
    pub browser: BrowserKind,
    pub headless: bool,
    /// Per-wait budget for each browser interaction.
    pub timeout_ms: u64,
    /// Overall budget for one scenario attempt.
    pub scenario_timeout_ms: u64,
    /// Additional attempts granted to retryable failures.
    pub retries: u32,
    pub output_dir: PathBuf,
    pub always_capture: bool,
    pub tags: Vec<String>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            browser: BrowserKind::Chromium,
            headless: true,
            timeout_ms: 10_000,
            scenario_timeout_ms: 90_000,
            retries: 1,
            output_dir: PathBuf::from("reports"),
            always_capture: false,
            tags: Vec::new(),
        }
    }
}

pub struct Runner {
    config: RunConfig,
    selectors: Arc<SelectorRegistry>,
    fixtures: Arc<FixtureSet>,
    emitter: EventEmitter,
}

impl Runner {
    pub fn new(
        config: RunConfig,
        selectors: Arc<SelectorRegistry>,
        fixtures: Arc<FixtureSet>,
    ) -> (Self, broadcast::Receiver<TestEvent>) {
        let (emitter, receiver) = EventEmitter::new();
        (
            Self {
                config,
                selectors,
                fixtures,
                emitter,
            },
            receiver,
        )
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TestEvent> {
        self.emitter.subscribe()
    }

    /// Execute the tag-selected scenarios sequentially over one driver.
    /// The group is always torn down, also when interrupted with Ctrl-C.
    pub async fn run(
        &self,
        driver: Arc<dyn BrowserDriver>,
        scenarios: &[Scenario],
    ) -> anyhow::Result<RunSummary> {
        let selected: Vec<&Scenario> = scenarios
            .iter()
            .filter(|s| s.matches(&self.config.tags))
            .collect();

        let run_id = format!("run-{}", uuid::Uuid::new_v4());
        let artifacts = ArtifactCapture::new(
            &self.config.output_dir,
            &run_id,
            self.config.always_capture,
        );
        std::fs::create_dir_all(artifacts.run_dir())
            .with_context(|| format!("creating report directory {:?}", artifacts.run_dir()))?;

        let mut run_state = RunState::new(&run_id);
        for scenario in &selected {
            run_state.add_scenario(ScenarioState::new(scenario.name, scenario.tags));
        }
        run_state.start();
        self.emitter.emit(TestEvent::RunStarted {
            run_id: run_id.clone(),
            scenario_count: selected.len(),
        });

        let mut session = Session::begin_group(
            driver.clone(),
            self.selectors.clone(),
            self.fixtures.clone(),
            self.config.timeout_ms,
            artifacts.run_dir(),
        )
        .await
        .map_err(|e| anyhow::anyhow!("opening scenario group: {e}"))?;

        let total = selected.len();
        let mut interrupted = false;

        'scenarios: for (index, scenario) in selected.iter().enumerate() {
            let scenario_state = &mut run_state.scenarios[index];
            scenario_state.start();
            self.emitter.emit(TestEvent::ScenarioStarted {
                name: scenario.name.to_string(),
                index,
                total,
            });

            let mut attempt = 0u32;
            loop {
                let budget = Duration::from_millis(self.config.scenario_timeout_ms);
                let outcome = tokio::select! {
                    res = tokio::time::timeout(budget, (scenario.run)(&mut session)) => {
                        res.unwrap_or_else(|_| {
                            Err(SessionError::Action(
                                DriverError::Timeout {
                                    locator: "scenario budget".to_string(),
                                    timeout_ms: self.config.scenario_timeout_ms,
                                }
                                .into(),
                            ))
                        })
                    }
                    _ = tokio::signal::ctrl_c() => {
                        log::warn!("interrupted, tearing the group down");
                        scenario_state.skip("interrupted".to_string());
                        self.emitter.emit(TestEvent::ScenarioSkipped {
                            name: scenario.name.to_string(),
                            reason: "interrupted".to_string(),
                        });
                        interrupted = true;
                        break 'scenarios;
                    }
                };

                match outcome {
                    Ok(()) => {
                        scenario_state.pass();
                        let written = artifacts
                            .observe(driver.as_ref(), scenario.name, Observation::Passed)
                            .await;
                        for path in written {
                            let path = path.display().to_string();
                            scenario_state.artifacts.push(path.clone());
                            self.emitter.emit(TestEvent::ArtifactWritten {
                                scenario: scenario.name.to_string(),
                                path,
                            });
                        }
                        self.emitter.emit(TestEvent::ScenarioPassed {
                            name: scenario.name.to_string(),
                            duration_ms: scenario_state.duration_ms.unwrap_or(0),
                            retried: attempt > 0,
                        });
                        break;
                    }
                    Err(e) => {
                        session.mark_failed();
                        let written = artifacts
                            .observe(
                                driver.as_ref(),
                                scenario.name,
                                Observation::Failed {
                                    worth_capturing: e.captures_artifacts(),
                                },
                            )
                            .await;
                        for path in written {
                            let path = path.display().to_string();
                            scenario_state.artifacts.push(path.clone());
                            self.emitter.emit(TestEvent::ArtifactWritten {
                                scenario: scenario.name.to_string(),
                                path,
                            });
                        }

                        if attempt < self.config.retries && e.is_retryable() {
                            attempt += 1;
                            scenario_state.retry(attempt);
                            self.emitter.emit(TestEvent::ScenarioRetrying {
                                name: scenario.name.to_string(),
                                attempt,
                                error: e.to_string(),
                            });
                            recover(&mut session).await;
                            continue;
                        }

                        scenario_state.fail(e.to_string());
                        self.emitter.emit(TestEvent::ScenarioFailed {
                            name: scenario.name.to_string(),
                            error: e.to_string(),
                            duration_ms: scenario_state.duration_ms.unwrap_or(0),
                        });
                        break;
                    }
                }
            }

            // Next scenario starts from a clean page either way.
            recover(&mut session).await;
        }

        if interrupted {
            for scenario_state in &mut run_state.scenarios {
                if matches!(scenario_state.status, ScenarioStatus::Pending) {
                    scenario_state.skip("interrupted".to_string());
                    self.emitter.emit(TestEvent::ScenarioSkipped {
                        name: scenario_state.name.clone(),
                        reason: "interrupted".to_string(),
                    });
                }
            }
        }

        session.end_group().await;
        run_state.finish();

        let report_path = artifacts.run_dir().join("summary.json");
        let json = serde_json::to_string_pretty(&run_state.to_report())
            .context("serializing run report")?;
        std::fs::write(&report_path, json)
            .with_context(|| format!("writing run report {report_path:?}"))?;

        let summary = run_state.summary();
        self.emitter.emit(TestEvent::RunFinished {
            summary: summary.clone(),
        });
        Ok(summary)
    }
}

/// Bring the session back to a clean state between attempts and scenarios:
/// selective reset when authenticated, otherwise a fresh group page.
async fn recover(session: &mut Session) {
    match session.reset_between_scenarios().await {
        Ok(()) => {}
        Err(SessionError::ResetPrecondition) => {
            if let Err(e) = session.restart_group().await {
                log::warn!("group restart failed: {e}");
            }
        }
        Err(e) => {
            log::warn!("selective reset failed ({e}), restarting the group");
            if let Err(e) = session.restart_group().await {
                log::warn!("group restart failed: {e}");
            }
        }
    }
}
