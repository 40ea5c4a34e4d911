use super::state::RunSummary;
use tokio::sync::broadcast;

/// Run execution events for real-time updates
#[derive(Debug, Clone)]
pub enum TestEvent {
    RunStarted {
        run_id: String,
        scenario_count: usize,
    },
    RunFinished {
        summary: RunSummary,
    },

    ScenarioStarted {
        name: String,
        index: usize,
        total: usize,
    },
    ScenarioPassed {
        name: String,
        duration_ms: u64,
        retried: bool,
    },
    ScenarioFailed {
        name: String,
        error: String,
        duration_ms: u64,
    },
    ScenarioRetrying {
        name: String,
        attempt: u32,
        error: String,
    },
    ScenarioSkipped {
        name: String,
        reason: String,
    },

    ArtifactWritten {
        scenario: String,
        path: String,
    },
}

/// Event emitter for broadcasting run events
pub struct EventEmitter {
    sender: broadcast::Sender<TestEvent>,
}

impl EventEmitter {
    pub fn new() -> (Self, broadcast::Receiver<TestEvent>) {
        let (sender, receiver) = broadcast::channel(100);
        (Self { sender }, receiver)
    }

    pub fn emit(&self, event: TestEvent) {
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TestEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventEmitter {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }
}

/// Console event listener for printing real-time updates
pub struct ConsoleEventListener;

impl ConsoleEventListener {
    pub async fn listen(mut receiver: broadcast::Receiver<TestEvent>) {
        use colored::Colorize;

        while let Ok(event) = receiver.recv().await {
            match event {
                TestEvent::RunStarted {
                    run_id,
                    scenario_count,
                } => {
                    println!(
                        "\n{} Run started: {} ({} scenarios)",
                        "▶".green().bold(),
                        run_id.cyan(),
                        scenario_count
                    );
                }

                TestEvent::RunFinished { summary } => {
                    println!("\n{} Run finished", "■".blue().bold());
                    println!(
                        "  {} passed, {} failed, {} skipped",
                        summary.passed.to_string().green(),
                        summary.failed.to_string().red(),
                        summary.skipped.to_string().yellow()
                    );
                    if let Some(duration) = summary.total_duration_ms {
                        println!("  Duration: {}ms", duration);
                    }
                }

                TestEvent::ScenarioStarted { name, index, total } => {
                    println!(
                        "\n  {} [{}/{}] {}",
                        "→".blue(),
                        index + 1,
                        total,
                        name.white().bold()
                    );
                }

                TestEvent::ScenarioPassed {
                    name,
                    duration_ms,
                    retried,
                } => {
                    let note = if retried { " (after retry)" } else { "" };
                    println!(
                        "    {} {} ({}ms){}",
                        "✓".green(),
                        name,
                        duration_ms,
                        note.dimmed()
                    );
                }

                TestEvent::ScenarioFailed {
                    name,
                    error,
                    duration_ms,
                } => {
                    println!("    {} {} ({}ms)", "✗".red(), name, duration_ms);
                    println!("      {}", error.red());
                }

                TestEvent::ScenarioRetrying {
                    name,
                    attempt,
                    error,
                } => {
                    println!(
                        "    {} {} attempt {} after: {}",
                        "↻".yellow(),
                        name,
                        attempt,
                        error.dimmed()
                    );
                }

                TestEvent::ScenarioSkipped { name, reason } => {
                    println!("    {} {} ({})", "○".yellow(), name, reason.dimmed());
                }

                TestEvent::ArtifactWritten { scenario, path } => {
                    println!("      {} {} -> {}", "◆".magenta(), scenario.dimmed(), path);
                }
            }
        }
    }
}
