use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Scenario execution status
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ScenarioStatus {
    Pending,
    Running,
    Passed,
    Failed { error: String },
    Skipped { reason: String },
    Retrying { attempt: u32 },
}

impl ScenarioStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ScenarioStatus::Passed
                | ScenarioStatus::Failed { .. }
                | ScenarioStatus::Skipped { .. }
        )
    }
}

/// State for a single scenario execution
#[derive(Debug, Clone)]
pub struct ScenarioState {
    pub name: String,
    pub tags: Vec<String>,
    pub status: ScenarioStatus,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
    pub duration_ms: Option<u64>,
    pub retry_count: u32,
    pub artifacts: Vec<String>,
}

impl ScenarioState {
    pub fn new(name: &str, tags: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            status: ScenarioStatus::Pending,
            started_at: None,
            finished_at: None,
            duration_ms: None,
            retry_count: 0,
            artifacts: Vec::new(),
        }
    }

    pub fn start(&mut self) {
        self.status = ScenarioStatus::Running;
        self.started_at = Some(Instant::now());
    }

    pub fn pass(&mut self) {
        self.finish(ScenarioStatus::Passed);
    }

    pub fn fail(&mut self, error: String) {
        self.finish(ScenarioStatus::Failed { error });
    }

    pub fn skip(&mut self, reason: String) {
        self.status = ScenarioStatus::Skipped { reason };
    }

    pub fn retry(&mut self, attempt: u32) {
        self.status = ScenarioStatus::Retrying { attempt };
        self.retry_count = attempt;
    }

    fn finish(&mut self, status: ScenarioStatus) {
        self.status = status;
        self.finished_at = Some(Instant::now());
        if let Some(start) = self.started_at {
            self.duration_ms = Some(start.elapsed().as_millis() as u64);
        }
    }

    /// Serialize state for reporting (without Instant which isn't serializable)
    pub fn to_report(&self) -> ScenarioReport {
        ScenarioReport {
            name: self.name.clone(),
            tags: self.tags.clone(),
            status: self.status.clone(),
            duration_ms: self.duration_ms,
            retry_count: self.retry_count,
            artifacts: self.artifacts.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    pub name: String,
    pub tags: Vec<String>,
    pub status: ScenarioStatus,
    pub duration_ms: Option<u64>,
    pub retry_count: u32,
    pub artifacts: Vec<String>,
}

/// Global state for one run
#[derive(Debug, Clone)]
pub struct RunState {
    pub run_id: String,
    pub scenarios: Vec<ScenarioState>,
    pub started_at: Option<Instant>,
    pub finished_at: Option<Instant>,
}

impl RunState {
    pub fn new(run_id: &str) -> Self {
        Self {
            run_id: run_id.to_string(),
            scenarios: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    pub fn add_scenario(&mut self, scenario: ScenarioState) {
        self.scenarios.push(scenario);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Instant::now());
    }

    pub fn summary(&self) -> RunSummary {
        let mut passed = 0;
        let mut failed = 0;
        let mut skipped = 0;
        for scenario in &self.scenarios {
            match scenario.status {
                ScenarioStatus::Passed => passed += 1,
                ScenarioStatus::Failed { .. } => failed += 1,
                ScenarioStatus::Skipped { .. } => skipped += 1,
                _ => {}
            }
        }

        let total_duration_ms = self.started_at.map(|start| {
            self.finished_at
                .unwrap_or_else(Instant::now)
                .duration_since(start)
                .as_millis() as u64
        });

        RunSummary {
            run_id: self.run_id.clone(),
            total: self.scenarios.len() as u32,
            passed,
            failed,
            skipped,
            total_duration_ms,
        }
    }

    /// Serialize state for reporting
    pub fn to_report(&self) -> RunReport {
        RunReport {
            run_id: self.run_id.clone(),
            scenarios: self.scenarios.iter().map(|s| s.to_report()).collect(),
            summary: self.summary(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_id: String,
    pub total: u32,
    pub passed: u32,
    pub failed: u32,
    pub skipped: u32,
    pub total_duration_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    pub run_id: String,
    pub scenarios: Vec<ScenarioReport>,
    pub summary: RunSummary,
}
