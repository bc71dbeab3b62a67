//! Scenario and suite reports

use crate::config::Environment;
use crate::error::{Result, SuiteError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Outcome of a scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScenarioStatus {
    Passed,
    Failed,
}

/// Result of running one scenario
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioReport {
    /// Scenario name (lowercase-hyphenated)
    pub name: String,

    pub status: ScenarioStatus,

    pub started_at: DateTime<Utc>,

    pub duration: Duration,

    /// Number of expectations evaluated
    pub checks: usize,

    /// Soft expectations that did not hold
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub soft_failures: Vec<String>,

    /// The error that ended the scenario early, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,

    /// Screenshot captured on failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<PathBuf>,
}

impl ScenarioReport {
    /// Build a report; any failure, hard or soft, fails the scenario
    pub fn new(
        name: impl Into<String>,
        started_at: DateTime<Utc>,
        duration: Duration,
        checks: usize,
        soft_failures: Vec<String>,
        failure: Option<String>,
    ) -> Self {
        let status = if failure.is_none() && soft_failures.is_empty() {
            ScenarioStatus::Passed
        } else {
            ScenarioStatus::Failed
        };
        Self {
            name: name.into(),
            status,
            started_at,
            duration,
            checks,
            soft_failures,
            failure,
            screenshot: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ScenarioStatus::Passed
    }
}

/// Reports of every scenario run against one storefront
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub environment: Environment,
    pub base_url: String,
    pub started_at: DateTime<Utc>,
    pub scenarios: Vec<ScenarioReport>,
}

impl SuiteReport {
    pub fn new(environment: Environment, base_url: impl Into<String>) -> Self {
        Self {
            environment,
            base_url: base_url.into(),
            started_at: Utc::now(),
            scenarios: Vec::new(),
        }
    }

    pub fn add(&mut self, report: ScenarioReport) {
        self.scenarios.push(report);
    }

    pub fn passed(&self) -> usize {
        self.scenarios.iter().filter(|s| s.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.scenarios.len() - self.passed()
    }

    /// True when at least one scenario ran and none failed
    pub fn is_success(&self) -> bool {
        !self.scenarios.is_empty() && self.failed() == 0
    }

    /// Write the report as pretty JSON to `<dir>/report.json`
    pub async fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await.map_err(|e| {
            SuiteError::Other(format!("Failed to create {}: {}", dir.display(), e))
        })?;

        let path = dir.join("report.json");
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SuiteError::Other(format!("Failed to serialize report: {}", e)))?;
        tokio::fs::write(&path, json).await.map_err(|e| {
            SuiteError::Other(format!("Failed to write {}: {}", path.display(), e))
        })?;

        Ok(path)
    }
}
