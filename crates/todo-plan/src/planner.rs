//! External command planner
//!
//! Runs a configured shell command, feeds it a [`PlannerRequest`] as JSON on
//! stdin and parses a [`Plan`] from its stdout. The result is passed through
//! [`normalize_plan`] before it reaches the gate.

use crate::error::PlanError;
use crate::prepare::Planner;
use crate::store::normalize_plan;
use crate::types::Plan;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::process::{Output, Stdio};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;
use todo_refs::{DirectorySnapshot, Project, Section};

/// Default planner timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Workspace context handed to the planner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerContext {
    /// Known projects
    #[serde(default)]
    pub projects: Vec<Project>,
    /// Known sections
    #[serde(default)]
    pub sections: Vec<Section>,
    /// Known label names
    #[serde(default)]
    pub labels: Vec<String>,
    /// Recently completed tasks, when requested
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub completed_tasks: Vec<serde_json::Value>,
}

impl PlannerContext {
    /// Context from a directory snapshot
    #[must_use]
    pub fn from_snapshot(snapshot: &DirectorySnapshot) -> Self {
        Self {
            projects: snapshot.projects.clone(),
            sections: snapshot.sections.clone(),
            ..Self::default()
        }
    }

    /// With label names
    #[must_use]
    pub fn with_labels(mut self, labels: Vec<String>) -> Self {
        self.labels = labels;
        self
    }
}

/// Document written to the planner's stdin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannerRequest {
    /// Free-text instruction
    pub instruction: String,
    /// Active profile name
    pub profile: String,
    /// Workspace context
    pub context: PlannerContext,
    /// Current time, RFC3339 UTC
    pub now: String,
}

/// [`Planner`] that shells out to a command
#[derive(Debug, Clone)]
pub struct CommandPlanner {
    command: String,
    timeout: Duration,
    profile: String,
    context: PlannerContext,
    expected_version: Option<u32>,
    now: Option<DateTime<Utc>>,
}

impl CommandPlanner {
    /// Create new planner for a shell command
    #[must_use]
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timeout: DEFAULT_TIMEOUT,
            profile: "default".to_string(),
            context: PlannerContext::default(),
            expected_version: None,
            now: None,
        }
    }

    /// With timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// With profile name
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = profile.into();
        self
    }

    /// With workspace context
    #[must_use]
    pub fn with_context(mut self, context: PlannerContext) -> Self {
        self.context = context;
        self
    }

    /// With expected plan version
    #[must_use]
    pub fn with_expected_version(mut self, version: Option<u32>) -> Self {
        self.expected_version = version;
        self
    }

    /// Pin the clock
    #[must_use]
    pub fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    /// Request document for an instruction
    #[must_use]
    pub fn request(&self, instruction: &str, now: DateTime<Utc>) -> PlannerRequest {
        PlannerRequest {
            instruction: instruction.to_string(),
            profile: self.profile.clone(),
            context: self.context.clone(),
            now: now.to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    /// Exchange with the planner process; the deadline covers the whole
    /// exchange, including output left open by the command's own children
    async fn run(&self, payload: Vec<u8>) -> Result<Output, PlanError> {
        let mut child = Command::new("/bin/sh")
            .arg("-c")
            .arg(&self.command)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(PlanError::planner_failed)?;

        let stdin = child.stdin.take();
        let write = async move {
            if let Some(mut stdin) = stdin {
                // a planner may exit without reading its input
                let _ = stdin.write_all(&payload).await;
            }
        };
        let exchange = async move {
            let ((), output) = tokio::join!(write, child.wait_with_output());
            output
        };

        match timeout(self.timeout, exchange).await {
            Ok(output) => output.map_err(PlanError::planner_failed),
            Err(_) => Err(PlanError::planner_failed(format!(
                "timed out after {:?}",
                self.timeout
            ))),
        }
    }
}

impl Planner for CommandPlanner {
    fn plan(&self, instruction: &str) -> Result<Plan, PlanError> {
        let now = self.now.unwrap_or_else(Utc::now);
        let payload = serde_json::to_vec(&self.request(instruction, now))
            .map_err(|e| PlanError::Planner(format!("encode planner request: {e}")))?;
        tracing::debug!(command = %self.command, bytes = payload.len(), "running planner");

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(PlanError::planner_failed)?;
        let output = runtime.block_on(self.run(payload))?;
        if !output.status.success() {
            let message = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if message.is_empty() {
                output.status.to_string()
            } else {
                message
            };
            return Err(PlanError::planner_failed(message));
        }

        let plan: Plan = serde_json::from_slice(&output.stdout)
            .map_err(|e| PlanError::Planner(format!("parse planner output: {e}")))?;
        let plan = normalize_plan(plan, instruction, now, self.expected_version)?;
        tracing::info!(actions = plan.actions.len(), summary = %plan.summary, "planner produced plan");
        Ok(plan)
    }
}
