//! Plan documents
//!
//! Defines:
//! - [`Plan`]: an ordered batch of actions plus confirmation token and metadata
//! - [`PlanSummary`]: per-entity action counts, derived from the actions

use crate::action::Action;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};

/// Plan schema version written by this crate
pub const PLAN_VERSION: u32 = 1;

/// Action counts by entity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlanSummary {
    /// `task_*` actions
    #[serde(default)]
    pub tasks: usize,
    /// `project_*` actions
    #[serde(default)]
    pub projects: usize,
    /// `section_*` actions
    #[serde(default)]
    pub sections: usize,
    /// `label_*` actions
    #[serde(default)]
    pub labels: usize,
    /// `comment_*` actions
    #[serde(default)]
    pub comments: usize,
}

impl PlanSummary {
    /// Check if all counts are zero
    #[inline]
    #[must_use]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Sum of all counts
    #[inline]
    #[must_use]
    pub fn total(&self) -> usize {
        self.tasks + self.projects + self.sections + self.labels + self.comments
    }
}

impl Display for PlanSummary {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "tasks={} projects={} sections={} labels={} comments={}",
            self.tasks, self.projects, self.sections, self.labels, self.comments
        )
    }
}

/// Count actions by type-name prefix
///
/// Counting is by prefix, not by recognized type, so the summary of an
/// unvalidated plan still reflects what it claims to do.
#[must_use]
pub fn summarize_actions(actions: &[Action]) -> PlanSummary {
    actions.iter().fold(PlanSummary::default(), |mut s, a| {
        let t = a.action_type.as_str();
        if t.starts_with("task_") {
            s.tasks += 1;
        } else if t.starts_with("project_") {
            s.projects += 1;
        } else if t.starts_with("section_") {
            s.sections += 1;
        } else if t.starts_with("label_") {
            s.labels += 1;
        } else if t.starts_with("comment_") {
            s.comments += 1;
        }
        s
    })
}

/// Batch of actions awaiting confirmation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Schema version; `None` (or 0) means unspecified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// Instruction the plan was produced from
    #[serde(default)]
    pub instruction: String,
    /// Creation time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Token the user must echo back to execute
    #[serde(default)]
    pub confirm_token: String,
    /// Derived action counts
    #[serde(default)]
    pub summary: PlanSummary,
    /// Actions in execution order
    #[serde(default)]
    pub actions: Vec<Action>,
    /// Set by the executor once applied
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub applied_at: Option<DateTime<Utc>>,
}

impl Plan {
    /// Create new plan with a confirmation token
    #[inline]
    #[must_use]
    pub fn new(confirm_token: impl Into<String>) -> Self {
        Self {
            version: Some(PLAN_VERSION),
            confirm_token: confirm_token.into(),
            ..Self::default()
        }
    }

    /// With instruction
    #[must_use]
    pub fn with_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.instruction = instruction.into();
        self
    }

    /// With version
    #[must_use]
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    /// Append action and refresh the summary
    #[must_use]
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self.refresh_summary();
        self
    }

    /// Effective version (0 counts as unspecified)
    #[inline]
    #[must_use]
    pub fn declared_version(&self) -> Option<u32> {
        self.version.filter(|v| *v != 0)
    }

    /// Recompute the summary from the actions
    pub fn refresh_summary(&mut self) {
        self.summary = summarize_actions(&self.actions);
    }

    /// Check if the plan has been applied
    #[inline]
    #[must_use]
    pub fn is_applied(&self) -> bool {
        self.applied_at.is_some()
    }
}
