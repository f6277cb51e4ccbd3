//! Agent policy
//!
//! Business rules layered on top of schema validity: which action types a
//! plan may contain and how many destructive actions one batch may carry.

use crate::error::{LoadError, PlanError, PolicyError};
use crate::prepare::PlanPolicy;
use crate::types::Plan;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Policy document
///
/// ```json
/// {"allow_action_types": [], "deny_action_types": ["project_delete"], "max_destructive_actions": 3}
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentPolicy {
    /// If non-empty, the only permitted types
    #[serde(default)]
    pub allow_action_types: Vec<String>,
    /// Types that are always rejected
    #[serde(default)]
    pub deny_action_types: Vec<String>,
    /// Upper bound on destructive actions; 0 disables the check
    #[serde(default)]
    pub max_destructive_actions: usize,
}

impl AgentPolicy {
    /// Load policy from a JSON file
    pub fn load(path: &Path) -> Result<Self, LoadError> {
        let data = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LoadError::NotFound {
                what: "policy",
                path: path.display().to_string(),
            },
            _ => LoadError::io(format!("read policy {}", path.display()), e),
        })?;
        serde_json::from_str(&data).map_err(|source| LoadError::InvalidJson {
            what: "policy",
            source_name: path.display().to_string(),
            source,
        })
    }

    /// Check a plan against the policy
    ///
    /// Actions are scanned in order; allow and deny lists are checked per
    /// action, the destructive count once at the end.
    pub fn enforce(&self, plan: &Plan) -> Result<(), PolicyError> {
        let allow: HashSet<&str> = self.allow_action_types.iter().map(String::as_str).collect();
        let deny: HashSet<&str> = self.deny_action_types.iter().map(String::as_str).collect();

        let mut destructive = 0;
        for action in &plan.actions {
            let t = action.action_type.as_str();
            if !allow.is_empty() && !allow.contains(t) {
                return Err(PolicyError::NotAllowed(t.to_string()));
            }
            if deny.contains(t) {
                return Err(PolicyError::Denied(t.to_string()));
            }
            if action.kind().is_ok_and(|k| k.is_destructive()) {
                destructive += 1;
            }
        }
        if self.max_destructive_actions > 0 && destructive > self.max_destructive_actions {
            return Err(PolicyError::TooManyDestructive {
                count: destructive,
                max: self.max_destructive_actions,
            });
        }
        Ok(())
    }
}

impl PlanPolicy for AgentPolicy {
    fn check(&self, plan: &Plan) -> Result<(), PlanError> {
        self.enforce(plan).map_err(|e| {
            tracing::warn!(error = %e, "plan rejected by policy");
            e.into()
        })
    }
}
