//! Plan document store
//!
//! JSON persistence for plans plus the normalization applied to every plan
//! that did not come from disk verbatim (planner output).

use crate::error::{LoadError, PlanError, SchemaError};
use crate::prepare::PlanLoader;
use crate::types::{summarize_actions, Plan, PLAN_VERSION};
use crate::validation::validate_plan;
use chrono::{DateTime, SubsecRound, Utc};
use std::io::Read;
use std::path::Path;
use uuid::Uuid;

/// Path that selects standard input
pub const STDIN_PATH: &str = "-";

const CONFIRM_TOKEN_LEN: usize = 4;

/// Read a plan from `path`, or from `stdin` when `path` is `-`
pub fn read_plan<R: Read>(path: &str, stdin: &mut R) -> Result<Plan, LoadError> {
    let (data, source_name) = if path == STDIN_PATH {
        let mut data = String::new();
        stdin
            .read_to_string(&mut data)
            .map_err(|e| LoadError::io("read plan from stdin", e))?;
        (data, "stdin".to_string())
    } else {
        let data = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => LoadError::NotFound {
                what: "plan",
                path: path.to_string(),
            },
            _ => LoadError::io(format!("read plan {path}"), e),
        })?;
        (data, path.to_string())
    };
    serde_json::from_str(&data).map_err(|source| LoadError::InvalidJson {
        what: "plan",
        source_name,
        source,
    })
}

/// Write a plan as pretty JSON, creating parent directories
pub fn write_plan(path: &Path, plan: &Plan) -> Result<(), LoadError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| LoadError::io(format!("create {}", parent.display()), e))?;
    }
    let data = serde_json::to_string_pretty(plan)
        .map_err(|e| LoadError::io("encode plan", std::io::Error::other(e)))?;
    std::fs::write(path, data).map_err(|e| LoadError::io(format!("write plan {}", path.display()), e))?;
    tracing::debug!(path = %path.display(), actions = plan.actions.len(), "plan written");
    Ok(())
}

/// Short random token the user echoes back to confirm a plan
#[must_use]
pub fn new_confirm_token() -> String {
    let mut token = Uuid::new_v4().simple().to_string();
    token.truncate(CONFIRM_TOKEN_LEN);
    token
}

/// Fill plan metadata and validate with empty action lists allowed
///
/// - missing version becomes [`PLAN_VERSION`] and must match `expected_version`
/// - missing instruction, creation time and confirmation token are filled
/// - an all-zero summary is derived from the actions
pub fn normalize_plan(
    mut plan: Plan,
    instruction: &str,
    now: DateTime<Utc>,
    expected_version: Option<u32>,
) -> Result<Plan, PlanError> {
    let version = plan.declared_version().unwrap_or(PLAN_VERSION);
    plan.version = Some(version);
    if let Some(expected) = expected_version.filter(|v| *v != 0) {
        if version != expected {
            return Err(SchemaError::UnsupportedVersion {
                found: version,
                expected,
            }
            .into());
        }
    }
    if plan.instruction.is_empty() {
        plan.instruction = instruction.to_string();
    }
    if plan.created_at.is_none() {
        plan.created_at = Some(now.trunc_subsecs(0));
    }
    if plan.confirm_token.is_empty() {
        plan.confirm_token = new_confirm_token();
    }
    if plan.summary.is_zero() {
        plan.summary = summarize_actions(&plan.actions);
    }
    validate_plan(&plan, expected_version, true)?;
    Ok(plan)
}

/// [`PlanLoader`] over the filesystem and standard input
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanFile;

impl PlanLoader for PlanFile {
    fn load(&self, path: &str) -> Result<Plan, PlanError> {
        Ok(read_plan(path.trim(), &mut std::io::stdin().lock())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::{Action, ActionKind};
    use chrono::TimeZone;
    use std::io::Cursor;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 22, 9, 0, 0).unwrap()
    }

    #[test]
    fn write_then_read_from_nested_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plans/last_plan.json");
        let plan = Plan::new("ab12").with_action(Action {
            name: "focus".into(),
            ..Action::new(ActionKind::LabelAdd)
        });
        write_plan(&path, &plan).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\n  \"confirm_token\": \"ab12\""));
        let loaded = read_plan(path.to_str().unwrap(), &mut std::io::empty()).unwrap();
        assert_eq!(loaded, plan);
    }

    #[test]
    fn stdin_source() {
        let mut input = Cursor::new(r#"{"confirm_token":"zz","actions":[]}"#);
        let plan = read_plan("-", &mut input).unwrap();
        assert_eq!(plan.confirm_token, "zz");

        let mut bad = Cursor::new("nope");
        let err = read_plan("-", &mut bad).unwrap_err();
        assert!(err.to_string().starts_with("invalid plan JSON in stdin: "));
    }

    #[test]
    fn missing_file_is_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let path = path.to_str().unwrap();
        let err = read_plan(path, &mut std::io::empty()).unwrap_err();
        assert_eq!(err.to_string(), format!("plan file not found: {path}"));
    }

    #[test]
    fn normalize_fills_metadata() {
        let raw = Plan {
            actions: vec![Action {
                content: "x".into(),
                ..Action::new(ActionKind::TaskAdd)
            }],
            ..Plan::default()
        };
        let plan = normalize_plan(raw, "add x", now(), Some(1)).unwrap();
        assert_eq!(plan.version, Some(1));
        assert_eq!(plan.instruction, "add x");
        assert_eq!(plan.created_at, Some(now()));
        assert_eq!(plan.confirm_token.len(), 4);
        assert_eq!(plan.summary.tasks, 1);
    }

    #[test]
    fn normalize_keeps_existing_values_and_checks_version() {
        let raw = Plan::new("ab12").with_instruction("original").with_version(2);
        let err = normalize_plan(raw.clone(), "other", now(), Some(1)).unwrap_err();
        assert_eq!(err.to_string(), "unsupported plan version 2 (expected 1)");

        let plan = normalize_plan(raw, "other", now(), None).unwrap();
        assert_eq!(plan.instruction, "original");
        assert_eq!(plan.confirm_token, "ab12");
    }

    #[test]
    fn confirm_tokens_are_short_hex() {
        let token = new_confirm_token();
        assert_eq!(token.len(), 4);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
