//! Plan schema validation
//!
//! Static checks, in order: confirmation token, non-empty action list,
//! version compatibility, then per action the type whitelist and the
//! required fields of that type. The first failing action is reported.

use crate::action::{Action, ActionKind};
use crate::error::SchemaError;
use crate::types::Plan;

/// Validate a plan
///
/// `expected_version` is only compared when both it and the plan's version
/// are set. `allow_empty` admits plans without actions (dry runs).
pub fn validate_plan(plan: &Plan, expected_version: Option<u32>, allow_empty: bool) -> Result<(), SchemaError> {
    if plan.confirm_token.is_empty() {
        return Err(SchemaError::MissingConfirmToken);
    }
    if plan.actions.is_empty() && !allow_empty {
        return Err(SchemaError::NoActions);
    }
    if let (Some(expected), Some(found)) = (expected_version.filter(|v| *v != 0), plan.declared_version()) {
        if expected != found {
            return Err(SchemaError::UnsupportedVersion { found, expected });
        }
    }
    for (index, action) in plan.actions.iter().enumerate() {
        if let Err(e) = validate_action(action) {
            tracing::debug!(index, action_type = %action.action_type, error = %e, "action failed validation");
            return Err(e);
        }
    }
    Ok(())
}

/// Validate one action's type and required fields
pub fn validate_action(a: &Action) -> Result<ActionKind, SchemaError> {
    use ActionKind as K;

    let kind = a.kind()?;
    let missing = |requirement| Err(SchemaError::missing(kind, requirement));
    match kind {
        K::TaskAdd if a.content.is_empty() => missing("content"),
        K::TaskUpdate | K::TaskMove | K::TaskComplete | K::TaskReopen | K::TaskDelete
            if a.task_id.is_empty() =>
        {
            missing("task_id")
        }
        K::TaskMove if !a.has_project() && !a.has_section() && a.parent.is_empty() => {
            missing("project/project_id, section/section_id, or parent")
        }
        K::ProjectAdd if a.name.is_empty() => missing("name"),
        K::ProjectUpdate | K::ProjectArchive | K::ProjectUnarchive | K::ProjectDelete
            if a.project_id.is_empty() =>
        {
            missing("project_id")
        }
        K::SectionAdd if a.name.is_empty() || !a.has_project() => missing("name and project/project_id"),
        K::SectionUpdate | K::SectionDelete if a.section_id.is_empty() => missing("section_id"),
        K::LabelAdd if a.name.is_empty() => missing("name"),
        K::LabelUpdate | K::LabelDelete if a.label_id.is_empty() => missing("label_id"),
        K::CommentAdd if a.content.is_empty() => missing("content"),
        K::CommentAdd if a.task_id.is_empty() && !a.has_project() => {
            missing("task_id or project/project_id")
        }
        K::CommentUpdate | K::CommentDelete if a.comment_id.is_empty() => missing("comment_id"),
        K::CommentUpdate if a.content.is_empty() => missing("content"),
        _ => Ok(kind),
    }
}
