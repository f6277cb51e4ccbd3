//! Action compilation
//!
//! Maps each validated [`Action`] to a transport-agnostic [`ActionRequest`].
//! Body fields follow a set-if-present rule: empty strings, zero numbers and
//! empty lists are left out, and `is_favorite` is only sent when specified.
//! Entity references go through the configured selectors; an ambiguous or
//! unknown reference fails compilation instead of being guessed.

use crate::action::{Action, ActionKind};
use crate::error::{PlanError, SchemaError};
use crate::types::Plan;
use crate::validation::validate_action;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt::{self, Debug, Display, Formatter};
use todo_refs::{
    strip_id_prefix, AssigneeSelector, EntityKind, ProjectSelector, SectionSelector, ID_PREFIX,
};

/// Request body
pub type Body = Map<String, Value>;

/// HTTP method of a compiled request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// Create or update
    Post,
    /// Remove
    Delete,
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Post => "POST",
            Self::Delete => "DELETE",
        })
    }
}

/// Compiled request, ready for the transport client
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionRequest {
    /// HTTP method
    pub method: Method,
    /// Path relative to the API root
    pub path: String,
    /// JSON body; `None` for bodiless requests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Body>,
}

impl ActionRequest {
    /// POST with a body
    #[inline]
    #[must_use]
    pub fn post(path: impl Into<String>, body: Body) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: Some(body),
        }
    }

    /// POST without a body
    #[inline]
    #[must_use]
    pub fn post_empty(path: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            body: None,
        }
    }

    /// DELETE
    #[inline]
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: Method::Delete,
            path: path.into(),
            body: None,
        }
    }
}

impl Display for ActionRequest {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.path)?;
        if let Some(body) = &self.body {
            write!(f, " {}", Value::Object(body.clone()))?;
        }
        Ok(())
    }
}

/// Selector dependencies for compilation
///
/// Each selector is optional; it is only required by actions that actually
/// supply the field it resolves.
#[derive(Clone, Copy, Default)]
pub struct Resolvers<'a> {
    projects: Option<&'a dyn ProjectSelector>,
    sections: Option<&'a dyn SectionSelector>,
    assignees: Option<&'a dyn AssigneeSelector>,
}

impl Debug for Resolvers<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolvers")
            .field("projects", &self.projects.is_some())
            .field("sections", &self.sections.is_some())
            .field("assignees", &self.assignees.is_some())
            .finish()
    }
}

impl<'a> Resolvers<'a> {
    /// No selectors
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// All three selectors from one resolver
    #[inline]
    #[must_use]
    pub fn all<R>(resolver: &'a R) -> Self
    where
        R: ProjectSelector + SectionSelector + AssigneeSelector,
    {
        Self {
            projects: Some(resolver as &dyn ProjectSelector),
            sections: Some(resolver as &dyn SectionSelector),
            assignees: Some(resolver as &dyn AssigneeSelector),
        }
    }

    /// With project selector
    #[must_use]
    pub fn with_projects(mut self, selector: &'a dyn ProjectSelector) -> Self {
        self.projects = Some(selector);
        self
    }

    /// With section selector
    #[must_use]
    pub fn with_sections(mut self, selector: &'a dyn SectionSelector) -> Self {
        self.sections = Some(selector);
        self
    }

    /// With assignee selector
    #[must_use]
    pub fn with_assignees(mut self, selector: &'a dyn AssigneeSelector) -> Self {
        self.assignees = Some(selector);
        self
    }

    fn project(&self, explicit_id: &str, reference: &str) -> Result<Option<String>, PlanError> {
        if !supplied(explicit_id, reference) {
            return Ok(None);
        }
        let selector = self
            .projects
            .ok_or_else(|| PlanError::configuration("project resolver is not configured"))?;
        let resolution = selector.resolve_project(explicit_id, reference)?;
        Ok(resolution.into_id(EntityKind::Project, reference)?)
    }

    fn section(&self, explicit_id: &str, reference: &str, project_scope: &str) -> Result<Option<String>, PlanError> {
        if !supplied(explicit_id, reference) {
            return Ok(None);
        }
        let selector = self
            .sections
            .ok_or_else(|| PlanError::configuration("section resolver is not configured"))?;
        let resolution = selector.resolve_section(explicit_id, reference, project_scope)?;
        Ok(resolution.into_id(EntityKind::Section, reference)?)
    }

    fn assignee(
        &self,
        explicit_id: &str,
        reference: &str,
        project_hint: &str,
        task_id: &str,
    ) -> Result<Option<String>, PlanError> {
        if !supplied(explicit_id, reference) {
            return Ok(None);
        }
        let selector = self
            .assignees
            .ok_or_else(|| PlanError::configuration("assignee resolver is not configured"))?;
        let resolution = selector.resolve_assignee(explicit_id, reference, project_hint, task_id)?;
        Ok(resolution.into_id(EntityKind::Assignee, reference)?)
    }
}

fn supplied(explicit_id: &str, reference: &str) -> bool {
    !strip_id_prefix(explicit_id).is_empty() || !reference.trim().is_empty()
}

fn set_str(body: &mut Body, key: &str, value: &str) {
    if !value.is_empty() {
        body.insert(key.to_string(), Value::from(value));
    }
}

fn set_num(body: &mut Body, key: &str, value: u32) {
    if value > 0 {
        body.insert(key.to_string(), Value::from(value));
    }
}

fn set_id(body: &mut Body, key: &str, value: Option<String>) {
    if let Some(id) = value {
        body.insert(key.to_string(), Value::String(id));
    }
}

fn set_favorite(body: &mut Body, value: Option<bool>) {
    if let Some(flag) = value {
        body.insert("is_favorite".to_string(), Value::Bool(flag));
    }
}

/// Section lookups are narrowed by the project reference, else by the
/// resolved project ID, passed as `id:` so it is never looked up by name
fn section_scope(project_ref: &str, project_id: Option<&str>) -> String {
    let reference = project_ref.trim();
    match project_id {
        Some(id) if reference.is_empty() && !id.is_empty() => format!("{ID_PREFIX}{id}"),
        _ => reference.to_string(),
    }
}

/// Where a task mutation may place the task
#[derive(Clone, Copy, PartialEq, Eq)]
enum Placement {
    /// New task: project, section and parent are honored
    Create,
    /// Existing task: placement changes go through `task_move`
    Update,
}

fn task_fields(body: &mut Body, a: &Action, resolvers: &Resolvers<'_>, placement: Placement) -> Result<(), PlanError> {
    set_str(body, "description", &a.description);

    let mut assignee_hint = String::new();
    if placement == Placement::Create {
        let project_id = resolvers.project(&a.project_id, &a.project)?;
        let scope = section_scope(&a.project, project_id.as_deref());
        let section_id = resolvers.section(&a.section_id, &a.section, &scope)?;
        set_id(body, "project_id", project_id);
        set_id(body, "section_id", section_id);
        set_str(body, "parent_id", &a.parent);
        assignee_hint = scope;
    }

    if !a.labels.is_empty() {
        body.insert("labels".to_string(), Value::from(a.labels.clone()));
    }
    set_num(body, "priority", a.priority);
    set_str(body, "due_string", &a.due);
    set_str(body, "due_date", &a.due_date);
    set_str(body, "due_datetime", &a.due_datetime);
    set_str(body, "due_lang", &a.due_lang);
    set_num(body, "duration", a.duration);
    set_str(body, "duration_unit", &a.duration_unit);
    set_str(body, "deadline_date", &a.deadline_date);

    let task_id = if placement == Placement::Update { a.task_id.as_str() } else { "" };
    let assignee_id = resolvers.assignee(&a.assignee_id, &a.assignee, &assignee_hint, task_id)?;
    set_id(body, "assignee_id", assignee_id);
    Ok(())
}

fn move_fields(a: &Action, resolvers: &Resolvers<'_>) -> Result<Body, PlanError> {
    let mut body = Body::new();
    let project_id = resolvers.project(&a.project_id, &a.project)?;
    let scope = section_scope(&a.project, project_id.as_deref());
    let section_id = resolvers.section(&a.section_id, &a.section, &scope)?;
    set_id(&mut body, "project_id", project_id);
    set_id(&mut body, "section_id", section_id);
    set_str(&mut body, "parent_id", &a.parent);
    Ok(body)
}

/// Compile one action into a request
///
/// The action is validated first; `section_update` additionally requires a
/// name and `section_add` a resolvable project.
pub fn compile_action(action: &Action, resolvers: &Resolvers<'_>) -> Result<ActionRequest, PlanError> {
    use ActionKind as K;

    let kind = validate_action(action)?;
    let a = action;
    let request = match kind {
        K::TaskAdd => {
            let mut body = Body::new();
            set_str(&mut body, "content", &a.content);
            task_fields(&mut body, a, resolvers, Placement::Create)?;
            ActionRequest::post("/tasks", body)
        }
        K::TaskUpdate => {
            let mut body = Body::new();
            task_fields(&mut body, a, resolvers, Placement::Update)?;
            set_str(&mut body, "content", &a.content);
            ActionRequest::post(format!("/tasks/{}", a.task_id), body)
        }
        K::TaskMove => ActionRequest::post(format!("/tasks/{}/move", a.task_id), move_fields(a, resolvers)?),
        K::TaskComplete => ActionRequest::post_empty(format!("/tasks/{}/close", a.task_id)),
        K::TaskReopen => ActionRequest::post_empty(format!("/tasks/{}/reopen", a.task_id)),
        K::TaskDelete => ActionRequest::delete(format!("/tasks/{}", a.task_id)),

        K::ProjectAdd => {
            let mut body = Body::new();
            set_str(&mut body, "name", &a.name);
            set_str(&mut body, "description", &a.description);
            set_id(&mut body, "parent_id", resolvers.project("", &a.parent)?);
            set_str(&mut body, "color", &a.color);
            set_favorite(&mut body, a.is_favorite);
            ActionRequest::post("/projects", body)
        }
        K::ProjectUpdate => {
            let mut body = Body::new();
            set_str(&mut body, "name", &a.name);
            set_str(&mut body, "description", &a.description);
            set_str(&mut body, "color", &a.color);
            set_favorite(&mut body, a.is_favorite);
            ActionRequest::post(format!("/projects/{}", a.project_id), body)
        }
        K::ProjectArchive => ActionRequest::post_empty(format!("/projects/{}/archive", a.project_id)),
        K::ProjectUnarchive => ActionRequest::post_empty(format!("/projects/{}/unarchive", a.project_id)),
        K::ProjectDelete => ActionRequest::delete(format!("/projects/{}", a.project_id)),

        K::SectionAdd => {
            let project_id = resolvers
                .project(&a.project_id, &a.project)?
                .ok_or(SchemaError::missing(kind, "project or project_id"))?;
            let mut body = Body::new();
            set_str(&mut body, "name", &a.name);
            body.insert("project_id".to_string(), Value::String(project_id));
            set_num(&mut body, "order", a.order);
            ActionRequest::post("/sections", body)
        }
        K::SectionUpdate => {
            if a.name.is_empty() {
                return Err(SchemaError::missing(kind, "section_id and name").into());
            }
            let mut body = Body::new();
            set_str(&mut body, "name", &a.name);
            ActionRequest::post(format!("/sections/{}", a.section_id), body)
        }
        K::SectionDelete => ActionRequest::delete(format!("/sections/{}", a.section_id)),

        K::LabelAdd | K::LabelUpdate => {
            let mut body = Body::new();
            set_str(&mut body, "name", &a.name);
            set_str(&mut body, "color", &a.color);
            set_num(&mut body, "order", a.order);
            set_favorite(&mut body, a.is_favorite);
            if kind == K::LabelAdd {
                ActionRequest::post("/labels", body)
            } else {
                ActionRequest::post(format!("/labels/{}", a.label_id), body)
            }
        }
        K::LabelDelete => ActionRequest::delete(format!("/labels/{}", a.label_id)),

        K::CommentAdd => {
            let mut body = Body::new();
            set_str(&mut body, "content", &a.content);
            set_str(&mut body, "task_id", &a.task_id);
            set_id(&mut body, "project_id", resolvers.project(&a.project_id, &a.project)?);
            ActionRequest::post("/comments", body)
        }
        K::CommentUpdate => {
            let mut body = Body::new();
            set_str(&mut body, "content", &a.content);
            ActionRequest::post(format!("/comments/{}", a.comment_id), body)
        }
        K::CommentDelete => ActionRequest::delete(format!("/comments/{}", a.comment_id)),
    };
    tracing::debug!(action = %kind, request = %request, "compiled action");
    Ok(request)
}

/// Compile every action of a plan, in order, halting on the first failure
pub fn compile_plan(plan: &Plan, resolvers: &Resolvers<'_>) -> Result<Vec<ActionRequest>, PlanError> {
    let mut requests = Vec::with_capacity(plan.actions.len());
    for (index, action) in plan.actions.iter().enumerate() {
        match compile_action(action, resolvers) {
            Ok(request) => requests.push(request),
            Err(e) => {
                tracing::warn!(index, action_type = %action.action_type, error = %e, "compilation halted");
                return Err(e);
            }
        }
    }
    tracing::info!(actions = requests.len(), "plan compiled");
    Ok(requests)
}
