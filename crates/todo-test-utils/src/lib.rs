//! Testing utilities for the todo agent workspace
//!
//! Shared fixtures, builders and recording fakes.

#![allow(missing_docs)]

use std::cell::RefCell;
use todo_plan::{Action, ActionKind, Plan, PlanError, PlanLoader, Planner};
use todo_refs::{Collaborator, DirectoryResolver, DirectorySnapshot, Project, Section};

pub const FIXTURE_TOKEN: &str = "c0ff";

/// Two similarly named projects, a shared project with collaborators and
/// duplicate section names across projects
pub fn fixture_snapshot() -> DirectorySnapshot {
    DirectorySnapshot::new()
        .with_project(Project::new("2203306141", "Work"))
        .with_project(Project::new("2203306142", "Workshop"))
        .with_project(Project::new("2203306143", "Home"))
        .with_project(Project::new("2203306144", "Team Launch"))
        .with_section(Section::new("7025", "Next", "2203306141"))
        .with_section(Section::new("7026", "Waiting", "2203306141"))
        .with_section(Section::new("7027", "Next", "2203306143"))
        .with_collaborator("2203306144", Collaborator::new("u-ada", "Ada Lovelace", "ada@example.com"))
        .with_collaborator("2203306144", Collaborator::new("u-alan", "Alan Turing", "alan@example.com"))
        .with_collaborator("2203306144", Collaborator::new("u-grace", "Grace Hopper", "grace@example.com"))
        .with_task("t-launch", "2203306144")
        .with_current_user("u-me")
}

pub fn fixture_resolver() -> DirectoryResolver<DirectorySnapshot> {
    DirectoryResolver::new(fixture_snapshot())
}

/// Fluent [`Action`] construction for tests
#[derive(Debug, Clone)]
pub struct ActionBuilder {
    action: Action,
}

impl ActionBuilder {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            action: Action::new(kind),
        }
    }

    /// Action with an arbitrary (possibly unsupported) type tag
    pub fn raw(action_type: &str) -> Self {
        Self {
            action: Action {
                action_type: action_type.to_string(),
                ..Action::default()
            },
        }
    }

    pub fn task_id(mut self, id: &str) -> Self {
        self.action.task_id = id.to_string();
        self
    }

    pub fn project_id(mut self, id: &str) -> Self {
        self.action.project_id = id.to_string();
        self
    }

    pub fn section_id(mut self, id: &str) -> Self {
        self.action.section_id = id.to_string();
        self
    }

    pub fn label_id(mut self, id: &str) -> Self {
        self.action.label_id = id.to_string();
        self
    }

    pub fn comment_id(mut self, id: &str) -> Self {
        self.action.comment_id = id.to_string();
        self
    }

    pub fn content(mut self, content: &str) -> Self {
        self.action.content = content.to_string();
        self
    }

    pub fn name(mut self, name: &str) -> Self {
        self.action.name = name.to_string();
        self
    }

    pub fn project(mut self, reference: &str) -> Self {
        self.action.project = reference.to_string();
        self
    }

    pub fn section(mut self, reference: &str) -> Self {
        self.action.section = reference.to_string();
        self
    }

    pub fn parent(mut self, parent: &str) -> Self {
        self.action.parent = parent.to_string();
        self
    }

    pub fn assignee(mut self, reference: &str) -> Self {
        self.action.assignee = reference.to_string();
        self
    }

    pub fn labels(mut self, labels: &[&str]) -> Self {
        self.action.labels = labels.iter().map(|l| (*l).to_string()).collect();
        self
    }

    pub fn priority(mut self, priority: u32) -> Self {
        self.action.priority = priority;
        self
    }

    pub fn due(mut self, due: &str) -> Self {
        self.action.due = due.to_string();
        self
    }

    pub fn color(mut self, color: &str) -> Self {
        self.action.color = color.to_string();
        self
    }

    pub fn order(mut self, order: u32) -> Self {
        self.action.order = order;
        self
    }

    pub fn favorite(mut self, favorite: bool) -> Self {
        self.action.is_favorite = Some(favorite);
        self
    }

    pub fn build(self) -> Action {
        self.action
    }
}

impl From<ActionBuilder> for Action {
    fn from(builder: ActionBuilder) -> Self {
        builder.build()
    }
}

/// Plan carrying [`FIXTURE_TOKEN`] with a derived summary
pub fn confirmed_plan(actions: impl IntoIterator<Item = Action>) -> Plan {
    actions
        .into_iter()
        .fold(Plan::new(FIXTURE_TOKEN).with_instruction("fixture"), Plan::with_action)
}

/// Loader that returns a fixed plan and records requested paths
#[derive(Debug, Default)]
pub struct RecordingLoader {
    plan: Plan,
    pub calls: RefCell<Vec<String>>,
}

impl RecordingLoader {
    pub fn new(plan: Plan) -> Self {
        Self {
            plan,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl PlanLoader for RecordingLoader {
    fn load(&self, path: &str) -> Result<Plan, PlanError> {
        self.calls.borrow_mut().push(path.to_string());
        Ok(self.plan.clone())
    }
}

/// Planner that returns a fixed plan and records instructions
#[derive(Debug, Default)]
pub struct RecordingPlanner {
    plan: Plan,
    pub calls: RefCell<Vec<String>>,
}

impl RecordingPlanner {
    pub fn new(plan: Plan) -> Self {
        Self {
            plan,
            calls: RefCell::new(Vec::new()),
        }
    }
}

impl Planner for RecordingPlanner {
    fn plan(&self, instruction: &str) -> Result<Plan, PlanError> {
        self.calls.borrow_mut().push(instruction.to_string());
        Ok(self.plan.clone())
    }
}

/// Compact JSON of a request body for comparisons
pub fn body_json(request: &todo_plan::ActionRequest) -> serde_json::Value {
    serde_json::Value::Object(request.body.clone().unwrap_or_default())
}
