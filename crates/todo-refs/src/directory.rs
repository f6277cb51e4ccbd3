//! Entity directories
//!
//! Read-only collections of projects, sections and collaborators that
//! selector resolution searches. Fetching and caching them is the job of the
//! transport layer; this module only defines the shape it must provide.

use crate::error::DirectoryError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Project entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    /// Project ID
    pub id: String,
    /// Display name
    pub name: String,
}

impl Project {
    /// Create new project entry
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Section entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    /// Section ID
    pub id: String,
    /// Display name
    pub name: String,
    /// Owning project
    pub project_id: String,
}

impl Section {
    /// Create new section entry
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            project_id: project_id.into(),
        }
    }
}

/// Project collaborator entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collaborator {
    /// User ID
    pub id: String,
    /// Full name
    pub name: String,
    /// Email address
    #[serde(default)]
    pub email: String,
}

impl Collaborator {
    /// Create new collaborator entry
    #[inline]
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
        }
    }

    /// `Name <email>` form used in candidate lists
    #[must_use]
    pub fn display_name(&self) -> String {
        if self.email.is_empty() {
            self.name.clone()
        } else {
            format!("{} <{}>", self.name, self.email)
        }
    }
}

/// Read-only source of entities for resolution
pub trait EntityDirectory {
    /// All projects
    fn projects(&self) -> Result<Vec<Project>, DirectoryError>;

    /// Sections, optionally narrowed to one project
    fn sections(&self, project_id: Option<&str>) -> Result<Vec<Section>, DirectoryError>;

    /// Collaborators of a shared project
    fn collaborators(&self, project_id: &str) -> Result<Vec<Collaborator>, DirectoryError>;

    /// Project that owns a task, if the task is known
    fn task_project_id(&self, task_id: &str) -> Result<Option<String>, DirectoryError>;

    /// ID of the authenticated user, if known
    fn current_user_id(&self) -> Result<Option<String>, DirectoryError>;
}

impl<D: EntityDirectory + ?Sized> EntityDirectory for &D {
    fn projects(&self) -> Result<Vec<Project>, DirectoryError> {
        (**self).projects()
    }

    fn sections(&self, project_id: Option<&str>) -> Result<Vec<Section>, DirectoryError> {
        (**self).sections(project_id)
    }

    fn collaborators(&self, project_id: &str) -> Result<Vec<Collaborator>, DirectoryError> {
        (**self).collaborators(project_id)
    }

    fn task_project_id(&self, task_id: &str) -> Result<Option<String>, DirectoryError> {
        (**self).task_project_id(task_id)
    }

    fn current_user_id(&self) -> Result<Option<String>, DirectoryError> {
        (**self).current_user_id()
    }
}

/// In-memory directory, typically deserialized from a JSON snapshot
///
/// ```json
/// {
///   "projects": [{"id": "p1", "name": "Work"}],
///   "sections": [{"id": "s1", "name": "Next", "project_id": "p1"}],
///   "collaborators": {"p1": [{"id": "u1", "name": "Ada", "email": "ada@example.com"}]},
///   "tasks": {"t1": "p1"},
///   "current_user_id": "u0"
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorySnapshot {
    /// Known projects
    #[serde(default)]
    pub projects: Vec<Project>,
    /// Known sections across all projects
    #[serde(default)]
    pub sections: Vec<Section>,
    /// Collaborators keyed by project ID
    #[serde(default)]
    pub collaborators: BTreeMap<String, Vec<Collaborator>>,
    /// Task ID to owning project ID
    #[serde(default)]
    pub tasks: BTreeMap<String, String>,
    /// Authenticated user
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_user_id: Option<String>,
}

impl DirectorySnapshot {
    /// Create empty snapshot
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With project
    #[must_use]
    pub fn with_project(mut self, project: Project) -> Self {
        self.projects.push(project);
        self
    }

    /// With section
    #[must_use]
    pub fn with_section(mut self, section: Section) -> Self {
        self.sections.push(section);
        self
    }

    /// With collaborator on a project
    #[must_use]
    pub fn with_collaborator(mut self, project_id: impl Into<String>, collaborator: Collaborator) -> Self {
        self.collaborators
            .entry(project_id.into())
            .or_default()
            .push(collaborator);
        self
    }

    /// With task ownership
    #[must_use]
    pub fn with_task(mut self, task_id: impl Into<String>, project_id: impl Into<String>) -> Self {
        self.tasks.insert(task_id.into(), project_id.into());
        self
    }

    /// With authenticated user
    #[must_use]
    pub fn with_current_user(mut self, user_id: impl Into<String>) -> Self {
        self.current_user_id = Some(user_id.into());
        self
    }
}

impl EntityDirectory for DirectorySnapshot {
    fn projects(&self) -> Result<Vec<Project>, DirectoryError> {
        Ok(self.projects.clone())
    }

    fn sections(&self, project_id: Option<&str>) -> Result<Vec<Section>, DirectoryError> {
        Ok(self
            .sections
            .iter()
            .filter(|s| project_id.map_or(true, |p| s.project_id == p))
            .cloned()
            .collect())
    }

    fn collaborators(&self, project_id: &str) -> Result<Vec<Collaborator>, DirectoryError> {
        Ok(self.collaborators.get(project_id).cloned().unwrap_or_default())
    }

    fn task_project_id(&self, task_id: &str) -> Result<Option<String>, DirectoryError> {
        Ok(self.tasks.get(task_id).cloned())
    }

    fn current_user_id(&self) -> Result<Option<String>, DirectoryError> {
        Ok(self.current_user_id.clone())
    }
}
