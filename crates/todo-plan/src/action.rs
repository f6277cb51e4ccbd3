//! Plan actions
//!
//! An [`Action`] is one declarative mutation. Its `type` tag is kept as the
//! raw string from the plan document so that unknown types survive parsing
//! and are reported by the validator; [`Action::kind`] maps it onto the closed
//! [`ActionKind`] set.

use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use todo_refs::EntityKind;

/// Recognized action types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Create task
    TaskAdd,
    /// Update task fields
    TaskUpdate,
    /// Move task to another project, section or parent
    TaskMove,
    /// Close task
    TaskComplete,
    /// Reopen closed task
    TaskReopen,
    /// Delete task
    TaskDelete,
    /// Create project
    ProjectAdd,
    /// Update project fields
    ProjectUpdate,
    /// Archive project
    ProjectArchive,
    /// Unarchive project
    ProjectUnarchive,
    /// Delete project
    ProjectDelete,
    /// Create section
    SectionAdd,
    /// Rename section
    SectionUpdate,
    /// Delete section
    SectionDelete,
    /// Create label
    LabelAdd,
    /// Update label fields
    LabelUpdate,
    /// Delete label
    LabelDelete,
    /// Add comment to a task or project
    CommentAdd,
    /// Edit comment
    CommentUpdate,
    /// Delete comment
    CommentDelete,
}

impl ActionKind {
    /// Every recognized type, in schema order
    pub const ALL: [Self; 20] = [
        Self::TaskAdd,
        Self::TaskUpdate,
        Self::TaskMove,
        Self::TaskComplete,
        Self::TaskReopen,
        Self::TaskDelete,
        Self::ProjectAdd,
        Self::ProjectUpdate,
        Self::ProjectArchive,
        Self::ProjectUnarchive,
        Self::ProjectDelete,
        Self::SectionAdd,
        Self::SectionUpdate,
        Self::SectionDelete,
        Self::LabelAdd,
        Self::LabelUpdate,
        Self::LabelDelete,
        Self::CommentAdd,
        Self::CommentUpdate,
        Self::CommentDelete,
    ];

    /// Wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TaskAdd => "task_add",
            Self::TaskUpdate => "task_update",
            Self::TaskMove => "task_move",
            Self::TaskComplete => "task_complete",
            Self::TaskReopen => "task_reopen",
            Self::TaskDelete => "task_delete",
            Self::ProjectAdd => "project_add",
            Self::ProjectUpdate => "project_update",
            Self::ProjectArchive => "project_archive",
            Self::ProjectUnarchive => "project_unarchive",
            Self::ProjectDelete => "project_delete",
            Self::SectionAdd => "section_add",
            Self::SectionUpdate => "section_update",
            Self::SectionDelete => "section_delete",
            Self::LabelAdd => "label_add",
            Self::LabelUpdate => "label_update",
            Self::LabelDelete => "label_delete",
            Self::CommentAdd => "comment_add",
            Self::CommentUpdate => "comment_update",
            Self::CommentDelete => "comment_delete",
        }
    }

    /// Entity the action operates on
    #[must_use]
    pub const fn entity(self) -> EntityKind {
        match self {
            Self::TaskAdd
            | Self::TaskUpdate
            | Self::TaskMove
            | Self::TaskComplete
            | Self::TaskReopen
            | Self::TaskDelete => EntityKind::Task,
            Self::ProjectAdd
            | Self::ProjectUpdate
            | Self::ProjectArchive
            | Self::ProjectUnarchive
            | Self::ProjectDelete => EntityKind::Project,
            Self::SectionAdd | Self::SectionUpdate | Self::SectionDelete => EntityKind::Section,
            Self::LabelAdd | Self::LabelUpdate | Self::LabelDelete => EntityKind::Label,
            Self::CommentAdd | Self::CommentUpdate | Self::CommentDelete => EntityKind::Comment,
        }
    }

    /// Deletes data or hides a project
    #[inline]
    #[must_use]
    pub const fn is_destructive(self) -> bool {
        matches!(
            self,
            Self::TaskDelete
                | Self::ProjectDelete
                | Self::SectionDelete
                | Self::LabelDelete
                | Self::CommentDelete
                | Self::ProjectArchive
        )
    }
}

impl Display for ActionKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| SchemaError::UnsupportedActionType(s.to_string()))
    }
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(n: &u32) -> bool {
    *n == 0
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_false(b: &bool) -> bool {
    !*b
}

/// One mutation in a plan
///
/// Fields are sparse: empty strings, zero numbers and empty lists mean "not
/// supplied" and are omitted on serialization. `is_favorite` is tri-state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Action type tag
    #[serde(rename = "type")]
    pub action_type: String,

    /// Task ID
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub task_id: String,
    /// Project ID (explicit)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub project_id: String,
    /// Section ID (explicit)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub section_id: String,
    /// Label ID
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub label_id: String,
    /// Comment ID
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub comment_id: String,

    /// Safe to replay
    #[serde(default, skip_serializing_if = "is_false")]
    pub idempotent: bool,

    /// Task or comment text
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    /// Task or project description
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Project, section or label name
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Task labels
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub labels: Vec<String>,

    /// Project reference (name, URL or `id:`)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub project: String,
    /// Section reference
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub section: String,
    /// Parent task ID, or parent project reference for `project_add`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub parent: String,

    /// Task priority (1-4)
    #[serde(default, skip_serializing_if = "is_zero")]
    pub priority: u32,
    /// Natural-language due string
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub due: String,
    /// Due date (`YYYY-MM-DD`)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub due_date: String,
    /// Due timestamp
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub due_datetime: String,
    /// Language of `due`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub due_lang: String,
    /// Duration amount
    #[serde(default, skip_serializing_if = "is_zero")]
    pub duration: u32,
    /// `minute` or `day`
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub duration_unit: String,
    /// Deadline date
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub deadline_date: String,
    /// Assignee user ID (explicit)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub assignee_id: String,
    /// Assignee reference (`me`, name or email)
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub assignee: String,

    /// Project or label color
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,
    /// Section or label order
    #[serde(default, skip_serializing_if = "is_zero")]
    pub order: u32,
    /// Favorite flag; `None` leaves it untouched
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_favorite: Option<bool>,

    /// Why the planner proposed this action
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reason: String,
}

impl Action {
    /// Create new action of a known type
    #[inline]
    #[must_use]
    pub fn new(kind: ActionKind) -> Self {
        Self {
            action_type: kind.as_str().to_string(),
            ..Self::default()
        }
    }

    /// Parse the type tag
    pub fn kind(&self) -> Result<ActionKind, SchemaError> {
        self.action_type.parse()
    }

    /// Check if the action supplies a project selector
    #[inline]
    #[must_use]
    pub fn has_project(&self) -> bool {
        !self.project.is_empty() || !self.project_id.is_empty()
    }

    /// Check if the action supplies a section selector
    #[inline]
    #[must_use]
    pub fn has_section(&self) -> bool {
        !self.section.is_empty() || !self.section_id.is_empty()
    }

    /// Check if the action supplies an assignee selector
    #[inline]
    #[must_use]
    pub fn has_assignee(&self) -> bool {
        !self.assignee.is_empty() || !self.assignee_id.is_empty()
    }
}
