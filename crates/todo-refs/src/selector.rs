//! Selector resolution
//!
//! A selector is the pair (explicit ID, free-text reference) accepted for one
//! entity field. Resolution order:
//!
//! 1. A non-empty explicit ID is trusted verbatim, no lookup.
//! 2. An empty reference resolves to [`Resolution::Absent`].
//! 3. IDs, `id:` prefixes and typed URLs in the reference are used directly.
//! 4. Exact case-insensitive match on name/email/ID.
//! 5. Fuzzy ranking, collapsed: one match resolves, several are ambiguous.

use crate::directory::{Collaborator, EntityDirectory};
use crate::error::ResolveError;
use crate::fuzzy::{candidate_rank, collapse, finalize_candidates, rank_candidates, Candidate, Resolution};
use crate::normalize::{strip_id_prefix, NormalizedRef};
use crate::web_url::{normalize_entity_ref, EntityKind};

/// Assignee reference that means the authenticated user
pub const ME_REFERENCE: &str = "me";

/// Resolves project selectors
pub trait ProjectSelector {
    /// Resolve `(explicit_id, reference)`; blank strings mean "not supplied"
    fn resolve_project(&self, explicit_id: &str, reference: &str) -> Result<Resolution, ResolveError>;
}

/// Resolves section selectors, optionally scoped to a project
pub trait SectionSelector {
    /// Resolve `(explicit_id, reference)` within `project_scope` (a project
    /// reference or ID; blank searches all sections)
    fn resolve_section(
        &self,
        explicit_id: &str,
        reference: &str,
        project_scope: &str,
    ) -> Result<Resolution, ResolveError>;
}

/// Resolves assignee selectors against project collaborators
pub trait AssigneeSelector {
    /// Resolve `(explicit_id, reference)`; collaborators are taken from
    /// `project_hint`, else from the project owning `task_id`
    fn resolve_assignee(
        &self,
        explicit_id: &str,
        reference: &str,
        project_hint: &str,
        task_id: &str,
    ) -> Result<Resolution, ResolveError>;
}

/// Selector resolution over an [`EntityDirectory`]
#[derive(Debug, Clone)]
pub struct DirectoryResolver<D> {
    directory: D,
}

impl<D: EntityDirectory> DirectoryResolver<D> {
    /// Create new resolver
    #[inline]
    #[must_use]
    pub fn new(directory: D) -> Self {
        Self { directory }
    }

    /// Underlying directory
    #[inline]
    #[must_use]
    pub fn directory(&self) -> &D {
        &self.directory
    }

    fn lookup_project(&self, reference: &str) -> Result<Resolution, ResolveError> {
        let query = match normalize_entity_ref(reference, EntityKind::Project)? {
            NormalizedRef::Empty => return Ok(Resolution::Absent),
            NormalizedRef::Direct(id) => return Ok(Resolution::Direct(id)),
            NormalizedRef::Lookup(query) => query,
        };
        let projects = self.directory.projects()?;
        let exact: Vec<Candidate> = projects
            .iter()
            .filter(|p| p.id.eq_ignore_ascii_case(&query) || p.name.trim().eq_ignore_ascii_case(&query))
            .map(|p| Candidate::new(&p.id, p.name.trim(), 0))
            .collect();
        if let Some(resolution) = exact_resolution(exact) {
            tracing::debug!(entity = "project", reference = %query, "exact match");
            return Ok(resolution);
        }
        Ok(collapse(rank_candidates(
            &query,
            &projects,
            |p| p.name.as_str(),
            |p| p.id.as_str(),
        )))
    }

    fn scoped_project_id(&self, project_scope: &str) -> Result<Option<String>, ResolveError> {
        self.lookup_project(project_scope)?
            .into_id(EntityKind::Project, project_scope)
    }

    fn assignee_project_id(&self, project_hint: &str, task_id: &str) -> Result<String, ResolveError> {
        if !project_hint.trim().is_empty() {
            if let Some(id) = self.scoped_project_id(project_hint)? {
                return Ok(id);
            }
        } else if !task_id.trim().is_empty() {
            if let Some(id) = self.directory.task_project_id(task_id.trim())? {
                return Ok(id);
            }
        }
        Err(ResolveError::MissingContext(
            "project is required when assignee is not an ID or \"me\"".to_string(),
        ))
    }
}

/// One exact match resolves; duplicates with distinct IDs are ambiguous
fn exact_resolution(exact: Vec<Candidate>) -> Option<Resolution> {
    if exact.is_empty() {
        return None;
    }
    Some(collapse(finalize_candidates(exact)))
}

fn explicit(explicit_id: &str) -> Option<Resolution> {
    let id = strip_id_prefix(explicit_id);
    (!id.is_empty()).then(|| Resolution::Direct(id.to_string()))
}

fn rank_collaborators(query: &str, collaborators: &[Collaborator]) -> Vec<Candidate> {
    let ranked = collaborators
        .iter()
        .filter_map(|c| {
            let by_name = candidate_rank(query, &c.name);
            let by_email = candidate_rank(query, &c.email);
            let rank = match (by_name, by_email) {
                (Some(a), Some(b)) => Some(a.min(b)),
                (a, b) => a.or(b),
            }?;
            Some(Candidate::new(&c.id, c.display_name(), rank))
        })
        .collect();
    finalize_candidates(ranked)
}

impl<D: EntityDirectory> ProjectSelector for DirectoryResolver<D> {
    fn resolve_project(&self, explicit_id: &str, reference: &str) -> Result<Resolution, ResolveError> {
        if let Some(direct) = explicit(explicit_id) {
            return Ok(direct);
        }
        self.lookup_project(reference)
    }
}

impl<D: EntityDirectory> SectionSelector for DirectoryResolver<D> {
    fn resolve_section(
        &self,
        explicit_id: &str,
        reference: &str,
        project_scope: &str,
    ) -> Result<Resolution, ResolveError> {
        if let Some(direct) = explicit(explicit_id) {
            return Ok(direct);
        }
        let query = match normalize_entity_ref(reference, EntityKind::Section)? {
            NormalizedRef::Empty => return Ok(Resolution::Absent),
            NormalizedRef::Direct(id) => return Ok(Resolution::Direct(id)),
            NormalizedRef::Lookup(query) => query,
        };

        let project_id = self.scoped_project_id(project_scope)?;
        let sections = self.directory.sections(project_id.as_deref())?;
        let exact: Vec<Candidate> = sections
            .iter()
            .filter(|s| s.id.eq_ignore_ascii_case(&query) || s.name.trim().eq_ignore_ascii_case(&query))
            .map(|s| Candidate::new(&s.id, s.name.trim(), 0))
            .collect();
        if let Some(resolution) = exact_resolution(exact) {
            return Ok(resolution);
        }
        Ok(collapse(rank_candidates(
            &query,
            &sections,
            |s| s.name.as_str(),
            |s| s.id.as_str(),
        )))
    }
}

impl<D: EntityDirectory> AssigneeSelector for DirectoryResolver<D> {
    fn resolve_assignee(
        &self,
        explicit_id: &str,
        reference: &str,
        project_hint: &str,
        task_id: &str,
    ) -> Result<Resolution, ResolveError> {
        if let Some(direct) = explicit(explicit_id) {
            return Ok(direct);
        }
        let reference = reference.trim();
        if reference.is_empty() {
            return Ok(Resolution::Absent);
        }
        if reference.eq_ignore_ascii_case(ME_REFERENCE) {
            return match self.directory.current_user_id()? {
                Some(id) => Ok(Resolution::Direct(id)),
                None => Err(ResolveError::MissingContext(
                    "current user is unknown; cannot resolve \"me\"".to_string(),
                )),
            };
        }
        let query = match normalize_entity_ref(reference, EntityKind::Assignee)? {
            NormalizedRef::Empty => return Ok(Resolution::Absent),
            NormalizedRef::Direct(id) => return Ok(Resolution::Direct(id)),
            NormalizedRef::Lookup(query) => query,
        };

        let project_id = self.assignee_project_id(project_hint, task_id)?;
        let collaborators = self.directory.collaborators(&project_id)?;
        let exact: Vec<Candidate> = collaborators
            .iter()
            .filter(|c| {
                c.id.eq_ignore_ascii_case(&query)
                    || c.name.trim().eq_ignore_ascii_case(&query)
                    || c.email.trim().eq_ignore_ascii_case(&query)
            })
            .map(|c| Candidate::new(&c.id, c.display_name(), 0))
            .collect();
        if let Some(resolution) = exact_resolution(exact) {
            return Ok(resolution);
        }
        Ok(collapse(rank_collaborators(&query, &collaborators)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::{DirectorySnapshot, Project, Section};

    fn resolver() -> DirectoryResolver<DirectorySnapshot> {
        DirectoryResolver::new(
            DirectorySnapshot::new()
                .with_project(Project::new("p1", "Work"))
                .with_project(Project::new("p2", "Workshop"))
                .with_project(Project::new("p3", "Home"))
                .with_section(Section::new("s1", "Next", "p1"))
                .with_section(Section::new("s2", "Next", "p3"))
                .with_section(Section::new("s3", "Someday", "p3"))
                .with_collaborator("p1", Collaborator::new("u1", "Ada Lovelace", "ada@example.com"))
                .with_collaborator("p1", Collaborator::new("u2", "Alan Turing", "alan@example.com"))
                .with_task("t1", "p1")
                .with_current_user("u0"),
        )
    }

    #[test]
    fn explicit_id_is_trusted_verbatim() {
        let r = resolver();
        assert_eq!(r.resolve_project("id:zzz", "Home").unwrap(), Resolution::Direct("zzz".into()));
        assert_eq!(r.resolve_section(" s9 ", "", "").unwrap(), Resolution::Direct("s9".into()));
    }

    #[test]
    fn blank_reference_is_absent() {
        assert_eq!(resolver().resolve_project("", "  ").unwrap(), Resolution::Absent);
        assert_eq!(resolver().resolve_assignee("", "", "", "").unwrap(), Resolution::Absent);
    }

    #[test]
    fn exact_name_short_circuits_fuzzy() {
        let resolution = resolver().resolve_project("", "work").unwrap();
        assert_eq!(resolution, Resolution::Matched("p1".into()));
        assert!(!resolution.is_direct());
    }

    #[test]
    fn fuzzy_ambiguity_is_reported() {
        let resolution = resolver().resolve_project("", "wor").unwrap();
        let Resolution::Ambiguous(candidates) = resolution else {
            panic!("expected ambiguity");
        };
        assert_eq!(candidates[0].name, "Work");
        assert_eq!(candidates[1].name, "Workshop");
    }

    #[test]
    fn unique_fuzzy_match_resolves() {
        assert_eq!(
            resolver().resolve_project("", "hme").unwrap(),
            Resolution::Matched("p3".into())
        );
    }

    #[test]
    fn unknown_project_is_not_found() {
        assert_eq!(resolver().resolve_project("", "Garden").unwrap(), Resolution::NotFound);
    }

    #[test]
    fn project_url_is_direct_and_wrong_kind_fails() {
        let r = resolver();
        assert_eq!(
            r.resolve_project("", "https://app.todoist.com/app/project/work-p1").unwrap(),
            Resolution::Direct("p1".into())
        );
        assert!(matches!(
            r.resolve_project("", "https://app.todoist.com/app/task/x-1"),
            Err(ResolveError::Reference(_))
        ));
    }

    #[test]
    fn section_is_scoped_by_project() {
        let r = resolver();
        assert_eq!(r.resolve_section("", "next", "Home").unwrap(), Resolution::Matched("s2".into()));
        assert_eq!(r.resolve_section("", "next", "p1").unwrap(), Resolution::Matched("s1".into()));
        assert!(matches!(
            r.resolve_section("", "next", "").unwrap(),
            Resolution::Ambiguous(c) if c.len() == 2
        ));
    }

    #[test]
    fn id_prefixed_scope_is_not_looked_up_by_name() {
        let r = DirectoryResolver::new(
            DirectorySnapshot::new()
                .with_project(Project::new("p4", "p9"))
                .with_section(Section::new("s4", "Next", "p4"))
                .with_section(Section::new("s9", "Next", "p9")),
        );
        assert_eq!(r.resolve_section("", "next", "id:p9").unwrap(), Resolution::Matched("s9".into()));
    }

    #[test]
    fn ambiguous_scope_fails_section_resolution() {
        let err = resolver().resolve_section("", "next", "wor").unwrap_err();
        assert!(err.is_ambiguous());
    }

    #[test]
    fn assignee_me_uses_current_user() {
        assert_eq!(
            resolver().resolve_assignee("", "ME", "", "").unwrap(),
            Resolution::Direct("u0".into())
        );
        let bare = DirectoryResolver::new(DirectorySnapshot::new());
        assert!(matches!(
            bare.resolve_assignee("", "me", "", ""),
            Err(ResolveError::MissingContext(_))
        ));
    }

    #[test]
    fn assignee_by_email_with_project_hint() {
        assert_eq!(
            resolver().resolve_assignee("", "ADA@example.com", "Work", "").unwrap(),
            Resolution::Matched("u1".into())
        );
    }

    #[test]
    fn assignee_scope_falls_back_to_task_project() {
        assert_eq!(
            resolver().resolve_assignee("", "turing", "", "t1").unwrap(),
            Resolution::Matched("u2".into())
        );
    }

    #[test]
    fn assignee_without_scope_needs_context() {
        let err = resolver().resolve_assignee("", "Ada", "", "").unwrap_err();
        assert_eq!(
            err.to_string(),
            "project is required when assignee is not an ID or \"me\""
        );
    }

    #[test]
    fn assignee_fuzzy_candidates_show_email() {
        let Resolution::Ambiguous(candidates) = resolver().resolve_assignee("", "a", "p1", "").unwrap()
        else {
            panic!("expected ambiguity");
        };
        // both are prefix matches; the shorter name has less slack
        assert_eq!(candidates[0].name, "Alan Turing <alan@example.com>");
        assert_eq!(candidates[1].name, "Ada Lovelace <ada@example.com>");
    }
}
