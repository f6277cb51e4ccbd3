//! Typed web URL decoding
//!
//! Recognizes `http(s)://[www.]app.todoist.com/app/<entity>/<slug>-<id>` links
//! copied from the web app and extracts the entity kind and trailing ID.

use crate::error::RefError;
use crate::normalize::{normalize_ref, NormalizedRef};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;
use url::Url;

const APP_HOST: &str = "app.todoist.com";
const APP_PATH_ROOT: &str = "app";

/// Kind of entity a reference points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Task
    Task,
    /// Project
    Project,
    /// Section within a project
    Section,
    /// Personal label
    Label,
    /// Saved filter
    Filter,
    /// Comment on a task or project
    Comment,
    /// Project collaborator
    Assignee,
}

impl EntityKind {
    /// Lowercase name used in URLs and messages
    #[inline]
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Task => "task",
            Self::Project => "project",
            Self::Section => "section",
            Self::Label => "label",
            Self::Filter => "filter",
            Self::Comment => "comment",
            Self::Assignee => "assignee",
        }
    }

    /// Entity kinds that have their own web app URL
    #[must_use]
    pub fn from_url_segment(segment: &str) -> Option<Self> {
        match segment {
            "task" => Some(Self::Task),
            "project" => Some(Self::Project),
            "label" => Some(Self::Label),
            "filter" => Some(Self::Filter),
            _ => None,
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "task" => Ok(Self::Task),
            "project" => Ok(Self::Project),
            "section" => Ok(Self::Section),
            "label" => Ok(Self::Label),
            "filter" => Ok(Self::Filter),
            "comment" => Ok(Self::Comment),
            "assignee" | "collaborator" => Ok(Self::Assignee),
            other => Err(format!("unknown entity kind: {other}")),
        }
    }
}

/// Entity kind and ID decoded from a web URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntityUrl {
    /// Entity kind from the path
    pub entity: EntityKind,
    /// Trailing ID from the last slug segment
    pub id: String,
}

/// Parse a web app URL into its entity kind and ID
///
/// Returns `None` for anything that is not a recognized entity link; the
/// caller then falls back to plain normalization.
#[must_use]
pub fn parse_entity_url(raw: &str) -> Option<ParsedEntityUrl> {
    let url = Url::parse(raw.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?.to_ascii_lowercase();
    if host.strip_prefix("www.").unwrap_or(&host) != APP_HOST {
        return None;
    }

    let path = urlencoding::decode(url.path()).ok()?;
    let parts: Vec<&str> = path.trim_matches('/').split('/').collect();
    if parts.len() < 3 || parts[0] != APP_PATH_ROOT {
        return None;
    }
    let entity = EntityKind::from_url_segment(&parts[1].trim().to_ascii_lowercase())?;

    let slug = parts[2].trim();
    let id = match slug.rfind('-') {
        Some(dash) if dash + 1 < slug.len() => &slug[dash + 1..],
        _ => slug,
    };
    if id.is_empty() {
        return None;
    }

    Some(ParsedEntityUrl {
        entity,
        id: id.to_string(),
    })
}

/// Normalize a reference that may be a typed URL
///
/// A URL for a different entity kind is an error rather than a silently
/// wrong ID. Non-URL input falls back to [`normalize_ref`].
pub fn normalize_entity_ref(value: &str, expected: EntityKind) -> Result<NormalizedRef, RefError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(NormalizedRef::Empty);
    }
    if let Some(parsed) = parse_entity_url(trimmed) {
        if parsed.entity != expected {
            return Err(RefError::EntityMismatch {
                expected,
                actual: parsed.entity,
            });
        }
        return Ok(NormalizedRef::Direct(parsed.id));
    }
    Ok(normalize_ref(trimmed))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_task_url_with_slug() {
        let parsed =
            parse_entity_url("https://app.todoist.com/app/task/call-mom-6Jf8VQXxpwv56VQ7").unwrap();
        assert_eq!(parsed.entity, EntityKind::Task);
        assert_eq!(parsed.id, "6Jf8VQXxpwv56VQ7");
    }

    #[test]
    fn accepts_www_http_and_trailing_slash() {
        let parsed = parse_entity_url("http://www.app.todoist.com/app/project/home-2203306141/").unwrap();
        assert_eq!(parsed.entity, EntityKind::Project);
        assert_eq!(parsed.id, "2203306141");
    }

    #[test]
    fn slug_without_dash_is_the_id() {
        let parsed = parse_entity_url("https://app.todoist.com/app/label/12345?view=list").unwrap();
        assert_eq!(parsed.entity, EntityKind::Label);
        assert_eq!(parsed.id, "12345");
    }

    #[test]
    fn escaped_path_is_decoded_before_splitting() {
        let parsed = parse_entity_url("https://app.todoist.com/app/project/home%2D2203306141").unwrap();
        assert_eq!(parsed.entity, EntityKind::Project);
        assert_eq!(parsed.id, "2203306141");

        let parsed = parse_entity_url("https://app.todoist.com/app/task/caf%C3%A9-run-6Jf8").unwrap();
        assert_eq!(parsed.id, "6Jf8");
    }

    #[test]
    fn rejects_foreign_hosts_and_paths() {
        assert!(parse_entity_url("https://example.com/app/task/x-1").is_none());
        assert!(parse_entity_url("https://app.todoist.com/app/settings/x-1").is_none());
        assert!(parse_entity_url("https://app.todoist.com/task/x-1").is_none());
        assert!(parse_entity_url("ftp://app.todoist.com/app/task/x-1").is_none());
        assert!(parse_entity_url("Work").is_none());
    }

    #[test]
    fn entity_ref_mismatch_is_an_error() {
        let err = normalize_entity_ref("https://app.todoist.com/app/task/x-99", EntityKind::Project)
            .unwrap_err();
        assert_eq!(
            err,
            RefError::EntityMismatch {
                expected: EntityKind::Project,
                actual: EntityKind::Task,
            }
        );
    }

    #[test]
    fn entity_ref_falls_back_to_plain_normalization() {
        assert_eq!(
            normalize_entity_ref("https://app.todoist.com/app/project/inbox-77", EntityKind::Project),
            Ok(NormalizedRef::Direct("77".into()))
        );
        assert_eq!(
            normalize_entity_ref("Errands", EntityKind::Project),
            Ok(NormalizedRef::Lookup("Errands".into()))
        );
        assert_eq!(normalize_entity_ref("  ", EntityKind::Task), Ok(NormalizedRef::Empty));
    }

    #[test]
    fn entity_kind_parses_cli_names() {
        assert_eq!("Project".parse::<EntityKind>(), Ok(EntityKind::Project));
        assert_eq!("collaborator".parse::<EntityKind>(), Ok(EntityKind::Assignee));
        assert!("widget".parse::<EntityKind>().is_err());
    }
}
