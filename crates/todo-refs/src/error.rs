//! Error types for reference resolution
//!
//! Provides error handling for:
//! - URL/identifier normalization failures
//! - Relative date parsing
//! - Ambiguous and missing matches during selector resolution
//! - Entity directory failures

use crate::fuzzy::Candidate;
use crate::web_url::EntityKind;

/// Reference normalization errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RefError {
    /// A typed URL names a different entity kind than the field expects
    #[error("expected {expected} URL, got {actual} URL")]
    EntityMismatch {
        /// Kind the caller asked for
        expected: EntityKind,
        /// Kind encoded in the URL
        actual: EntityKind,
    },

    /// Date value is not in any accepted form
    #[error(
        "invalid date {value:?}; use YYYY-MM-DD, RFC3339, today/yesterday, weekday name, or '<N> days ago'"
    )]
    InvalidDate {
        /// Raw input
        value: String,
    },

    /// Normalized range starts after it ends
    #[error("since must be on or before until ({since} > {until})")]
    InvertedRange {
        /// Normalized start date
        since: String,
        /// Normalized end date
        until: String,
    },
}

/// Failure reported by an [`EntityDirectory`](crate::EntityDirectory) implementation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct DirectoryError(pub String);

impl DirectoryError {
    /// Create new directory error
    #[inline]
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Selector resolution errors
///
/// Ambiguous and not-found outcomes are distinct variants so that callers can
/// never mistake them for an absent optional field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// Reference matched more than one candidate
    #[error("ambiguous {entity} match for {input:?}; matches: {}", join_names(.candidates))]
    Ambiguous {
        /// Entity kind being resolved
        entity: EntityKind,
        /// Reference as supplied
        input: String,
        /// Ranked candidates, best first
        candidates: Vec<Candidate>,
    },

    /// Reference matched nothing
    #[error("{entity} {input:?} not found")]
    NotFound {
        /// Entity kind being resolved
        entity: EntityKind,
        /// Reference as supplied
        input: String,
    },

    /// Resolution needs scoping information that was not supplied
    #[error("{0}")]
    MissingContext(String),

    /// Reference could not be normalized
    #[error(transparent)]
    Reference(#[from] RefError),

    /// Directory lookup failed
    #[error("directory lookup failed: {0}")]
    Directory(#[from] DirectoryError),
}

impl ResolveError {
    /// Check if error is an ambiguous match
    #[inline]
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::Ambiguous { .. })
    }

    /// Check if error is a missing match
    #[inline]
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Candidates carried by an ambiguous match
    #[must_use]
    pub fn candidates(&self) -> Option<&[Candidate]> {
        match self {
            Self::Ambiguous { candidates, .. } => Some(candidates),
            _ => None,
        }
    }
}

fn join_names(candidates: &[Candidate]) -> String {
    candidates
        .iter()
        .map(|c| c.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
