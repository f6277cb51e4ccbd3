//! Error types for plan handling
//!
//! Provides error handling for:
//! - Schema violations found by the validator (and the compiler's own checks)
//! - Reference resolution failures during compilation
//! - Missing collaborator wiring
//! - Confirmation gating
//! - Policy rejections
//! - Plan document loading and planner failures

use crate::action::ActionKind;
use todo_refs::ResolveError;

/// Main plan error type
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    /// Malformed or incomplete plan or action
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// Reference was ambiguous, missing or could not be normalized
    #[error(transparent)]
    Resolution(#[from] ResolveError),

    /// A required collaborator was not supplied
    #[error("{0}")]
    Configuration(String),

    /// Confirmation token missing or mismatched
    #[error(transparent)]
    Confirmation(#[from] ConfirmationError),

    /// Plan rejected by policy
    #[error(transparent)]
    Policy(#[from] PolicyError),

    /// Plan document could not be loaded or written
    #[error(transparent)]
    Load(#[from] LoadError),

    /// External planner failed or produced unusable output
    #[error("{0}")]
    Planner(String),
}

/// Coarse error classification, used for exit codes and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Schema violation
    Schema,
    /// Ambiguous reference
    Ambiguous,
    /// Reference not found
    NotFound,
    /// Other resolution failure
    Resolution,
    /// Wiring defect
    Configuration,
    /// Confirmation failure
    Confirmation,
    /// Policy rejection
    Policy,
    /// Load or persistence failure
    Load,
    /// Planner failure
    Planner,
}

impl PlanError {
    /// Create configuration error
    #[inline]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Create planner failure from the planner's diagnostic output
    #[inline]
    pub fn planner_failed(message: impl std::fmt::Display) -> Self {
        Self::Planner(format!("planner failed: {message}"))
    }

    /// Classify the error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Schema(_) => ErrorKind::Schema,
            Self::Resolution(e) if e.is_ambiguous() => ErrorKind::Ambiguous,
            Self::Resolution(e) if e.is_not_found() => ErrorKind::NotFound,
            Self::Resolution(_) => ErrorKind::Resolution,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Confirmation(_) => ErrorKind::Confirmation,
            Self::Policy(_) => ErrorKind::Policy,
            Self::Load(LoadError::NotFound { .. }) => ErrorKind::NotFound,
            Self::Load(_) => ErrorKind::Load,
            Self::Planner(_) => ErrorKind::Planner,
        }
    }

    /// Check if error is retryable
    ///
    /// Nothing in plan preparation or compilation is retried; retries belong
    /// to the transport layer.
    #[inline]
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        false
    }

    /// Candidates of an ambiguous reference, for presenting choices
    #[must_use]
    pub fn candidates(&self) -> Option<&[todo_refs::Candidate]> {
        match self {
            Self::Resolution(e) => e.candidates(),
            _ => None,
        }
    }
}

/// Plan and action schema violations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Plan has no confirmation token
    #[error("plan missing confirm_token")]
    MissingConfirmToken,

    /// Plan has no actions
    #[error("plan has no actions")]
    NoActions,

    /// Plan version differs from the expected one
    #[error("unsupported plan version {found} (expected {expected})")]
    UnsupportedVersion {
        /// Version in the plan
        found: u32,
        /// Version the caller accepts
        expected: u32,
    },

    /// Action type outside the whitelist
    #[error("unsupported action type: {0}")]
    UnsupportedActionType(String),

    /// Action lacks a field its type requires
    #[error("{kind} requires {requirement}")]
    MissingField {
        /// Action type
        kind: ActionKind,
        /// Human-readable requirement, e.g. `task_id`
        requirement: &'static str,
    },
}

impl SchemaError {
    /// Create missing field error
    #[inline]
    #[must_use]
    pub fn missing(kind: ActionKind, requirement: &'static str) -> Self {
        Self::MissingField { kind, requirement }
    }
}

/// Confirmation gate errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ConfirmationError {
    /// No confirmation supplied and not forced
    #[error("--confirm is required (or use --force)")]
    Missing,

    /// Confirmation differs from the plan token
    #[error("confirmation token does not match plan")]
    Mismatch,
}

/// Policy rejections
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    /// Type absent from a non-empty allow list
    #[error("policy denied action type: {0} (not in allow list)")]
    NotAllowed(String),

    /// Type on the deny list
    #[error("policy denied action type: {0}")]
    Denied(String),

    /// Too many destructive actions in one plan
    #[error("policy exceeded max destructive actions: {count} > {max}")]
    TooManyDestructive {
        /// Destructive actions in the plan
        count: usize,
        /// Configured maximum
        max: usize,
    },
}

/// Plan document and policy file errors
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// File does not exist
    #[error("{what} file not found: {path}")]
    NotFound {
        /// Kind of document
        what: &'static str,
        /// Path as given
        path: String,
    },

    /// Document is not valid JSON for its type
    #[error("invalid {what} JSON in {source_name}: {source}")]
    InvalidJson {
        /// Kind of document
        what: &'static str,
        /// Path, or `stdin`
        source_name: String,
        /// Parse failure
        source: serde_json::Error,
    },

    /// Other I/O failure
    #[error("{context}: {source}")]
    Io {
        /// Operation that failed
        context: String,
        /// Underlying error
        source: std::io::Error,
    },
}

impl LoadError {
    /// Create I/O error with context
    #[inline]
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use todo_refs::{Candidate, EntityKind};

    #[test]
    fn schema_messages() {
        assert_eq!(
            SchemaError::missing(ActionKind::TaskMove, "task_id").to_string(),
            "task_move requires task_id"
        );
        assert_eq!(
            SchemaError::UnsupportedVersion { found: 2, expected: 1 }.to_string(),
            "unsupported plan version 2 (expected 1)"
        );
    }

    #[test]
    fn kinds_distinguish_resolution_outcomes() {
        let ambiguous = PlanError::from(ResolveError::Ambiguous {
            entity: EntityKind::Project,
            input: "wo".into(),
            candidates: vec![Candidate::new("1", "Work", 100), Candidate::new("2", "Works", 101)],
        });
        assert_eq!(ambiguous.kind(), ErrorKind::Ambiguous);
        assert_eq!(ambiguous.candidates().map(<[Candidate]>::len), Some(2));

        let missing = PlanError::from(ResolveError::NotFound {
            entity: EntityKind::Section,
            input: "x".into(),
        });
        assert_eq!(missing.kind(), ErrorKind::NotFound);
        assert!(!missing.is_retryable());
    }

    #[test]
    fn policy_messages() {
        assert_eq!(
            PolicyError::TooManyDestructive { count: 3, max: 2 }.to_string(),
            "policy exceeded max destructive actions: 3 > 2"
        );
        assert_eq!(
            PlanError::from(ConfirmationError::Mismatch).kind(),
            ErrorKind::Confirmation
        );
    }
}
