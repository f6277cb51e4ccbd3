//! Process exit codes
//!
//! - 0: success
//! - 1: any other failure
//! - 2: usage, schema, configuration or confirmation problems
//! - 3: something named by the user was not found

use todo_plan::{ErrorKind, LoadError, PlanError};
use todo_refs::{RefError, ResolveError};

/// Success
pub const SUCCESS: u8 = 0;
/// Generic failure
pub const FAILURE: u8 = 1;
/// Bad invocation or input
pub const USAGE: u8 = 2;
/// Named entity or file not found
pub const NOT_FOUND: u8 = 3;

/// Invocation problem detected by the front end itself
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct UsageError(pub String);

/// Exit code for an error chain; the first recognized cause decides
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if let Some(e) = cause.downcast_ref::<PlanError>() {
            return plan_code(e);
        }
        if let Some(e) = cause.downcast_ref::<ResolveError>() {
            return resolve_code(e);
        }
        if let Some(e) = cause.downcast_ref::<LoadError>() {
            return load_code(e);
        }
        if cause.is::<RefError>() || cause.is::<UsageError>() || cause.is::<clap::Error>() {
            return USAGE;
        }
    }
    FAILURE
}

fn plan_code(e: &PlanError) -> u8 {
    match e.kind() {
        ErrorKind::Schema | ErrorKind::Configuration | ErrorKind::Confirmation => USAGE,
        ErrorKind::NotFound => NOT_FOUND,
        _ => FAILURE,
    }
}

fn resolve_code(e: &ResolveError) -> u8 {
    match e {
        ResolveError::NotFound { .. } => NOT_FOUND,
        ResolveError::MissingContext(_) | ResolveError::Reference(_) => USAGE,
        _ => FAILURE,
    }
}

fn load_code(e: &LoadError) -> u8 {
    match e {
        LoadError::NotFound { .. } => NOT_FOUND,
        _ => FAILURE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use todo_plan::{ConfirmationError, SchemaError};
    use todo_refs::EntityKind;

    #[test]
    fn plan_errors() {
        let schema = anyhow::Error::from(PlanError::from(SchemaError::NoActions));
        assert_eq!(exit_code(&schema), USAGE);

        let confirm = anyhow::Error::from(PlanError::from(ConfirmationError::Mismatch));
        assert_eq!(exit_code(&confirm), USAGE);

        let planner = anyhow::Error::from(PlanError::planner_failed("exit 1"));
        assert_eq!(exit_code(&planner), FAILURE);
    }

    #[test]
    fn not_found_through_context() {
        let missing: Result<(), ResolveError> = Err(ResolveError::NotFound {
            entity: EntityKind::Project,
            input: "Garden".into(),
        });
        let err = missing.context("resolve project").unwrap_err();
        assert_eq!(exit_code(&err), NOT_FOUND);

        let file = anyhow::Error::from(LoadError::NotFound {
            what: "plan",
            path: "p.json".into(),
        });
        assert_eq!(exit_code(&file), NOT_FOUND);
    }

    #[test]
    fn unrecognized_is_generic() {
        assert_eq!(exit_code(&anyhow::anyhow!("disk on fire")), FAILURE);
        assert_eq!(exit_code(&UsageError("bad".into()).into()), USAGE);
    }
}
