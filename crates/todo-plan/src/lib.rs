//! Todo Plan - validation, gating and compilation of action plans
//!
//! A plan is an ordered batch of declarative actions produced by a planner or
//! loaded from disk. This crate:
//! - Validates plan and action structure
//! - Gates a plan behind policy and a confirmation token
//! - Compiles each action into a transport-agnostic request
//! - Loads, normalizes and persists plan documents
//! - Runs an external command as a planner
//!
//! # Example
//!
//! ```rust
//! use todo_plan::{compile_plan, Action, ActionKind, Method, Plan, Resolvers};
//!
//! let plan = Plan::new("ab12").with_action(Action {
//!     content: "hi".into(),
//!     task_id: "t1".into(),
//!     ..Action::new(ActionKind::CommentAdd)
//! });
//!
//! let requests = compile_plan(&plan, &Resolvers::none()).unwrap();
//! assert_eq!(requests[0].method, Method::Post);
//! assert_eq!(requests[0].path, "/comments");
//! ```

#![warn(missing_docs)]

pub mod action;
pub mod compiler;
pub mod error;
pub mod planner;
pub mod policy;
pub mod prepare;
pub mod store;
pub mod types;
pub mod validation;

// Re-exports for convenience
pub use action::{Action, ActionKind};
pub use compiler::{compile_action, compile_plan, ActionRequest, Body, Method, Resolvers};
pub use error::{ConfirmationError, ErrorKind, LoadError, PlanError, PolicyError, SchemaError};
pub use planner::{CommandPlanner, PlannerContext, PlannerRequest};
pub use policy::AgentPolicy;
pub use prepare::{
    prepare_plan, PlanLoader, PlanPolicy, PlanValidator, Planner, PrepareDeps, PrepareInput,
    SchemaValidator, Stage,
};
pub use store::{new_confirm_token, normalize_plan, read_plan, write_plan, PlanFile};
pub use types::{summarize_actions, Plan, PlanSummary, PLAN_VERSION};
pub use validation::{validate_action, validate_plan};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with plans
    pub use crate::{
        compile_plan, prepare_plan, validate_plan, Action, ActionKind, ActionRequest, Plan,
        PlanError, PrepareDeps, PrepareInput, Resolvers,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
