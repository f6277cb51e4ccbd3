//! Plan preparation gate
//!
//! Linear, no retries:
//!
//! ```text
//! SourceSelected -> Loaded | Planned -> Validated -> PolicyChecked -> Confirmed
//! ```
//!
//! Exactly one of load-from-path and invoke-planner runs, chosen by whether a
//! plan path was given. Validation and policy run when their collaborator is
//! configured. Unless forced, a confirmation must be supplied and must match
//! the plan's token. Any failure aborts the whole batch.

use crate::error::{ConfirmationError, PlanError};
use crate::types::Plan;
use crate::validation::validate_plan;
use std::fmt::{self, Debug, Display, Formatter};

/// Loads a stored plan document
pub trait PlanLoader {
    /// Load the plan at `path` (`-` for stdin where supported)
    fn load(&self, path: &str) -> Result<Plan, PlanError>;
}

/// Produces a plan from a free-text instruction
pub trait Planner {
    /// Plan the instruction
    fn plan(&self, instruction: &str) -> Result<Plan, PlanError>;
}

/// Structural plan validation
pub trait PlanValidator {
    /// Validate; `allow_empty` admits plans without actions
    fn validate(&self, plan: &Plan, expected_version: Option<u32>, allow_empty: bool) -> Result<(), PlanError>;
}

/// Business-rule check orthogonal to schema validity
pub trait PlanPolicy {
    /// Accept or reject the plan
    fn check(&self, plan: &Plan) -> Result<(), PlanError>;
}

/// [`PlanValidator`] backed by [`validate_plan`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaValidator;

impl PlanValidator for SchemaValidator {
    fn validate(&self, plan: &Plan, expected_version: Option<u32>, allow_empty: bool) -> Result<(), PlanError> {
        Ok(validate_plan(plan, expected_version, allow_empty)?)
    }
}

/// Gate stage, reported in trace events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Source chosen
    SourceSelected,
    /// Plan read from storage
    Loaded,
    /// Plan produced by the planner
    Planned,
    /// Schema checks passed
    Validated,
    /// Policy accepted the plan
    PolicyChecked,
    /// Confirmation accepted; ready for compilation
    Confirmed,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::SourceSelected => "source_selected",
            Self::Loaded => "loaded",
            Self::Planned => "planned",
            Self::Validated => "validated",
            Self::PolicyChecked => "policy_checked",
            Self::Confirmed => "confirmed",
        })
    }
}

/// Caller-supplied gate input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrepareInput {
    /// Plan document path; blank selects the planner
    pub plan_path: String,
    /// Instruction for the planner
    pub instruction: String,
    /// Confirmation echoed by the user
    pub confirm: String,
    /// Plan version accepted by the caller
    pub expected_version: Option<u32>,
    /// Skip the confirmation check
    pub force: bool,
    /// Preview only; plans without actions are accepted
    pub dry_run: bool,
}

impl PrepareInput {
    /// Load from a plan path
    #[must_use]
    pub fn from_path(path: impl Into<String>) -> Self {
        Self {
            plan_path: path.into(),
            ..Self::default()
        }
    }

    /// Produce with the planner
    #[must_use]
    pub fn from_instruction(instruction: impl Into<String>) -> Self {
        Self {
            instruction: instruction.into(),
            ..Self::default()
        }
    }

    /// With confirmation
    #[must_use]
    pub fn with_confirm(mut self, confirm: impl Into<String>) -> Self {
        self.confirm = confirm.into();
        self
    }

    /// With expected version
    #[must_use]
    pub fn with_expected_version(mut self, version: u32) -> Self {
        self.expected_version = Some(version);
        self
    }

    /// Skip confirmation
    #[must_use]
    pub fn forced(mut self) -> Self {
        self.force = true;
        self
    }

    /// Preview mode
    #[must_use]
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }
}

/// Gate collaborators; all optional, required only by the path taken
#[derive(Clone, Copy, Default)]
pub struct PrepareDeps<'a> {
    loader: Option<&'a dyn PlanLoader>,
    planner: Option<&'a dyn Planner>,
    validator: Option<&'a dyn PlanValidator>,
    policy: Option<&'a dyn PlanPolicy>,
}

impl Debug for PrepareDeps<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrepareDeps")
            .field("loader", &self.loader.is_some())
            .field("planner", &self.planner.is_some())
            .field("validator", &self.validator.is_some())
            .field("policy", &self.policy.is_some())
            .finish()
    }
}

impl<'a> PrepareDeps<'a> {
    /// No collaborators
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With loader
    #[must_use]
    pub fn with_loader(mut self, loader: &'a dyn PlanLoader) -> Self {
        self.loader = Some(loader);
        self
    }

    /// With planner
    #[must_use]
    pub fn with_planner(mut self, planner: &'a dyn Planner) -> Self {
        self.planner = Some(planner);
        self
    }

    /// With validator
    #[must_use]
    pub fn with_validator(mut self, validator: &'a dyn PlanValidator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// With policy
    #[must_use]
    pub fn with_policy(mut self, policy: &'a dyn PlanPolicy) -> Self {
        self.policy = Some(policy);
        self
    }
}

/// Run the gate and return a plan that is ready for compilation
pub fn prepare_plan(input: &PrepareInput, deps: &PrepareDeps<'_>) -> Result<Plan, PlanError> {
    let plan_path = input.plan_path.trim();
    let plan = if plan_path.is_empty() {
        if input.instruction.trim().is_empty() {
            return Err(PlanError::configuration(
                "instruction is required when --plan is not provided",
            ));
        }
        let planner = deps
            .planner
            .ok_or_else(|| PlanError::configuration("planner is not configured"))?;
        tracing::debug!(stage = %Stage::SourceSelected, source = "planner");
        let plan = planner.plan(&input.instruction)?;
        tracing::debug!(stage = %Stage::Planned, actions = plan.actions.len());
        plan
    } else {
        let loader = deps
            .loader
            .ok_or_else(|| PlanError::configuration("plan loader is not configured"))?;
        tracing::debug!(stage = %Stage::SourceSelected, source = "file", path = plan_path);
        let plan = loader.load(&input.plan_path)?;
        tracing::debug!(stage = %Stage::Loaded, actions = plan.actions.len());
        plan
    };

    if let Some(validator) = deps.validator {
        validator.validate(&plan, input.expected_version, input.dry_run)?;
        tracing::debug!(stage = %Stage::Validated);
    }
    if let Some(policy) = deps.policy {
        policy.check(&plan)?;
        tracing::debug!(stage = %Stage::PolicyChecked);
    }

    if !input.force {
        let confirm = input.confirm.trim();
        if confirm.is_empty() {
            return Err(ConfirmationError::Missing.into());
        }
        if !plan.confirm_token.is_empty() && confirm != plan.confirm_token {
            return Err(ConfirmationError::Mismatch.into());
        }
    }
    tracing::info!(stage = %Stage::Confirmed, summary = %plan.summary, forced = input.force, "plan ready");
    Ok(plan)
}
