//! Subcommand implementations
//!
//! Each command writes its result to `out` and returns an error chain that
//! [`exit_code`](crate::exit::exit_code) maps to a process status.

use crate::cli::{CompileArgs, RangeArgs, ResolveArgs, ResolveTarget, ValidateArgs};
use crate::config::LoadedConfig;
use crate::exit::UsageError;
use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use serde_json::json;
use std::io::{Read, Write};
use std::path::Path;
use std::time::Duration;
use todo_plan::{
    compile_plan, prepare_plan, read_plan, summarize_actions, validate_plan, write_plan, AgentPolicy,
    CommandPlanner, PlanError, PlanFile, PlannerContext, PrepareDeps, PrepareInput, Resolvers,
    SchemaValidator,
};
use todo_refs::{
    normalize_date_range, AssigneeSelector, DirectoryResolver, DirectorySnapshot, EntityKind,
    ProjectSelector, SectionSelector,
};

/// Read a directory snapshot document
pub fn load_directory(path: &Path) -> anyhow::Result<DirectorySnapshot> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read directory snapshot {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("invalid directory snapshot {}", path.display()))
}

/// `validate`: schema-check a plan and print its summary
pub fn validate<R: Read, W: Write>(
    args: &ValidateArgs,
    config: &LoadedConfig,
    stdin: &mut R,
    out: &mut W,
) -> anyhow::Result<()> {
    let plan = read_plan(&args.plan, stdin)?;
    let expected = match args.expected_version {
        Some(version) => Some(version).filter(|v| *v != 0),
        None => config.config.expected_version(),
    };
    let summary = summarize_actions(&plan.actions);
    match validate_plan(&plan, expected, args.allow_empty) {
        Ok(()) => {
            if args.json {
                writeln!(out, "{}", json!({"valid": true, "summary": summary}))?;
            } else {
                writeln!(out, "valid: {summary}")?;
            }
            Ok(())
        }
        Err(e) => {
            if args.json {
                writeln!(out, "{}", json!({"valid": false, "error": e.to_string()}))?;
            }
            Err(PlanError::from(e).into())
        }
    }
}

/// `compile`: run the preparation gate, then compile every action
pub fn compile<W: Write>(
    args: &CompileArgs,
    config: &LoadedConfig,
    planner_env: Option<String>,
    out: &mut W,
) -> anyhow::Result<()> {
    let snapshot = config
        .directory_path(args.directory.as_deref())
        .map(|path| load_directory(&path))
        .transpose()?;
    let policy = config
        .policy_path(args.policy.as_deref())
        .map(|path| AgentPolicy::load(&path))
        .transpose()?;
    let planner = config
        .planner_cmd(args.planner.as_deref(), planner_env)
        .map(|command| {
            let planner = CommandPlanner::new(command)
                .with_timeout(Duration::from_secs(config.config.planner_timeout_secs))
                .with_expected_version(config.config.expected_version());
            match &snapshot {
                Some(snapshot) => planner.with_context(PlannerContext::from_snapshot(snapshot)),
                None => planner,
            }
        });

    let loader = PlanFile;
    let mut deps = PrepareDeps::new()
        .with_loader(&loader)
        .with_validator(&SchemaValidator);
    if let Some(planner) = &planner {
        deps = deps.with_planner(planner);
    }
    if let Some(policy) = &policy {
        deps = deps.with_policy(policy);
    }

    let input = PrepareInput {
        plan_path: args.plan.clone().unwrap_or_default(),
        instruction: args.instruction.clone().unwrap_or_default(),
        confirm: args.confirm.clone(),
        expected_version: config.config.expected_version(),
        force: args.force,
        dry_run: args.dry_run,
    };
    let plan = prepare_plan(&input, &deps)?;
    if let Some(path) = &args.save {
        write_plan(path, &plan)?;
    }

    let resolver = snapshot.map(DirectoryResolver::new);
    let resolvers = resolver.as_ref().map_or_else(Resolvers::none, Resolvers::all);
    let requests = compile_plan(&plan, &resolvers)?;

    if args.json {
        let document = json!({
            "confirm_token": plan.confirm_token,
            "summary": plan.summary,
            "requests": requests,
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&document)?)?;
    } else {
        for request in &requests {
            writeln!(out, "{request}")?;
        }
    }
    Ok(())
}

/// `resolve`: run one selector and print the ID or the candidates
pub fn resolve<W: Write>(args: &ResolveArgs, config: &LoadedConfig, out: &mut W) -> anyhow::Result<()> {
    let path = config
        .directory_path(args.directory.as_deref())
        .ok_or_else(|| UsageError("--directory is required (or set directory_path in the config)".into()))?;
    let resolver = DirectoryResolver::new(load_directory(&path)?);

    let (entity, resolution) = match args.target {
        ResolveTarget::Project => (EntityKind::Project, resolver.resolve_project("", &args.reference)?),
        ResolveTarget::Section => (
            EntityKind::Section,
            resolver.resolve_section("", &args.reference, &args.project)?,
        ),
        ResolveTarget::Assignee => (
            EntityKind::Assignee,
            resolver.resolve_assignee("", &args.reference, &args.project, &args.task)?,
        ),
    };

    match resolution.into_id(entity, &args.reference) {
        Ok(Some(id)) => {
            if args.json {
                writeln!(out, "{}", json!({"id": id}))?;
            } else {
                writeln!(out, "{id}")?;
            }
            Ok(())
        }
        Ok(None) => Err(UsageError("reference is empty".into()).into()),
        Err(e) => {
            if let Some(candidates) = e.candidates() {
                if args.json {
                    writeln!(out, "{}", json!({"candidates": candidates}))?;
                } else {
                    for candidate in candidates {
                        writeln!(out, "{}\t{}", candidate.id, candidate.name)?;
                    }
                }
            }
            Err(e.into())
        }
    }
}

fn day(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default()
}

/// `range`: normalize `since`/`until` against `now`
pub fn range<W: Write>(args: &RangeArgs, now: DateTime<Utc>, out: &mut W) -> anyhow::Result<()> {
    let range = normalize_date_range(now, &args.since, &args.until)?;
    let (since, until) = (day(range.since), day(range.until));
    if args.json {
        writeln!(out, "{}", json!({"since": since, "until": until}))?;
    } else {
        writeln!(out, "{since} {until}")?;
    }
    Ok(())
}
