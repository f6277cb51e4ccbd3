//! Command-line surface
//!
//! Built with the clap builder API; matches are converted into typed
//! argument structs so commands never touch [`ArgMatches`].

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::path::PathBuf;

/// Which selector `resolve` exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveTarget {
    /// Project by name
    Project,
    /// Section, optionally scoped by `--project`
    Section,
    /// Collaborator, scoped by `--project` or `--task`
    Assignee,
}

/// `validate` arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidateArgs {
    /// Plan path, `-` for stdin
    pub plan: String,
    /// Overrides the configured version
    pub expected_version: Option<u32>,
    /// Accept plans without actions
    pub allow_empty: bool,
    /// JSON output
    pub json: bool,
}

/// `compile` arguments
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileArgs {
    /// Plan path, `-` for stdin
    pub plan: Option<String>,
    /// Instruction for the planner
    pub instruction: Option<String>,
    /// Confirmation token
    pub confirm: String,
    /// Skip confirmation
    pub force: bool,
    /// Preview; empty plans accepted
    pub dry_run: bool,
    /// Directory snapshot
    pub directory: Option<PathBuf>,
    /// Policy document
    pub policy: Option<PathBuf>,
    /// Planner command
    pub planner: Option<String>,
    /// Write the prepared plan here
    pub save: Option<PathBuf>,
    /// JSON output
    pub json: bool,
}

/// `resolve` arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveArgs {
    /// Selector to run
    pub target: ResolveTarget,
    /// Reference text
    pub reference: String,
    /// Project scope or hint
    pub project: String,
    /// Task whose project scopes an assignee
    pub task: String,
    /// Directory snapshot
    pub directory: Option<PathBuf>,
    /// JSON output
    pub json: bool,
}

/// `range` arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeArgs {
    /// Start expression
    pub since: String,
    /// End expression
    pub until: String,
    /// JSON output
    pub json: bool,
}

/// Parsed subcommand
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    /// Check a plan document
    Validate(ValidateArgs),
    /// Gate and compile a plan
    Compile(CompileArgs),
    /// Run one selector
    Resolve(ResolveArgs),
    /// Normalize a date range
    Range(RangeArgs),
}

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    /// Explicit config file
    pub config: Option<PathBuf>,
    /// Subcommand
    pub invocation: Invocation,
}

fn json_flag() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

fn directory_arg() -> Arg {
    Arg::new("directory")
        .long("directory")
        .value_parser(value_parser!(PathBuf))
        .help("Entity directory snapshot (JSON)")
}

/// Command definition
#[must_use]
pub fn command() -> Command {
    Command::new("todo-agent")
        .version(crate::VERSION)
        .about("Validate, gate and compile task-service action plans")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Config file (default: $XDG_CONFIG_HOME/todo-agent/config.toml)"),
        )
        .subcommand(
            Command::new("validate")
                .about("Check a plan document and print its summary")
                .arg(
                    Arg::new("plan")
                        .long("plan")
                        .required(true)
                        .help("Plan file, or - for stdin"),
                )
                .arg(
                    Arg::new("expected-version")
                        .long("expected-version")
                        .value_parser(value_parser!(u32))
                        .help("Plan version to accept (0 disables the check)"),
                )
                .arg(
                    Arg::new("allow-empty")
                        .long("allow-empty")
                        .action(ArgAction::SetTrue)
                        .help("Accept plans without actions"),
                )
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("compile")
                .about("Prepare a plan and print one request per action")
                .arg(
                    Arg::new("plan")
                        .long("plan")
                        .conflicts_with("instruction")
                        .help("Plan file, or - for stdin"),
                )
                .arg(
                    Arg::new("instruction")
                        .long("instruction")
                        .help("Ask the planner for a plan"),
                )
                .arg(
                    Arg::new("confirm")
                        .long("confirm")
                        .help("Confirmation token shown with the plan"),
                )
                .arg(
                    Arg::new("force")
                        .long("force")
                        .action(ArgAction::SetTrue)
                        .help("Skip confirmation"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Preview; plans without actions are accepted"),
                )
                .arg(directory_arg())
                .arg(
                    Arg::new("policy")
                        .long("policy")
                        .value_parser(value_parser!(PathBuf))
                        .help("Policy document (JSON)"),
                )
                .arg(
                    Arg::new("planner")
                        .long("planner")
                        .help("Planner shell command"),
                )
                .arg(
                    Arg::new("save")
                        .long("save")
                        .value_parser(value_parser!(PathBuf))
                        .help("Write the prepared plan to this path"),
                )
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("resolve")
                .about("Resolve a reference against a directory snapshot")
                .arg(
                    Arg::new("target")
                        .required(true)
                        .value_parser(["project", "section", "assignee"])
                        .help("Entity to resolve"),
                )
                .arg(Arg::new("reference").required(true).help("Name, ID, id:ID or URL"))
                .arg(
                    Arg::new("project")
                        .long("project")
                        .default_value("")
                        .help("Project scope for sections, or hint for assignees"),
                )
                .arg(
                    Arg::new("task")
                        .long("task")
                        .default_value("")
                        .help("Task whose project scopes an assignee"),
                )
                .arg(directory_arg())
                .arg(json_flag()),
        )
        .subcommand(
            Command::new("range")
                .about("Normalize a date range")
                .arg(
                    Arg::new("since")
                        .long("since")
                        .required(true)
                        .help("Start: YYYY-MM-DD, RFC3339, today, weekday or '<N> days ago'"),
                )
                .arg(
                    Arg::new("until")
                        .long("until")
                        .default_value("")
                        .help("End (default: today)"),
                )
                .arg(json_flag()),
        )
}

fn string(args: &ArgMatches, id: &str) -> String {
    args.get_one::<String>(id).cloned().unwrap_or_default()
}

impl Cli {
    /// Parse an argument list, program name first
    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = command().try_get_matches_from(args)?;
        Self::from_matches(&matches)
    }

    fn from_matches(matches: &ArgMatches) -> Result<Self, clap::Error> {
        let config = matches.get_one::<PathBuf>("config").cloned();
        let invocation = match matches.subcommand() {
            Some(("validate", args)) => Invocation::Validate(ValidateArgs {
                plan: string(args, "plan"),
                expected_version: args.get_one::<u32>("expected-version").copied(),
                allow_empty: args.get_flag("allow-empty"),
                json: args.get_flag("json"),
            }),
            Some(("compile", args)) => Invocation::Compile(CompileArgs {
                plan: args.get_one::<String>("plan").cloned(),
                instruction: args.get_one::<String>("instruction").cloned(),
                confirm: string(args, "confirm"),
                force: args.get_flag("force"),
                dry_run: args.get_flag("dry-run"),
                directory: args.get_one::<PathBuf>("directory").cloned(),
                policy: args.get_one::<PathBuf>("policy").cloned(),
                planner: args.get_one::<String>("planner").cloned(),
                save: args.get_one::<PathBuf>("save").cloned(),
                json: args.get_flag("json"),
            }),
            Some(("resolve", args)) => Invocation::Resolve(ResolveArgs {
                target: match string(args, "target").as_str() {
                    "section" => ResolveTarget::Section,
                    "assignee" => ResolveTarget::Assignee,
                    _ => ResolveTarget::Project,
                },
                reference: string(args, "reference"),
                project: string(args, "project"),
                task: string(args, "task"),
                directory: args.get_one::<PathBuf>("directory").cloned(),
                json: args.get_flag("json"),
            }),
            Some(("range", args)) => Invocation::Range(RangeArgs {
                since: string(args, "since"),
                until: string(args, "until"),
                json: args.get_flag("json"),
            }),
            _ => {
                return Err(command().error(
                    clap::error::ErrorKind::MissingSubcommand,
                    "a subcommand is required",
                ))
            }
        };
        Ok(Self { config, invocation })
    }
}
