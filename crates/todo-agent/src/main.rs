//! `todo-agent` binary entry point

use chrono::Utc;
use std::process::ExitCode;
use todo_agent::config::PLANNER_ENV;
use todo_agent::{commands, exit_code, logging, Cli, Invocation, LoadedConfig};

fn main() -> ExitCode {
    let cli = match Cli::try_parse_from(std::env::args_os()) {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(todo_agent::exit::USAGE));
        }
    };
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = LoadedConfig::load(cli.config.as_deref())?;
    logging::init(&config.config.log_filter, config.config.log_json);
    tracing::debug!(path = ?config.path, "configuration loaded");

    let mut out = std::io::stdout().lock();
    match cli.invocation {
        Invocation::Validate(args) => commands::validate(&args, &config, &mut std::io::stdin().lock(), &mut out),
        Invocation::Compile(args) => commands::compile(&args, &config, std::env::var(PLANNER_ENV).ok(), &mut out),
        Invocation::Resolve(args) => commands::resolve(&args, &config, &mut out),
        Invocation::Range(args) => commands::range(&args, Utc::now(), &mut out),
    }
}
