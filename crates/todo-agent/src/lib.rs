//! Todo Agent - command-line front end
//!
//! Wires the reference and plan libraries into a binary:
//! - TOML configuration with environment and flag overrides
//! - stderr logging through `tracing-subscriber`
//! - `validate`, `compile`, `resolve` and `range` subcommands
//! - exit codes distinguishing usage problems from missing entities

#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod exit;
pub mod logging;

pub use cli::{Cli, Invocation};
pub use config::{AgentConfig, ConfigError, LoadedConfig};
pub use exit::{exit_code, UsageError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
