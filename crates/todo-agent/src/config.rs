//! Agent configuration
//!
//! An optional TOML file, located in order:
//! - the `--config` path (must exist)
//! - `$XDG_CONFIG_HOME/todo-agent/config.toml`
//! - `~/.config/todo-agent/config.toml`
//!
//! A default location that does not exist yields [`AgentConfig::default`].
//! Relative paths inside the file are taken relative to the file's directory.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Directory name under the user config home
pub const APP_DIR: &str = "todo-agent";

/// Config file name
pub const CONFIG_FILE: &str = "config.toml";

/// Policy file picked up next to the config file
pub const POLICY_FILE: &str = "agent_policy.json";

/// Environment override for the planner command
pub const PLANNER_ENV: &str = "TODO_AGENT_PLANNER_CMD";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("read config {path}: {source}")]
    Read {
        /// Config path
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for [`AgentConfig`]
    #[error("invalid config {path}: {source}")]
    Parse {
        /// Config path
        path: String,
        /// Underlying error
        #[source]
        source: toml::de::Error,
    },
}

/// Settings read from the config file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Shell command used as the planner
    pub planner_cmd: Option<String>,
    /// Planner timeout in seconds
    pub planner_timeout_secs: u64,
    /// Plan version accepted; 0 disables the check
    pub expected_plan_version: u32,
    /// Policy document
    pub policy_path: Option<PathBuf>,
    /// Entity directory snapshot
    pub directory_path: Option<PathBuf>,
    /// Default tracing filter
    pub log_filter: String,
    /// Emit logs as JSON lines
    pub log_json: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            planner_cmd: None,
            planner_timeout_secs: 30,
            expected_plan_version: 1,
            policy_path: None,
            directory_path: None,
            log_filter: "warn".to_string(),
            log_json: false,
        }
    }
}

impl AgentConfig {
    /// Parse TOML text
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    /// Read and parse a config file
    pub fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Expected plan version, `None` when disabled
    #[inline]
    #[must_use]
    pub fn expected_version(&self) -> Option<u32> {
        Some(self.expected_plan_version).filter(|v| *v != 0)
    }
}

/// Default config file location for this user
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    config_home(std::env::var_os("XDG_CONFIG_HOME"), dirs::home_dir())
        .map(|home| home.join(APP_DIR).join(CONFIG_FILE))
}

fn config_home(xdg: Option<OsString>, home: Option<PathBuf>) -> Option<PathBuf> {
    xdg.filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .or_else(|| home.map(|h| h.join(".config")))
}

/// Configuration together with the file it came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadedConfig {
    /// Parsed settings
    pub config: AgentConfig,
    /// Source file, if one was read
    pub path: Option<PathBuf>,
}

impl LoadedConfig {
    /// Load from `explicit`, else from the default location if present
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match default_config_path() {
            Some(path) if path.is_file() => Self::from_file(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load a specific file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Ok(Self {
            config: AgentConfig::read(path)?,
            path: Some(path.to_path_buf()),
        })
    }

    fn base_dir(&self) -> Option<&Path> {
        self.path.as_deref().and_then(Path::parent)
    }

    fn relative_to_file(&self, path: &Path) -> PathBuf {
        match self.base_dir() {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Planner command: flag, then environment, then file
    #[must_use]
    pub fn planner_cmd(&self, flag: Option<&str>, env: Option<String>) -> Option<String> {
        let non_blank = |s: &String| !s.trim().is_empty();
        flag.map(str::to_string)
            .filter(non_blank)
            .or_else(|| env.filter(non_blank))
            .or_else(|| self.config.planner_cmd.clone().filter(non_blank))
    }

    /// Policy file: flag, then file setting, then [`POLICY_FILE`] beside the config
    #[must_use]
    pub fn policy_path(&self, flag: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = flag {
            return Some(path.to_path_buf());
        }
        if let Some(path) = &self.config.policy_path {
            return Some(self.relative_to_file(path));
        }
        self.base_dir()
            .map(|base| base.join(POLICY_FILE))
            .filter(|p| p.is_file())
    }

    /// Directory snapshot: flag, then file setting
    #[must_use]
    pub fn directory_path(&self, flag: Option<&Path>) -> Option<PathBuf> {
        flag.map(Path::to_path_buf)
            .or_else(|| self.config.directory_path.as_deref().map(|p| self.relative_to_file(p)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, text: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn empty_file_gives_defaults() {
        let config = AgentConfig::from_toml("", Path::new("c.toml")).unwrap();
        assert_eq!(config, AgentConfig::default());
        assert_eq!(config.planner_timeout_secs, 30);
        assert_eq!(config.expected_version(), Some(1));
        assert_eq!(config.log_filter, "warn");
    }

    #[test]
    fn keys_are_read() {
        let text = r#"
planner_cmd = "plan-bot --json"
planner_timeout_secs = 5
expected_plan_version = 0
directory_path = "snapshot.json"
log_filter = "todo_plan=debug"
"#;
        let config = AgentConfig::from_toml(text, Path::new("c.toml")).unwrap();
        assert_eq!(config.planner_cmd.as_deref(), Some("plan-bot --json"));
        assert_eq!(config.planner_timeout_secs, 5);
        assert_eq!(config.expected_version(), None);
        assert_eq!(config.log_filter, "todo_plan=debug");
    }

    #[test]
    fn malformed_file_is_an_error() {
        let err = AgentConfig::from_toml("planner_timeout_secs = \"soon\"", Path::new("c.toml")).unwrap_err();
        assert!(err.to_string().starts_with("invalid config c.toml: "));
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = LoadedConfig::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn config_home_prefers_xdg() {
        assert_eq!(
            config_home(Some("/x".into()), Some("/home/u".into())),
            Some(PathBuf::from("/x"))
        );
        assert_eq!(
            config_home(Some(OsString::new()), Some("/home/u".into())),
            Some(PathBuf::from("/home/u/.config"))
        );
        assert_eq!(config_home(None, None), None);
    }

    #[test]
    fn planner_precedence() {
        let loaded = LoadedConfig {
            config: AgentConfig {
                planner_cmd: Some("from-file".into()),
                ..AgentConfig::default()
            },
            path: None,
        };
        assert_eq!(loaded.planner_cmd(Some("flag"), Some("env".into())).as_deref(), Some("flag"));
        assert_eq!(loaded.planner_cmd(None, Some("env".into())).as_deref(), Some("env"));
        assert_eq!(loaded.planner_cmd(Some(" "), Some(String::new())).as_deref(), Some("from-file"));
        assert_eq!(LoadedConfig::default().planner_cmd(None, None), None);
    }

    #[test]
    fn paths_resolve_beside_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = write(dir.path(), "config.toml", "directory_path = \"snap.json\"\n");
        let loaded = LoadedConfig::load(Some(&config)).unwrap();

        assert_eq!(loaded.directory_path(None), Some(dir.path().join("snap.json")));
        assert_eq!(
            loaded.directory_path(Some(Path::new("/tmp/other.json"))),
            Some(PathBuf::from("/tmp/other.json"))
        );

        assert_eq!(loaded.policy_path(None), None);
        write(dir.path(), POLICY_FILE, "{}");
        assert_eq!(loaded.policy_path(None), Some(dir.path().join(POLICY_FILE)));
    }
}
