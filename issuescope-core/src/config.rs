//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/issuescope/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/issuescope/` (~/.config/issuescope/)
//! - State/Logs: `$XDG_STATE_HOME/issuescope/` (~/.local/state/issuescope/)
//!
//! Run parameters (`label`, `user`) are resolved once per run into
//! [`RunParams`] and handed to every analysis explicitly.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Environment variable that overrides `[data] path`.
pub const DATA_PATH_ENV: &str = "ISSUESCOPE_DATA_PATH";

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Issue dataset location
    #[serde(default)]
    pub data: DataConfig,

    /// Analysis configuration
    #[serde(default)]
    pub analysis: AnalysisConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the issue dataset lives
#[derive(Debug, Deserialize, Default)]
pub struct DataConfig {
    /// Path to a JSON file holding an array of issues
    pub path: Option<PathBuf>,
}

/// Analysis configuration
#[derive(Debug, Deserialize)]
pub struct AnalysisConfig {
    /// How many creators the top-creators ranking keeps
    #[serde(default = "default_top_creators")]
    pub top_creators: usize,

    /// Analyses that are not registered with the default engine
    #[serde(default)]
    pub disabled_analyses: Vec<String>,

    /// Default `label` parameter when no flag is given
    pub label: Option<String>,

    /// Default `user` parameter when no flag is given
    pub user: Option<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_creators: default_top_creators(),
            disabled_analyses: vec![],
            label: None,
            user: None,
        }
    }
}

fn default_top_creators() -> usize {
    50
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Resolve the dataset path.
    ///
    /// Precedence: explicit override, then `ISSUESCOPE_DATA_PATH`, then `[data] path`.
    pub fn dataset_path(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = std::env::var_os(DATA_PATH_ENV).filter(|p| !p.is_empty()) {
            return Ok(PathBuf::from(path));
        }
        self.data.path.clone().ok_or(Error::DatasetNotConfigured)
    }

    /// Resolve run parameters, letting flags win over configured defaults.
    pub fn run_params(&self, label: Option<String>, user: Option<String>) -> RunParams {
        RunParams::new(
            label.or_else(|| self.analysis.label.clone()),
            user.or_else(|| self.analysis.user.clone()),
        )
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/issuescope/config.toml` (~/.config/issuescope/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("issuescope").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/issuescope/` (~/.local/state/issuescope/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("issuescope")
    }

    /// Returns the log file path
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("issuescope.log")
    }
}

/// Parameters for a single analysis run.
///
/// Blank values are normalized to `None` so that `--label ""` behaves
/// exactly like not passing the flag.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunParams {
    /// Label filter; exact label or category prefix depending on the analysis
    pub label: Option<String>,
    /// Actor filter
    pub user: Option<String>,
}

impl RunParams {
    pub fn new(label: Option<String>, user: Option<String>) -> Self {
        Self {
            label: non_blank(label),
            user: non_blank(user),
        }
    }

    /// Read a named parameter. Unknown keys are `None`.
    pub fn get_parameter(&self, key: &str) -> Option<&str> {
        match key {
            "label" => self.label.as_deref(),
            "user" => self.user.as_deref(),
            _ => None,
        }
    }

    /// The label parameter interpreted as a category prefix.
    ///
    /// Trailing separators are dropped, so `status/` and `status` are equivalent.
    pub fn require_label_prefix(&self) -> Result<&str> {
        self.label
            .as_deref()
            .map(|label| label.trim_end_matches('/'))
            .filter(|prefix| !prefix.is_empty())
            .ok_or(Error::MissingParameter {
                parameter: "label",
                message: "Error: No label prefix provided. Please specify a label with the --label flag.",
            })
    }

    /// The user parameter; required by per-actor analyses.
    pub fn require_user(&self) -> Result<&str> {
        self.user.as_deref().ok_or(Error::MissingParameter {
            parameter: "user",
            message: "No user specified. Please provide a user with the --user flag.",
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.data.path.is_none());
        assert_eq!(config.analysis.top_creators, 50);
        assert!(config.analysis.disabled_analyses.is_empty());
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[data]
path = "/tmp/issues.json"

[analysis]
top_creators = 10
disabled_analyses = ["top_creators"]
label = "kind/bug"

[logging]
level = "debug"
"#;
        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.data.path, Some(PathBuf::from("/tmp/issues.json")));
        assert_eq!(config.analysis.top_creators, 10);
        assert_eq!(config.analysis.disabled_analyses, vec!["top_creators"]);
        assert_eq!(config.analysis.label.as_deref(), Some("kind/bug"));
        assert!(config.analysis.user.is_none());
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_from_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[analysis\ntop_creators = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_explicit_dataset_path_wins() {
        let config = Config {
            data: DataConfig {
                path: Some(PathBuf::from("/from/config.json")),
            },
            ..Default::default()
        };
        let path = config
            .dataset_path(Some(Path::new("/from/flag.json")))
            .unwrap();
        assert_eq!(path, PathBuf::from("/from/flag.json"));
    }

    #[test]
    fn test_flags_override_configured_params() {
        let config = Config {
            analysis: AnalysisConfig {
                label: Some("kind/bug".to_string()),
                user: Some("alice".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };

        let params = config.run_params(None, Some("bob".to_string()));
        assert_eq!(params.label.as_deref(), Some("kind/bug"));
        assert_eq!(params.user.as_deref(), Some("bob"));
    }

    #[test]
    fn test_blank_params_are_not_provided() {
        let params = RunParams::new(Some("".to_string()), Some("   ".to_string()));
        assert_eq!(params, RunParams::default());
        assert!(params.get_parameter("label").is_none());
        assert!(params.get_parameter("user").is_none());
    }

    #[test]
    fn test_get_parameter_unknown_key() {
        let params = RunParams::new(Some("kind/bug".to_string()), None);
        assert_eq!(params.get_parameter("label"), Some("kind/bug"));
        assert_eq!(params.get_parameter("state"), None);
    }

    #[test]
    fn test_require_label_prefix() {
        let params = RunParams::new(Some("status/".to_string()), None);
        assert_eq!(params.require_label_prefix().unwrap(), "status");

        let params = RunParams::new(Some("/".to_string()), None);
        let err = params.require_label_prefix().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Error: No label prefix provided. Please specify a label with the --label flag."
        );
        assert!(err.is_configuration());
    }

    #[test]
    fn test_require_user() {
        let err = RunParams::default().require_user().unwrap_err();
        assert_eq!(
            err.to_string(),
            "No user specified. Please provide a user with the --user flag."
        );

        let params = RunParams::new(None, Some("test_user".to_string()));
        assert_eq!(params.require_user().unwrap(), "test_user");
    }
}
