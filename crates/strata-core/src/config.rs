//! Runtime and project configuration.
//!
//! `Config` is the CLI's runtime state. `ProjectConfig` is loaded from a
//! `strata.config.json` at the project root; CLI flags override its values.

use crate::error::Error;
use crate::roots::RootOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Runtime configuration for the strata CLI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Current working directory.
    pub cwd: PathBuf,

    /// Whether to emit JSON logs.
    pub json_logs: bool,

    /// Verbosity level (0 = INFO, 1 = DEBUG, 2+ = TRACE).
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cwd: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            json_logs: false,
            verbosity: 0,
        }
    }
}

impl Config {
    /// Create a new config with the given working directory.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            ..Default::default()
        }
    }

    /// Set verbosity level.
    #[must_use]
    pub fn with_verbosity(mut self, verbosity: u8) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set JSON log output.
    #[must_use]
    pub fn with_json_logs(mut self, json: bool) -> Self {
        self.json_logs = json;
        self
    }
}

/// Name of the project configuration file.
pub const CONFIG_FILE: &str = "strata.config.json";

/// Project-level configuration.
///
/// ## Supported format
///
/// ```json
/// {
///   "desktopRoot": "/src/desktop",
///   "mobileRoot": "/src/mobile",
///   "tabletRoot": "/src/tablet",
///   "entry": "index.html",
///   "outDir": "dist",
///   "server": { "port": 3000, "host": "localhost" }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectConfig {
    /// Device root directories.
    #[serde(flatten)]
    pub roots: RootOptions,
    /// Entry document served and emitted per variant.
    pub entry: Option<String>,
    /// Output directory for `strata build`.
    pub out_dir: Option<String>,
    /// Dev server options.
    pub server: ServerConfig,
}

/// Dev server configuration from the project config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// Port to listen on.
    pub port: Option<u16>,
    /// Host to bind to.
    pub host: Option<String>,
}

/// Load the project config from `root`, if one is present.
pub fn load_project_config(root: &Path) -> Result<Option<(PathBuf, ProjectConfig)>, Error> {
    let path = root.join(CONFIG_FILE);
    if !path.exists() {
        return Ok(None);
    }
    let content = std::fs::read_to_string(&path).map_err(|source| Error::ConfigRead {
        path: path.clone(),
        source,
    })?;
    let config = serde_json::from_str(&content).map_err(|source| Error::ConfigParse {
        path: path.clone(),
        source,
    })?;
    Ok(Some((path, config)))
}
