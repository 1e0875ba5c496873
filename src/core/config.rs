//! # Configuration
//!
//! Settings for the `quickstate` binary, with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.quickstate/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.
//! The library itself reads none of this; it takes its client as a value.

use log::{LevelFilter, debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct QuickstateConfig {
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct HttpConfig {
    pub base_url: Option<String>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: Option<String>,
    pub file: Option<String>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_USER_AGENT: &str = concat!("quickstate/", env!("CARGO_PKG_VERSION"));
pub const DEFAULT_LOG_LEVEL: LevelFilter = LevelFilter::Info;
pub const DEFAULT_LOG_FILE: &str = "quickstate.log";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// Base for relative request URLs. `None` means only absolute URLs work.
    pub base_url: Option<String>,
    pub user_agent: String,
    pub log_level: LevelFilter,
    pub log_file: PathBuf,
    /// Problems found while resolving, reported once logging is up.
    pub warnings: Vec<String>,
}

// ============================================================================
// Error Type
// ============================================================================

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "config I/O error: {e}"),
            ConfigError::Parse(e) => write!(f, "config parse error: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Loading
// ============================================================================

/// Returns the path to `~/.quickstate/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".quickstate").join("config.toml"))
}

/// Load config from `~/.quickstate/config.toml`.
pub fn load_config() -> Result<QuickstateConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => {
            warn!("Could not determine home directory, using default config");
            Ok(QuickstateConfig::default())
        }
    }
}

/// Load config from `path`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `QuickstateConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config_from(path: &Path) -> Result<QuickstateConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(QuickstateConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: QuickstateConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

fn generate_default_config(path: &Path) {
    let default_content = r#"# quickstate configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [http]
# base_url = "https://api.example.com/v1"   # Or set QUICKSTATE_BASE_URL
# user_agent = "quickstate/0.1.0"           # Or set QUICKSTATE_USER_AGENT

# [logging]
# level = "info"                            # "off", "error", "warn", "info", "debug", "trace"
# file = "quickstate.log"
"#;

    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, default_content) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_base_url` is from the `--base-url` flag (None = not specified).
pub fn resolve(config: &QuickstateConfig, cli_base_url: Option<&str>) -> ResolvedConfig {
    // Base URL: CLI → env → config
    let base_url = cli_base_url
        .map(|s| s.to_string())
        .or_else(|| std::env::var("QUICKSTATE_BASE_URL").ok())
        .or_else(|| config.http.base_url.clone());

    // User agent: env → config → default
    let user_agent = std::env::var("QUICKSTATE_USER_AGENT")
        .ok()
        .or_else(|| config.http.user_agent.clone())
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());

    let mut warnings = Vec::new();

    // Log level: env → config → default
    let log_level = match std::env::var("QUICKSTATE_LOG_LEVEL")
        .ok()
        .or_else(|| config.logging.level.clone())
    {
        Some(raw) => parse_level(&raw).unwrap_or_else(|| {
            warnings.push(format!("Unknown log level '{raw}', using {DEFAULT_LOG_LEVEL}"));
            DEFAULT_LOG_LEVEL
        }),
        None => DEFAULT_LOG_LEVEL,
    };

    let log_file = config
        .logging
        .file
        .as_deref()
        .unwrap_or(DEFAULT_LOG_FILE)
        .into();

    ResolvedConfig {
        base_url,
        user_agent,
        log_level,
        log_file,
        warnings,
    }
}

fn parse_level(raw: &str) -> Option<LevelFilter> {
    raw.parse().ok()
}
