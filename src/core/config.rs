//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.guidenav/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::code_tabs::DEFAULT_CODE_LANG;
use crate::core::guides::{GuideDescriptor, GuideRegistry};
use crate::core::overlay::{DEFAULT_BREAKPOINT_PX, DEFAULT_TRANSITION_MS};
use crate::core::theme::{DEFAULT_THEME_TRANSITION_MS, Theme};

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GuidenavConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub timing: TimingConfig,
    #[serde(default)]
    pub guides: Vec<GuideDescriptor>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub base_path: Option<String>,
    pub default_theme: Option<Theme>,
    pub default_code_lang: Option<String>,
    pub start_route: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct TimingConfig {
    pub overlay_transition_ms: Option<u64>,
    pub theme_transition_ms: Option<u64>,
    pub mobile_breakpoint_px: Option<u32>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_BASE_PATH: &str = "/claude-god";
pub const DEFAULT_START_ROUTE: &str = "/";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub base_path: String,
    pub default_theme: Theme,
    /// Theme forced from the command line. Replaces the stored value.
    pub theme_override: Option<Theme>,
    pub default_code_lang: String,
    pub start_route: String,
    pub overlay_transition_ms: u64,
    pub theme_transition_ms: u64,
    pub mobile_breakpoint_px: u32,
    pub guides: GuideRegistry,
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        resolve_with_env(&GuidenavConfig::default(), None, None, |_| None)
    }
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

/// Returns the path to `~/.guidenav/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".guidenav").join("config.toml"))
}

/// Load config from `explicit` or `~/.guidenav/config.toml`.
///
/// If the default file doesn't exist, generates a commented-out default and
/// returns `GuidenavConfig::default()`. An explicit path that doesn't exist
/// is an I/O error. A malformed file returns `ConfigError::Parse`.
pub fn load_config(explicit: Option<&Path>) -> Result<GuidenavConfig, ConfigError> {
    if let Some(path) = explicit {
        return read_config(path);
    }

    let path = match config_path() {
        Some(p) => p,
        None => {
            warn!("Could not determine home directory, using default config");
            return Ok(GuidenavConfig::default());
        }
    };

    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(&path);
        return Ok(GuidenavConfig::default());
    }

    read_config(&path)
}

fn read_config(path: &Path) -> Result<GuidenavConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: GuidenavConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    let default_content = r#"# Guidenav Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# base_path = "/claude-god"           # Or set GUIDENAV_BASE_PATH
# default_theme = "dark"              # "light", "dark", "ember"; or GUIDENAV_THEME
# default_code_lang = "python"
# start_route = "/"                   # Route opened when --route is not given

# [timing]
# overlay_transition_ms = 300
# theme_transition_ms = 200
# mobile_breakpoint_px = 768          # One terminal column counts as 8px

# Replaces the built-in guide list when present.
# [[guides]]
# id = "quickStart"
# title = "Quick Start"
# subtitle = "5-Minute Setup"
# route = "/quick-start"
# nav_items = [
#   { id = "installation", label = "Installation" },
#   { id = "first-steps", label = "First Steps" },
# ]
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
/// `cli_route` and `cli_theme` are from CLI flags (None = not specified).
pub fn resolve(config: &GuidenavConfig, cli_route: Option<&str>, cli_theme: Option<Theme>) -> ResolvedConfig {
    resolve_with_env(config, cli_route, cli_theme, |key| std::env::var(key).ok())
}

/// Same as [`resolve`], reading env vars through `env`.
pub fn resolve_with_env(
    config: &GuidenavConfig,
    cli_route: Option<&str>,
    cli_theme: Option<Theme>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Base path: env → config → default
    let base_path = env("GUIDENAV_BASE_PATH")
        .or_else(|| config.general.base_path.clone())
        .unwrap_or_else(|| DEFAULT_BASE_PATH.to_string());
    let base_path = base_path.trim_end_matches('/').to_string();

    // Default theme: env → config → default. Unknown env values are ignored.
    let env_theme = env("GUIDENAV_THEME").and_then(|raw| match raw.parse::<Theme>() {
        Ok(theme) => Some(theme),
        Err(e) => {
            warn!("Ignoring GUIDENAV_THEME: {}", e);
            None
        }
    });
    let default_theme = env_theme
        .or(config.general.default_theme)
        .unwrap_or_default();

    let guides = resolve_guides(&config.guides);

    ResolvedConfig {
        base_path,
        default_theme,
        theme_override: cli_theme,
        default_code_lang: config
            .general
            .default_code_lang
            .clone()
            .filter(|l| !l.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CODE_LANG.to_string()),
        start_route: cli_route
            .map(str::to_string)
            .or_else(|| config.general.start_route.clone())
            .unwrap_or_else(|| DEFAULT_START_ROUTE.to_string()),
        overlay_transition_ms: config
            .timing
            .overlay_transition_ms
            .unwrap_or(DEFAULT_TRANSITION_MS),
        theme_transition_ms: config
            .timing
            .theme_transition_ms
            .unwrap_or(DEFAULT_THEME_TRANSITION_MS),
        mobile_breakpoint_px: config
            .timing
            .mobile_breakpoint_px
            .unwrap_or(DEFAULT_BREAKPOINT_PX),
        guides,
    }
}

/// A configured guide list wins over the built-in one, but only if it passes
/// validation.
fn resolve_guides(configured: &[GuideDescriptor]) -> GuideRegistry {
    if configured.is_empty() {
        return GuideRegistry::builtin();
    }
    let registry = GuideRegistry::new(configured.to_vec());
    match registry.validate() {
        Ok(()) => {
            info!("Using {} configured guides", registry.len());
            registry
        }
        Err(errors) => {
            for e in &errors {
                warn!("Invalid guide config: {}", e);
            }
            warn!("Falling back to built-in guides");
            GuideRegistry::builtin()
        }
    }
}
