//! # Configuration
//!
//! Centralizes all settings with a clear override hierarchy:
//! defaults → config file → env vars → CLI flags.
//!
//! Config lives at `~/.painel/config.toml`. If missing on first run, a
//! commented-out default is generated so users can discover all options.

use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

// ============================================================================
// Config Structs (all fields Option<T> for sparse TOML)
// ============================================================================

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PainelConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct GeneralConfig {
    pub log_level: Option<String>,
    pub log_file: Option<String>,
}

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    pub base_url: Option<String>,
    pub auth_base_url: Option<String>,
    pub timeout_ms: Option<u64>,
}

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;
pub const DEFAULT_LOG_LEVEL: &str = "debug";
pub const DEFAULT_LOG_FILE: &str = "painel.log";

pub const ENV_API_URL: &str = "PAINEL_API_URL";
pub const ENV_AUTH_API_URL: &str = "PAINEL_AUTH_API_URL";
pub const ENV_TIMEOUT_MS: &str = "PAINEL_TIMEOUT_MS";

// ============================================================================
// Resolved Config (concrete values, no Options)
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    pub api_base_url: String,
    /// `None` means the recovery endpoints live on `api_base_url`.
    pub auth_base_url: Option<String>,
    pub timeout: Duration,
    pub log_level: log::LevelFilter,
    pub log_file: String,
    /// Settings that were ignored in favour of a fallback. Resolution runs
    /// before the logger exists, so the caller reports these.
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

/// Returns `~/.painel/`, the home of the config and session files.
pub fn painel_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".painel"))
}

/// Returns the path to `~/.painel/config.toml`.
pub fn config_path() -> Option<PathBuf> {
    painel_dir().map(|d| d.join("config.toml"))
}

/// Load config from `~/.painel/config.toml`.
pub fn load_config() -> Result<PainelConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => {
            warn!("Could not determine home directory, using default config");
            Ok(PainelConfig::default())
        }
    }
}

/// Load config from `path`.
///
/// If the file doesn't exist, generates a commented-out default and
/// returns `PainelConfig::default()`. If it exists but is malformed,
/// returns `ConfigError::Parse`.
pub fn load_config_from(path: &Path) -> Result<PainelConfig, ConfigError> {
    if !path.exists() {
        info!("No config file found, generating default at {}", path.display());
        generate_default_config(path);
        return Ok(PainelConfig::default());
    }

    let contents = fs::read_to_string(path).map_err(ConfigError::Io)?;
    let config: PainelConfig = toml::from_str(&contents).map_err(ConfigError::Parse)?;
    info!("Loaded config from {}", path.display());
    debug!("Config: {:?}", config);
    Ok(config)
}

const DEFAULT_CONFIG_CONTENT: &str = r#"# Painel Configuration
# All settings are optional. Defaults are used for anything not specified.
# Override hierarchy: defaults → this file → env vars → CLI flags.

# [general]
# log_level = "debug"                # "error", "warn", "info", "debug", "trace", "off"
# log_file = "painel.log"

# [api]
# base_url = "http://localhost:8000"       # Or PAINEL_API_URL / --api-url
# auth_base_url = "http://localhost:8000"  # Password recovery; or PAINEL_AUTH_API_URL
# timeout_ms = 15000                       # Or PAINEL_TIMEOUT_MS
"#;

/// Generates a commented-out default config file at the given path.
fn generate_default_config(path: &Path) {
    if let Some(parent) = path.parent()
        && let Err(e) = fs::create_dir_all(parent)
    {
        warn!("Failed to create config directory: {}", e);
        return;
    }
    if let Err(e) = fs::write(path, DEFAULT_CONFIG_CONTENT) {
        warn!("Failed to write default config: {}", e);
    }
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve the final config by collapsing: defaults → config file → env vars → CLI.
///
/// `cli_api_url` comes from `--api-url` (None = not specified).
pub fn resolve(config: &PainelConfig, cli_api_url: Option<&str>) -> ResolvedConfig {
    resolve_with(config, cli_api_url, |key| std::env::var(key).ok())
}

/// Same as [`resolve`], reading environment variables through `env`.
pub fn resolve_with(
    config: &PainelConfig,
    cli_api_url: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> ResolvedConfig {
    // Base URL: CLI → env → config → default
    let api_base_url = cli_api_url
        .map(|s| s.to_string())
        .or_else(|| env(ENV_API_URL))
        .or_else(|| config.api.base_url.clone())
        .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

    let auth_base_url = env(ENV_AUTH_API_URL).or_else(|| config.api.auth_base_url.clone());

    let mut warnings = Vec::new();

    // Timeout: env → config → default. Zero would fail every request.
    let env_timeout = env(ENV_TIMEOUT_MS).and_then(|raw| match raw.trim().parse::<u64>() {
        Ok(ms) if ms > 0 => Some(ms),
        _ => {
            warnings.push(format!("Ignoring invalid {ENV_TIMEOUT_MS}: {raw:?}"));
            None
        }
    });
    let file_timeout = config.api.timeout_ms.filter(|&ms| {
        if ms == 0 {
            warnings.push("Ignoring api.timeout_ms = 0".to_string());
        }
        ms > 0
    });
    let timeout_ms = env_timeout.or(file_timeout).unwrap_or(DEFAULT_TIMEOUT_MS);

    let log_level = match config.general.log_level.as_deref() {
        Some(level) => level.parse().unwrap_or_else(|_| {
            warnings.push(format!(
                "Ignoring unknown general.log_level {level:?}, using {DEFAULT_LOG_LEVEL}"
            ));
            log::LevelFilter::Debug
        }),
        None => log::LevelFilter::Debug,
    };

    ResolvedConfig {
        api_base_url,
        auth_base_url,
        timeout: Duration::from_millis(timeout_ms),
        log_level,
        log_file: config
            .general
            .log_file
            .clone()
            .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string()),
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_resolve_uses_defaults_when_empty() {
        let resolved = resolve_with(&PainelConfig::default(), None, no_env);
        assert_eq!(resolved.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(resolved.auth_base_url, None);
        assert_eq!(resolved.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
        assert_eq!(resolved.log_level, log::LevelFilter::Debug);
        assert_eq!(resolved.log_file, DEFAULT_LOG_FILE);
        assert!(resolved.warnings.is_empty());
    }

    #[test]
    fn test_resolve_config_values_override_defaults() {
        let config = PainelConfig {
            general: GeneralConfig {
                log_level: Some("warn".to_string()),
                log_file: Some("/tmp/p.log".to_string()),
            },
            api: ApiConfig {
                base_url: Some("http://api.local".to_string()),
                auth_base_url: Some("http://auth.local".to_string()),
                timeout_ms: Some(500),
            },
        };
        let resolved = resolve_with(&config, None, no_env);
        assert_eq!(resolved.api_base_url, "http://api.local");
        assert_eq!(resolved.auth_base_url.as_deref(), Some("http://auth.local"));
        assert_eq!(resolved.timeout, Duration::from_millis(500));
        assert_eq!(resolved.log_level, log::LevelFilter::Warn);
        assert_eq!(resolved.log_file, "/tmp/p.log");
    }

    #[test]
    fn test_env_overrides_config() {
        let config = PainelConfig {
            api: ApiConfig {
                base_url: Some("http://file.local".to_string()),
                timeout_ms: Some(500),
                ..Default::default()
            },
            ..Default::default()
        };
        let env = |key: &str| match key {
            ENV_API_URL => Some("http://env.local".to_string()),
            ENV_TIMEOUT_MS => Some("2500".to_string()),
            _ => None,
        };
        let resolved = resolve_with(&config, None, env);
        assert_eq!(resolved.api_base_url, "http://env.local");
        assert_eq!(resolved.timeout, Duration::from_millis(2500));
    }

    #[test]
    fn test_cli_api_url_wins() {
        let env = |key: &str| (key == ENV_API_URL).then(|| "http://env.local".to_string());
        let resolved = resolve_with(&PainelConfig::default(), Some("http://cli.local"), env);
        assert_eq!(resolved.api_base_url, "http://cli.local");
    }

    #[test]
    fn test_invalid_env_timeout_falls_back() {
        let env = |key: &str| (key == ENV_TIMEOUT_MS).then(|| "soon".to_string());
        let resolved = resolve_with(&PainelConfig::default(), None, env);
        assert_eq!(resolved.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
        assert_eq!(resolved.warnings.len(), 1);
        assert!(resolved.warnings[0].contains(ENV_TIMEOUT_MS));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let config = PainelConfig {
            api: ApiConfig {
                timeout_ms: Some(0),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve_with(&config, None, no_env);
        assert_eq!(resolved.timeout, Duration::from_millis(DEFAULT_TIMEOUT_MS));
        assert_eq!(resolved.warnings, vec!["Ignoring api.timeout_ms = 0".to_string()]);
    }

    #[test]
    fn test_zero_env_timeout_falls_back_to_file() {
        let config = PainelConfig {
            api: ApiConfig {
                timeout_ms: Some(750),
                ..Default::default()
            },
            ..Default::default()
        };
        let env = |key: &str| (key == ENV_TIMEOUT_MS).then(|| "0".to_string());
        let resolved = resolve_with(&config, None, env);
        assert_eq!(resolved.timeout, Duration::from_millis(750));
        assert_eq!(resolved.warnings.len(), 1);
    }

    #[test]
    fn test_unknown_log_level_falls_back() {
        let config = PainelConfig {
            general: GeneralConfig {
                log_level: Some("chatty".to_string()),
                ..Default::default()
            },
            ..Default::default()
        };
        let resolved = resolve_with(&config, None, no_env);
        assert_eq!(resolved.log_level, log::LevelFilter::Debug);
        assert_eq!(resolved.warnings.len(), 1);
        assert!(resolved.warnings[0].contains("chatty"));
    }

    #[test]
    fn test_sparse_toml_parses() {
        let toml_str = r#"
[api]
timeout_ms = 3000
"#;
        let config: PainelConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.api.timeout_ms, Some(3000));
        assert!(config.api.base_url.is_none());
        assert!(config.general.log_level.is_none());
    }

    #[test]
    fn test_default_content_is_valid_toml() {
        let config: PainelConfig = toml::from_str(DEFAULT_CONFIG_CONTENT).unwrap();
        assert!(config.api.base_url.is_none());
    }

    #[test]
    fn test_missing_file_generates_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = load_config_from(&path).unwrap();
        assert!(config.api.base_url.is_none());
        let written = fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("# Painel Configuration"));
    }

    #[test]
    fn test_malformed_file_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[api\nbase_url = ").unwrap();
        assert!(matches!(
            load_config_from(&path),
            Err(ConfigError::Parse(_))
        ));
    }
}
