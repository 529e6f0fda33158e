// crates/optimade-providers/src/config.rs
// ============================================================================
// Module: Provider Directory Configuration
// Description: Configuration loading and validation for the provider directory.
// Purpose: Make registry URLs, timeouts, and size limits explicit.
// Dependencies: serde, thiserror, toml, url
// ============================================================================

//! ## Overview
//! Configuration is loaded from an optional TOML file. Every field has a
//! default so an absent file yields the stock registry URLs and limits.
//! Invalid configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use url::Url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Primary registry of OPTIMADE providers.
pub const PROVIDERS_INDEX_URL: &str = "https://providers.optimade.org/v1/links";
/// Mirror of the registry served from the providers repository.
pub const PROVIDERS_MIRROR_URL: &str =
    "https://raw.githubusercontent.com/Materials-Consortia/providers/master/src/links/v1/providers.json";
/// Registry URLs tried, in order, when no source is given.
pub const DEFAULT_REGISTRY_URLS: [&str; 2] = [PROVIDERS_INDEX_URL, PROVIDERS_MIRROR_URL];
/// Environment variable used to locate a config file.
pub const CONFIG_ENV_VAR: &str = "OPTIMADE_PROVIDERS_CONFIG";
/// Maximum configuration file size in bytes.
pub const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Default total request timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Default connect timeout in milliseconds.
const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 5_000;
/// Default cap on response bodies.
const DEFAULT_MAX_RESPONSE_BYTES: usize = 8 * 1024 * 1024;
/// Default number of redirects followed.
const DEFAULT_MAX_REDIRECTS: usize = 5;

// ============================================================================
// SECTION: Configuration
// ============================================================================

/// Provider directory configuration.
///
/// # Invariants
/// - `registry_urls` is non-empty and every entry is an `http(s)` URL.
/// - Timeouts and `max_response_bytes` are non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DirectoryConfig {
    /// Registry URLs tried in order when no explicit source is given.
    pub registry_urls: Vec<String>,
    /// Total request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Connect timeout in milliseconds.
    pub connect_timeout_ms: u64,
    /// Maximum accepted response or file size in bytes.
    pub max_response_bytes: usize,
    /// Maximum number of redirects followed per request.
    pub max_redirects: usize,
    /// User agent for outbound requests.
    pub user_agent: String,
    /// Fall back to the bundled providers list when every registry URL fails.
    pub bundled_fallback: bool,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            registry_urls: DEFAULT_REGISTRY_URLS.iter().map(ToString::to_string).collect(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            max_redirects: DEFAULT_MAX_REDIRECTS,
            user_agent: concat!("optimade-providers/", env!("CARGO_PKG_VERSION")).to_string(),
            bundled_fallback: true,
        }
    }
}

impl DirectoryConfig {
    /// Loads configuration from an explicit path, the environment, or defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(resolved) = resolve_path(path) else {
            return Ok(Self::default());
        };
        let io_error =
            |err: std::io::Error| ConfigError::Io(format!("{}: {err}", resolved.display()));
        let size = fs::metadata(&resolved).map_err(io_error)?.len();
        if size > u64::try_from(MAX_CONFIG_FILE_SIZE).unwrap_or(u64::MAX) {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let bytes = fs::read(&resolved).map_err(io_error)?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        Self::from_toml_str(content)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.registry_urls.is_empty() {
            return Err(ConfigError::Invalid("registry_urls must not be empty".to_string()));
        }
        for raw in &self.registry_urls {
            let url = Url::parse(raw)
                .map_err(|err| ConfigError::Invalid(format!("invalid registry url {raw}: {err}")))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(ConfigError::Invalid(format!(
                    "registry url must use http or https: {raw}"
                )));
            }
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::Invalid("timeout_ms must be greater than zero".to_string()));
        }
        if self.connect_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "connect_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_response_bytes == 0 {
            return Err(ConfigError::Invalid(
                "max_response_bytes must be greater than zero".to_string(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid("user_agent must be non-empty".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Resolves the config path from the caller or the environment.
fn resolve_path(path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = path {
        return Some(path.to_path_buf());
    }
    env::var_os(CONFIG_ENV_VAR).filter(|value| !value.is_empty()).map(PathBuf::from)
}
