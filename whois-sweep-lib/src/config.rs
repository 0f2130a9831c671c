//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and `WS_*`
//! environment variables, and merging them with proper precedence rules.
//! Precedence, lowest to highest: built-in defaults, XDG config, global
//! config, local config, environment, command-line flags.

use crate::error::DomainCheckError;
use crate::protocols::registry::validate_tld_config;
use crate::protocols::TldRegistry;
use crate::types::{CheckConfig, TldConfig};
use crate::utils::{normalize_tld, split_list};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Configuration loaded from TOML files.
///
/// ```toml
/// [check]
/// window_size = 3
/// pacing = "500ms"
///
/// [[tlds]]
/// name = "com"
/// server = "whois.verisign-grs.com"
/// available_pattern = "No match for"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct FileConfig {
    /// Exchange and scheduling tunables
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<CheckSection>,

    /// TLD entries that override or extend the built-in table
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tlds: Option<Vec<TldEntry>>,
}

/// The `[check]` table. Durations are strings such as "500ms", "5s", "2m".
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CheckSection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub window_size: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub pacing: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve_timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub connect_timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub idle_timeout: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_attempts: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_delay: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_response_bytes: Option<usize>,
}

/// One `[[tlds]]` entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TldEntry {
    pub name: String,
    pub server: String,
    pub available_pattern: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl TldEntry {
    pub fn to_tld_config(&self) -> TldConfig {
        let config = TldConfig::new(
            normalize_tld(&self.name),
            self.server.trim(),
            self.available_pattern.as_str(),
        )
        .with_enabled(self.enabled.unwrap_or(true));

        match &self.display_name {
            Some(display_name) => config.with_display_name(display_name.as_str()),
            None => config,
        }
    }
}

impl From<&TldConfig> for TldEntry {
    fn from(tld: &TldConfig) -> Self {
        Self {
            name: tld.name.clone(),
            server: tld.server.clone(),
            available_pattern: tld.available_pattern.clone(),
            enabled: Some(tld.enabled),
            display_name: Some(tld.display_name.clone()),
        }
    }
}

impl FileConfig {
    /// Apply the `[check]` table on top of `base`.
    pub fn apply_to(&self, base: CheckConfig) -> Result<CheckConfig, DomainCheckError> {
        let Some(check) = &self.check else {
            return Ok(base);
        };

        let mut config = base;
        if let Some(window_size) = check.window_size {
            config = config.with_window_size(window_size);
        }
        if let Some(pacing) = &check.pacing {
            config = config.with_pacing_delay(require_duration("pacing", pacing)?);
        }
        if let Some(timeout) = &check.resolve_timeout {
            config = config.with_resolve_timeout(require_timeout("resolve_timeout", timeout)?);
        }
        if let Some(timeout) = &check.connect_timeout {
            config = config.with_connect_timeout(require_timeout("connect_timeout", timeout)?);
        }
        if let Some(timeout) = &check.idle_timeout {
            config = config.with_idle_timeout(require_timeout("idle_timeout", timeout)?);
        }
        if check.retry_attempts.is_some() || check.retry_delay.is_some() {
            let attempts = check.retry_attempts.unwrap_or(config.retry_attempts);
            let delay = match &check.retry_delay {
                Some(delay) => require_duration("retry_delay", delay)?,
                None => config.retry_delay,
            };
            config = config.with_retry(attempts, delay);
        }
        if let Some(max) = check.max_response_bytes {
            config = config.with_max_response_bytes(max);
        }

        Ok(config)
    }

    /// The built-in registry with this file's `[[tlds]]` entries merged in.
    pub fn build_registry(&self) -> Result<TldRegistry, DomainCheckError> {
        let overrides = self
            .tlds
            .iter()
            .flatten()
            .map(TldEntry::to_tld_config)
            .collect();
        TldRegistry::builtin().with_overrides(overrides)
    }
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to report which config files were picked up
    pub verbose: bool,
}

impl ConfigManager {
    /// Create a new configuration manager.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    ///
    /// # Errors
    ///
    /// `DomainCheckError::File` if the file is missing or unreadable,
    /// `DomainCheckError::Config` if it is not valid TOML or fails validation.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, DomainCheckError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(DomainCheckError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DomainCheckError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            DomainCheckError::config(format!(
                "Failed to parse TOML configuration '{}': {}",
                path.display(),
                e
            ))
        })?;

        self.validate_config(&config)?;
        debug!(path = %path.display(), "loaded configuration file");

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// Files that exist but fail to load are reported and skipped.
    pub fn discover_and_load(&self) -> Result<FileConfig, DomainCheckError> {
        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    merged_config = self.merge_configs(merged_config, config);
                    loaded_files.push(path);
                }
                Err(e) => warn!(path = %path.display(), error = %e, "ignoring configuration file"),
            }
        }

        if self.verbose && !loaded_files.is_empty() {
            for (i, path) in loaded_files.iter().enumerate() {
                info!(
                    path = %path.display(),
                    precedence = i + 1,
                    "using configuration file"
                );
            }
        }

        Ok(merged_config)
    }

    /// Looks for configuration files in the current directory.
    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./whois-sweep.toml", "./.whois-sweep.toml"]
            .into_iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Looks for configuration files in the user's home directory.
    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        [".whois-sweep.toml", "whois-sweep.toml"]
            .into_iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    /// Follows the XDG Base Directory Specification.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("whois-sweep").join("config.toml");
        path.exists().then_some(path)
    }

    /// Merge two configurations with proper precedence.
    ///
    /// Values from `higher` take precedence over values from `lower`. TLD
    /// entries are merged by name.
    pub fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            check: match (lower.check, higher.check) {
                (Some(lower_check), Some(higher_check)) => Some(CheckSection {
                    window_size: higher_check.window_size.or(lower_check.window_size),
                    pacing: higher_check.pacing.or(lower_check.pacing),
                    resolve_timeout: higher_check.resolve_timeout.or(lower_check.resolve_timeout),
                    connect_timeout: higher_check.connect_timeout.or(lower_check.connect_timeout),
                    idle_timeout: higher_check.idle_timeout.or(lower_check.idle_timeout),
                    retry_attempts: higher_check.retry_attempts.or(lower_check.retry_attempts),
                    retry_delay: higher_check.retry_delay.or(lower_check.retry_delay),
                    max_response_bytes: higher_check
                        .max_response_bytes
                        .or(lower_check.max_response_bytes),
                }),
                (lower_check, higher_check) => higher_check.or(lower_check),
            },
            tlds: match (lower.tlds, higher.tlds) {
                (Some(mut lower_tlds), Some(higher_tlds)) => {
                    for entry in higher_tlds {
                        match lower_tlds
                            .iter_mut()
                            .find(|existing| same_tld(&existing.name, &entry.name))
                        {
                            Some(existing) => *existing = entry,
                            None => lower_tlds.push(entry),
                        }
                    }
                    Some(lower_tlds)
                }
                (lower_tlds, higher_tlds) => higher_tlds.or(lower_tlds),
            },
        }
    }

    /// Validate a configuration for common issues.
    pub fn validate_config(&self, config: &FileConfig) -> Result<(), DomainCheckError> {
        if let Some(check) = &config.check {
            if let Some(window_size) = check.window_size {
                if !(1..=50).contains(&window_size) {
                    return Err(DomainCheckError::config(
                        "window_size must be between 1 and 50",
                    ));
                }
            }

            if let Some(attempts) = check.retry_attempts {
                if !(1..=10).contains(&attempts) {
                    return Err(DomainCheckError::config(
                        "retry_attempts must be between 1 and 10",
                    ));
                }
            }

            if check.max_response_bytes == Some(0) {
                return Err(DomainCheckError::config(
                    "max_response_bytes must be greater than 0",
                ));
            }

            let durations = [("pacing", &check.pacing), ("retry_delay", &check.retry_delay)];
            for (field, value) in durations {
                if let Some(value) = value {
                    require_duration(field, value)?;
                }
            }

            let timeouts = [
                ("resolve_timeout", &check.resolve_timeout),
                ("connect_timeout", &check.connect_timeout),
                ("idle_timeout", &check.idle_timeout),
            ];
            for (field, value) in timeouts {
                if let Some(value) = value {
                    require_timeout(field, value)?;
                }
            }
        }

        if let Some(tlds) = &config.tlds {
            let mut seen = HashSet::new();
            for entry in tlds {
                let tld = validate_tld_config(entry.to_tld_config())?;
                if !seen.insert(tld.name.clone()) {
                    return Err(DomainCheckError::config(format!(
                        "TLD '{}' is defined more than once",
                        tld.name
                    )));
                }
            }
        }

        Ok(())
    }
}

fn same_tld(a: &str, b: &str) -> bool {
    normalize_tld(a) == normalize_tld(b)
}

fn require_duration(field: &str, value: &str) -> Result<Duration, DomainCheckError> {
    parse_duration_string(value).ok_or_else(|| {
        DomainCheckError::config(format!(
            "Invalid {} '{}'. Use a format like '500ms', '5s' or '2m'",
            field, value
        ))
    })
}

/// Timeouts must be non-zero: a zero idle timeout ends every read at once.
fn require_timeout(field: &str, value: &str) -> Result<Duration, DomainCheckError> {
    let timeout = require_duration(field, value)?;
    if timeout.is_zero() {
        return Err(DomainCheckError::config(format!(
            "{} must be greater than 0",
            field
        )));
    }
    Ok(timeout)
}

/// Parse a duration string like "500ms", "5s", "2m", or bare seconds ("5").
pub fn parse_duration_string(value: &str) -> Option<Duration> {
    let value = value.trim().to_lowercase();

    if let Some(millis) = value.strip_suffix("ms") {
        millis.trim().parse::<u64>().ok().map(Duration::from_millis)
    } else if let Some(secs) = value.strip_suffix('s') {
        secs.trim().parse::<u64>().ok().map(Duration::from_secs)
    } else if let Some(mins) = value.strip_suffix('m') {
        mins.trim()
            .parse::<u64>()
            .ok()
            .and_then(|m| m.checked_mul(60))
            .map(Duration::from_secs)
    } else {
        value.parse::<u64>().ok().map(Duration::from_secs)
    }
}

/// Environment variable configuration that mirrors CLI options.
///
/// This represents configuration values that can be set via `WS_*`
/// environment variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvConfig {
    pub window_size: Option<usize>,
    pub pacing: Option<Duration>,
    pub resolve_timeout: Option<Duration>,
    pub connect_timeout: Option<Duration>,
    pub idle_timeout: Option<Duration>,
    pub retry_attempts: Option<u32>,
    pub tlds: Option<Vec<String>>,
    pub config: Option<String>,
}

impl EnvConfig {
    /// Apply the variables that were set on top of `base`.
    pub fn apply_to(&self, base: CheckConfig) -> CheckConfig {
        let mut config = base;
        if let Some(window_size) = self.window_size {
            config = config.with_window_size(window_size);
        }
        if let Some(pacing) = self.pacing {
            config = config.with_pacing_delay(pacing);
        }
        if let Some(timeout) = self.resolve_timeout {
            config = config.with_resolve_timeout(timeout);
        }
        if let Some(timeout) = self.connect_timeout {
            config = config.with_connect_timeout(timeout);
        }
        if let Some(timeout) = self.idle_timeout {
            config = config.with_idle_timeout(timeout);
        }
        if let Some(attempts) = self.retry_attempts {
            let delay = config.retry_delay;
            config = config.with_retry(attempts, delay);
        }
        config
    }
}

/// Load configuration from the process environment.
///
/// Invalid values are logged as warnings and ignored.
pub fn load_env_config() -> EnvConfig {
    load_env_config_from(|key| env::var(key).ok())
}

/// Load `WS_*` configuration through an arbitrary variable source.
pub fn load_env_config_from<F>(get: F) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();

    // WS_WINDOW_SIZE - tasks per window
    if let Some(val) = get("WS_WINDOW_SIZE") {
        match val.trim().parse::<usize>() {
            Ok(size) if (1..=50).contains(&size) => {
                debug!(window_size = size, "using WS_WINDOW_SIZE");
                env_config.window_size = Some(size);
            }
            _ => warn!(value = %val, "invalid WS_WINDOW_SIZE, must be 1-50"),
        }
    }

    // (variable, slot, zero allowed)
    let durations: [(&str, &mut Option<Duration>, bool); 4] = [
        ("WS_PACING", &mut env_config.pacing, true),
        ("WS_RESOLVE_TIMEOUT", &mut env_config.resolve_timeout, false),
        ("WS_CONNECT_TIMEOUT", &mut env_config.connect_timeout, false),
        ("WS_IDLE_TIMEOUT", &mut env_config.idle_timeout, false),
    ];
    for (key, slot, zero_allowed) in durations {
        if let Some(val) = get(key) {
            match parse_duration_string(&val) {
                Some(duration) if duration.is_zero() && !zero_allowed => {
                    warn!(variable = key, value = %val, "timeout must be greater than 0")
                }
                Some(duration) => {
                    debug!(variable = key, ?duration, "using environment override");
                    *slot = Some(duration);
                }
                None => warn!(
                    variable = key,
                    value = %val,
                    "invalid duration, use a format like '500ms', '5s' or '2m'"
                ),
            }
        }
    }

    // WS_RETRY_ATTEMPTS - attempts on the retry path
    if let Some(val) = get("WS_RETRY_ATTEMPTS") {
        match val.trim().parse::<u32>() {
            Ok(attempts) if (1..=10).contains(&attempts) => {
                debug!(retry_attempts = attempts, "using WS_RETRY_ATTEMPTS");
                env_config.retry_attempts = Some(attempts);
            }
            _ => warn!(value = %val, "invalid WS_RETRY_ATTEMPTS, must be 1-10"),
        }
    }

    // WS_TLD - comma-separated TLD list
    if let Some(val) = get("WS_TLD") {
        let tlds = split_list(&[val.as_str()]);
        if !tlds.is_empty() {
            debug!(tlds = %val, "using WS_TLD");
            env_config.tlds = Some(tlds);
        }
    }

    // WS_CONFIG - explicit config file
    if let Some(val) = get("WS_CONFIG") {
        if !val.trim().is_empty() {
            debug!(path = %val, "using WS_CONFIG");
            env_config.config = Some(val);
        }
    }

    env_config
}
