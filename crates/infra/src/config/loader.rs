//! Configuration loader
//!
//! Loads payroll configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. First, attempts to load from environment variables
//! 2. If `CRANEPAY_API_BASE_URL` is unset, falls back to loading from file
//! 3. Probes multiple paths for config files
//! 4. Supports JSON and TOML formats
//!
//! ## Environment Variables
//! - `CRANEPAY_API_BASE_URL`: Backend base URL (required)
//! - `CRANEPAY_API_TIMEOUT_SECS`: Per-request timeout in seconds
//! - `CRANEPAY_API_READ_ATTEMPTS`: Attempts for read-only requests
//! - `CRANEPAY_REGULAR_RATE`, `CRANEPAY_OVERTIME_RATE`, `CRANEPAY_WEEKEND_RATE`: Hourly rates (decimal)
//! - `CRANEPAY_OVERTIME_THRESHOLD_HOURS`: Weekly hours before overtime applies
//! - `CRANEPAY_BULK_DISPATCH`: `batched` or `per_entry`
//! - `CRANEPAY_BULK_MAX_PARALLEL`: Concurrent calls in per-entry mode
//! - `CRANEPAY_BULK_TIMEOUT_SECS`: Deadline per bulk call in seconds
//! - `CRANEPAY_LOG_LEVEL`: Fallback log filter when `RUST_LOG` is unset
//! - `CRANEPAY_LOG_JSON`: Emit JSON log lines (true/false)
//!
//! Optional variables keep their defaults when unset.
//!
//! ## File Locations
//! The loader probes the following paths (in order):
//! 1. `./cranepay.json` or `./cranepay.toml` (current working directory)
//! 2. `./config.json` or `./config.toml` (current working directory)
//! 3. The same names in the parent directory
//! 4. Relative to executable location

use std::path::{Path, PathBuf};
use std::str::FromStr;

use cranepay_domain::{BulkDispatchMode, Config, PayrollError, Result};
use rust_decimal::Decimal;

const CONFIG_FILE_NAMES: [&str; 4] = ["cranepay.json", "cranepay.toml", "config.json", "config.toml"];

/// Load configuration with automatic fallback strategy
///
/// First attempts to load from environment variables. If the required
/// variable is missing, falls back to loading from a config file.
///
/// # Errors
/// Returns `PayrollError::Config` if:
/// - Configuration cannot be loaded from either source
/// - File format is invalid
/// - A value fails validation
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = ?e, "Failed to load from environment, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from environment variables
///
/// # Errors
/// Returns `PayrollError::Config` if `CRANEPAY_API_BASE_URL` is missing or
/// any set variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.api.base_url = env_var("CRANEPAY_API_BASE_URL")?;
    if let Some(timeout) = env_parse::<u64>("CRANEPAY_API_TIMEOUT_SECS")? {
        config.api.timeout_secs = timeout;
    }
    if let Some(attempts) = env_parse::<usize>("CRANEPAY_API_READ_ATTEMPTS")? {
        config.api.read_attempts = attempts;
    }

    if let Some(rate) = env_parse::<Decimal>("CRANEPAY_REGULAR_RATE")? {
        config.rates.regular_rate = rate;
    }
    if let Some(rate) = env_parse::<Decimal>("CRANEPAY_OVERTIME_RATE")? {
        config.rates.overtime_rate = rate;
    }
    if let Some(rate) = env_parse::<Decimal>("CRANEPAY_WEEKEND_RATE")? {
        config.rates.weekend_rate = rate;
    }
    if let Some(hours) = env_parse::<Decimal>("CRANEPAY_OVERTIME_THRESHOLD_HOURS")? {
        config.rates.weekly_overtime_threshold_hours = hours;
    }

    if let Ok(raw) = std::env::var("CRANEPAY_BULK_DISPATCH") {
        config.bulk.dispatch = parse_dispatch(&raw)?;
    }
    if let Some(parallel) = env_parse::<usize>("CRANEPAY_BULK_MAX_PARALLEL")? {
        config.bulk.max_parallel = parallel;
    }
    if let Some(timeout) = env_parse::<u64>("CRANEPAY_BULK_TIMEOUT_SECS")? {
        config.bulk.call_timeout_secs = timeout;
    }

    if let Ok(level) = std::env::var("CRANEPAY_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("CRANEPAY_LOG_JSON", config.logging.json);

    validate(&config)?;
    Ok(config)
}

/// Load configuration from a file
///
/// If `path` is `None`, probes multiple locations for config files.
/// Supports both JSON and TOML formats (detected by file extension).
///
/// # Errors
/// Returns `PayrollError::Config` if:
/// - File not found (when path is specified)
/// - No config file found (when path is `None`)
/// - File format is invalid
/// - A value fails validation
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(PayrollError::Config(format!("Config file not found: {}", p.display())));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            PayrollError::Config("No config file found in any of the standard locations".to_string())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| PayrollError::Config(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    validate(&config)?;
    Ok(config)
}

/// Parse configuration, format detected by file extension
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents).map_err(|e| PayrollError::Config(format!("Invalid TOML format: {e}"))),
        "json" => {
            serde_json::from_str(contents).map_err(|e| PayrollError::Config(format!("Invalid JSON format: {e}")))
        }
        _ => Err(PayrollError::Config(format!("Unsupported config format: {extension}"))),
    }
}

/// Reject values the aggregator or bulk engine cannot work with.
///
/// # Errors
/// Returns `PayrollError::Config` naming the first offending field.
pub fn validate(config: &Config) -> Result<()> {
    if config.api.base_url.trim().is_empty() {
        return Err(PayrollError::Config("api.base_url must not be empty".to_string()));
    }

    let rates = [
        ("rates.regular_rate", config.rates.regular_rate),
        ("rates.overtime_rate", config.rates.overtime_rate),
        ("rates.weekend_rate", config.rates.weekend_rate),
    ];
    if let Some((name, value)) = rates.iter().find(|(_, value)| value.is_sign_negative()) {
        return Err(PayrollError::Config(format!("{name} must not be negative (got {value})")));
    }
    if config.rates.weekly_overtime_threshold_hours <= Decimal::ZERO {
        return Err(PayrollError::Config(
            "rates.weekly_overtime_threshold_hours must be positive".to_string(),
        ));
    }

    if config.bulk.max_parallel == 0 {
        return Err(PayrollError::Config("bulk.max_parallel must be at least 1".to_string()));
    }
    if config.bulk.call_timeout_secs == 0 {
        return Err(PayrollError::Config("bulk.call_timeout_secs must be at least 1".to_string()));
    }
    Ok(())
}

/// Probe multiple paths for configuration files
///
/// Searches the current working directory, its parent, then the
/// executable's directory.
///
/// # Returns
/// The first config file found, or `None` if no file exists.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();

    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd.clone());
        dirs.push(cwd.join(".."));
    }
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            dirs.push(exe_dir.to_path_buf());
        }
    }

    dirs.iter()
        .flat_map(|dir| CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name)))
        .find(|path| path.exists())
}

fn env_var(key: &str) -> Result<String> {
    std::env::var(key)
        .map_err(|_| PayrollError::Config(format!("Missing required environment variable: {key}")))
}

/// `Ok(None)` when unset
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| PayrollError::Config(format!("Invalid value for {key}: {e}"))),
        Err(_) => Ok(None),
    }
}

/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}

fn parse_dispatch(raw: &str) -> Result<BulkDispatchMode> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "batched" => Ok(BulkDispatchMode::Batched),
        "per_entry" | "per-entry" => Ok(BulkDispatchMode::PerEntry),
        other => Err(PayrollError::Config(format!(
            "Invalid value for CRANEPAY_BULK_DISPATCH: '{other}' (expected batched or per_entry)"
        ))),
    }
}
