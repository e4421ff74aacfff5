//! Configuration structures
//!
//! Loaded by `cranepay_infra::config` from the environment or a JSON/TOML
//! file. Every section has serde defaults so partial files are accepted.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BULK_CALL_TIMEOUT_SECS, DEFAULT_BULK_MAX_PARALLEL};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub rates: RatePolicyConfig,
    #[serde(default)]
    pub bulk: BulkConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// REST backend settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL, e.g. `https://ksr-cranes-app.vercel.app`
    pub base_url: String,
    pub timeout_secs: u64,
    /// Total attempts for read-only requests. Mutations always use one.
    pub read_attempts: usize,
    pub user_agent: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout_secs: 30,
            read_attempts: 3,
            user_agent: format!("cranepay/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Rate split policy used by the aggregator.
///
/// Hours beyond `weekly_overtime_threshold_hours` in one ISO week (per
/// employee, weekdays only) are overtime; Saturday/Sunday hours are weekend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RatePolicyConfig {
    pub regular_rate: Decimal,
    pub overtime_rate: Decimal,
    pub weekend_rate: Decimal,
    pub weekly_overtime_threshold_hours: Decimal,
}

impl Default for RatePolicyConfig {
    fn default() -> Self {
        Self {
            regular_rate: Decimal::from(450),
            overtime_rate: Decimal::from(675),
            weekend_rate: Decimal::from(600),
            weekly_overtime_threshold_hours: Decimal::from(37),
        }
    }
}

/// How bulk actions reach the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkDispatchMode {
    /// One request carrying every id
    Batched,
    /// One request per id, bounded by `max_parallel`
    PerEntry,
}

/// Bulk engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BulkConfig {
    pub dispatch: BulkDispatchMode,
    pub max_parallel: usize,
    pub call_timeout_secs: u64,
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            dispatch: BulkDispatchMode::Batched,
            max_parallel: DEFAULT_BULK_MAX_PARALLEL,
            call_timeout_secs: DEFAULT_BULK_CALL_TIMEOUT_SECS,
        }
    }
}

/// Log output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Fallback filter when `RUST_LOG` is unset
    pub level: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
