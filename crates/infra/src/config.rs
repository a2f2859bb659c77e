//! Configuration loading and representation.
//!
//! Every knob has a default; environment variables override them:
//!
//! | Variable                         | Default         |
//! |----------------------------------|-----------------|
//! | `STOCKLEDGER_FALLBACK_LOCATION`  | `001/0001/AA01` |
//! | `STOCKLEDGER_EXPIRY_WINDOW_DAYS` | `60`            |
//! | `STOCKLEDGER_TOP_OUTBOUND`       | `5`             |
//! | `STOCKLEDGER_RECENT_LIMIT`       | `50`            |
//! | `STOCKLEDGER_NOTIFY_CAPACITY`    | `64`            |
//! | `STOCKLEDGER_SYSTEM_ACTOR`       | `admin`         |
//! | `STOCKLEDGER_SEED_DEMO`          | `false`         |

use std::str::FromStr;

use thiserror::Error;

use stockledger_core::{LocationCode, UserId};
use stockledger_events::DEFAULT_SUBSCRIBER_CAPACITY;

pub const ENV_FALLBACK_LOCATION: &str = "STOCKLEDGER_FALLBACK_LOCATION";
pub const ENV_EXPIRY_WINDOW_DAYS: &str = "STOCKLEDGER_EXPIRY_WINDOW_DAYS";
pub const ENV_TOP_OUTBOUND: &str = "STOCKLEDGER_TOP_OUTBOUND";
pub const ENV_RECENT_LIMIT: &str = "STOCKLEDGER_RECENT_LIMIT";
pub const ENV_NOTIFY_CAPACITY: &str = "STOCKLEDGER_NOTIFY_CAPACITY";
pub const ENV_SYSTEM_ACTOR: &str = "STOCKLEDGER_SYSTEM_ACTOR";
pub const ENV_SEED_DEMO: &str = "STOCKLEDGER_SEED_DEMO";

/// Upper bound for the expiry window: one hundred years.
pub const MAX_EXPIRY_WINDOW_DAYS: i64 = 36_500;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Runtime settings of one ledger instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Used when neither an existing batch, the item default nor the storage
    /// layout yields an aisle for inbound stock.
    pub fallback_location: LocationCode,
    /// Width of the dashboard's "expiring soon" window.
    pub expiry_window_days: i64,
    pub top_outbound_limit: usize,
    /// Default page size of the recent stock change / audit feeds.
    pub recent_limit: usize,
    /// Queue depth per change subscriber.
    pub notify_capacity: usize,
    /// Actor recorded in audit entries of catalog and storage mutations.
    pub system_actor: UserId,
    pub seed_demo: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            // First aisle of the first room on the ground floor: `001/0001/AA01`.
            fallback_location: stockledger_core::location::name(0, 0, 0),
            expiry_window_days: 60,
            top_outbound_limit: 5,
            recent_limit: 50,
            notify_capacity: DEFAULT_SUBSCRIBER_CAPACITY,
            system_actor: UserId::new("admin"),
            seed_demo: false,
        }
    }
}

impl LedgerConfig {
    /// Load from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load using an arbitrary variable lookup (tests pass a map here).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = non_empty(&lookup, ENV_FALLBACK_LOCATION) {
            config.fallback_location = LocationCode::parse(&raw).map_err(|e| ConfigError::Invalid {
                key: ENV_FALLBACK_LOCATION,
                value: raw.clone(),
                reason: e.to_string(),
            })?;
        }
        if let Some(days) = parse_var::<i64, _>(&lookup, ENV_EXPIRY_WINDOW_DAYS)? {
            if !(0..=MAX_EXPIRY_WINDOW_DAYS).contains(&days) {
                return Err(ConfigError::Invalid {
                    key: ENV_EXPIRY_WINDOW_DAYS,
                    value: days.to_string(),
                    reason: format!("must be between 0 and {MAX_EXPIRY_WINDOW_DAYS}"),
                });
            }
            config.expiry_window_days = days;
        }
        if let Some(n) = parse_var(&lookup, ENV_TOP_OUTBOUND)? {
            config.top_outbound_limit = n;
        }
        if let Some(n) = parse_var(&lookup, ENV_RECENT_LIMIT)? {
            config.recent_limit = n;
        }
        if let Some(n) = parse_var::<usize, _>(&lookup, ENV_NOTIFY_CAPACITY)? {
            if n == 0 {
                return Err(ConfigError::Invalid {
                    key: ENV_NOTIFY_CAPACITY,
                    value: n.to_string(),
                    reason: "must be at least 1".to_string(),
                });
            }
            config.notify_capacity = n;
        }
        if let Some(actor) = non_empty(&lookup, ENV_SYSTEM_ACTOR) {
            config.system_actor = UserId::new(actor);
        }
        if let Some(raw) = non_empty(&lookup, ENV_SEED_DEMO) {
            config.seed_demo = parse_flag(&raw).ok_or_else(|| ConfigError::Invalid {
                key: ENV_SEED_DEMO,
                value: raw.clone(),
                reason: "expected true/false".to_string(),
            })?;
        }

        Ok(config)
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_var<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match non_empty(lookup, key) {
        None => Ok(None),
        Some(raw) => raw.parse::<T>().map(Some).map_err(|e| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
