//! Runtime configuration read from environment variables.
//!
//! Validation is all-or-nothing: every missing or malformed key is collected
//! into a single [`ConfigError`] so the operator can fix them in one pass.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::models::amount::MAX_DECIMALS;
use crate::{DEFAULT_HISTORY_FILE, DEFAULT_STATE_FILE};

pub const DEFAULT_RPC_URL: &str = "http://localhost:26657";
pub const DEFAULT_LCD_URL: &str = "http://localhost:1317";
pub const DEFAULT_DENOM: &str = "arai";
pub const DEFAULT_DECIMALS: u32 = 18;
pub const DEFAULT_HEARTBEAT_HOURS: f64 = 3.0;
pub const DEFAULT_NODE_BINARY: &str = "republicd";
pub const DEFAULT_NODE_HOME: &str = "/root/.republicd";
pub const DEFAULT_TELEGRAM_API: &str = "https://api.telegram.org";
pub const DEFAULT_UTC_OFFSET_HOURS: i32 = 7;
pub const DEFAULT_TZ_LABEL: &str = "WIB";

/// Keys that must be present for the monitor to start.
pub const REQUIRED_KEYS: [&str; 4] = ["TG_TOKEN", "TG_CHAT_ID", "VALOPER", "WALLET"];

/// A single problem found while validating configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigProblem {
    #[error("{0} is not set")]
    Missing(&'static str),

    #[error("{key}={value:?} is invalid: {reason}")]
    Malformed {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Every configuration problem found, in key order.
#[derive(Debug, Error)]
#[error("invalid configuration:\n{}", list_problems(.problems))]
pub struct ConfigError {
    pub problems: Vec<ConfigProblem>,
}

impl ConfigError {
    /// Names of required keys that were not set.
    pub fn missing_keys(&self) -> Vec<&'static str> {
        self.problems
            .iter()
            .filter_map(|p| match p {
                ConfigProblem::Missing(key) => Some(*key),
                ConfigProblem::Malformed { .. } => None,
            })
            .collect()
    }
}

fn list_problems(problems: &[ConfigProblem]) -> String {
    problems
        .iter()
        .map(|p| format!("  - {p}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
    pub api_base: String,
}

#[derive(Debug, Clone)]
pub struct ChainConfig {
    pub rpc_url: String,
    pub lcd_url: String,
    pub denom: String,
    pub decimals: u32,
    pub token_symbol: String,
    pub chain_id: Option<String>,
}

/// The one validator this process watches.
#[derive(Debug, Clone)]
pub struct ValidatorIdentity {
    /// `valoper` address used for staking queries.
    pub operator_address: String,
    /// `valcons` address used for slashing queries. Without it missed blocks are not tracked.
    pub consensus_address: Option<String>,
    /// Account holding the self-delegation and rewards.
    pub wallet_address: String,
}

/// Node binary used when the network endpoints do not answer.
#[derive(Debug, Clone)]
pub struct FallbackConfig {
    pub binary: String,
    pub home: PathBuf,
}

/// How timestamps in outgoing messages are rendered.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    pub utc_offset_hours: i32,
    pub tz_label: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            utc_offset_hours: DEFAULT_UTC_OFFSET_HOURS,
            tz_label: DEFAULT_TZ_LABEL.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub chain: ChainConfig,
    pub validator: ValidatorIdentity,
    pub fallback: FallbackConfig,
    pub heartbeat_interval: Duration,
    pub state_file: PathBuf,
    pub history_file: PathBuf,
    pub report: ReportConfig,
}

impl Config {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut reader = Reader {
            lookup,
            problems: Vec::new(),
        };

        let token = reader.required("TG_TOKEN");
        let chat_id = reader.required("TG_CHAT_ID");
        let operator_address = reader.required("VALOPER");
        let wallet_address = reader.required("WALLET");

        if let Some(token) = token.as_deref() {
            if !token.contains(':') || token.len() < 20 {
                reader.malformed("TG_TOKEN", "<redacted>", "expected <bot id>:<secret>");
            }
        }

        let rpc_url = reader.url("RPC_URL", DEFAULT_RPC_URL);
        let lcd_url = reader.url("LCD_URL", DEFAULT_LCD_URL);
        let api_base = reader.url("TG_API_BASE", DEFAULT_TELEGRAM_API);
        let denom = reader.optional("DENOM").unwrap_or_else(|| DEFAULT_DENOM.to_string());
        let decimals = reader.decimals();
        let heartbeat_interval = reader.heartbeat_interval();
        let utc_offset_hours = reader.utc_offset();

        let token_symbol = reader
            .optional("TOKEN_SYMBOL")
            .unwrap_or_else(|| symbol_from_denom(&denom));

        let config = Config {
            telegram: TelegramConfig {
                token: token.unwrap_or_default(),
                chat_id: chat_id.unwrap_or_default(),
                api_base,
            },
            chain: ChainConfig {
                rpc_url,
                lcd_url,
                denom,
                decimals,
                token_symbol,
                chain_id: reader.optional("CHAIN_ID"),
            },
            validator: ValidatorIdentity {
                operator_address: operator_address.unwrap_or_default(),
                consensus_address: reader.optional("VALCONS"),
                wallet_address: wallet_address.unwrap_or_default(),
            },
            fallback: FallbackConfig {
                binary: reader
                    .optional_any(&["NODE_BINARY", "REPUBLICD_BINARY"])
                    .unwrap_or_else(|| DEFAULT_NODE_BINARY.to_string()),
                home: reader
                    .optional_any(&["NODE_HOME", "REPUBLIC_HOME"])
                    .map(PathBuf::from)
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_NODE_HOME)),
            },
            heartbeat_interval,
            state_file: reader
                .optional("STATE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_FILE)),
            history_file: reader
                .optional("HISTORY_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_HISTORY_FILE)),
            report: ReportConfig {
                utc_offset_hours,
                tz_label: reader
                    .optional("REPORT_TZ_LABEL")
                    .unwrap_or_else(|| DEFAULT_TZ_LABEL.to_string()),
            },
        };

        if reader.problems.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError {
                problems: reader.problems,
            })
        }
    }
}

/// `arai` → `RAI`, `uatom` → `ATOM`, `stake` → `STAKE`.
pub fn symbol_from_denom(denom: &str) -> String {
    let trimmed = match denom.strip_prefix(|c: char| c == 'a' || c == 'u') {
        Some(rest) if rest.len() >= 3 => rest,
        _ => denom,
    };
    trimmed.to_ascii_uppercase()
}

struct Reader<F> {
    lookup: F,
    problems: Vec<ConfigProblem>,
}

impl<F> Reader<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.lookup)(key)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    /// First set value among `keys`; later keys are legacy names.
    fn optional_any(&self, keys: &[&str]) -> Option<String> {
        keys.iter().find_map(|key| self.optional(key))
    }

    fn required(&mut self, key: &'static str) -> Option<String> {
        let value = self.optional(key);
        if value.is_none() {
            self.problems.push(ConfigProblem::Missing(key));
        }
        value
    }

    fn malformed(&mut self, key: &'static str, value: &str, reason: &str) {
        self.problems.push(ConfigProblem::Malformed {
            key,
            value: value.to_string(),
            reason: reason.to_string(),
        });
    }

    fn url(&mut self, key: &'static str, default: &str) -> String {
        let value = self.optional(key).unwrap_or_else(|| default.to_string());
        if !(value.starts_with("http://") || value.starts_with("https://")) {
            self.malformed(key, &value, "expected an http:// or https:// URL");
        }
        value.trim_end_matches('/').to_string()
    }

    fn decimals(&mut self) -> u32 {
        let Some(raw) = self.optional("DECIMALS") else {
            return DEFAULT_DECIMALS;
        };
        match raw.parse::<u32>() {
            Ok(d) if d <= MAX_DECIMALS => d,
            _ => {
                self.malformed(
                    "DECIMALS",
                    &raw,
                    &format!("expected an integer between 0 and {MAX_DECIMALS}"),
                );
                DEFAULT_DECIMALS
            }
        }
    }

    fn heartbeat_interval(&mut self) -> Duration {
        let default = Duration::from_secs_f64(DEFAULT_HEARTBEAT_HOURS * 3600.0);
        let Some(raw) = self.optional("HEARTBEAT_HOURS") else {
            return default;
        };
        let interval = raw
            .parse::<f64>()
            .ok()
            .filter(|h| h.is_finite() && *h > 0.0)
            .and_then(|h| Duration::try_from_secs_f64(h * 3600.0).ok());
        match interval {
            Some(interval) => interval,
            None => {
                self.malformed(
                    "HEARTBEAT_HOURS",
                    &raw,
                    "expected a positive number of hours within range",
                );
                default
            }
        }
    }

    fn utc_offset(&mut self) -> i32 {
        let Some(raw) = self.optional("REPORT_UTC_OFFSET_HOURS") else {
            return DEFAULT_UTC_OFFSET_HOURS;
        };
        match raw.parse::<i32>() {
            Ok(h) if (-12..=14).contains(&h) => h,
            _ => {
                self.malformed(
                    "REPORT_UTC_OFFSET_HOURS",
                    &raw,
                    "expected whole hours between -12 and 14",
                );
                DEFAULT_UTC_OFFSET_HOURS
            }
        }
    }
}
