use chrono_tz::Tz;
use std::env;
use std::time::Duration;

use super::models::CarrierHint;
use crate::errors::TrackerError;

pub const DEFAULT_TRACKING_API_BASE_URL: &str = "https://api.17track.net/track/v2.2/";
pub const DEFAULT_TELEGRAM_API_BASE_URL: &str = "https://api.telegram.org/";

const DEFAULT_SETTLE_MS: u64 = 2_000;
const DEFAULT_MAX_WAIT_MS: u64 = 10_000;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub telegram_bot_token: String,
    pub telegram_api_base_url: String,
    pub telegram_webhook_secret: Option<String>,
    pub tracking_api_key: Option<String>,
    pub tracking_api_base_url: String,
    pub register_before_query: bool,
    pub fallback_carriers: Vec<CarrierHint>,
    pub register_settle_ms: u64,
    pub register_requery_attempts: usize,
    pub register_max_wait_ms: u64,
    pub display_timezone: Tz,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary key lookup, so tests do not
    /// have to mutate the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| lookup(key).ok_or_else(|| format!("{}: not set", key));

        let register_before_query = parse_bool(&required("REGISTER_BEFORE_QUERY")?)
            .map_err(|e| format!("REGISTER_BEFORE_QUERY: {}", e))?;

        let fallback_carriers = match lookup("TRACKING_FALLBACK_CARRIERS") {
            Some(raw) => parse_carrier_list(&raw)
                .map_err(|e| format!("TRACKING_FALLBACK_CARRIERS: {}", e))?,
            None => CarrierHint::ALL.to_vec(),
        };

        let display_timezone = match lookup("DISPLAY_TIMEZONE") {
            Some(name) => name
                .parse::<Tz>()
                .map_err(|e| format!("DISPLAY_TIMEZONE: {}", e))?,
            None => Tz::UTC,
        };

        Ok(Self {
            telegram_bot_token: required("TELEGRAM_BOT_TOKEN")?,
            telegram_api_base_url: lookup("TELEGRAM_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE_URL.to_string()),
            telegram_webhook_secret: lookup("TELEGRAM_WEBHOOK_SECRET").filter(|s| !s.is_empty()),
            tracking_api_key: lookup("TRACKING_API_KEY").filter(|s| !s.is_empty()),
            tracking_api_base_url: lookup("TRACKING_API_BASE_URL")
                .unwrap_or_else(|| DEFAULT_TRACKING_API_BASE_URL.to_string()),
            register_before_query,
            fallback_carriers,
            register_settle_ms: parse_number(&lookup, "REGISTER_SETTLE_MS", DEFAULT_SETTLE_MS)?,
            register_requery_attempts: parse_number(&lookup, "REGISTER_REQUERY_ATTEMPTS", 0)?,
            register_max_wait_ms: parse_number(
                &lookup,
                "REGISTER_MAX_WAIT_MS",
                DEFAULT_MAX_WAIT_MS,
            )?,
            display_timezone,
        })
    }

    /// Returns the tracking API key, or a configuration error when it is missing.
    ///
    /// # Errors
    ///
    /// Returns `TrackerError::ConfigError` if `TRACKING_API_KEY` was not provided.
    pub fn require_tracking_api_key(&self) -> Result<&str, TrackerError> {
        self.tracking_api_key
            .as_deref()
            .ok_or_else(|| TrackerError::ConfigError("TRACKING_API_KEY is not set".to_string()))
    }

    #[must_use]
    pub fn register_settle_delay(&self) -> Duration {
        Duration::from_millis(self.register_settle_ms)
    }

    #[must_use]
    pub fn register_max_wait(&self) -> Duration {
        Duration::from_millis(self.register_max_wait_ms)
    }
}

fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("expected a boolean, got '{}'", other)),
    }
}

fn parse_number<F, T>(lookup: &F, key: &str, default: T) -> Result<T, String>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse::<T>().map_err(|e| format!("{}: {}", key, e)),
        None => Ok(default),
    }
}

fn parse_carrier_list(raw: &str) -> Result<Vec<CarrierHint>, String> {
    let mut carriers = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let hint = item.parse::<CarrierHint>()?;
        if !carriers.contains(&hint) {
            carriers.push(hint);
        }
    }
    Ok(carriers)
}
