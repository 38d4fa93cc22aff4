//! Environment configuration, read once at startup.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::TimeDelta;
use scout_backend::BackendConfig;
use scout_telegram::auth::Credentials;
use scout_telegram::search::SearchOptions;
use secrecy::{ExposeSecret, SecretString};

use crate::flow::RunPlan;

// ─── Error ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    Missing(&'static str),
    /// A variable is set but cannot be parsed.
    Invalid { var: &'static str, value: String, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(var) => write!(f, "environment variable {var} is not set"),
            Self::Invalid { var, value, reason } => write!(f, "invalid {var}={value:?}: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

// ─── Config ───────────────────────────────────────────────────────────────────

/// Everything the app reads from the environment.
#[derive(Debug)]
pub struct Config {
    pub api_id:         i32,
    pub api_hash:       SecretString,
    pub phone:          String,
    pub session_dir:    PathBuf,
    pub folder_id:      i32,
    pub search:         SearchOptions,
    pub search_timeout: Duration,
    pub product_index:  usize,
    pub include_groups: bool,
    /// Only present when all four `SUPABASE_*` variables are set.
    backend:            Option<BackendConfig>,
}

const BACKEND_VARS: [&str; 4] = ["SUPABASE_URL", "SUPABASE_KEY", "SUPABASE_USER", "SUPABASE_PASSWORD"];

/// One year.
const MAX_WINDOW_MINUTES: i64 = 525_600;

impl Config {
    /// Load `.env` (if any) and read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenv::dotenv() {
            log::debug!("loaded {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let api_id   = parse(require("TELEGRAM_APP_ID")?, "TELEGRAM_APP_ID")?;
        let api_hash = SecretString::from(require("TELEGRAM_APP_HASH")?);
        let phone    = require("TELEGRAM_PHONE")?;

        let optional = |key: &'static str, default: i64| -> Result<i64, ConfigError> {
            get(key).map_or(Ok(default), |v| parse(v, key))
        };

        let window_minutes = optional("SCOUT_SEARCH_WINDOW_MINUTES", 120)?;
        if !(1..=MAX_WINDOW_MINUTES).contains(&window_minutes) {
            return Err(invalid(
                "SCOUT_SEARCH_WINDOW_MINUTES",
                window_minutes,
                &format!("must be between 1 and {MAX_WINDOW_MINUTES}"),
            ));
        }
        let window = TimeDelta::try_minutes(window_minutes)
            .ok_or_else(|| invalid("SCOUT_SEARCH_WINDOW_MINUTES", window_minutes, "out of range"))?;
        let limit = optional("SCOUT_SEARCH_LIMIT", 2)?;
        if !(1..=100).contains(&limit) {
            return Err(invalid("SCOUT_SEARCH_LIMIT", limit, "must be between 1 and 100"));
        }
        let timeout = optional("SCOUT_SEARCH_TIMEOUT_SECS", 10)?;
        if timeout <= 0 {
            return Err(invalid("SCOUT_SEARCH_TIMEOUT_SECS", timeout, "must be positive"));
        }
        let folder_id = optional("SCOUT_FOLDER_ID", 4)?;
        let folder_id = i32::try_from(folder_id)
            .map_err(|_| invalid("SCOUT_FOLDER_ID", folder_id, "out of range"))?;
        let product_index = optional("SCOUT_PRODUCT_INDEX", 0)?;
        let product_index = usize::try_from(product_index)
            .map_err(|_| invalid("SCOUT_PRODUCT_INDEX", product_index, "must not be negative"))?;

        let include_groups = match get("SCOUT_INCLUDE_GROUPS") {
            None => false,
            Some(v) => parse_bool(&v).ok_or_else(|| invalid("SCOUT_INCLUDE_GROUPS", &v, "expected true or false"))?,
        };

        let backend = backend_from(&get)?;

        Ok(Self {
            api_id,
            api_hash,
            phone,
            session_dir: get("SCOUT_SESSION_DIR").map_or_else(|| PathBuf::from("session"), PathBuf::from),
            folder_id,
            search: SearchOptions {
                window,
                limit:  limit as i32,
            },
            search_timeout: Duration::from_secs(timeout as u64),
            product_index,
            include_groups,
            backend,
        })
    }

    /// Telegram login parameters.
    pub fn credentials(&self) -> Credentials {
        Credentials {
            api_id:      self.api_id,
            api_hash:    self.api_hash.expose_secret().to_string(),
            phone:       self.phone.clone(),
            session_dir: self.session_dir.clone(),
        }
    }

    /// Hand out the backend settings. Fails with the first missing variable
    /// when the backend is not configured.
    pub fn take_backend(&mut self) -> Result<BackendConfig, ConfigError> {
        self.backend.take().ok_or(ConfigError::Missing(BACKEND_VARS[0]))
    }

    /// Everything `run` needs, checked before any network or login work.
    pub fn run_settings(&mut self) -> Result<(BackendConfig, RunPlan), ConfigError> {
        let backend = self.take_backend()?;
        let plan = RunPlan {
            folder_id:      self.folder_id,
            include_groups: self.include_groups,
            options:        self.search,
            product_index:  self.product_index,
            timeout:        self.search_timeout,
        };
        Ok((backend, plan))
    }
}

/// All four backend variables, none of them, or `Missing` for the first gap.
fn backend_from<G>(get: &G) -> Result<Option<BackendConfig>, ConfigError>
where
    G: Fn(&str) -> Option<String>,
{
    let values: Vec<Option<String>> = BACKEND_VARS.iter().map(|&k| get(k)).collect();
    if values.iter().all(Option::is_none) {
        return Ok(None);
    }
    if let Some(i) = values.iter().position(Option::is_none) {
        return Err(ConfigError::Missing(BACKEND_VARS[i]));
    }

    let mut values = values.into_iter().flatten();
    let mut next = || values.next().unwrap_or_default();
    Ok(Some(BackendConfig {
        url:      next(),
        api_key:  SecretString::from(next()),
        email:    next(),
        password: SecretString::from(next()),
    }))
}

fn parse<T>(value: String, var: &'static str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid { var, reason: e.to_string(), value })
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on"  => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

fn invalid(var: &'static str, value: impl fmt::Display, reason: &str) -> ConfigError {
    ConfigError::Invalid { var, value: value.to_string(), reason: reason.to_string() }
}
