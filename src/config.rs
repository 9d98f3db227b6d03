//! Environment-driven configuration
//!
//! Values come from the process environment, after loading a `.env` file
//! when one is present. Every setting except the access token has a default.

use std::collections::BTreeSet;
use std::env;
use std::str::FromStr;

use crate::analysis::{DEFAULT_LONG_RUN_SPORTS, DEFAULT_PACE_SPORTS};

pub const DEFAULT_API_BASE: &str = "https://www.strava.com/api/v3";
pub const DEFAULT_PER_PAGE: u32 = 200;
pub const DEFAULT_WINDOW_LIMIT: u32 = 100;
pub const DEFAULT_DAILY_LIMIT: u32 = 1000;
pub const DEFAULT_DATABASE_URL: &str = "sqlite://training-load.db?mode=rwc";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
  #[error("Missing configuration: {0}")]
  Missing(String),

  #[error("Invalid value for {key}: {value:?}")]
  Invalid { key: String, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
  pub api_base: String,
  pub per_page: u32,
  /// Requests allowed per 15-minute window
  pub window_limit: u32,
  /// Requests allowed per UTC day
  pub daily_limit: u32,
  pub database_url: String,
  pub access_token: Option<String>,
  pub pace_sports: BTreeSet<String>,
  pub long_run_sports: BTreeSet<String>,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      api_base: DEFAULT_API_BASE.to_string(),
      per_page: DEFAULT_PER_PAGE,
      window_limit: DEFAULT_WINDOW_LIMIT,
      daily_limit: DEFAULT_DAILY_LIMIT,
      database_url: DEFAULT_DATABASE_URL.to_string(),
      access_token: None,
      pace_sports: DEFAULT_PACE_SPORTS.iter().map(|s| s.to_string()).collect(),
      long_run_sports: DEFAULT_LONG_RUN_SPORTS.iter().map(|s| s.to_string()).collect(),
    }
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self, ConfigError> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let defaults = Self::default();
    let config = Self {
      api_base: env::var("STRAVA_API_BASE").unwrap_or(defaults.api_base),
      per_page: parse_var("STRAVA_PER_PAGE", defaults.per_page)?,
      window_limit: parse_var("STRAVA_WINDOW_LIMIT", defaults.window_limit)?,
      daily_limit: parse_var("STRAVA_DAILY_LIMIT", defaults.daily_limit)?,
      database_url: env::var("DATABASE_URL").unwrap_or(defaults.database_url),
      access_token: env::var("STRAVA_ACCESS_TOKEN").ok().filter(|t| !t.trim().is_empty()),
      pace_sports: list_var("PACE_SPORTS").unwrap_or(defaults.pace_sports),
      long_run_sports: list_var("LONG_RUN_SPORTS").unwrap_or(defaults.long_run_sports),
    };

    if config.per_page == 0 {
      return Err(ConfigError::Invalid {
        key: "STRAVA_PER_PAGE".into(),
        value: "0".into(),
      });
    }

    tracing::debug!(
      api_base = %config.api_base,
      per_page = config.per_page,
      window_limit = config.window_limit,
      daily_limit = config.daily_limit,
      "Loaded configuration"
    );
    Ok(config)
  }

  pub fn require_access_token(&self) -> Result<&str, ConfigError> {
    self
      .access_token
      .as_deref()
      .ok_or_else(|| ConfigError::Missing("STRAVA_ACCESS_TOKEN".into()))
  }
}

fn parse_var<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError> {
  match env::var(key) {
    Ok(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
      key: key.to_string(),
      value,
    }),
    Err(_) => Ok(default),
  }
}

/// Comma-separated list; `None` when unset or blank
fn list_var(key: &str) -> Option<BTreeSet<String>> {
  let value = env::var(key).ok()?;
  let items: BTreeSet<String> = value
    .split(',')
    .map(str::trim)
    .filter(|s| !s.is_empty())
    .map(String::from)
    .collect();
  if items.is_empty() {
    None
  } else {
    Some(items)
  }
}
