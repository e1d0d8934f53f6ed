//! Configuration management for the Screener pipeline

use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use crate::types::Exchange;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use std::time::Duration;
use url::Url;

/// Main configuration struct for the Screener client and pipeline
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
  /// Base URL for screener.in (company pages and search API)
  pub base_url: String,

  /// Yahoo Finance search endpoint used as a secondary name search
  pub yahoo_search_url: String,

  /// Rate limit (requests per minute)
  pub rate_limit: u32,

  /// Request timeout in seconds
  pub timeout_secs: u64,

  /// Retry policy applied to every fetch
  pub retry: RetryPolicy,

  /// Delay between sequential page fetches of one run, in milliseconds
  pub fetch_delay_ms: u64,

  /// Exchange the resolver prefers when disambiguating
  pub target_exchange: Exchange,

  /// Most recent fiscal years kept per table (0 keeps all)
  pub max_years: usize,

  /// User-Agent header sent with every request
  pub user_agent: String,

  /// Prefer consolidated statements, falling back to standalone ones
  pub consolidated: bool,

  /// Value written to the Source column of mapped records
  pub source_label: String,
}

impl Config {
  /// Load configuration from environment variables
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let base_url = env::var("SCREENER_BASE_URL").unwrap_or_else(|_| crate::SCREENER_BASE_URL.to_string());
    validate_url(&base_url, "SCREENER_BASE_URL")?;

    let yahoo_search_url =
      env::var("YAHOO_SEARCH_URL").unwrap_or_else(|_| crate::YAHOO_SEARCH_URL.to_string());
    validate_url(&yahoo_search_url, "YAHOO_SEARCH_URL")?;

    let defaults = RetryPolicy::default();
    let retry = RetryPolicy {
      max_attempts: parse_var("SCR_MAX_RETRIES", defaults.max_attempts)?,
      initial_backoff_ms: parse_var("SCR_RETRY_BACKOFF_MS", defaults.initial_backoff_ms)?,
      max_backoff_ms: parse_var("SCR_MAX_BACKOFF_MS", defaults.max_backoff_ms)?,
      multiplier: defaults.multiplier,
      jitter_ms: parse_var("SCR_RETRY_JITTER_MS", defaults.jitter_ms)?,
    };

    let target_exchange = env::var("SCR_TARGET_EXCHANGE")
      .unwrap_or_else(|_| "NSE".to_string())
      .parse()
      .map_err(|_| Error::Config("Invalid SCR_TARGET_EXCHANGE".to_string()))?;

    Ok(Config {
      base_url,
      yahoo_search_url,
      rate_limit: parse_var("SCR_RATE_LIMIT", crate::DEFAULT_RATE_LIMIT)?,
      timeout_secs: parse_var("SCR_TIMEOUT_SECS", 20)?,
      retry,
      fetch_delay_ms: parse_var("SCR_FETCH_DELAY_MS", 1000)?,
      target_exchange,
      max_years: parse_var("SCR_MAX_YEARS", crate::DEFAULT_MAX_YEARS)?,
      user_agent: env::var("SCR_USER_AGENT").unwrap_or_else(|_| crate::DEFAULT_USER_AGENT.to_string()),
      consolidated: parse_var("SCR_CONSOLIDATED", true)?,
      source_label: env::var("SCR_SOURCE_LABEL")
        .unwrap_or_else(|_| crate::DEFAULT_SOURCE_LABEL.to_string()),
    })
  }

  /// Create a config pointing at the given base URL (for testing)
  pub fn with_base_url(base_url: impl Into<String>) -> Self {
    let base_url = base_url.into();
    Config {
      yahoo_search_url: format!("{}/v1/finance/search", base_url.trim_end_matches('/')),
      base_url,
      rate_limit: 6000,
      timeout_secs: 5,
      retry: RetryPolicy::none(),
      fetch_delay_ms: 0,
      ..Config::default()
    }
  }

  /// Request timeout as a duration
  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }

  /// Delay between sequential fetches as a duration
  pub fn fetch_delay(&self) -> Duration {
    Duration::from_millis(self.fetch_delay_ms)
  }
}

impl Default for Config {
  fn default() -> Self {
    Config {
      base_url: crate::SCREENER_BASE_URL.to_string(),
      yahoo_search_url: crate::YAHOO_SEARCH_URL.to_string(),
      rate_limit: crate::DEFAULT_RATE_LIMIT,
      timeout_secs: 20,
      retry: RetryPolicy::default(),
      fetch_delay_ms: 1000,
      target_exchange: Exchange::Nse,
      max_years: crate::DEFAULT_MAX_YEARS,
      user_agent: crate::DEFAULT_USER_AGENT.to_string(),
      consolidated: true,
      source_label: crate::DEFAULT_SOURCE_LABEL.to_string(),
    }
  }
}

fn parse_var<T: FromStr>(name: &str, default: T) -> Result<T> {
  match env::var(name) {
    Ok(raw) => raw.trim().parse().map_err(|_| Error::Config(format!("Invalid {}", name))),
    Err(_) => Ok(default),
  }
}

fn validate_url(raw: &str, name: &str) -> Result<()> {
  Url::parse(raw).map(|_| ()).map_err(|e| Error::Config(format!("Invalid {}: {}", name, e)))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_config_from_env() {
    env::set_var("SCR_MAX_YEARS", "4");
    env::set_var("SCR_TARGET_EXCHANGE", "bse");
    let config = Config::from_env().unwrap();
    assert_eq!(config.max_years, 4);
    assert_eq!(config.target_exchange, Exchange::Bse);
    assert_eq!(config.rate_limit, 30);
    env::remove_var("SCR_MAX_YEARS");
    env::remove_var("SCR_TARGET_EXCHANGE");
  }

  #[test]
  fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.base_url, "https://www.screener.in");
    assert_eq!(config.target_exchange, Exchange::Nse);
    assert!(config.consolidated);
    assert_eq!(config.fetch_delay(), Duration::from_secs(1));
  }

  #[test]
  fn test_with_base_url_disables_delays() {
    let config = Config::with_base_url("http://127.0.0.1:9999");
    assert_eq!(config.fetch_delay_ms, 0);
    assert_eq!(config.retry.max_attempts, 1);
    assert_eq!(config.yahoo_search_url, "http://127.0.0.1:9999/v1/finance/search");
  }

  #[test]
  fn test_validate_url() {
    assert!(validate_url("https://www.screener.in", "X").is_ok());
    assert!(matches!(validate_url("not a url", "X"), Err(Error::Config(_))));
  }
}
