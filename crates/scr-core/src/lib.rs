pub mod config;
pub mod error;
pub mod retry;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use config::Config;
pub use error::{Error, Result};
pub use retry::RetryPolicy;
pub use types::{Exchange, PageView, Statement, Unit};

/// Base URL for Screener.in
pub const SCREENER_BASE_URL: &str = "https://www.screener.in";

/// Yahoo Finance symbol search endpoint
pub const YAHOO_SEARCH_URL: &str = "https://query2.finance.yahoo.com/v1/finance/search";

/// Source label written on mapped records
pub const DEFAULT_SOURCE_LABEL: &str = "Screener.in";

/// Source label written on rows the metric catalog does not know
pub const UNMAPPED_SOURCE_LABEL: &str = "raw:unmapped";

/// Screener serves pages to browsers only
pub const DEFAULT_USER_AGENT: &str =
  "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko)";

/// Requests per minute against screener.in
pub const DEFAULT_RATE_LIMIT: u32 = 30;

/// Number of most recent fiscal years kept per table
pub const DEFAULT_MAX_YEARS: usize = 6;
