//! Name-search candidates and the wire formats they come from

use scr_core::Exchange;
use serde::{Deserialize, Serialize};

/// A listed company returned by a name-search service
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SearchCandidate {
  pub name: String,
  pub symbol: String,
  pub exchange: Exchange,
}

impl SearchCandidate {
  pub fn new(name: impl Into<String>, symbol: impl Into<String>, exchange: Exchange) -> Self {
    Self { name: name.into(), symbol: symbol.into(), exchange }
  }
}

/// One entry of `GET /api/company/search/?q=...` on screener.in.
///
/// Company hits look like
/// `{"id": 1326, "name": "Infosys Ltd", "url": "/company/INFY/consolidated/"}`;
/// the trailing "search everywhere" entry has no id and a non-company url.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScreenerSearchHit {
  pub id: Option<u64>,
  pub name: String,
  pub url: String,
}

impl ScreenerSearchHit {
  /// Symbol segment of the company url, if this hit is a company
  pub fn symbol(&self) -> Option<&str> {
    let rest = self.url.trim_start_matches('/').strip_prefix("company/")?;
    rest.split('/').next().filter(|s| !s.is_empty())
  }

  /// Screener lists BSE-only companies under their numeric scrip code
  pub fn into_candidate(self) -> Option<SearchCandidate> {
    let symbol = self.symbol()?.to_ascii_uppercase();
    let exchange =
      if symbol.chars().all(|c| c.is_ascii_digit()) { Exchange::Bse } else { Exchange::Nse };
    Some(SearchCandidate::new(self.name.trim(), symbol, exchange))
  }
}

/// Response of the Yahoo Finance search endpoint
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct YahooSearchResponse {
  #[serde(default)]
  pub quotes: Vec<YahooQuote>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct YahooQuote {
  pub symbol: String,
  #[serde(default)]
  pub exchange: Option<String>,
  #[serde(default, rename = "shortname")]
  pub short_name: Option<String>,
  #[serde(default, rename = "longname")]
  pub long_name: Option<String>,
}

impl YahooQuote {
  /// Keep Indian listings only; `INFY.NS` becomes `INFY` on NSE
  pub fn into_candidate(self) -> Option<SearchCandidate> {
    let (base, suffix) = match self.symbol.rsplit_once('.') {
      Some((base, suffix)) => (base.to_string(), Some(suffix.to_string())),
      None => (self.symbol.clone(), None),
    };
    let exchange = suffix
      .as_deref()
      .and_then(|s| s.parse::<Exchange>().ok())
      .or_else(|| self.exchange.as_deref().and_then(|e| e.parse::<Exchange>().ok()))?;
    let name = self.long_name.or(self.short_name).unwrap_or_else(|| base.clone());
    Some(SearchCandidate::new(name.trim(), base.to_ascii_uppercase(), exchange))
  }
}
