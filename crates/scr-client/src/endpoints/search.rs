use super::{EndpointBase, SharedRateLimiter};
use crate::endpoints::impl_endpoint_base;
use crate::transport::Transport;
use scr_core::Result;
use scr_models::search::{ScreenerSearchHit, SearchCandidate, YahooQuote, YahooSearchResponse};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Name-search endpoints
pub struct SearchEndpoints {
  transport: Arc<Transport>,
  rate_limiter: SharedRateLimiter,
  base_url: String,
  yahoo_search_url: String,
}

impl SearchEndpoints {
  pub fn new(
    transport: Arc<Transport>,
    rate_limiter: SharedRateLimiter,
    base_url: String,
    yahoo_search_url: String,
  ) -> Self {
    Self { transport, rate_limiter, base_url, yahoo_search_url }
  }

  /// Query screener.in's company search
  ///
  /// Non-company entries (the "search everywhere" link) are dropped.
  #[instrument(skip(self))]
  pub async fn screener(&self, query: &str) -> Result<Vec<SearchCandidate>> {
    self.wait_for_rate_limit().await;

    let url = format!("{}/api/company/search/", self.base_url.trim_end_matches('/'));
    let hits: Vec<ScreenerSearchHit> = self.transport.get_json(&url, &[("q", query)]).await?;

    let candidates: Vec<SearchCandidate> =
      hits.into_iter().filter_map(ScreenerSearchHit::into_candidate).collect();
    debug!("Screener search returned {} candidates", candidates.len());
    Ok(candidates)
  }

  /// Query Yahoo Finance search, keeping NSE and BSE listings
  #[instrument(skip(self))]
  pub async fn yahoo(&self, query: &str) -> Result<Vec<SearchCandidate>> {
    self.wait_for_rate_limit().await;

    let response: YahooSearchResponse = self
      .transport
      .get_json(&self.yahoo_search_url, &[("q", query), ("quotesCount", "10"), ("newsCount", "0")])
      .await?;

    let candidates: Vec<SearchCandidate> =
      response.quotes.into_iter().filter_map(YahooQuote::into_candidate).collect();
    debug!("Yahoo search returned {} candidates", candidates.len());
    Ok(candidates)
  }
}

impl_endpoint_base!(SearchEndpoints);
