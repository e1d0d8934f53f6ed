//! Network-backed implementations of the pipeline capabilities

use crate::traits::{NameSearch, StatementSource};
use async_trait::async_trait;
use scr_client::ScreenerClient;
use scr_core::PageView;
use scr_models::SearchCandidate;
use std::sync::Arc;
use tracing::{debug, warn};

/// screener.in company search
pub struct ScreenerSearch {
  client: Arc<ScreenerClient>,
}

impl ScreenerSearch {
  pub fn new(client: Arc<ScreenerClient>) -> Self {
    Self { client }
  }
}

#[async_trait]
impl NameSearch for ScreenerSearch {
  async fn search(&self, query: &str) -> scr_core::Result<Vec<SearchCandidate>> {
    self.client.search().screener(query).await
  }

  fn source_name(&self) -> &'static str {
    "screener"
  }
}

/// Yahoo Finance symbol search, restricted to Indian listings
pub struct YahooSearch {
  client: Arc<ScreenerClient>,
}

impl YahooSearch {
  pub fn new(client: Arc<ScreenerClient>) -> Self {
    Self { client }
  }
}

#[async_trait]
impl NameSearch for YahooSearch {
  async fn search(&self, query: &str) -> scr_core::Result<Vec<SearchCandidate>> {
    self.client.search().yahoo(query).await
  }

  fn source_name(&self) -> &'static str {
    "yahoo"
  }
}

/// Asks each source in turn and returns the first non-empty answer.
///
/// When nothing was found and at least one source failed, the failure is
/// returned: an outage must not read as "no such company".
pub struct ChainedSearch {
  sources: Vec<Box<dyn NameSearch>>,
}

impl ChainedSearch {
  pub fn new(sources: Vec<Box<dyn NameSearch>>) -> Self {
    Self { sources }
  }

  /// Screener first, Yahoo as the fallback
  pub fn screener_then_yahoo(client: Arc<ScreenerClient>) -> Self {
    Self::new(vec![
      Box::new(ScreenerSearch::new(client.clone())),
      Box::new(YahooSearch::new(client)),
    ])
  }
}

#[async_trait]
impl NameSearch for ChainedSearch {
  async fn search(&self, query: &str) -> scr_core::Result<Vec<SearchCandidate>> {
    let mut last_error = None;

    for source in &self.sources {
      match source.search(query).await {
        Ok(candidates) if !candidates.is_empty() => {
          debug!("{} answered {:?} with {} candidates", source.source_name(), query, candidates.len());
          return Ok(candidates);
        }
        Ok(_) => debug!("{} has nothing for {:?}", source.source_name(), query),
        Err(e) => {
          warn!("{} search failed for {:?}: {}", source.source_name(), query, e);
          last_error = Some(e);
        }
      }
    }

    match last_error {
      Some(e) => Err(e),
      None => Ok(Vec::new()),
    }
  }

  fn source_name(&self) -> &'static str {
    "chained"
  }
}

#[async_trait]
impl StatementSource for ScreenerClient {
  async fn fetch_page(&self, symbol: &str, view: PageView) -> scr_core::Result<String> {
    self.company().page(symbol, view).await
  }
}
