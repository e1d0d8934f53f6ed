use super::{EndpointBase, SharedRateLimiter};
use crate::endpoints::impl_endpoint_base;
use crate::transport::Transport;
use scr_core::{PageView, Result};
use std::sync::Arc;
use tracing::instrument;

/// Company page endpoints (`/company/{SYMBOL}/...`)
pub struct CompanyEndpoints {
  transport: Arc<Transport>,
  rate_limiter: SharedRateLimiter,
  base_url: String,
}

impl CompanyEndpoints {
  pub fn new(transport: Arc<Transport>, rate_limiter: SharedRateLimiter, base_url: String) -> Self {
    Self { transport, rate_limiter, base_url }
  }

  /// URL of the statements page for `symbol`
  ///
  /// Consolidated figures live under `/consolidated/`; standalone ones on
  /// the bare company page.
  pub fn page_url(&self, symbol: &str, view: PageView) -> String {
    let base = self.base_url.trim_end_matches('/');
    let symbol = symbol.trim().to_ascii_uppercase();
    match view {
      PageView::Consolidated => format!("{}/company/{}/consolidated/", base, symbol),
      PageView::Standalone => format!("{}/company/{}/", base, symbol),
    }
  }

  /// Fetch the raw HTML of the statements page
  #[instrument(skip(self))]
  pub async fn page(&self, symbol: &str, view: PageView) -> Result<String> {
    self.wait_for_rate_limit().await;
    self.transport.get_text(&self.page_url(symbol, view), &[]).await
  }
}

impl_endpoint_base!(CompanyEndpoints);
