/*
 *
 *
 *
 *
 * MIT License
 * Copyright (c) 2025. Dwight J. Browne
 * dwight[-at-]dwightjbrowne[-dot-]com
 *
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

use crate::endpoints::{company::CompanyEndpoints, search::SearchEndpoints, SharedRateLimiter};
use crate::transport::Transport;
use governor::{Quota, RateLimiter};
use scr_core::{Config, Result};
use std::num::NonZeroU32;
use std::sync::Arc;

/// Screener.in client
///
/// Provides access to the company pages and the name-search services through
/// endpoint modules. All endpoints share one transport and one rate limiter,
/// so a single client can be handed to concurrent pipeline runs.
///
/// # Examples
///
/// ```ignore
/// use scr_client::ScreenerClient;
/// use scr_core::{Config, PageView};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = ScreenerClient::new(Config::from_env()?)?;
///
///     let candidates = client.search().screener("infosys").await?;
///     let html = client.company().page("INFY", PageView::Consolidated).await?;
///     println!("{} candidates, {} bytes", candidates.len(), html.len());
///     Ok(())
/// }
/// ```
pub struct ScreenerClient {
  rate_limiter: SharedRateLimiter,
  transport: Arc<Transport>,
  config: Config,
}

impl ScreenerClient {
  /// Create a new client
  ///
  /// # Errors
  ///
  /// Returns an error if the HTTP client cannot be created.
  pub fn new(config: Config) -> Result<Self> {
    let rate_limit = NonZeroU32::new(config.rate_limit)
      .or_else(|| NonZeroU32::new(scr_core::DEFAULT_RATE_LIMIT))
      .unwrap_or(NonZeroU32::MIN);
    let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(rate_limit)));

    Self::with_rate_limiter(config, rate_limiter)
  }

  /// Create a new client sharing an existing rate limiter
  pub fn with_rate_limiter(config: Config, rate_limiter: SharedRateLimiter) -> Result<Self> {
    let transport = Arc::new(Transport::new(&config)?);
    Ok(Self { rate_limiter, transport, config })
  }

  /// Company statement pages
  pub fn company(&self) -> CompanyEndpoints {
    CompanyEndpoints::new(
      self.transport.clone(),
      self.rate_limiter.clone(),
      self.config.base_url.clone(),
    )
  }

  /// Name-search services
  pub fn search(&self) -> SearchEndpoints {
    SearchEndpoints::new(
      self.transport.clone(),
      self.rate_limiter.clone(),
      self.config.base_url.clone(),
      self.config.yahoo_search_url.clone(),
    )
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

  /// Wait for rate limit to allow next request
  pub async fn wait_for_rate_limit(&self) {
    self.rate_limiter.until_ready().await;
  }
}

impl std::fmt::Debug for ScreenerClient {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("ScreenerClient")
      .field("transport", &self.transport)
      .field("base_url", &self.config.base_url)
      .field("rate_limiter", &"RateLimiter")
      .finish()
  }
}
