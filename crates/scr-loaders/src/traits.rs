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

//! Capabilities the pipeline is built over.
//!
//! Each seam is a trait so tests can swap the network for in-memory fakes.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scr_core::PageView;
use scr_models::{CompanyIdentity, SearchCandidate};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A service that maps free text to listed companies.
#[async_trait]
pub trait NameSearch: Send + Sync {
  /// Candidates for `query`. An empty list means "nothing found"; an error
  /// means the service itself could not be reached.
  async fn search(&self, query: &str) -> scr_core::Result<Vec<SearchCandidate>>;

  /// Get the name of this data source.
  fn source_name(&self) -> &'static str;
}

/// Where statement pages come from.
#[async_trait]
pub trait StatementSource: Send + Sync {
  /// Raw HTML of the company page for `symbol` in the given view.
  async fn fetch_page(&self, symbol: &str, view: PageView) -> scr_core::Result<String>;
}

#[async_trait]
impl<T: StatementSource + ?Sized> StatementSource for Arc<T> {
  async fn fetch_page(&self, symbol: &str, view: PageView) -> scr_core::Result<String> {
    (**self).fetch_page(symbol, view).await
  }
}

/// Aggregated sentiment about one company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentRecord {
  pub symbol: String,
  /// Score in `[-1, 1]`
  pub score: f64,
  pub sample_size: usize,
  pub sources: Vec<String>,
  pub computed_at: DateTime<Utc>,
}

/// Sentiment providers plug in here. The fundamentals pipeline never calls it.
#[async_trait]
pub trait SentimentSource: Send + Sync {
  async fn sentiment(&self, company: &CompanyIdentity) -> scr_core::Result<SentimentRecord>;

  fn source_name(&self) -> &'static str;
}
