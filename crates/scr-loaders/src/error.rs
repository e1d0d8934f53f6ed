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

use scr_core::{Statement, Unit};
use scr_models::SearchCandidate;
use thiserror::Error;

/// Why a single cell could not be turned into a value
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CleanError {
  #[error("value {value} outside plausible {unit} range [{min}, {max}]")]
  OutOfRange { value: f64, unit: Unit, min: f64, max: f64 },

  #[error("unparsable cell {0:?}")]
  Unparsable(String),
}

/// Symbol resolution failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
  #[error("no listed company matches {0:?}")]
  NotFound(String),

  #[error("{query:?} matches several companies: {}", describe(.candidates))]
  AmbiguousMatch { query: String, candidates: Vec<SearchCandidate> },

  /// The search service itself failed; says nothing about the company
  #[error("name search unavailable: {0}")]
  UpstreamUnavailable(String),
}

fn describe(candidates: &[SearchCandidate]) -> String {
  candidates
    .iter()
    .map(|c| format!("{} ({}/{})", c.name, c.symbol, c.exchange))
    .collect::<Vec<_>>()
    .join(", ")
}

/// Statement scraping failures
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScrapeError {
  /// Transport or HTTP failure after retries; worth retrying later
  #[error("page unavailable for {symbol}: {reason}")]
  PageUnavailable { symbol: String, reason: String },

  #[error("{0} has no data on the source")]
  SymbolNotListed(String),

  /// The page came back but the expected markers are gone; the scraper
  /// needs maintenance, retrying will not help
  #[error("page layout changed: {statement} is missing {marker}")]
  StructureChanged { statement: Statement, marker: String },
}

impl ScrapeError {
  /// Rank used to pick the error reported when every statement failed
  pub fn priority(&self) -> u8 {
    match self {
      ScrapeError::SymbolNotListed(_) => 3,
      ScrapeError::StructureChanged { .. } => 2,
      ScrapeError::PageUnavailable { .. } => 1,
    }
  }
}

/// Terminal failures of one pipeline run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
  #[error("resolve failed: {0}")]
  Resolve(#[from] ResolveError),

  #[error("every statement failed for {symbol}")]
  AllStatementsFailed { symbol: String, failures: Vec<(Statement, ScrapeError)> },

  #[error("invariant violated: {0}")]
  Invariant(String),
}

#[derive(Error, Debug, Clone)]
pub enum LoaderError {
  #[error("API error: {0}")]
  ApiError(String),

  #[error("CSV error: {0}")]
  CsvError(String),

  #[error("IO error: {0}")]
  IoError(String),

  #[error("Serialization error: {0}")]
  SerializationError(String),

  #[error("Catalog error: {0}")]
  CatalogError(String),

  #[error("Pipeline error: {0}")]
  PipelineError(#[from] PipelineError),

  #[error("Invalid data: {0}")]
  InvalidData(String),
}

// Implement conversions manually
impl From<csv::Error> for LoaderError {
  fn from(err: csv::Error) -> Self {
    LoaderError::CsvError(err.to_string())
  }
}

impl From<std::io::Error> for LoaderError {
  fn from(err: std::io::Error) -> Self {
    LoaderError::IoError(err.to_string())
  }
}

impl From<serde_json::Error> for LoaderError {
  fn from(err: serde_json::Error) -> Self {
    LoaderError::SerializationError(err.to_string())
  }
}

impl From<scr_core::Error> for LoaderError {
  fn from(err: scr_core::Error) -> Self {
    LoaderError::ApiError(err.to_string())
  }
}

pub type LoaderResult<T> = Result<T, LoaderError>;

#[cfg(test)]
mod tests {
  use super::*;
  use scr_core::Exchange;

  #[test]
  fn test_ambiguous_match_names_candidates() {
    let err = ResolveError::AmbiguousMatch {
      query: "Infosys".to_string(),
      candidates: vec![
        SearchCandidate::new("Infosys Limited", "INFY", Exchange::Nse),
        SearchCandidate::new("Infosys BPO", "INFYBPO", Exchange::Nse),
      ],
    };
    assert_eq!(
      err.to_string(),
      "\"Infosys\" matches several companies: Infosys Limited (INFY/NSE), Infosys BPO (INFYBPO/NSE)"
    );
  }

  #[test]
  fn test_structure_changed_display() {
    let err =
      ScrapeError::StructureChanged { statement: Statement::Ratios, marker: "section#ratios".to_string() };
    assert_eq!(err.to_string(), "page layout changed: Ratios is missing section#ratios");
  }

  #[test]
  fn test_scrape_error_priority() {
    let not_listed = ScrapeError::SymbolNotListed("NOPE".to_string());
    let changed =
      ScrapeError::StructureChanged { statement: Statement::CashFlow, marker: "thead".to_string() };
    let unavailable =
      ScrapeError::PageUnavailable { symbol: "INFY".to_string(), reason: "timeout".to_string() };
    assert!(not_listed.priority() > changed.priority());
    assert!(changed.priority() > unavailable.priority());
  }

  #[test]
  fn test_loader_error_from_io_error() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
    let err = LoaderError::from(io_err);
    assert!(matches!(err, LoaderError::IoError(_)));
    assert!(err.to_string().contains("file missing"));
  }

  #[test]
  fn test_loader_error_from_core_error() {
    let err = LoaderError::from(scr_core::Error::Config("bad config".to_string()));
    assert!(matches!(err, LoaderError::ApiError(_)));
    assert!(err.to_string().contains("Configuration error"));
  }

  #[test]
  fn test_pipeline_error_from_resolve_error() {
    let err: PipelineError = ResolveError::NotFound("Acme".to_string()).into();
    assert_eq!(err.to_string(), "resolve failed: no listed company matches \"Acme\"");
  }
}
