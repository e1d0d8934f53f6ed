//! # scr-loaders
//!
//! The fundamentals pipeline: resolve a company name, scrape its statement
//! tables from screener.in, and normalize them into long-format records.
//!
//! ## Components
//!
//! - [`cleaner`]: raw cell text to numbers
//! - [`catalog`]: raw row labels to canonical metrics
//! - [`resolver`]: company names to listed symbols
//! - [`scraper`]: statement tables out of company pages
//! - [`normalizer`]: tables to [`scr_models::NormalizedRecord`]s
//! - [`pipeline`]: one company end to end
//! - [`loader`]: many companies concurrently
//! - [`sink`]: CSV and JSON export
//!
//! ## Usage
//!
//! ```ignore
//! use scr_loaders::prelude::*;
//!
//! let client = Arc::new(ScreenerClient::new(Config::from_env()?)?);
//! let pipeline = Pipeline::screener(client, Arc::new(MetricCatalog::screener()));
//! let output = pipeline.run("Infosys").await.into_result()?;
//! ```

pub mod catalog;
pub mod cleaner;
pub mod csv_processor;
pub mod error;
pub mod loader;
pub mod normalizer;
pub mod pipeline;
pub mod process_tracker;
pub mod resolver;
pub mod scraper;
pub mod sink;
pub mod sources;
pub mod traits;

pub use catalog::{MetricCatalog, MetricSpec, Sign};
pub use cleaner::{clean, Cleaned};
pub use csv_processor::CsvProcessor;
pub use error::{CleanError, LoaderError, LoaderResult, PipelineError, ResolveError, ScrapeError};
pub use loader::{
  DataLoader, FundamentalsLoader, FundamentalsLoaderInput, FundamentalsLoaderOutput, LoaderConfig,
  LoaderContext,
};
pub use normalizer::{CellIssue, IssueKind, Normalized, Normalizer};
pub use pipeline::{Pipeline, PipelineOutput, PipelineRun, RunState, ScrapeManifest};
pub use process_tracker::{ProcessInfo, ProcessState, ProcessTracker};
pub use resolver::SymbolResolver;
pub use scraper::{StatementOutcome, TableScraper};
pub use sink::{CsvSink, JsonSink, RecordSink, DEFAULT_OUTPUT_FILE};
pub use sources::{ChainedSearch, ScreenerSearch, YahooSearch};
pub use traits::{NameSearch, SentimentRecord, SentimentSource, StatementSource};

// Prelude for convenient imports
pub mod prelude {
  pub use crate::{
    ChainedSearch, CsvSink, DataLoader, FundamentalsLoader, FundamentalsLoaderInput, JsonSink,
    LoaderConfig, LoaderContext, LoaderError, LoaderResult, MetricCatalog, Normalizer, Pipeline,
    ProcessState, ProcessTracker, RecordSink, SymbolResolver, TableScraper,
  };
  pub use scr_client::ScreenerClient;
  pub use scr_core::Config;
  pub use std::sync::Arc;
}
