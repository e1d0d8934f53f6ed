//! # scr-models
//!
//! Data models for the Screener fundamentals pipeline.
//!
//! - **Identity**: the company a pipeline run is about
//! - **Raw tables**: untyped text grids as scraped from a company page
//! - **Normalized records**: the long-format output schema
//! - **Search**: candidates and wire formats of the name-search services
//!
//! ## Usage
//!
//! ```ignore
//! use scr_models::search::ScreenerSearchHit;
//!
//! let hits: Vec<ScreenerSearchHit> = serde_json::from_str(&response_json)?;
//! let candidates: Vec<_> = hits.into_iter().filter_map(|h| h.into_candidate()).collect();
//! ```

#![warn(clippy::all)]

pub mod identity;
pub mod record;
pub mod search;
pub mod table;

pub use identity::CompanyIdentity;
pub use record::{NormalizedRecord, RecordKey, OUTPUT_COLUMNS};
pub use search::{ScreenerSearchHit, SearchCandidate, YahooQuote, YahooSearchResponse};
pub use table::{RawRow, RawTable};
