//! # scr-client
//!
//! HTTP client for screener.in company pages and for the name-search
//! services used to resolve company names.
//!
//! ## Features
//!
//! - **Async/Await**: Built on tokio and reqwest
//! - **Rate Limiting**: One `governor` limiter shared by every endpoint
//! - **Retries**: Bounded exponential backoff with jitter, driven by
//!   `scr_core::RetryPolicy`
//! - **No parsing**: pages come back as text; statement extraction lives in
//!   `scr-loaders`
//!
//! ## Error Handling
//!
//! All methods return `Result<T, scr_core::Error>`. Non-success HTTP statuses
//! are reported as `Error::Status` so callers can tell a missing page (404)
//! from a transient failure.

#![warn(clippy::all)]

pub mod client;
pub mod endpoints;
pub mod transport;

pub use client::ScreenerClient;
pub use endpoints::{company::CompanyEndpoints, search::SearchEndpoints};
pub use scr_core::{Config, Error, Result};
