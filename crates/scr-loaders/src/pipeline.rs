//! One company, end to end: resolve, scrape, normalize.
//!
//! A run moves `Idle → Resolving → Scraping → Normalizing` and ends in
//! `Complete` or `Failed`. Every transition is logged and kept on the
//! [`PipelineRun`].

use crate::catalog::MetricCatalog;
use crate::error::{PipelineError, ScrapeError};
use crate::normalizer::{CellIssue, Normalizer};
use crate::resolver::SymbolResolver;
use crate::scraper::TableScraper;
use crate::sources::ChainedSearch;
use crate::traits::{NameSearch, StatementSource};
use chrono::{DateTime, Utc};
use scr_client::ScreenerClient;
use scr_core::{Config, PageView, Statement};
use scr_models::{CompanyIdentity, NormalizedRecord};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;
use tracing::{error, info};

#[derive(Debug, Clone, PartialEq)]
pub enum RunState {
  Idle,
  Resolving,
  Scraping,
  Normalizing,
  Complete,
  Failed(PipelineError),
}

impl RunState {
  pub fn is_terminal(&self) -> bool {
    matches!(self, RunState::Complete | RunState::Failed(_))
  }
}

impl fmt::Display for RunState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RunState::Idle => write!(f, "idle"),
      RunState::Resolving => write!(f, "resolving"),
      RunState::Scraping => write!(f, "scraping"),
      RunState::Normalizing => write!(f, "normalizing"),
      RunState::Complete => write!(f, "complete"),
      RunState::Failed(reason) => write!(f, "failed: {}", reason),
    }
  }
}

/// Which statements made it into the output and which did not
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScrapeManifest {
  pub scraped: Vec<(Statement, PageView)>,
  pub missing: Vec<(Statement, ScrapeError)>,
}

impl ScrapeManifest {
  pub fn is_partial(&self) -> bool {
    !self.missing.is_empty()
  }
}

/// Everything a completed run produced
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineOutput {
  pub identity: CompanyIdentity,
  pub records: Vec<NormalizedRecord>,
  pub manifest: ScrapeManifest,
  pub issues: Vec<CellIssue>,
  pub extracted_at: DateTime<Utc>,
}

/// State and history of one run
#[derive(Debug, Clone)]
pub struct PipelineRun {
  input: String,
  state: RunState,
  history: Vec<RunState>,
  output: Option<PipelineOutput>,
}

impl PipelineRun {
  fn new(input: &str) -> Self {
    Self { input: input.to_string(), state: RunState::Idle, history: vec![RunState::Idle], output: None }
  }

  fn transition(&mut self, next: RunState) {
    match &next {
      RunState::Failed(reason) => error!("{}: {} -> failed ({})", self.input, self.state, reason),
      _ => info!("{}: {} -> {}", self.input, self.state, next),
    }
    self.history.push(next.clone());
    self.state = next;
  }

  fn fail(mut self, reason: PipelineError) -> Self {
    self.transition(RunState::Failed(reason));
    self
  }

  /// The company name the run was started with
  pub fn input(&self) -> &str {
    &self.input
  }

  pub fn state(&self) -> &RunState {
    &self.state
  }

  /// Every state the run passed through, `Idle` first
  pub fn history(&self) -> &[RunState] {
    &self.history
  }

  pub fn output(&self) -> Option<&PipelineOutput> {
    self.output.as_ref()
  }

  pub fn into_result(self) -> Result<PipelineOutput, PipelineError> {
    match (self.state, self.output) {
      (RunState::Complete, Some(output)) => Ok(output),
      (RunState::Failed(reason), _) => Err(reason),
      (state, _) => Err(PipelineError::Invariant(format!("run ended in non-terminal state {}", state))),
    }
  }
}

/// Resolver, scraper and normalizer wired together
pub struct Pipeline<S, F> {
  resolver: SymbolResolver<S>,
  scraper: TableScraper<F>,
  normalizer: Normalizer,
}

impl Pipeline<ChainedSearch, Arc<ScreenerClient>> {
  /// Pipeline against screener.in, configured from `client`'s config
  pub fn screener(client: Arc<ScreenerClient>, catalog: Arc<MetricCatalog>) -> Self {
    let config: &Config = client.config();
    let resolver = SymbolResolver::new(ChainedSearch::screener_then_yahoo(client.clone()), config.target_exchange);
    let normalizer = Normalizer::new(catalog)
      .with_max_years(config.max_years)
      .with_source_label(config.source_label.clone());
    let scraper = TableScraper::new(client.clone())
      .with_views(PageView::preference(config.consolidated))
      .with_fetch_delay(config.fetch_delay());
    Self::new(resolver, scraper, normalizer)
  }
}

impl<S: NameSearch, F: StatementSource> Pipeline<S, F> {
  pub fn new(resolver: SymbolResolver<S>, scraper: TableScraper<F>, normalizer: Normalizer) -> Self {
    Self { resolver, scraper, normalizer }
  }

  pub async fn run(&self, name: &str) -> PipelineRun {
    self.run_at(name, Utc::now()).await
  }

  /// Run with a fixed extraction time; records are stamped with `extracted_at`
  pub async fn run_at(&self, name: &str, extracted_at: DateTime<Utc>) -> PipelineRun {
    let mut run = PipelineRun::new(name);

    run.transition(RunState::Resolving);
    let identity = match self.resolver.resolve(name).await {
      Ok(identity) => identity,
      Err(e) => return run.fail(e.into()),
    };

    self.scrape_and_normalize(run, identity, extracted_at).await
  }

  /// Skip resolution for an already known company; the history goes
  /// straight from `Idle` to `Scraping`
  pub async fn run_identity(&self, identity: CompanyIdentity, extracted_at: DateTime<Utc>) -> PipelineRun {
    let run = PipelineRun::new(identity.display_name());
    self.scrape_and_normalize(run, identity, extracted_at).await
  }

  async fn scrape_and_normalize(
    &self,
    mut run: PipelineRun,
    identity: CompanyIdentity,
    extracted_at: DateTime<Utc>,
  ) -> PipelineRun {
    run.transition(RunState::Scraping);
    let mut manifest = ScrapeManifest::default();
    let mut tables = Vec::new();
    for outcome in self.scraper.fetch_statements(identity.symbol()).await {
      match outcome.result {
        Ok((view, table)) => {
          manifest.scraped.push((outcome.statement, view));
          tables.push(table);
        }
        Err(e) => manifest.missing.push((outcome.statement, e)),
      }
    }

    if tables.is_empty() {
      return run.fail(PipelineError::AllStatementsFailed {
        symbol: identity.symbol().to_string(),
        failures: manifest.missing,
      });
    }

    run.transition(RunState::Normalizing);
    let normalized = self.normalizer.normalize(&identity, &tables, extracted_at);

    let mut keys = HashSet::new();
    if let Some(duplicate) = normalized.records.iter().map(|r| r.key()).find(|k| !keys.insert(k.clone())) {
      return run.fail(PipelineError::Invariant(format!(
        "duplicate record {} {} {} {}",
        duplicate.symbol, duplicate.statement, duplicate.metric, duplicate.year
      )));
    }

    info!(
      "{}: {} records, {} issues, missing {:?}",
      identity,
      normalized.records.len(),
      normalized.issues.len(),
      manifest.missing.iter().map(|(s, _)| s.name()).collect::<Vec<_>>()
    );

    run.output = Some(PipelineOutput {
      identity,
      records: normalized.records,
      manifest,
      issues: normalized.issues,
      extracted_at,
    });
    run.transition(RunState::Complete);
    run
  }
}
