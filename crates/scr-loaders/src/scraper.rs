//! Statement tables out of company pages.
//!
//! Extraction is purely syntactic: `section#<id> table`, headers from
//! `thead`, one row per labelled `tbody tr`. Values, blank ones included,
//! are left as text for the normalizer.

use crate::error::ScrapeError;
use crate::traits::StatementSource;
use scr_core::{PageView, Statement};
use scr_models::RawTable;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Phrases a company page uses when the symbol has no data
const NOT_LISTED_MARKERS: [&str; 3] =
  ["Page not found", "could not find the company", "No data available for this company"];

/// What happened to one statement of a scrape
#[derive(Debug, Clone, PartialEq)]
pub struct StatementOutcome {
  pub statement: Statement,
  /// The table and the view it was found on
  pub result: Result<(PageView, RawTable), ScrapeError>,
}

/// Fetches the statement pages of a symbol and extracts their tables
pub struct TableScraper<F> {
  source: F,
  views: Vec<PageView>,
  statements: Vec<Statement>,
  fetch_delay: Duration,
}

impl<F: StatementSource> TableScraper<F> {
  /// Consolidated statements first, standalone as the fallback
  pub fn new(source: F) -> Self {
    Self {
      source,
      views: PageView::preference(true),
      statements: Statement::ALL.to_vec(),
      fetch_delay: Duration::ZERO,
    }
  }

  pub fn with_views(mut self, views: Vec<PageView>) -> Self {
    self.views = views;
    self
  }

  pub fn with_statements(mut self, statements: Vec<Statement>) -> Self {
    self.statements = statements;
    self
  }

  /// Pause between two sequential page fetches
  pub fn with_fetch_delay(mut self, delay: Duration) -> Self {
    self.fetch_delay = delay;
    self
  }

  pub fn source(&self) -> &F {
    &self.source
  }

  /// One outcome per configured statement, in configuration order.
  ///
  /// Each distinct page is fetched at most once. A statement missing (or
  /// empty) on the preferred view is looked up on the next one; when no view
  /// has it, the preferred view's error is reported. A page that could not be
  /// fetched stops the lookup with `PageUnavailable`: the next view holds
  /// different figures under the same keys.
  #[instrument(skip(self))]
  pub async fn fetch_statements(&self, symbol: &str) -> Vec<StatementOutcome> {
    let mut pages: HashMap<PageView, Result<String, ScrapeError>> = HashMap::new();
    let mut outcomes = Vec::with_capacity(self.statements.len());

    for &statement in &self.statements {
      let mut errors: Vec<ScrapeError> = Vec::new();
      let mut found = None;
      let mut unavailable = None;

      for &view in &self.views {
        if !pages.contains_key(&view) {
          if !pages.is_empty() && !self.fetch_delay.is_zero() {
            tokio::time::sleep(self.fetch_delay).await;
          }
          let page = self.fetch(symbol, view).await;
          pages.insert(view, page);
        }

        let html = match pages.get(&view) {
          Some(Ok(html)) => html,
          Some(Err(e @ ScrapeError::PageUnavailable { .. })) => {
            unavailable = Some(e.clone());
            break;
          }
          Some(Err(e)) => {
            errors.push(e.clone());
            continue;
          }
          None => continue,
        };

        match extract_table(html, statement) {
          Ok(table) if table.is_empty() => {
            debug!("{} {} table has no rows", view, statement);
            errors.push(ScrapeError::SymbolNotListed(symbol.to_string()));
          }
          Ok(table) => {
            found = Some((view, table));
            break;
          }
          Err(e) => errors.push(e),
        }
      }

      let outcome = match found {
        Some((view, table)) => {
          debug!("{} from {} page: {} rows", statement, view, table.rows.len());
          StatementOutcome { statement, result: Ok((view, table)) }
        }
        None => {
          let error = unavailable
            .or_else(|| errors.into_iter().next())
            .unwrap_or_else(|| ScrapeError::SymbolNotListed(symbol.to_string()));
          warn!("{} unavailable for {}: {}", statement, symbol, error);
          StatementOutcome { statement, result: Err(error) }
        }
      };
      outcomes.push(outcome);
    }

    outcomes
  }

  /// Successful tables, or the most severe error when none succeeded
  pub async fn fetch_tables(&self, symbol: &str) -> Result<Vec<RawTable>, ScrapeError> {
    let mut tables = Vec::new();
    let mut errors = Vec::new();
    for outcome in self.fetch_statements(symbol).await {
      match outcome.result {
        Ok((_, table)) => tables.push(table),
        Err(e) => errors.push(e),
      }
    }

    if tables.is_empty() {
      if let Some(error) = most_severe(errors) {
        return Err(error);
      }
    }
    info!("Scraped {} tables for {}", tables.len(), symbol);
    Ok(tables)
  }

  async fn fetch(&self, symbol: &str, view: PageView) -> Result<String, ScrapeError> {
    let html = self.source.fetch_page(symbol, view).await.map_err(|e| classify(symbol, e))?;
    if announces_missing_company(&html) {
      return Err(ScrapeError::SymbolNotListed(symbol.to_string()));
    }
    Ok(html)
  }
}

/// Pick the error reported for a set of failures
pub fn most_severe(errors: Vec<ScrapeError>) -> Option<ScrapeError> {
  errors.into_iter().fold(None, |best, e| match best {
    Some(b) if ScrapeError::priority(&b) >= e.priority() => Some(b),
    _ => Some(e),
  })
}

/// 404 and 410 mean the symbol has no page; anything else is a fetch problem
fn classify(symbol: &str, error: scr_core::Error) -> ScrapeError {
  match error.status() {
    Some(404) | Some(410) => ScrapeError::SymbolNotListed(symbol.to_string()),
    _ => ScrapeError::PageUnavailable { symbol: symbol.to_string(), reason: error.to_string() },
  }
}

fn announces_missing_company(html: &str) -> bool {
  let document = Html::parse_document(html);
  let Ok(title) = Selector::parse("title, h1, h2") else {
    return false;
  };
  document.select(&title).any(|el| {
    let text = norm_text(&el.text().collect::<String>());
    NOT_LISTED_MARKERS.iter().any(|m| text.to_lowercase().contains(&m.to_lowercase()))
  })
}

/// Extract one statement's table from a company page
pub fn extract_table(html: &str, statement: Statement) -> Result<RawTable, ScrapeError> {
  let document = Html::parse_document(html);
  let section_marker = format!("section#{}", statement.section_id());

  let section = document
    .select(&selector(&section_marker, statement)?)
    .next()
    .ok_or_else(|| changed(statement, &section_marker))?;

  let table = section
    .select(&selector("table.data-table", statement)?)
    .next()
    .or_else(|| selector("table", statement).ok().and_then(|s| section.select(&s).next()))
    .ok_or_else(|| changed(statement, &format!("{} table", section_marker)))?;

  let headers: Vec<String> =
    table.select(&selector("thead th", statement)?).map(|th| norm_text(&element_text(th))).collect();
  if headers.len() < 2 {
    return Err(changed(statement, &format!("{} thead", section_marker)));
  }

  // First header sits above the label column
  let mut raw = RawTable::new(statement, headers[1..].to_vec());
  let cell = selector("td, th", statement)?;

  for tr in table.select(&selector("tbody tr", statement)?) {
    let mut cells = tr.select(&cell).map(|c| norm_text(&element_text(c)));
    let Some(label) = cells.next() else {
      continue;
    };
    let values: Vec<String> = cells.collect();
    if label.is_empty() {
      continue;
    }
    raw.push_row(label, values);
  }

  Ok(raw)
}

fn selector(css: &str, statement: Statement) -> Result<Selector, ScrapeError> {
  Selector::parse(css).map_err(|_| changed(statement, css))
}

fn changed(statement: Statement, marker: &str) -> ScrapeError {
  ScrapeError::StructureChanged { statement, marker: marker.to_string() }
}

fn element_text(element: ElementRef<'_>) -> String {
  element.text().collect::<String>()
}

/// Collapse runs of whitespace (NBSP included) to one space
fn norm_text(s: &str) -> String {
  s.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
  use super::*;
  use async_trait::async_trait;
  use std::sync::Mutex;

  fn section(id: &str, headers: &[&str], rows: &[(&str, &[&str])]) -> String {
    let head: String = headers.iter().map(|h| format!("<th>{}</th>", h)).collect();
    let body: String = rows
      .iter()
      .map(|(label, cells)| {
        let tds: String = cells.iter().map(|c| format!("<td>{}</td>", c)).collect();
        format!("<tr><td class=\"text\"><button>{}&nbsp;<span>+</span></button></td>{}</tr>", label, tds)
      })
      .collect();
    format!(
      "<section id=\"{}\"><h2>t</h2><table class=\"data-table\"><thead><tr>{}</tr></thead><tbody>{}</tbody></table></section>",
      id, head, body
    )
  }

  fn page(sections: &[String]) -> String {
    format!("<html><head><title>Company</title></head><body>{}</body></html>", sections.concat())
  }

  fn ratios_page() -> String {
    page(&[section(
      "ratios",
      &["", "Mar 2021", "Mar 2022", "Mar 2023", "Mar 2024"],
      &[("ROE %", &["24.1%", "25.0%", "—", "25.8%"]), ("Debtor Days", &["", "", "", ""])],
    )])
  }

  struct FakeSource {
    pages: HashMap<PageView, scr_core::Result<String>>,
    calls: Mutex<Vec<PageView>>,
  }

  impl FakeSource {
    fn new(pages: Vec<(PageView, scr_core::Result<String>)>) -> Self {
      Self { pages: pages.into_iter().collect(), calls: Mutex::new(Vec::new()) }
    }
  }

  #[async_trait]
  impl StatementSource for FakeSource {
    async fn fetch_page(&self, _symbol: &str, view: PageView) -> scr_core::Result<String> {
      self.calls.lock().unwrap().push(view);
      match self.pages.get(&view) {
        Some(Ok(html)) => Ok(html.clone()),
        Some(Err(_)) => Err(scr_core::Error::Http("timed out".to_string())),
        None => Err(scr_core::Error::Status { status: 404, url: "/company/X/".to_string() }),
      }
    }
  }

  #[test]
  fn test_extract_table_pairs_cells_with_headers() {
    let table = extract_table(&ratios_page(), Statement::Ratios).unwrap();
    assert_eq!(table.columns, vec!["Mar 2021", "Mar 2022", "Mar 2023", "Mar 2024"]);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0].label, "ROE % +");
    assert_eq!(table.rows[0].cells[2], ("Mar 2023".to_string(), "—".to_string()));
    assert_eq!(table.rows[1].label, "Debtor Days +");
    assert!(table.rows[1].cells.iter().all(|(_, text)| text.is_empty()));
  }

  #[test]
  fn test_missing_section_is_structure_changed() {
    match extract_table(&ratios_page(), Statement::CashFlow) {
      Err(ScrapeError::StructureChanged { statement, marker }) => {
        assert_eq!(statement, Statement::CashFlow);
        assert_eq!(marker, "section#cash-flow");
      }
      other => panic!("expected StructureChanged, got {:?}", other),
    }
  }

  #[test]
  fn test_missing_header_is_structure_changed() {
    let html = page(&["<section id=\"ratios\"><table><tbody><tr><td>ROE</td><td>1</td></tr></tbody></table></section>".to_string()]);
    assert!(matches!(
      extract_table(&html, Statement::Ratios),
      Err(ScrapeError::StructureChanged { marker, .. }) if marker == "section#ratios thead"
    ));
  }

  #[test]
  fn test_most_severe() {
    let unavailable = ScrapeError::PageUnavailable { symbol: "X".to_string(), reason: "x".to_string() };
    let not_listed = ScrapeError::SymbolNotListed("X".to_string());
    assert_eq!(most_severe(vec![unavailable.clone(), not_listed.clone()]), Some(not_listed));
    assert_eq!(most_severe(vec![unavailable.clone()]), Some(unavailable));
    assert_eq!(most_severe(vec![]), None);
  }

  #[tokio::test]
  async fn test_each_page_fetched_once() {
    let source = FakeSource::new(vec![(PageView::Consolidated, Ok(ratios_page()))]);
    let scraper = TableScraper::new(source).with_views(vec![PageView::Consolidated]);

    let outcomes = scraper.fetch_statements("INFY").await;
    assert_eq!(outcomes.len(), 4);
    assert_eq!(scraper.source().calls.lock().unwrap().len(), 1);
    assert!(outcomes[3].result.is_ok());
    assert!(matches!(outcomes[0].result, Err(ScrapeError::StructureChanged { .. })));
  }

  #[tokio::test]
  async fn test_falls_back_to_standalone() {
    let standalone = page(&[section("profit-loss", &["", "Mar 2024"], &[("Sales", &["100"])])]);
    let source = FakeSource::new(vec![
      (PageView::Consolidated, Ok(page(&[]))),
      (PageView::Standalone, Ok(standalone)),
    ]);
    let scraper = TableScraper::new(source).with_statements(vec![Statement::ProfitLoss]);

    let outcomes = scraper.fetch_statements("SMALLCO").await;
    let (view, table) = outcomes[0].result.as_ref().unwrap();
    assert_eq!(*view, PageView::Standalone);
    assert_eq!(table.rows[0].label, "Sales +");
  }

  #[tokio::test]
  async fn test_404_is_symbol_not_listed() {
    let scraper = TableScraper::new(FakeSource::new(vec![]));
    assert_eq!(
      scraper.fetch_tables("NOPE").await,
      Err(ScrapeError::SymbolNotListed("NOPE".to_string()))
    );
  }

  #[tokio::test]
  async fn test_transport_failure_is_page_unavailable() {
    let source = FakeSource::new(vec![(
      PageView::Consolidated,
      Err(scr_core::Error::Http("timed out".to_string())),
    )]);
    let scraper = TableScraper::new(source).with_views(vec![PageView::Consolidated]);

    assert!(matches!(scraper.fetch_tables("INFY").await, Err(ScrapeError::PageUnavailable { .. })));
  }

  #[tokio::test]
  async fn test_not_found_page_is_symbol_not_listed() {
    let html = "<html><head><title>Error 404: Page Not Found - Screener</title></head><body></body></html>";
    let source = FakeSource::new(vec![(PageView::Standalone, Ok(html.to_string()))]);
    let scraper = TableScraper::new(source).with_views(vec![PageView::Standalone]);

    assert_eq!(scraper.fetch_tables("GONE").await, Err(ScrapeError::SymbolNotListed("GONE".to_string())));
  }

  #[tokio::test]
  async fn test_partial_success_returns_subset() {
    let source = FakeSource::new(vec![(PageView::Consolidated, Ok(ratios_page()))]);
    let scraper = TableScraper::new(source).with_views(vec![PageView::Consolidated]);

    let tables = scraper.fetch_tables("INFY").await.unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(tables[0].statement, Statement::Ratios);
  }

  #[tokio::test]
  async fn test_unreachable_consolidated_page_does_not_fall_back() {
    let standalone = page(&[section("ratios", &["", "Mar 2024"], &[("ROE %", &["25.8%"])])]);
    let source = FakeSource::new(vec![
      (PageView::Consolidated, Err(scr_core::Error::Http("timed out".to_string()))),
      (PageView::Standalone, Ok(standalone)),
    ]);
    let scraper = TableScraper::new(source).with_statements(vec![Statement::Ratios]);

    let outcomes = scraper.fetch_statements("INFY").await;
    assert!(matches!(outcomes[0].result, Err(ScrapeError::PageUnavailable { .. })));
    assert_eq!(*scraper.source().calls.lock().unwrap(), vec![PageView::Consolidated]);
  }

  #[tokio::test(start_paused = true)]
  async fn test_fetch_delay_between_distinct_pages_only() {
    let consolidated = page(&[section("ratios", &["", "Mar 2024"], &[("ROE %", &["25.8%"])])]);
    let standalone = page(&[section("profit-loss", &["", "Mar 2024"], &[("Sales", &["100"])])]);
    let source = FakeSource::new(vec![
      (PageView::Consolidated, Ok(consolidated)),
      (PageView::Standalone, Ok(standalone)),
    ]);
    let delay = Duration::from_secs(5);
    let scraper = TableScraper::new(source)
      .with_statements(vec![Statement::ProfitLoss, Statement::Ratios, Statement::CashFlow])
      .with_fetch_delay(delay);

    let started = tokio::time::Instant::now();
    let outcomes = scraper.fetch_statements("INFY").await;
    let elapsed = started.elapsed();

    // two distinct pages: one pause, cached lookups add none
    assert_eq!(scraper.source().calls.lock().unwrap().len(), 2);
    assert!(elapsed >= delay, "elapsed {:?}", elapsed);
    assert!(elapsed < delay * 2, "elapsed {:?}", elapsed);
    assert!(outcomes[0].result.is_ok());
    assert!(outcomes[1].result.is_ok());
    assert!(outcomes[2].result.is_err());
  }
}
