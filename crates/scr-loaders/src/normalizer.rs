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

//! Raw tables to long-format records.
//!
//! Every `(row, year column)` cell becomes exactly one record. Cells that
//! cannot be trusted keep their place with `value = None` and are reported
//! as [`CellIssue`]s.

use crate::catalog::{clean_label, MetricCatalog};
use crate::cleaner::{self, Cleaned};
use crate::error::CleanError;
use chrono::{DateTime, Utc};
use regex::Regex;
use scr_core::{Statement, Unit};
use scr_models::{CompanyIdentity, NormalizedRecord, RawTable};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, OnceLock};
use tracing::{debug, warn};

/// Section given to rows the catalog does not know
pub const UNMAPPED_SECTION: &str = "Summary";

fn year_pattern() -> Option<&'static Regex> {
  static YEAR: OnceLock<Option<Regex>> = OnceLock::new();
  YEAR.get_or_init(|| Regex::new(r"\b(19|20)\d{2}\b").ok()).as_ref()
}

/// Fiscal year of a column header: `"Mar 2024"` → 2024. `"TTM"` has none.
pub fn parse_year(header: &str) -> Option<i32> {
  year_pattern()?.find(header).and_then(|m| m.as_str().parse().ok())
}

/// Why a cell was published without a value
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
  Unparsable,
  OutOfRange { value: f64 },
  /// Parsed fine but breaks the metric's sign or range rule
  Validation { value: f64, rule: String },
  /// A second row of the same table maps to an already seen metric; the
  /// first row (`kept`) is published
  DuplicateRow { kept: String },
}

/// A cell that degraded to `value = None`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellIssue {
  pub statement: Statement,
  pub metric: String,
  pub year: i32,
  pub raw: String,
  #[serde(flatten)]
  pub kind: IssueKind,
}

/// Records in output order plus the cells that lost their value
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Normalized {
  pub records: Vec<NormalizedRecord>,
  pub issues: Vec<CellIssue>,
}

/// Turns scraped tables into [`NormalizedRecord`]s using a shared catalog
#[derive(Debug, Clone)]
pub struct Normalizer {
  catalog: Arc<MetricCatalog>,
  max_years: usize,
  source_label: String,
}

impl Normalizer {
  pub fn new(catalog: Arc<MetricCatalog>) -> Self {
    Self {
      catalog,
      max_years: scr_core::DEFAULT_MAX_YEARS,
      source_label: scr_core::DEFAULT_SOURCE_LABEL.to_string(),
    }
  }

  /// Keep only the most recent `max_years` year columns; 0 keeps all
  pub fn with_max_years(mut self, max_years: usize) -> Self {
    self.max_years = max_years;
    self
  }

  pub fn with_source_label(mut self, label: impl Into<String>) -> Self {
    self.source_label = label.into();
    self
  }

  pub fn catalog(&self) -> &Arc<MetricCatalog> {
    &self.catalog
  }

  /// Normalize the tables of one company.
  ///
  /// Pure: the same tables and `extracted_at` always give the same output.
  /// When a `(metric, year)` pair shows up in several tables the later
  /// table wins. Within one table the first row of a metric wins and the
  /// cells of later rows are reported as [`IssueKind::DuplicateRow`].
  pub fn normalize(
    &self,
    company: &CompanyIdentity,
    tables: &[RawTable],
    extracted_at: DateTime<Utc>,
  ) -> Normalized {
    // (metric, year) -> record, last write wins
    let mut latest: HashMap<(String, i32), (NormalizedRecord, Option<CellIssue>)> = HashMap::new();
    let mut shadowed: Vec<CellIssue> = Vec::new();

    for table in tables {
      let years = self.year_columns(table);
      debug!("{}: {} rows x {} year columns", table.statement, table.rows.len(), years.len());

      // metric -> label of the row that claimed it in this table
      let mut claimed: HashMap<String, String> = HashMap::new();

      for row in &table.rows {
        let label = clean_label(&row.label);
        let spec = self.catalog.lookup(table.statement, &label);
        let metric = spec.map(|s| s.metric.clone()).unwrap_or_else(|| label.clone());

        if let Some(kept) = claimed.get(&metric) {
          warn!("{}: row {:?} maps to {} already taken by {:?}; dropped", table.statement, label, metric, kept);
          for &(index, year) in &years {
            shadowed.push(CellIssue {
              statement: table.statement,
              metric: metric.clone(),
              year,
              raw: row.cells.get(index).map(|(_, text)| text.clone()).unwrap_or_default(),
              kind: IssueKind::DuplicateRow { kept: kept.clone() },
            });
          }
          continue;
        }
        claimed.insert(metric.clone(), label.clone());

        for &(index, year) in &years {
          let raw = row.cells.get(index).map(|(_, text)| text.as_str()).unwrap_or("");

          let (section, source, cleaned) = match spec {
            Some(spec) => (spec.section.clone(), self.source_label.clone(), cleaner::clean(raw, spec.unit)),
            None => (
              UNMAPPED_SECTION.to_string(),
              scr_core::UNMAPPED_SOURCE_LABEL.to_string(),
              cleaner::clean(raw, Unit::None),
            ),
          };

          let (value, kind) = match (&cleaned, spec) {
            (Cleaned { failure: Some(CleanError::Unparsable(_)), .. }, _) => (None, Some(IssueKind::Unparsable)),
            (Cleaned { failure: Some(CleanError::OutOfRange { value, .. }), .. }, _) => {
              (None, Some(IssueKind::OutOfRange { value: *value }))
            }
            (Cleaned { value: Some(v), .. }, Some(spec)) => match spec.violation(*v) {
              Some(rule) => (None, Some(IssueKind::Validation { value: *v, rule })),
              None => (Some(*v), None),
            },
            (Cleaned { value, .. }, _) => (*value, None),
          };

          let issue = kind.map(|kind| CellIssue {
            statement: table.statement,
            metric: metric.clone(),
            year,
            raw: raw.to_string(),
            kind,
          });

          let record = NormalizedRecord {
            company: company.display_name().to_string(),
            symbol: company.symbol().to_string(),
            statement: table.statement,
            section,
            metric: metric.clone(),
            year,
            value,
            unit: cleaned.unit,
            source,
            timestamp: extracted_at,
          };
          latest.insert((metric.clone(), year), (record, issue));
        }
      }
    }

    let ordered: BTreeMap<(Statement, String, i32), (NormalizedRecord, Option<CellIssue>)> = latest
      .into_values()
      .map(|(record, issue)| ((record.statement, record.metric.clone(), record.year), (record, issue)))
      .collect();

    let mut normalized = Normalized::default();
    for (_, (record, issue)) in ordered {
      normalized.records.push(record);
      normalized.issues.extend(issue);
    }
    normalized.issues.extend(shadowed);
    normalized
  }

  /// `(cell index, year)` of the year columns kept for `table`
  fn year_columns(&self, table: &RawTable) -> Vec<(usize, i32)> {
    let mut years: Vec<(usize, i32)> =
      table.columns.iter().enumerate().filter_map(|(i, header)| parse_year(header).map(|y| (i, y))).collect();

    // A repeated year keeps its March (fiscal year-end) column, else its first
    let mut chosen: HashMap<i32, usize> = HashMap::new();
    for &(index, year) in &years {
      match chosen.get(&year) {
        Some(&current) if is_year_end(&table.columns[current]) || !is_year_end(&table.columns[index]) => {}
        _ => {
          chosen.insert(year, index);
        }
      }
    }
    years.retain(|&(index, year)| {
      let keep = chosen.get(&year) == Some(&index);
      if !keep {
        warn!("{}: column {:?} repeats {}; ignored", table.statement, table.columns[index], year);
      }
      keep
    });

    if self.max_years > 0 && years.len() > self.max_years {
      years.drain(..years.len() - self.max_years);
    }
    years
  }
}

fn is_year_end(header: &str) -> bool {
  header.trim().to_ascii_lowercase().starts_with("mar")
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::TimeZone;
  use pretty_assertions::assert_eq;
  use scr_core::test_utils::assert_value_eq;
  use scr_core::Exchange;

  fn infy() -> CompanyIdentity {
    CompanyIdentity::new("Infosys Ltd", "INFY", Exchange::Nse)
  }

  fn at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
  }

  fn normalizer() -> Normalizer {
    Normalizer::new(Arc::new(MetricCatalog::screener()))
  }

  fn ratios() -> RawTable {
    RawTable::new(Statement::Ratios, vec!["Mar 2021".into(), "Mar 2022".into(), "Mar 2023".into(), "Mar 2024".into()])
      .with_row("ROE %", ["24.1%", "25.0%", "—", "25.8%"])
  }

  #[test]
  fn test_parse_year() {
    assert_eq!(parse_year("Mar 2024"), Some(2024));
    assert_eq!(parse_year("Dec 1999 9m"), Some(1999));
    assert_eq!(parse_year("TTM"), None);
    assert_eq!(parse_year("12024"), None);
  }

  #[test]
  fn test_roe_row_keeps_dash_as_none() {
    let out = normalizer().normalize(&infy(), &[ratios()], at());
    let values: Vec<Option<f64>> = out.records.iter().map(|r| r.value).collect();

    assert_eq!(out.records.len(), 4);
    assert_eq!(out.records.iter().map(|r| r.year).collect::<Vec<_>>(), vec![2021, 2022, 2023, 2024]);
    assert_value_eq(values[0], Some(24.1));
    assert_value_eq(values[2], None);
    assert_value_eq(values[3], Some(25.8));
    assert!(out.records.iter().all(|r| r.metric == "ROE" && r.unit == Unit::Percent));
    assert!(out.records.iter().all(|r| r.section == "Returns" && r.source == "Screener.in"));
    assert!(out.issues.is_empty());
  }

  #[test]
  fn test_k_times_n_records_and_ttm_ignored() {
    let table = RawTable::new(Statement::ProfitLoss, vec!["Mar 2023".into(), "Mar 2024".into(), "TTM".into()])
      .with_row("Sales +", ["100", "120", "130"])
      .with_row("Net Profit +", ["10", "", "14"])
      .with_row("Mystery Row", ["1", "2", "3"]);

    let out = normalizer().normalize(&infy(), &[table], at());
    assert_eq!(out.records.len(), 3 * 2);
    assert!(out.records.iter().all(|r| r.year != 0));
  }

  #[test]
  fn test_unmapped_rows_pass_through() {
    let table = RawTable::new(Statement::CashFlow, vec!["Mar 2024".into()])
      .with_row("Free Cash Flow +", ["₹ 1,200"])
      .with_row("Capex Ratio", ["12%"]);

    let out = normalizer().normalize(&infy(), &[table], at());
    assert_eq!(out.records.len(), 2);

    let capex = &out.records[0];
    assert_eq!(capex.metric, "Capex Ratio");
    assert_eq!(capex.unit, Unit::Percent);
    assert_eq!(capex.source, "raw:unmapped");
    assert_eq!(capex.section, "Summary");

    let fcf = &out.records[1];
    assert_eq!(fcf.metric, "Free Cash Flow");
    assert_eq!(fcf.unit, Unit::Currency);
    assert_value_eq(fcf.value, Some(1200.0));
  }

  #[test]
  fn test_bad_cells_become_none_with_issue() {
    let table = RawTable::new(Statement::ProfitLoss, vec!["Mar 2023".into(), "Mar 2024".into()])
      .with_row("Sales", ["abc", "-5"])
      .with_row("Net Profit", ["(12)", "1e20"]);

    let out = normalizer().normalize(&infy(), &[table], at());
    assert_eq!(out.records.len(), 4);
    assert!(out.records.iter().all(|r| r.value.is_none() || r.value == Some(-12.0)));

    let kinds: Vec<&IssueKind> = out.issues.iter().map(|i| &i.kind).collect();
    assert_eq!(kinds.len(), 3);
    assert!(matches!(kinds[0], IssueKind::Unparsable));
    assert!(matches!(kinds[1], IssueKind::Unparsable));
    assert!(matches!(kinds[2], IssueKind::Validation { .. }));
  }

  #[test]
  fn test_later_table_wins() {
    let first = RawTable::new(Statement::ProfitLoss, vec!["Mar 2024".into()]).with_row("ROE", ["10"]);
    let second = ratios();

    let out = normalizer().normalize(&infy(), &[first, second], at());
    let roe_2024: Vec<&NormalizedRecord> =
      out.records.iter().filter(|r| r.metric == "ROE" && r.year == 2024).collect();
    assert_eq!(roe_2024.len(), 1);
    assert_eq!(roe_2024[0].statement, Statement::Ratios);
    assert_value_eq(roe_2024[0].value, Some(25.8));
  }

  #[test]
  fn test_output_order() {
    let pl = RawTable::new(Statement::ProfitLoss, vec!["Mar 2023".into(), "Mar 2024".into()])
      .with_row("Sales", ["1", "2"])
      .with_row("EPS in Rs", ["3", "4"]);
    let out = normalizer().normalize(&infy(), &[ratios(), pl], at());

    let keys: Vec<(Statement, &str, i32)> =
      out.records.iter().map(|r| (r.statement, r.metric.as_str(), r.year)).collect();
    assert_eq!(keys[0], (Statement::ProfitLoss, "EPS", 2023));
    assert_eq!(keys[1], (Statement::ProfitLoss, "EPS", 2024));
    assert_eq!(keys[2], (Statement::ProfitLoss, "Sales", 2023));
    assert_eq!(keys[4], (Statement::Ratios, "ROE", 2021));
  }

  #[test]
  fn test_max_years_keeps_most_recent() {
    let out = normalizer().with_max_years(2).normalize(&infy(), &[ratios()], at());
    assert_eq!(out.records.iter().map(|r| r.year).collect::<Vec<_>>(), vec![2023, 2024]);

    let all = normalizer().with_max_years(0).normalize(&infy(), &[ratios()], at());
    assert_eq!(all.records.len(), 4);
  }

  #[test]
  fn test_idempotent() {
    let n = normalizer();
    let tables = [ratios()];
    assert_eq!(n.normalize(&infy(), &tables, at()), n.normalize(&infy(), &tables, at()));
  }

  #[test]
  fn test_blank_row_yields_null_per_year() {
    let html = r#"<html><body><section id="ratios"><table class="data-table">
      <thead><tr><th></th><th>Mar 2023</th><th>Mar 2024</th></tr></thead>
      <tbody>
        <tr><td>ROE %</td><td>24%</td><td>25%</td></tr>
        <tr><td>Inventory Days</td><td></td><td></td></tr>
      </tbody></table></section></body></html>"#;
    let table = crate::scraper::extract_table(html, Statement::Ratios).unwrap();

    let out = normalizer().normalize(&infy(), &[table], at());
    let inventory: Vec<&NormalizedRecord> = out.records.iter().filter(|r| r.metric == "Inventory Days").collect();
    assert_eq!(inventory.len(), 2);
    assert!(inventory.iter().all(|r| r.value.is_none() && r.unit == Unit::Count));
    assert_eq!(out.records.len(), 4);
    assert!(out.issues.is_empty());
  }

  #[test]
  fn test_alias_rows_in_one_table_keep_first() {
    let table = RawTable::new(Statement::Ratios, vec!["Mar 2023".into(), "Mar 2024".into()])
      .with_row("ROE %", ["24%", "25%"])
      .with_row("Return on Equity", ["1%", "2%"]);

    let out = normalizer().normalize(&infy(), &[table], at());
    assert_eq!(out.records.len(), 2);
    assert_value_eq(out.records[1].value, Some(25.0));

    assert_eq!(out.issues.len(), 2);
    assert_eq!(out.issues[0].metric, "ROE");
    assert_eq!(out.issues[0].raw, "1%");
    assert_eq!(out.issues[0].kind, IssueKind::DuplicateRow { kept: "ROE %".to_string() });
  }

  #[test]
  fn test_repeated_year_prefers_march_column() {
    let table = RawTable::new(Statement::ProfitLoss, vec!["Mar 2023".into(), "Sep 2024".into(), "Mar 2024".into()])
      .with_row("Sales", ["1", "2", "3"]);

    let out = normalizer().normalize(&infy(), &[table], at());
    let values: Vec<(i32, Option<f64>)> = out.records.iter().map(|r| (r.year, r.value)).collect();
    assert_eq!(values, vec![(2023, Some(1.0)), (2024, Some(3.0))]);
  }

  #[test]
  fn test_repeated_year_without_march_keeps_first() {
    let table = RawTable::new(Statement::ProfitLoss, vec!["Dec 2023".into(), "Jun 2023".into()])
      .with_row("Sales", ["7", "9"]);

    let out = normalizer().normalize(&infy(), &[table], at());
    assert_eq!(out.records.len(), 1);
    assert_value_eq(out.records[0].value, Some(7.0));
  }
}
