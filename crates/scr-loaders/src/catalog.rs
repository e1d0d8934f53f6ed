//! Metric catalog: raw Screener row labels to canonical metrics.
//!
//! Built once at startup (the built-in Screener catalog or a JSON file) and
//! shared read-only behind an `Arc`.

use crate::error::{LoaderError, LoaderResult};
use scr_core::{Statement, Unit};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Sign a metric is allowed to take
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sign {
  #[default]
  Any,
  NonNegative,
  NonPositive,
}

impl Sign {
  pub fn admits(&self, value: f64) -> bool {
    match self {
      Sign::Any => true,
      Sign::NonNegative => value >= 0.0,
      Sign::NonPositive => value <= 0.0,
    }
  }
}

/// Canonical description of one metric
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSpec {
  pub metric: String,
  pub section: String,
  pub unit: Unit,
  #[serde(default)]
  pub sign: Sign,
  /// Inclusive plausible range, tighter than the unit bounds
  #[serde(default)]
  pub range: Option<(f64, f64)>,
  /// Restricts the entry to one statement; unscoped entries apply everywhere
  #[serde(default)]
  pub statement: Option<Statement>,
}

impl MetricSpec {
  /// Describe why `value` violates this metric's rules, if it does
  pub fn violation(&self, value: f64) -> Option<String> {
    if !self.sign.admits(value) {
      return Some(format!("{} must be {:?}, got {}", self.metric, self.sign, value));
    }
    match self.range {
      Some((min, max)) if value < min || value > max => {
        Some(format!("{} outside [{}, {}], got {}", self.metric, min, max, value))
      }
      _ => None,
    }
  }
}

/// One catalog file entry: a spec and the raw labels that map to it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
  pub labels: Vec<String>,
  #[serde(flatten)]
  pub spec: MetricSpec,
}

/// Lookup table from cleaned labels to metric specs
#[derive(Debug, Clone, Default)]
pub struct MetricCatalog {
  scoped: HashMap<(Statement, String), MetricSpec>,
  global: HashMap<String, MetricSpec>,
}

impl MetricCatalog {
  pub fn from_entries(entries: Vec<CatalogEntry>) -> LoaderResult<Self> {
    let mut catalog = MetricCatalog::default();
    for entry in entries {
      for label in &entry.labels {
        let key = label_key(label);
        if key.is_empty() {
          return Err(LoaderError::CatalogError(format!("empty label for {}", entry.spec.metric)));
        }
        let clash = match entry.spec.statement {
          Some(statement) => catalog.scoped.insert((statement, key), entry.spec.clone()),
          None => catalog.global.insert(key, entry.spec.clone()),
        };
        if let Some(previous) = clash {
          return Err(LoaderError::CatalogError(format!(
            "label {:?} maps to both {} and {}",
            label, previous.metric, entry.spec.metric
          )));
        }
      }
    }
    Ok(catalog)
  }

  pub fn from_json_str(json: &str) -> LoaderResult<Self> {
    let entries: Vec<CatalogEntry> = serde_json::from_str(json)?;
    Self::from_entries(entries)
  }

  pub fn from_json_file(path: impl AsRef<Path>) -> LoaderResult<Self> {
    let json = std::fs::read_to_string(path)?;
    Self::from_json_str(&json)
  }

  /// Catalog of the row labels screener.in uses on its company pages
  pub fn screener() -> Self {
    let mut catalog = MetricCatalog::default();
    for (statement, labels, metric, section, unit, sign) in SCREENER_METRICS {
      let spec = MetricSpec {
        metric: metric.to_string(),
        section: section.to_string(),
        unit: *unit,
        sign: *sign,
        range: None,
        statement: Some(*statement),
      };
      for label in *labels {
        catalog.scoped.insert((*statement, label_key(label)), spec.clone());
      }
    }
    catalog
  }

  /// Statement-scoped entries win over global ones
  pub fn lookup(&self, statement: Statement, label: &str) -> Option<&MetricSpec> {
    let key = label_key(label);
    self.scoped.get(&(statement, key.clone())).or_else(|| self.global.get(&key))
  }

  pub fn len(&self) -> usize {
    self.scoped.len() + self.global.len()
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// Strip Screener's expand markers (`+`, `*`, `#`) and collapse whitespace
pub fn clean_label(label: &str) -> String {
  label
    .chars()
    .filter(|c| !matches!(c, '+' | '*' | '#'))
    .collect::<String>()
    .split_whitespace()
    .collect::<Vec<_>>()
    .join(" ")
}

fn label_key(label: &str) -> String {
  clean_label(label).to_lowercase()
}

type BuiltIn = (Statement, &'static [&'static str], &'static str, &'static str, Unit, Sign);

const SCREENER_METRICS: &[BuiltIn] = &[
  // Profit & Loss
  (Statement::ProfitLoss, &["Sales", "Revenue"], "Sales", "Income", Unit::Currency, Sign::NonNegative),
  (Statement::ProfitLoss, &["Expenses"], "Expenses", "Expenses", Unit::Currency, Sign::Any),
  (Statement::ProfitLoss, &["Operating Profit", "Financing Profit"], "Operating Profit", "Profitability", Unit::Currency, Sign::Any),
  (Statement::ProfitLoss, &["OPM %", "OPM", "Financing Margin %"], "OPM", "Profitability", Unit::Percent, Sign::Any),
  (Statement::ProfitLoss, &["Other Income"], "Other Income", "Income", Unit::Currency, Sign::Any),
  (Statement::ProfitLoss, &["Interest"], "Interest", "Expenses", Unit::Currency, Sign::NonNegative),
  (Statement::ProfitLoss, &["Depreciation"], "Depreciation", "Expenses", Unit::Currency, Sign::NonNegative),
  (Statement::ProfitLoss, &["Profit before tax"], "Profit Before Tax", "Profitability", Unit::Currency, Sign::Any),
  (Statement::ProfitLoss, &["Tax %", "Tax"], "Tax Rate", "Tax", Unit::Percent, Sign::Any),
  (Statement::ProfitLoss, &["Net Profit", "Profit after tax"], "Net Profit", "Profitability", Unit::Currency, Sign::Any),
  (Statement::ProfitLoss, &["EPS in Rs", "EPS"], "EPS", "Per Share", Unit::Currency, Sign::Any),
  (Statement::ProfitLoss, &["Dividend Payout %", "Dividend Payout"], "Dividend Payout", "Per Share", Unit::Percent, Sign::NonNegative),
  // Balance Sheet
  (Statement::BalanceSheet, &["Equity Capital", "Share Capital"], "Equity Capital", "Liabilities", Unit::Currency, Sign::NonNegative),
  (Statement::BalanceSheet, &["Reserves"], "Reserves", "Liabilities", Unit::Currency, Sign::Any),
  (Statement::BalanceSheet, &["Borrowings", "Borrowing"], "Borrowings", "Liabilities", Unit::Currency, Sign::NonNegative),
  (Statement::BalanceSheet, &["Deposits"], "Deposits", "Liabilities", Unit::Currency, Sign::NonNegative),
  (Statement::BalanceSheet, &["Other Liabilities"], "Other Liabilities", "Liabilities", Unit::Currency, Sign::Any),
  (Statement::BalanceSheet, &["Total Liabilities"], "Total Liabilities", "Liabilities", Unit::Currency, Sign::NonNegative),
  (Statement::BalanceSheet, &["Fixed Assets", "Net Block"], "Fixed Assets", "Assets", Unit::Currency, Sign::NonNegative),
  (Statement::BalanceSheet, &["CWIP", "Capital Work in Progress"], "CWIP", "Assets", Unit::Currency, Sign::NonNegative),
  (Statement::BalanceSheet, &["Investments"], "Investments", "Assets", Unit::Currency, Sign::NonNegative),
  (Statement::BalanceSheet, &["Other Assets"], "Other Assets", "Assets", Unit::Currency, Sign::Any),
  (Statement::BalanceSheet, &["Total Assets"], "Total Assets", "Assets", Unit::Currency, Sign::NonNegative),
  // Cash Flow
  (Statement::CashFlow, &["Cash from Operating Activity"], "Cash from Operations", "Operating", Unit::Currency, Sign::Any),
  (Statement::CashFlow, &["Cash from Investing Activity"], "Cash from Investing", "Investing", Unit::Currency, Sign::Any),
  (Statement::CashFlow, &["Cash from Financing Activity"], "Cash from Financing", "Financing", Unit::Currency, Sign::Any),
  (Statement::CashFlow, &["Net Cash Flow"], "Net Cash Flow", "Summary", Unit::Currency, Sign::Any),
  // Ratios
  (Statement::Ratios, &["Debtor Days"], "Debtor Days", "Efficiency", Unit::Count, Sign::Any),
  (Statement::Ratios, &["Inventory Days"], "Inventory Days", "Efficiency", Unit::Count, Sign::Any),
  (Statement::Ratios, &["Days Payable"], "Days Payable", "Efficiency", Unit::Count, Sign::Any),
  (Statement::Ratios, &["Cash Conversion Cycle"], "Cash Conversion Cycle", "Efficiency", Unit::Count, Sign::Any),
  (Statement::Ratios, &["Working Capital Days"], "Working Capital Days", "Efficiency", Unit::Count, Sign::Any),
  (Statement::Ratios, &["ROCE %", "ROCE"], "ROCE", "Returns", Unit::Percent, Sign::Any),
  (Statement::Ratios, &["ROE %", "ROE", "Return on Equity"], "ROE", "Returns", Unit::Percent, Sign::Any),
];
