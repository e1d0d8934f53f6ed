//! Enumerations shared across the workspace

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Semantic scale of a numeric value.
///
/// Percentages are stored as percentage points: `25.8%` is `25.8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
  Percent,
  Ratio,
  Currency,
  Count,
  None,
}

impl Unit {
  /// Plausible closed range for values of this unit
  pub fn bounds(&self) -> (f64, f64) {
    match self {
      Unit::Percent => (-100_000.0, 100_000.0),
      Unit::Ratio => (-1000.0, 1000.0),
      Unit::Currency | Unit::Count => (-1e15, 1e15),
      Unit::None => (f64::MIN, f64::MAX),
    }
  }

  pub fn as_str(&self) -> &'static str {
    match self {
      Unit::Percent => "percent",
      Unit::Ratio => "ratio",
      Unit::Currency => "currency",
      Unit::Count => "count",
      Unit::None => "none",
    }
  }
}

impl fmt::Display for Unit {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Financial statement scraped from a company page.
///
/// Variant order is the output order of normalized records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Statement {
  #[serde(rename = "Profit & Loss")]
  ProfitLoss,
  #[serde(rename = "Balance Sheet")]
  BalanceSheet,
  #[serde(rename = "Cash Flow")]
  CashFlow,
  #[serde(rename = "Ratios")]
  Ratios,
}

impl Statement {
  pub const ALL: [Statement; 4] =
    [Statement::ProfitLoss, Statement::BalanceSheet, Statement::CashFlow, Statement::Ratios];

  /// Id of the `<section>` holding this statement on a company page
  pub fn section_id(&self) -> &'static str {
    match self {
      Statement::ProfitLoss => "profit-loss",
      Statement::BalanceSheet => "balance-sheet",
      Statement::CashFlow => "cash-flow",
      Statement::Ratios => "ratios",
    }
  }

  pub fn name(&self) -> &'static str {
    match self {
      Statement::ProfitLoss => "Profit & Loss",
      Statement::BalanceSheet => "Balance Sheet",
      Statement::CashFlow => "Cash Flow",
      Statement::Ratios => "Ratios",
    }
  }
}

impl fmt::Display for Statement {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.name())
  }
}

impl FromStr for Statement {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let key = s.trim().to_ascii_lowercase();
    Statement::ALL
      .into_iter()
      .find(|st| st.section_id() == key || st.name().to_ascii_lowercase() == key)
      .ok_or_else(|| format!("unknown statement: {}", s))
  }
}

/// Indian exchanges the resolver knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Exchange {
  #[serde(rename = "NSE")]
  Nse,
  #[serde(rename = "BSE")]
  Bse,
}

impl fmt::Display for Exchange {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Exchange::Nse => write!(f, "NSE"),
      Exchange::Bse => write!(f, "BSE"),
    }
  }
}

impl FromStr for Exchange {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_uppercase().as_str() {
      "NSE" | "NSI" | "NS" => Ok(Exchange::Nse),
      "BSE" | "BO" => Ok(Exchange::Bse),
      other => Err(format!("unknown exchange: {}", other)),
    }
  }
}

/// Which set of statements a company page shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PageView {
  Consolidated,
  Standalone,
}

impl PageView {
  /// Views to try, in order, for the configured preference
  pub fn preference(consolidated: bool) -> Vec<PageView> {
    if consolidated {
      vec![PageView::Consolidated, PageView::Standalone]
    } else {
      vec![PageView::Standalone]
    }
  }
}

impl fmt::Display for PageView {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PageView::Consolidated => write!(f, "consolidated"),
      PageView::Standalone => write!(f, "standalone"),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_unit_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Unit::Percent).unwrap(), "\"percent\"");
    assert_eq!(serde_json::to_string(&Unit::None).unwrap(), "\"none\"");
    assert_eq!(Unit::Ratio.to_string(), "ratio");
  }

  #[test]
  fn test_ratio_bounds() {
    assert_eq!(Unit::Ratio.bounds(), (-1000.0, 1000.0));
  }

  #[test]
  fn test_statement_order_and_names() {
    let mut all = vec![Statement::Ratios, Statement::ProfitLoss, Statement::CashFlow];
    all.sort();
    assert_eq!(all, vec![Statement::ProfitLoss, Statement::CashFlow, Statement::Ratios]);
    assert_eq!(Statement::ProfitLoss.to_string(), "Profit & Loss");
    assert_eq!(serde_json::to_string(&Statement::BalanceSheet).unwrap(), "\"Balance Sheet\"");
  }

  #[test]
  fn test_statement_from_str() {
    assert_eq!("cash-flow".parse::<Statement>().unwrap(), Statement::CashFlow);
    assert_eq!("Profit & Loss".parse::<Statement>().unwrap(), Statement::ProfitLoss);
    assert!("quarters".parse::<Statement>().is_err());
  }

  #[test]
  fn test_exchange_from_str() {
    assert_eq!("nse".parse::<Exchange>().unwrap(), Exchange::Nse);
    assert_eq!("NSI".parse::<Exchange>().unwrap(), Exchange::Nse);
    assert_eq!("BO".parse::<Exchange>().unwrap(), Exchange::Bse);
    assert!("NASDAQ".parse::<Exchange>().is_err());
  }

  #[test]
  fn test_page_view_preference() {
    assert_eq!(PageView::preference(true), vec![PageView::Consolidated, PageView::Standalone]);
    assert_eq!(PageView::preference(false), vec![PageView::Standalone]);
  }
}
