//! Long-format output schema

use chrono::{DateTime, Utc};
use scr_core::{Statement, Unit};
use serde::{Deserialize, Serialize};

/// Column order of the exported schema. New fiscal years add rows, never
/// columns.
pub const OUTPUT_COLUMNS: [&str; 9] =
  ["Company", "Symbol", "Statement", "Section", "Metric", "Year", "Value", "Unit", "Source"];

/// One observation: a metric of a company for one fiscal year
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
  #[serde(rename = "Company")]
  pub company: String,

  #[serde(rename = "Symbol")]
  pub symbol: String,

  #[serde(rename = "Statement")]
  pub statement: Statement,

  #[serde(rename = "Section")]
  pub section: String,

  #[serde(rename = "Metric")]
  pub metric: String,

  /// Fiscal year
  #[serde(rename = "Year")]
  pub year: i32,

  /// `None` when the source cell was blank, dashed or unusable
  #[serde(rename = "Value")]
  pub value: Option<f64>,

  #[serde(rename = "Unit")]
  pub unit: Unit,

  /// Provenance; `raw:unmapped` flags rows the metric catalog did not know
  #[serde(rename = "Source")]
  pub source: String,

  /// Extraction time, shared by every record of a run
  #[serde(rename = "Timestamp")]
  pub timestamp: DateTime<Utc>,
}

/// Upsert key of a record within one run's output
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RecordKey {
  pub symbol: String,
  pub statement: Statement,
  pub metric: String,
  pub year: i32,
}

impl NormalizedRecord {
  pub fn key(&self) -> RecordKey {
    RecordKey {
      symbol: self.symbol.clone(),
      statement: self.statement,
      metric: self.metric.clone(),
      year: self.year,
    }
  }

  /// Value rendered for flat exports: empty for `None`
  pub fn value_text(&self) -> String {
    self.value.map(|v| v.to_string()).unwrap_or_default()
  }
}
