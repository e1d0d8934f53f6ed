//! Export boundary for normalized records

use crate::error::{LoaderError, LoaderResult};
use scr_models::{NormalizedRecord, OUTPUT_COLUMNS};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Default CSV export file name
pub const DEFAULT_OUTPUT_FILE: &str = "screener_normalized_data.csv";

/// Somewhere records go. `finish` must be called once all batches are written.
pub trait RecordSink {
  fn write_records(&mut self, records: &[NormalizedRecord]) -> LoaderResult<usize>;

  fn finish(&mut self) -> LoaderResult<()>;
}

/// Flat CSV with exactly the nine schema columns; `None` values are blank
pub struct CsvSink<W: Write> {
  writer: csv::Writer<W>,
  header_written: bool,
  rows: usize,
}

impl CsvSink<BufWriter<File>> {
  pub fn create<P: AsRef<Path>>(path: P) -> LoaderResult<Self> {
    Ok(Self::new(BufWriter::new(File::create(path)?)))
  }
}

impl<W: Write> CsvSink<W> {
  pub fn new(inner: W) -> Self {
    Self { writer: csv::Writer::from_writer(inner), header_written: false, rows: 0 }
  }

  pub fn rows_written(&self) -> usize {
    self.rows
  }

  pub fn into_inner(mut self) -> LoaderResult<W> {
    self.finish()?;
    self.writer.into_inner().map_err(|e| LoaderError::IoError(e.to_string()))
  }

  fn ensure_header(&mut self) -> LoaderResult<()> {
    if !self.header_written {
      self.writer.write_record(OUTPUT_COLUMNS)?;
      self.header_written = true;
    }
    Ok(())
  }
}

impl<W: Write> RecordSink for CsvSink<W> {
  fn write_records(&mut self, records: &[NormalizedRecord]) -> LoaderResult<usize> {
    self.ensure_header()?;
    for r in records {
      let year = r.year.to_string();
      let value = r.value_text();
      self.writer.write_record([
        r.company.as_str(),
        r.symbol.as_str(),
        r.statement.name(),
        r.section.as_str(),
        r.metric.as_str(),
        year.as_str(),
        value.as_str(),
        r.unit.as_str(),
        r.source.as_str(),
      ])?;
    }
    self.rows += records.len();
    Ok(records.len())
  }

  fn finish(&mut self) -> LoaderResult<()> {
    self.ensure_header()?;
    self.writer.flush()?;
    debug!("CSV sink flushed {} rows", self.rows);
    Ok(())
  }
}

/// JSON array of records, `Timestamp` included. Written on `finish`.
pub struct JsonSink<W: Write> {
  inner: W,
  buffered: Vec<NormalizedRecord>,
  finished: bool,
}

impl JsonSink<BufWriter<File>> {
  pub fn create<P: AsRef<Path>>(path: P) -> LoaderResult<Self> {
    Ok(Self::new(BufWriter::new(File::create(path)?)))
  }
}

impl<W: Write> JsonSink<W> {
  pub fn new(inner: W) -> Self {
    Self { inner, buffered: Vec::new(), finished: false }
  }

  pub fn into_inner(mut self) -> LoaderResult<W> {
    self.finish()?;
    Ok(self.inner)
  }
}

impl<W: Write> RecordSink for JsonSink<W> {
  fn write_records(&mut self, records: &[NormalizedRecord]) -> LoaderResult<usize> {
    if self.finished {
      return Err(LoaderError::InvalidData("JSON sink already finished".to_string()));
    }
    self.buffered.extend_from_slice(records);
    Ok(records.len())
  }

  fn finish(&mut self) -> LoaderResult<()> {
    if self.finished {
      return Ok(());
    }
    serde_json::to_writer_pretty(&mut self.inner, &self.buffered)?;
    self.inner.flush()?;
    debug!("JSON sink wrote {} records", self.buffered.len());
    self.buffered.clear();
    self.finished = true;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use chrono::{TimeZone, Utc};
  use scr_core::{Statement, Unit};

  fn roe(year: i32, value: Option<f64>) -> NormalizedRecord {
    NormalizedRecord {
      company: "Infosys Ltd".to_string(),
      symbol: "INFY".to_string(),
      statement: Statement::Ratios,
      section: "Returns".to_string(),
      metric: "ROE".to_string(),
      year,
      value,
      unit: Unit::Percent,
      source: "Screener.in".to_string(),
      timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
    }
  }

  #[test]
  fn test_csv_has_nine_columns_and_blank_nulls() {
    let mut sink = CsvSink::new(Vec::new());
    sink.write_records(&[roe(2023, None), roe(2024, Some(25.8))]).unwrap();
    assert_eq!(sink.rows_written(), 2);

    let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "Company,Symbol,Statement,Section,Metric,Year,Value,Unit,Source");
    assert_eq!(lines[1], "Infosys Ltd,INFY,Ratios,Returns,ROE,2023,,percent,Screener.in");
    assert_eq!(lines[2], "Infosys Ltd,INFY,Ratios,Returns,ROE,2024,25.8,percent,Screener.in");
  }

  #[test]
  fn test_csv_leaves_statement_names_unquoted() {
    let mut record = roe(2024, Some(1.0));
    record.statement = Statement::ProfitLoss;
    let mut sink = CsvSink::new(Vec::new());
    sink.write_records(&[record]).unwrap();

    let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
    assert!(text.contains(",Profit & Loss,"));
    assert!(!text.contains("\"Profit & Loss\""));
  }

  #[test]
  fn test_empty_csv_still_has_header() {
    let sink = CsvSink::new(Vec::new());
    let text = String::from_utf8(sink.into_inner().unwrap()).unwrap();
    assert_eq!(text.trim_end(), OUTPUT_COLUMNS.join(","));
  }

  #[test]
  fn test_json_keeps_null_and_timestamp() {
    let mut sink = JsonSink::new(Vec::new());
    sink.write_records(&[roe(2023, None)]).unwrap();

    let bytes = sink.into_inner().unwrap();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert!(json[0]["Value"].is_null());
    assert_eq!(json[0]["Year"], 2023);
    assert!(json[0]["Timestamp"].as_str().unwrap().starts_with("2025-01-01"));
  }

  #[test]
  fn test_csv_sink_creates_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(DEFAULT_OUTPUT_FILE);
    let mut sink = CsvSink::create(&path).unwrap();
    sink.write_records(&[roe(2024, Some(25.8))]).unwrap();
    sink.finish().unwrap();
    drop(sink);

    let text = std::fs::read_to_string(&path).unwrap();
    assert_eq!(text.lines().count(), 2);
  }
}
