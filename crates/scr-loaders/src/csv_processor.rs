//! CSV reader for company lists
//!
//! Accepts a file with a `Company` (or `Name`) column, or a bare list with
//! one name per line. Blank names are skipped.

use crate::LoaderResult;
use csv::ReaderBuilder;
use std::fs::File;
use std::path::Path;

#[derive(Debug, Default)]
pub struct CsvProcessor;

impl CsvProcessor {
  pub fn new() -> Self {
    Self
  }

  /// Company names in file order
  pub fn parse_company_list<P: AsRef<Path>>(&self, path: P) -> LoaderResult<Vec<String>> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new().has_headers(false).flexible(true).from_reader(file);

    let mut records = reader.records();
    let Some(first) = records.next().transpose()? else {
      return Ok(Vec::new());
    };

    let column = first.iter().position(|h| {
      let h = h.trim().to_lowercase();
      h == "company" || h == "name" || h == "company name"
    });

    let mut companies = Vec::new();
    if column.is_none() {
      push_name(&mut companies, first.get(0));
    }
    let index = column.unwrap_or(0);

    for result in records {
      let record = result?;
      push_name(&mut companies, record.get(index));
    }

    Ok(companies)
  }
}

fn push_name(out: &mut Vec<String>, name: Option<&str>) {
  if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
    out.push(name.to_string());
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  fn write_temp(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
  }

  #[test]
  fn test_company_column() {
    let file = write_temp("Rank,Company\n1,Infosys\n2, Tata Motors \n3,\n");
    let companies = CsvProcessor::new().parse_company_list(file.path()).unwrap();
    assert_eq!(companies, vec!["Infosys", "Tata Motors"]);
  }

  #[test]
  fn test_bare_list() {
    let file = write_temp("Infosys\nHDFC Bank\n");
    let companies = CsvProcessor::new().parse_company_list(file.path()).unwrap();
    assert_eq!(companies, vec!["Infosys", "HDFC Bank"]);
  }

  #[test]
  fn test_empty_file() {
    let file = write_temp("");
    assert!(CsvProcessor::new().parse_company_list(file.path()).unwrap().is_empty());
  }

  #[test]
  fn test_missing_file() {
    let err = CsvProcessor::new().parse_company_list("/nonexistent/companies.csv").unwrap_err();
    assert!(matches!(err, crate::LoaderError::IoError(_)));
  }
}
