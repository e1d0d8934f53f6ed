use anyhow::{Context, Result};
use scr_core::Config as CoreConfig;
use scr_loaders::MetricCatalog;
use std::env;

#[derive(Debug, Clone)]
pub struct Config {
  pub client_config: CoreConfig,
  /// JSON metric catalog replacing the built-in one
  pub catalog_path: Option<String>,
  pub output_path: String,
}

impl Config {
  pub fn from_env() -> Result<Self> {
    let client_config = CoreConfig::from_env().context("Invalid Screener configuration")?;

    let catalog_path = env::var("SCR_CATALOG").ok().filter(|p| !p.trim().is_empty());

    let output_path =
      env::var("SCR_OUTPUT").unwrap_or_else(|_| scr_loaders::DEFAULT_OUTPUT_FILE.to_string());

    Ok(Self { client_config, catalog_path, output_path })
  }

  pub fn load_catalog(&self) -> Result<MetricCatalog> {
    match &self.catalog_path {
      Some(path) => MetricCatalog::from_json_file(path)
        .with_context(|| format!("Failed to load metric catalog from {}", path)),
      None => Ok(MetricCatalog::screener()),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_load_catalog_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("catalog.json");
    std::fs::write(&path, r#"[{"labels": ["Sales"], "metric": "Revenue", "section": "Income", "unit": "currency"}]"#)
      .unwrap();

    let config = Config {
      client_config: CoreConfig::default(),
      catalog_path: Some(path.to_string_lossy().to_string()),
      output_path: "out.csv".to_string(),
    };
    let catalog = config.load_catalog().unwrap();
    assert_eq!(catalog.lookup(scr_core::Statement::ProfitLoss, "Sales").unwrap().metric, "Revenue");
  }

  #[test]
  fn test_missing_catalog_file_is_an_error() {
    let config = Config {
      client_config: CoreConfig::default(),
      catalog_path: Some("/nonexistent/catalog.json".to_string()),
      output_path: "out.csv".to_string(),
    };
    assert!(config.load_catalog().is_err());
  }
}
