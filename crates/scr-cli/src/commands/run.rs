use anyhow::{anyhow, Context, Result};
use clap::{Args, ValueEnum};
use scr_loaders::prelude::*;
use scr_loaders::{CsvProcessor, FundamentalsLoaderOutput, RunState};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::config::Config;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
  Csv,
  Json,
}

#[derive(Args, Clone, Debug)]
pub struct RunArgs {
  /// Company names to process
  companies: Vec<String>,

  /// CSV file with a Company column (or one name per line)
  #[arg(short = 'f', long)]
  file: Option<PathBuf>,

  /// Output file (defaults to SCR_OUTPUT or screener_normalized_data.csv)
  #[arg(short, long)]
  output: Option<PathBuf>,

  /// Output format
  #[arg(long, value_enum, default_value = "csv")]
  format: OutputFormat,

  /// Number of companies processed concurrently
  #[arg(short, long, default_value = "4")]
  concurrent: usize,

  /// Scrape standalone statements only
  #[arg(long)]
  standalone: bool,

  /// Most recent fiscal years to keep (0 keeps all)
  #[arg(long)]
  max_years: Option<usize>,

  /// Hide the progress bar
  #[arg(long)]
  no_progress: bool,
}

/// Main execute function
pub async fn execute(args: RunArgs, config: Config) -> Result<()> {
  let mut companies = args.companies.clone();
  if let Some(file) = &args.file {
    let listed = CsvProcessor::new()
      .parse_company_list(file)
      .with_context(|| format!("Failed to read companies from {}", file.display()))?;
    companies.extend(listed);
  }
  companies.retain(|c| !c.trim().is_empty());

  if companies.is_empty() {
    return Err(anyhow!("No companies given; pass names or --file"));
  }
  info!("Processing {} companies", companies.len());

  let mut client_config = config.client_config.clone();
  if args.standalone {
    client_config.consolidated = false;
  }
  if let Some(max_years) = args.max_years {
    client_config.max_years = max_years;
  }

  let catalog = Arc::new(config.load_catalog()?);
  let client = Arc::new(
    ScreenerClient::new(client_config).map_err(|e| anyhow!("Failed to create client: {}", e))?,
  );
  let pipeline = Arc::new(Pipeline::screener(client, catalog));

  let context = LoaderContext::new(LoaderConfig {
    max_concurrent_requests: args.concurrent,
    show_progress: !args.no_progress,
    track_process: true,
  })
  .with_process_tracker(ProcessTracker::new());

  let output = FundamentalsLoader::new(pipeline)
    .load(&context, FundamentalsLoaderInput { companies })
    .await
    .map_err(|e| anyhow!("Loading failed: {}", e))?;

  report(&output);

  let path = args.output.clone().unwrap_or_else(|| PathBuf::from(&config.output_path));
  let records = output.records();
  let written = match args.format {
    OutputFormat::Csv => {
      let mut sink = CsvSink::create(&path)?;
      let n = sink.write_records(&records)?;
      sink.finish()?;
      n
    }
    OutputFormat::Json => {
      let mut sink = JsonSink::create(&path)?;
      let n = sink.write_records(&records)?;
      sink.finish()?;
      n
    }
  };
  info!("Wrote {} records to {}", written, path.display());

  if output.completed + output.partial == 0 {
    return Err(anyhow!("Every company failed"));
  }
  Ok(())
}

fn report(output: &FundamentalsLoaderOutput) {
  for run in &output.runs {
    match (run.state(), run.output()) {
      (RunState::Complete, Some(out)) => {
        println!("{:<30} {} records", out.identity.to_string(), out.records.len());
        for (statement, error) in &out.manifest.missing {
          println!("{:<30}   missing {}: {}", "", statement, error);
        }
        for issue in &out.issues {
          warn!("{} {} {} {:?}: {:?}", out.identity.symbol(), issue.metric, issue.year, issue.raw, issue.kind);
        }
      }
      (state, _) => println!("{:<30} {}", run.input(), state),
    }
  }
  println!(
    "\n{} complete, {} partial, {} failed",
    output.completed, output.partial, output.failed
  );
}
