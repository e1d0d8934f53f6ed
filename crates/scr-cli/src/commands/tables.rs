use anyhow::{anyhow, Result};
use clap::Args;
use scr_client::ScreenerClient;
use scr_core::{PageView, Statement};
use scr_loaders::TableScraper;
use scr_models::RawTable;
use std::sync::Arc;

use crate::config::Config;

#[derive(Args, Clone, Debug)]
pub struct TablesArgs {
  /// Listed symbol, e.g. INFY
  symbol: String,

  /// Only this statement (profit-loss, balance-sheet, cash-flow, ratios)
  #[arg(short, long)]
  statement: Option<Statement>,

  /// Scrape the standalone page only
  #[arg(long)]
  standalone: bool,

  /// Print tables as JSON
  #[arg(long)]
  json: bool,
}

pub async fn execute(args: TablesArgs, config: Config) -> Result<()> {
  let consolidated = config.client_config.consolidated && !args.standalone;
  let fetch_delay = config.client_config.fetch_delay();
  let client = Arc::new(ScreenerClient::new(config.client_config)?);

  let statements = args.statement.map(|s| vec![s]).unwrap_or_else(|| Statement::ALL.to_vec());
  let scraper = TableScraper::new(client)
    .with_views(PageView::preference(consolidated))
    .with_statements(statements)
    .with_fetch_delay(fetch_delay);

  let mut found = 0;
  for outcome in scraper.fetch_statements(&args.symbol).await {
    match outcome.result {
      Ok((view, table)) => {
        found += 1;
        if args.json {
          println!("{}", serde_json::to_string_pretty(&table)?);
        } else {
          print_table(&table, view);
        }
      }
      Err(e) => eprintln!("{}: {}", outcome.statement, e),
    }
  }

  if found == 0 {
    return Err(anyhow!("No tables found for {}", args.symbol));
  }
  Ok(())
}

fn print_table(table: &RawTable, view: PageView) {
  println!("== {} ({}) ==", table.statement, view);
  println!("{:<40} {}", "", table.columns.join(" | "));
  for row in &table.rows {
    let cells: Vec<&str> = row.cells.iter().map(|(_, text)| text.as_str()).collect();
    println!("{:<40} {}", row.label, cells.join(" | "));
  }
  println!();
}
