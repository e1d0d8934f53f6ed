use anyhow::Result;
use clap::{Parser, Subcommand};
use dotenvy::dotenv;

mod commands;
use commands::{resolve::ResolveArgs, run::RunArgs, tables::TablesArgs};

mod config;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(name = "scr")]
#[command(propagate_version = true)]
struct Cli {
  #[command(subcommand)]
  command: Commands,

  /// Verbose output
  #[arg(short, long, global = true)]
  verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
  /// Resolve, scrape and normalize companies, then export the records
  Run(RunArgs),

  /// Resolve a company name to its listed symbol
  Resolve(ResolveArgs),

  /// Show the raw statement tables scraped for a symbol
  Tables(TablesArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
  // Load environment variables
  dotenv().ok();

  // Parse CLI arguments
  let cli = Cli::parse();

  // Initialize logging; RUST_LOG wins over -v
  let log_level = if cli.verbose { "debug" } else { "info" };
  let filter = tracing_subscriber::EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));
  tracing_subscriber::fmt().with_env_filter(filter).init();

  // Load configuration
  let config = config::Config::from_env()?;

  // Execute command
  match cli.command {
    Commands::Run(args) => commands::run::execute(args, config).await?,
    Commands::Resolve(args) => commands::resolve::execute(args, config).await?,
    Commands::Tables(args) => commands::tables::execute(args, config).await?,
  }

  Ok(())
}
