use anyhow::Result;
use clap::Args;
use scr_client::ScreenerClient;
use scr_core::Exchange;
use scr_loaders::{ChainedSearch, SymbolResolver};
use std::sync::Arc;

use crate::config::Config;

#[derive(Args, Clone, Debug)]
pub struct ResolveArgs {
  /// Company name, e.g. "Tata Motors"
  name: String,

  /// Exchange to prefer (NSE or BSE)
  #[arg(short, long)]
  exchange: Option<Exchange>,
}

pub async fn execute(args: ResolveArgs, config: Config) -> Result<()> {
  let target = args.exchange.unwrap_or(config.client_config.target_exchange);
  let client = Arc::new(ScreenerClient::new(config.client_config)?);
  let resolver = SymbolResolver::new(ChainedSearch::screener_then_yahoo(client), target);

  let identity = resolver.resolve(&args.name).await?;
  println!("{}", identity);
  Ok(())
}
