use scr_core::Exchange;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A resolved company. Built once by the resolver and never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanyIdentity {
  display_name: String,
  symbol: String,
  exchange: Exchange,
}

impl CompanyIdentity {
  pub fn new(display_name: impl Into<String>, symbol: impl Into<String>, exchange: Exchange) -> Self {
    Self {
      display_name: display_name.into().trim().to_string(),
      symbol: symbol.into().trim().to_ascii_uppercase(),
      exchange,
    }
  }

  pub fn display_name(&self) -> &str {
    &self.display_name
  }

  pub fn symbol(&self) -> &str {
    &self.symbol
  }

  pub fn exchange(&self) -> Exchange {
    self.exchange
  }
}

impl fmt::Display for CompanyIdentity {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({}/{})", self.display_name, self.symbol, self.exchange)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_identity_normalizes_symbol() {
    let id = CompanyIdentity::new(" Infosys Ltd ", "infy", Exchange::Nse);
    assert_eq!(id.display_name(), "Infosys Ltd");
    assert_eq!(id.symbol(), "INFY");
    assert_eq!(id.to_string(), "Infosys Ltd (INFY/NSE)");
  }
}
