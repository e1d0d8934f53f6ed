//! Free-text company name to a listed symbol

use crate::error::ResolveError;
use crate::traits::NameSearch;
use scr_core::Exchange;
use scr_models::{CompanyIdentity, SearchCandidate};
use std::collections::HashSet;
use tracing::{debug, info, instrument};

const LEGAL_SUFFIXES: [&str; 11] =
  ["limited", "ltd", "inc", "incorporated", "corp", "corporation", "plc", "pvt", "private", "company", "co"];

/// Resolves names against a [`NameSearch`], preferring one exchange.
///
/// Never guesses: when candidates cannot be told apart the caller gets
/// [`ResolveError::AmbiguousMatch`] with all of them.
pub struct SymbolResolver<S> {
  search: S,
  target: Exchange,
}

impl<S: NameSearch> SymbolResolver<S> {
  pub fn new(search: S, target: Exchange) -> Self {
    Self { search, target }
  }

  pub fn target(&self) -> Exchange {
    self.target
  }

  #[instrument(skip(self))]
  pub async fn resolve(&self, name: &str) -> Result<CompanyIdentity, ResolveError> {
    let query = name.trim();
    if query.is_empty() {
      return Err(ResolveError::NotFound(name.to_string()));
    }

    let mut candidates = self.lookup(query).await?;
    if candidates.is_empty() {
      let variant = normalize_name(query);
      if !variant.is_empty() && variant != collapse(query) {
        debug!("No candidates for {:?}, retrying as {:?}", query, variant);
        candidates = self.lookup(&variant).await?;
      }
    }

    let chosen = self.choose(query, dedup(candidates))?;
    info!("Resolved {:?} to {}/{}", query, chosen.symbol, chosen.exchange);
    Ok(CompanyIdentity::new(chosen.name, chosen.symbol, chosen.exchange))
  }

  async fn lookup(&self, query: &str) -> Result<Vec<SearchCandidate>, ResolveError> {
    self.search.search(query).await.map_err(|e| ResolveError::UpstreamUnavailable(e.to_string()))
  }

  fn choose(&self, query: &str, candidates: Vec<SearchCandidate>) -> Result<SearchCandidate, ResolveError> {
    let wanted = collapse(query);

    let exact: Vec<&SearchCandidate> =
      candidates.iter().filter(|c| collapse(&c.name) == wanted).collect();
    match exact.as_slice() {
      [only] => return Ok((*only).clone()),
      [] => {}
      several => {
        let on_target: Vec<&&SearchCandidate> =
          several.iter().filter(|c| c.exchange == self.target).collect();
        if let [only] = on_target.as_slice() {
          return Ok((**only).clone());
        }
        return Err(ResolveError::AmbiguousMatch {
          query: query.to_string(),
          candidates: several.iter().map(|c| (*c).clone()).collect(),
        });
      }
    }

    let on_target: Vec<&SearchCandidate> =
      candidates.iter().filter(|c| c.exchange == self.target).collect();
    match on_target.as_slice() {
      [only] => Ok((*only).clone()),
      [] => Err(ResolveError::NotFound(query.to_string())),
      several => Err(ResolveError::AmbiguousMatch {
        query: query.to_string(),
        candidates: several.iter().map(|c| (*c).clone()).collect(),
      }),
    }
  }
}

/// Case-fold, drop punctuation and trailing legal-form words:
/// `"Tata Motors Ltd."` → `"tata motors"`
pub fn normalize_name(name: &str) -> String {
  let cleaned: String =
    name.chars().map(|c| if c.is_alphanumeric() || c.is_whitespace() { c } else { ' ' }).collect();
  let words: Vec<String> = cleaned
    .split_whitespace()
    .map(|w| w.to_lowercase())
    .filter(|w| !LEGAL_SUFFIXES.contains(&w.as_str()))
    .collect();
  words.join(" ")
}

fn collapse(name: &str) -> String {
  name.split_whitespace().collect::<Vec<_>>().join(" ").to_lowercase()
}

fn dedup(candidates: Vec<SearchCandidate>) -> Vec<SearchCandidate> {
  let mut seen = HashSet::new();
  candidates.into_iter().filter(|c| seen.insert((c.symbol.clone(), c.exchange))).collect()
}
