//! Bounded retry policy shared by every fetch

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry policy for a single fetch.
///
/// `max_attempts` counts the first try, so `1` means no retries. The delay
/// before retry `n` (1-based) is `initial_backoff_ms * multiplier^(n-1)`,
/// capped at `max_backoff_ms`. Callers add up to `jitter_ms` of random delay
/// on top.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RetryPolicy {
  pub max_attempts: u32,
  pub initial_backoff_ms: u64,
  pub max_backoff_ms: u64,
  pub multiplier: f64,
  pub jitter_ms: u64,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self {
      max_attempts: 3,
      initial_backoff_ms: 1000,
      max_backoff_ms: 30_000,
      multiplier: 2.0,
      jitter_ms: 250,
    }
  }
}

impl RetryPolicy {
  /// A policy that tries exactly once
  pub fn none() -> Self {
    Self { max_attempts: 1, initial_backoff_ms: 0, max_backoff_ms: 0, multiplier: 1.0, jitter_ms: 0 }
  }

  /// Whether another attempt is allowed after `attempts_made` tries
  pub fn should_retry(&self, attempts_made: u32) -> bool {
    attempts_made < self.max_attempts.max(1)
  }

  /// Backoff before retry number `retry` (1-based), without jitter
  pub fn backoff(&self, retry: u32) -> Duration {
    if retry == 0 {
      return Duration::ZERO;
    }
    let factor = self.multiplier.max(1.0).powi(retry as i32 - 1);
    let millis = (self.initial_backoff_ms as f64 * factor).min(self.max_backoff_ms as f64);
    Duration::from_millis(millis as u64)
  }
}
