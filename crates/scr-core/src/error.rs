use thiserror::Error;

/// The main error type for scr-* crates
#[derive(Error, Debug)]
pub enum Error {
  /// Environment variable error
  #[error("Environment variable error: {0}")]
  EnvVar(#[from] std::env::VarError),

  /// Configuration error
  #[error("Configuration error: {0}")]
  Config(String),

  /// Serialization/Deserialization error
  #[error("Serialization error: {0}")]
  Serde(#[from] serde_json::Error),

  /// HTTP transport error (connection, timeout, body read)
  #[error("HTTP error: {0}")]
  Http(String),

  /// Non-success HTTP status returned by the upstream
  #[error("HTTP status {status} for {url}")]
  Status { status: u16, url: String },

  /// Upstream asked us to slow down
  #[error("Rate limit exceeded: {0}")]
  RateLimit(String),

  /// Parse error for data processing
  #[error("Parse error: {0}")]
  Parse(String),
}

impl Error {
  /// Whether a retry of the same request can reasonably succeed
  pub fn is_transient(&self) -> bool {
    match self {
      Error::Http(_) | Error::RateLimit(_) => true,
      Error::Status { status, .. } => *status == 408 || *status == 429 || *status >= 500,
      _ => false,
    }
  }

  /// HTTP status carried by the error, if any
  pub fn status(&self) -> Option<u16> {
    match self {
      Error::Status { status, .. } => Some(*status),
      _ => None,
    }
  }
}

/// Result type alias for scr-* crates
pub type Result<T> = std::result::Result<T, Error>;
