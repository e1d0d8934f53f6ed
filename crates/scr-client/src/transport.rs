//! HTTP transport layer for Screener and Yahoo requests

use rand::Rng;
use reqwest::{Client, StatusCode};
use scr_core::{Config, Error, Result, RetryPolicy};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error, instrument, warn};
use url::Url;

/// HTTP transport with a bounded retry policy
#[derive(Debug)]
pub struct Transport {
  client: Client,
  timeout: Duration,
  retry: RetryPolicy,
}

impl Transport {
  /// Create a new transport instance
  pub fn new(config: &Config) -> Result<Self> {
    let client = Client::builder()
      .timeout(config.timeout())
      .user_agent(config.user_agent.as_str())
      .build()
      .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

    Ok(Self { client, timeout: config.timeout(), retry: config.retry.clone() })
  }

  /// GET `url` with `query` appended and return the body as text.
  ///
  /// Transient failures (connect errors, timeouts, 408/429/5xx) are retried
  /// according to the retry policy; anything else is returned at once.
  #[instrument(skip(self, query), fields(url = %url))]
  pub async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String> {
    let url = build_url(url, query)?;

    let mut attempts = 0;
    loop {
      if attempts > 0 {
        let delay = self.retry.backoff(attempts) + self.jitter();
        warn!("Retrying request in {}ms (attempt {})", delay.as_millis(), attempts + 1);
        tokio::time::sleep(delay).await;
      }
      attempts += 1;

      match self.make_request(&url).await {
        Ok(text) => {
          debug!("Response body length: {} bytes", text.len());
          return Ok(text);
        }
        Err(e) if e.is_transient() && self.retry.should_retry(attempts) => {
          warn!("Request failed (attempt {}): {}", attempts, e);
        }
        Err(e) => {
          error!("Request failed after {} attempt(s): {}", attempts, e);
          return Err(e);
        }
      }
    }
  }

  /// GET and deserialize a JSON body
  pub async fn get_json<T>(&self, url: &str, query: &[(&str, &str)]) -> Result<T>
  where
    T: DeserializeOwned,
  {
    let text = self.get_text(url, query).await?;
    serde_json::from_str::<T>(&text).map_err(|e| {
      error!("Failed to parse JSON response: {}", e);
      Error::Parse(format!(
        "Failed to parse response: {}. Response: {}",
        e,
        text.chars().take(200).collect::<String>()
      ))
    })
  }

  async fn make_request(&self, url: &Url) -> Result<String> {
    let response = self
      .client
      .get(url.clone())
      .send()
      .await
      .map_err(|e| Error::Http(format!("Request failed: {}", e)))?;

    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
      return Err(Error::RateLimit(format!("{} answered 429", url)));
    }
    if !status.is_success() {
      debug!("Request failed with status: {}", status);
      return Err(Error::Status { status: status.as_u16(), url: url.to_string() });
    }

    response.text().await.map_err(|e| Error::Http(format!("Failed to read response body: {}", e)))
  }

  fn jitter(&self) -> Duration {
    if self.retry.jitter_ms == 0 {
      return Duration::ZERO;
    }
    Duration::from_millis(rand::thread_rng().gen_range(0..=self.retry.jitter_ms))
  }

  /// Get request timeout duration
  pub fn timeout(&self) -> Duration {
    self.timeout
  }

  pub fn retry_policy(&self) -> &RetryPolicy {
    &self.retry
  }
}

/// Parse `base` and append `query` pairs
fn build_url(base: &str, query: &[(&str, &str)]) -> Result<Url> {
  let mut url = Url::parse(base).map_err(|e| Error::Http(format!("Invalid URL {}: {}", base, e)))?;
  if !query.is_empty() {
    let mut pairs = url.query_pairs_mut();
    for (key, value) in query {
      pairs.append_pair(key, value);
    }
  }
  Ok(url)
}

#[cfg(test)]
mod tests {
  use super::*;
  use scr_core::RetryPolicy;
  use wiremock::matchers::{method, path, query_param};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  fn transport(server: &MockServer, retry: RetryPolicy) -> Transport {
    let config = Config { retry, ..Config::with_base_url(server.uri()) };
    Transport::new(&config).unwrap()
  }

  fn quick_retries(max_attempts: u32) -> RetryPolicy {
    RetryPolicy { max_attempts, initial_backoff_ms: 1, max_backoff_ms: 5, multiplier: 2.0, jitter_ms: 0 }
  }

  #[test]
  fn test_build_url() {
    let url = build_url("https://www.screener.in/api/company/search/", &[("q", "tata motors")]).unwrap();
    assert_eq!(url.as_str(), "https://www.screener.in/api/company/search/?q=tata+motors");
  }

  #[tokio::test]
  async fn test_get_text_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .and(path("/search"))
      .and(query_param("q", "infosys"))
      .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
      .mount(&server)
      .await;

    let transport = transport(&server, RetryPolicy::none());
    let body = transport.get_text(&format!("{}/search", server.uri()), &[("q", "infosys")]).await;
    assert_eq!(body.unwrap(), "ok");
  }

  #[tokio::test]
  async fn test_server_errors_are_retried_until_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(503))
      .expect(3)
      .mount(&server)
      .await;

    let transport = transport(&server, quick_retries(3));
    let result = transport.get_text(&format!("{}/company/INFY/", server.uri()), &[]).await;
    assert!(matches!(result, Err(Error::Status { status: 503, .. })));
  }

  #[tokio::test]
  async fn test_not_found_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(404))
      .expect(1)
      .mount(&server)
      .await;

    let transport = transport(&server, quick_retries(3));
    let result = transport.get_text(&format!("{}/company/NOPE/", server.uri()), &[]).await;
    assert_eq!(result.unwrap_err().status(), Some(404));
  }

  #[tokio::test]
  async fn test_get_json_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
      .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
      .mount(&server)
      .await;

    let transport = transport(&server, RetryPolicy::none());
    let result: Result<Vec<String>> = transport.get_json(&server.uri(), &[]).await;
    assert!(matches!(result, Err(Error::Parse(_))));
  }
}
