pub mod company;
pub mod search;

use crate::transport::Transport;
use governor::DefaultDirectRateLimiter;
use std::sync::Arc;

/// Base trait for endpoint implementations
///
/// Provides common functionality needed by all endpoint modules
pub trait EndpointBase {
  /// Wait for rate limit before making a request
  async fn wait_for_rate_limit(&self);

  /// Get a reference to the transport layer
  fn transport(&self) -> &Arc<Transport>;
}

/// Macro to implement the EndpointBase trait for endpoint structs
macro_rules! impl_endpoint_base {
  ($struct_name:ident) => {
    impl $crate::endpoints::EndpointBase for $struct_name {
      async fn wait_for_rate_limit(&self) {
        self.rate_limiter.until_ready().await;
      }

      fn transport(&self) -> &std::sync::Arc<$crate::transport::Transport> {
        &self.transport
      }
    }
  };
}

pub(crate) use impl_endpoint_base;

/// Shared rate limiter handle passed to every endpoint
pub type SharedRateLimiter = Arc<DefaultDirectRateLimiter>;
