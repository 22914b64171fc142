//! HTTP access to the USAspending v2 API.
//!
//! [`SpendingClient`] is the only way tool handlers reach the network. It
//! spaces requests globally, bounds each one with a timeout, and retries
//! rate limits and transient failures with exponential backoff.

pub mod client;
#[cfg(any(test, feature = "test-util"))]
pub mod mock;
pub mod retry;
pub mod throttle;
pub mod transport;

pub use client::SpendingClient;
pub use retry::RetryPolicy;
pub use throttle::Throttle;
pub use transport::{ApiRequest, ApiResponse, Method, ReqwestTransport, Transport, TransportError};
