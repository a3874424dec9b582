//! HTTP transport module
//!
//! Owns all I/O the protocol adapter itself never performs: the POST of a
//! built XML body and the wait for the vendor's reply. The transport judges
//! nothing about the response; status and body go back to the caller as-is
//! for classification.

mod rate_limit;
mod transport;

pub use rate_limit::{RateLimiter, RateLimiterConfig};
pub use transport::{TransportConfig, XmlTransport};

use crate::error::Result;
use async_trait::async_trait;

/// Raw HTTP response handed to the protocol adapter
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// HTTP status code
    pub status: u16,
    /// Response body text
    pub body: String,
}

/// Performs the HTTP POST for a built request body.
///
/// Implemented by [`XmlTransport`] in production and by stubs in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST an XML body and return the raw status and response text
    async fn post_xml(&self, url: &str, body: String) -> Result<RawResponse>;
}
