//! reqwest-backed XML transport

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::{RawResponse, Transport};
use crate::config::ConnectorConfig;
use crate::error::Result;
use crate::types::OptionStringExt;
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Configuration for the XML transport
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Request timeout
    pub timeout: Duration,
    /// Optional User-Agent header
    pub user_agent: Option<String>,
    /// Rate limiter configuration, None to disable
    pub rate_limit: Option<RateLimiterConfig>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(60),
            user_agent: None,
            rate_limit: Some(RateLimiterConfig::default()),
        }
    }
}

impl TransportConfig {
    /// Derive transport settings from the connector configuration
    pub fn from_connector_config(config: &ConnectorConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone().none_if_empty(),
            rate_limit: Some(
                config
                    .requests_per_second
                    .map_or_else(RateLimiterConfig::default, |rps| {
                        RateLimiterConfig::new(rps, rps)
                    }),
            ),
            ..Self::default()
        }
    }
}

/// HTTP transport that POSTs XML bodies to the vendor gateway
pub struct XmlTransport {
    client: Client,
    rate_limiter: Option<RateLimiter>,
}

impl XmlTransport {
    /// Create a transport with default configuration
    pub fn new() -> Self {
        Self::with_config(&TransportConfig::default())
    }

    /// Create a transport with custom configuration
    pub fn with_config(config: &TransportConfig) -> Self {
        let mut builder = Client::builder().timeout(config.timeout);
        if let Some(agent) = &config.user_agent {
            builder = builder.user_agent(agent);
        }
        let client = builder.build().expect("Failed to build HTTP client");

        Self {
            client,
            rate_limiter: config.rate_limit.as_ref().map(RateLimiter::new),
        }
    }
}

impl Default for XmlTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for XmlTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("XmlTransport")
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transport for XmlTransport {
    async fn post_xml(&self, url: &str, body: String) -> Result<RawResponse> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.wait().await;
        }

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "application/xml")
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("POST {url} -> {status} ({} bytes)", body.len());

        Ok(RawResponse { status, body })
    }
}
