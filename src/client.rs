//! Protocol client facade
//!
//! Composes the request builder, response parser, and date normalizer into
//! the two operations the sync engine calls: build the request for a page
//! and parse a response into normalized records. The facade also owns the
//! retry policy for transient vendor errors; the protocol adapter beneath it
//! never retries.

use crate::catalog::StreamDescriptor;
use crate::config::ConnectorConfig;
use crate::error::Result;
use crate::http::{RawResponse, Transport, TransportConfig, XmlTransport};
use crate::protocol::datetime;
use crate::protocol::request::{self, LoginCredentials, Page, SenderCredentials};
use crate::protocol::response::{parse_query_response, DiagnosticDecoder};
use crate::session::{self, DefaultDiagnosticDecoder, Session};
use crate::types::Record;
use chrono::NaiveDateTime;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Retry policy for transient vendor errors
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts before giving up
    pub max_tries: u32,
    /// Delay before the first retry; doubles per attempt
    pub initial_backoff: Duration,
    /// Backoff ceiling
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_tries: 8,
            initial_backoff: Duration::from_secs(3),
            max_backoff: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Backoff delay for a given zero-based attempt
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        std::cmp::min(self.initial_backoff.saturating_mul(factor), self.max_backoff)
    }
}

/// Client for the vendor XML gateway, bound to an established session
pub struct IntacctClient {
    transport: Arc<dyn Transport>,
    diagnostics: Arc<dyn DiagnosticDecoder>,
    sender: SenderCredentials,
    session: Session,
    page_size: u64,
    retry: RetryPolicy,
}

impl IntacctClient {
    /// Log in and return a client bound to the resulting session
    pub async fn connect(config: &ConnectorConfig) -> Result<Self> {
        let transport = Arc::new(XmlTransport::with_config(
            &TransportConfig::from_connector_config(config),
        ));
        Self::connect_with_transport(transport, config).await
    }

    /// Log in over a caller-supplied transport
    pub async fn connect_with_transport(
        transport: Arc<dyn Transport>,
        config: &ConnectorConfig,
    ) -> Result<Self> {
        let sender = SenderCredentials {
            sender_id: config.sender_id.clone(),
            sender_password: config.sender_password.clone(),
        };
        let login = LoginCredentials {
            user_id: config.user_id.clone(),
            company_id: config.company_id.clone(),
            user_password: config.user_password.clone(),
        };

        let session =
            session::establish(transport.as_ref(), &config.api_url, &sender, &login).await?;

        Ok(Self {
            transport,
            diagnostics: Arc::new(DefaultDiagnosticDecoder),
            sender,
            session,
            page_size: config.page_size(),
            retry: RetryPolicy::default(),
        })
    }

    /// Override the retry policy
    #[must_use]
    pub fn with_retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// The established session
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Records requested per page
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Build the request body for one page of a stream.
    ///
    /// Fails fast for the reserved audit stream, before anything exists to
    /// send.
    pub fn build_page_request(
        &self,
        stream: &StreamDescriptor,
        watermark: NaiveDateTime,
        page: Page,
    ) -> Result<String> {
        request::build_query_request(
            stream,
            watermark,
            page,
            &self.session.session_id,
            &self.sender,
        )
    }

    /// Parse a raw response into normalized records
    pub fn parse_page_response(
        &self,
        stream: &StreamDescriptor,
        raw: &RawResponse,
    ) -> Result<Vec<Record>> {
        let mut records = parse_query_response(
            raw.status,
            &raw.body,
            &stream.object,
            self.diagnostics.as_ref(),
        )?;

        let datetime_fields = stream.datetime_fields();
        for record in &mut records {
            datetime::normalize_record(record, &datetime_fields)?;
        }
        Ok(records)
    }

    /// Read one page, retrying transient vendor errors with backoff
    pub async fn read_page(
        &self,
        stream: &StreamDescriptor,
        watermark: NaiveDateTime,
        page: Page,
    ) -> Result<Vec<Record>> {
        let mut attempt = 0;
        loop {
            // Rebuilt per attempt so correlation ids stay fresh
            let body = self.build_page_request(stream, watermark, page)?;
            let outcome = match self.transport.post_xml(&self.session.endpoint, body).await {
                Ok(raw) => self.parse_page_response(stream, &raw),
                Err(err) => Err(err),
            };

            match outcome {
                Ok(records) => return Ok(records),
                Err(err) if err.is_retryable() && attempt + 1 < self.retry.max_tries => {
                    let delay = self.retry.delay(attempt);
                    attempt += 1;
                    warn!(
                        "Transient vendor error on '{}' (attempt {}/{}), retrying in {:?}: {err}",
                        stream.name, attempt, self.retry.max_tries, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Read an entire stream from the watermark, advancing the offset by the
    /// page size until the vendor returns a short page
    pub async fn read_stream(
        &self,
        stream: &StreamDescriptor,
        watermark: NaiveDateTime,
    ) -> Result<Vec<Record>> {
        let mut page = Page::first(self.page_size);
        let mut records = Vec::new();

        loop {
            let batch = self.read_page(stream, watermark, page).await?;
            let count = batch.len() as u64;
            records.extend(batch);

            if count < page.size {
                break;
            }
            page = page.next();
        }

        Ok(records)
    }
}

impl std::fmt::Debug for IntacctClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IntacctClient")
            .field("endpoint", &self.session.endpoint)
            .field("page_size", &self.page_size)
            .finish_non_exhaustive()
    }
}
