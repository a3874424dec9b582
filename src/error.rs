//! Error types for the Intacct connector
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//!
//! The vendor-facing variants form a closed taxonomy: every failed call into
//! the protocol adapter terminates in exactly one of them, carrying the HTTP
//! status (where one exists) and the raw decoded payload so an operator can
//! diagnose without re-running with verbose logging.

use serde_json::Value;
use thiserror::Error;

/// The main error type for the Intacct connector
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Missing required config field: {field}")]
    MissingConfigField { field: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Transport Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("XML error: {message}")]
    Xml { message: String },

    // ============================================================================
    // Vendor Protocol Errors (undecodable response body)
    // ============================================================================
    #[error("Bad gateway. Response status code: {status}, response: {body}")]
    BadGateway { status: u16, body: String },

    #[error("Service offline. Response status code: {status}, response: {body}")]
    OfflineService { status: u16, body: String },

    #[error("Rate limited. Response status code: {status}, response: {body}")]
    RateLimit { status: u16, body: String },

    #[error("Invalid XML response. Response status code: {status}, response: {body}")]
    InvalidXmlResponse { status: u16, body: String },

    // ============================================================================
    // Vendor Protocol Errors (classified from the decoded envelope)
    // ============================================================================
    #[error("Some of the parameters are wrong: {message}")]
    WrongParameters { message: String, payload: Value },

    #[error("Invalid token / incorrect credentials. Response: {payload}")]
    InvalidToken { status: Option<u16>, payload: Value },

    #[error("One or more authentication values are incorrect. Response: {payload}")]
    AuthFailure { status: u16, payload: Value },

    #[error("Invalid request. Response: {payload}")]
    InvalidRequest { status: u16, payload: Value },

    #[error("Forbidden, the user has insufficient privilege. Response: {payload}")]
    NoPrivilege { status: u16, payload: Value },

    #[error("Requested item was not found. Response: {payload}")]
    NotFound { status: u16, payload: Value },

    #[error("Expired token, try to refresh it. Response: {payload}")]
    ExpiredToken { status: u16, payload: Value },

    #[error("Internal server error. Response: {payload}")]
    InternalServerError { status: u16, payload: Value },

    #[error("Vendor asked to retry later. Response: {payload}")]
    PleaseTryAgainLater { status: u16, payload: Value },

    #[error("Vendor error: {message}. Response: {payload}")]
    Protocol { message: String, payload: Value },

    // ============================================================================
    // Adapter Errors
    // ============================================================================
    #[error("Stream '{stream}' requires a request shape this adapter does not build")]
    UnsupportedStream { stream: String },

    #[error("Invalid date format: {value}")]
    InvalidDateFormat { value: String },

    // ============================================================================
    // State Errors
    // ============================================================================
    #[error("State error: {message}")]
    State { message: String },
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a missing field error
    pub fn missing_field(field: impl Into<String>) -> Self {
        Self::MissingConfigField {
            field: field.into(),
        }
    }

    /// Create an XML encode/decode error
    pub fn xml(message: impl Into<String>) -> Self {
        Self::Xml {
            message: message.into(),
        }
    }

    /// Create a state error
    pub fn state(message: impl Into<String>) -> Self {
        Self::State {
            message: message.into(),
        }
    }

    /// Create an unsupported stream error
    pub fn unsupported_stream(stream: impl Into<String>) -> Self {
        Self::UnsupportedStream {
            stream: stream.into(),
        }
    }

    /// Create an invalid date format error naming the offending string
    pub fn invalid_date(value: impl Into<String>) -> Self {
        Self::InvalidDateFormat {
            value: value.into(),
        }
    }

    /// Create a generic vendor protocol error
    pub fn protocol(message: impl Into<String>, payload: Value) -> Self {
        Self::Protocol {
            message: message.into(),
            payload,
        }
    }

    /// Whether the caller should retry the request after a delay.
    ///
    /// Retryable kinds are transient on the vendor side; everything else is
    /// either a caller bug or a session problem and retrying verbatim cannot
    /// succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::BadGateway { .. }
                | Error::OfflineService { .. }
                | Error::RateLimit { .. }
                | Error::PleaseTryAgainLater { .. }
        )
    }

    /// Whether the caller should re-establish the session before retrying.
    ///
    /// Covers all three session-invalidity signals: HTTP 498 (refresh),
    /// HTTP 401 (re-authenticate from scratch), and the in-envelope
    /// authentication failure that arrives with HTTP 200.
    pub fn needs_reauthentication(&self) -> bool {
        matches!(
            self,
            Error::InvalidToken { .. } | Error::AuthFailure { .. } | Error::ExpiredToken { .. }
        )
    }

    /// HTTP status the error was classified from, if any
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::BadGateway { status, .. }
            | Error::OfflineService { status, .. }
            | Error::RateLimit { status, .. }
            | Error::InvalidXmlResponse { status, .. }
            | Error::AuthFailure { status, .. }
            | Error::InvalidRequest { status, .. }
            | Error::NoPrivilege { status, .. }
            | Error::NotFound { status, .. }
            | Error::ExpiredToken { status, .. }
            | Error::InternalServerError { status, .. }
            | Error::PleaseTryAgainLater { status, .. } => Some(*status),
            Error::InvalidToken { status, .. } => *status,
            _ => None,
        }
    }
}

/// Result type alias for the Intacct connector
pub type Result<T> = std::result::Result<T, Error>;
