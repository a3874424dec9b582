//! Connector configuration
//!
//! Typed configuration deserialized from a JSON or YAML file. Credentials
//! come in as plain strings; validation checks presence and URL
//! well-formedness before any request is attempted.

use crate::error::{Error, Result};
use crate::protocol::datetime;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use crate::protocol::request::DEFAULT_PAGE_SIZE;

/// Complete connector configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectorConfig {
    /// Vendor API gateway URL
    pub api_url: String,

    /// Company to log into
    pub company_id: String,

    /// Web-services sender id
    pub sender_id: String,

    /// Web-services sender password
    pub sender_password: String,

    /// API user id
    pub user_id: String,

    /// API user password
    pub user_password: String,

    /// Optional User-Agent header for outbound requests
    #[serde(default)]
    pub user_agent: Option<String>,

    /// Default watermark for streams with no saved cursor.
    /// Accepts `YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`.
    pub start_date: String,

    /// Records per query page
    #[serde(default)]
    pub page_size: Option<u64>,

    /// Outbound request rate limit (requests per second)
    #[serde(default)]
    pub requests_per_second: Option<u32>,
}

impl ConnectorConfig {
    /// Validate required fields and formats
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("api_url", &self.api_url),
            ("company_id", &self.company_id),
            ("sender_id", &self.sender_id),
            ("sender_password", &self.sender_password),
            ("user_id", &self.user_id),
            ("user_password", &self.user_password),
            ("start_date", &self.start_date),
        ] {
            if value.trim().is_empty() {
                return Err(Error::missing_field(field));
            }
        }

        url::Url::parse(&self.api_url)?;
        datetime::parse_canonical(&self.start_date)?;

        if self.page_size == Some(0) {
            return Err(Error::config("page_size must be greater than zero"));
        }

        Ok(())
    }

    /// The watermark used when a stream has no saved cursor
    pub fn start_watermark(&self) -> Result<NaiveDateTime> {
        datetime::parse_canonical(&self.start_date)
    }

    /// Effective page size
    pub fn page_size(&self) -> u64 {
        self.page_size.unwrap_or(DEFAULT_PAGE_SIZE)
    }
}

/// Load a configuration from a JSON or YAML file, chosen by extension
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<ConnectorConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)?;

    let is_yaml = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"));

    let config = if is_yaml {
        load_config_from_yaml(&contents)?
    } else {
        load_config_from_json(&contents)?
    };

    config.validate()?;
    Ok(config)
}

/// Parse a configuration from a JSON string
pub fn load_config_from_json(json: &str) -> Result<ConnectorConfig> {
    Ok(serde_json::from_str(json)?)
}

/// Parse a configuration from a YAML string
pub fn load_config_from_yaml(yaml: &str) -> Result<ConnectorConfig> {
    Ok(serde_yaml::from_str(yaml)?)
}
