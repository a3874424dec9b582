//! Stream descriptors and built-in stream definitions
//!
//! # Overview
//!
//! Per-object metadata is declarative: which vendor object a logical stream
//! maps to, which fields exist (and which are date-time typed), the primary
//! key, and the replication key used for incremental bounds. The protocol
//! adapter consumes these descriptors read-only.

mod definitions;

pub use definitions::builtin_streams;

use serde::Serialize;

/// Stream name reserved for audit-trail extraction. It requires a materially
/// different request shape and is rejected before any request is built.
pub const AUDIT_HISTORY_STREAM: &str = "audit_history";

/// Replication key used by every query stream unless overridden
pub const DEFAULT_REPLICATION_KEY: &str = "WHENMODIFIED";

/// A single declared field of a stream schema
#[derive(Debug, Clone, Serialize)]
pub struct FieldSpec {
    /// Vendor field name
    pub name: String,
    /// Whether the vendor returns this field as a date/time string
    pub is_datetime: bool,
}

impl FieldSpec {
    /// Declare a plain field
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_datetime: false,
        }
    }

    /// Declare a date/time field
    pub fn datetime(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_datetime: true,
        }
    }
}

/// Immutable description of one logical stream
#[derive(Debug, Clone, Serialize)]
pub struct StreamDescriptor {
    /// Logical stream name
    pub name: String,
    /// Remote vendor object name
    pub object: String,
    /// Primary key field names
    pub primary_key: Vec<String>,
    /// Field used to order and bound incremental queries
    pub replication_key: String,
    /// Declared schema fields, in declared order
    pub fields: Vec<FieldSpec>,
}

impl StreamDescriptor {
    /// Schema field names in declared order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Names of the fields declared as date/time typed
    pub fn datetime_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.is_datetime)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// Whether the query adapter can build requests for this stream
    pub fn is_supported(&self) -> bool {
        self.name != AUDIT_HISTORY_STREAM
    }
}

/// Look up a built-in stream descriptor by logical name
pub fn find_stream(name: &str) -> Option<&'static StreamDescriptor> {
    builtin_streams().iter().find(|s| s.name == name)
}
