//! Vendor date normalization
//!
//! The vendor formats temporal values as `MM/DD/YYYY HH:MM:SS`, or
//! `MM/DD/YYYY` for date-only fields, and compares watermark filters as
//! strings server-side. Normalization converts both shapes into canonical
//! ISO-8601 timestamps; anything else fails loudly with the offending string.

use crate::error::{Error, Result};
use crate::types::{JsonValue, Record};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Vendor timestamp format, also used for watermark filters
pub const VENDOR_DATETIME_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Vendor date-only format
pub const VENDOR_DATE_FORMAT: &str = "%m/%d/%Y";

/// Canonical timestamp format emitted after normalization
pub const CANONICAL_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a vendor date string, trying the full timestamp format first and
/// falling back to date-only (midnight)
pub fn parse_vendor_datetime(raw: &str) -> Result<NaiveDateTime> {
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, VENDOR_DATETIME_FORMAT) {
        return Ok(parsed);
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(raw, VENDOR_DATE_FORMAT) {
        return Ok(parsed.and_time(NaiveTime::MIN));
    }
    Err(Error::invalid_date(raw))
}

/// Parse a canonical timestamp, accepting `YYYY-MM-DDTHH:MM:SS` or
/// `YYYY-MM-DD` (midnight). Used for config start dates and saved cursors.
pub fn parse_canonical(raw: &str) -> Result<NaiveDateTime> {
    if let Ok(parsed) = NaiveDateTime::parse_from_str(raw, CANONICAL_FORMAT) {
        return Ok(parsed);
    }
    if let Ok(parsed) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(parsed.and_time(NaiveTime::MIN));
    }
    Err(Error::invalid_date(raw))
}

/// Format a timestamp the way the vendor expects watermark filters
pub fn format_watermark(watermark: NaiveDateTime) -> String {
    watermark.format(VENDOR_DATETIME_FORMAT).to_string()
}

/// Format a timestamp in the canonical emitted form
pub fn format_canonical(timestamp: NaiveDateTime) -> String {
    timestamp.format(CANONICAL_FORMAT).to_string()
}

/// Normalize every declared date field of a record in place.
///
/// Null values pass through untouched and non-datetime fields are never
/// looked at. The update is all-or-nothing: values are parsed first and only
/// written back once every present, non-null date field parsed, so a record
/// is never left partially normalized.
pub fn normalize_record(record: &mut Record, datetime_fields: &[&str]) -> Result<()> {
    let mut normalized: Vec<(String, String)> = Vec::new();

    for field in datetime_fields {
        match record.get(*field) {
            None | Some(JsonValue::Null) => {}
            Some(JsonValue::String(raw)) => {
                let parsed = parse_vendor_datetime(raw)?;
                normalized.push(((*field).to_string(), format_canonical(parsed)));
            }
            Some(other) => return Err(Error::invalid_date(other.to_string())),
        }
    }

    for (field, value) in normalized {
        record.insert(field, JsonValue::String(value));
    }

    Ok(())
}
