//! Vendor request envelope builder
//!
//! Builds the nested XML request body for a logical query (or a session
//! login). Field names and nesting must be reproduced bit-for-bit for the
//! vendor gateway to accept the request.
//!
//! The builder performs no I/O. The outer `controlid` is the wall-clock
//! timestamp the vendor uses for request correlation; the inner function
//! `controlid` is a fresh UUID with a per-function correlation purpose.

use super::datetime;
use super::xml::XmlBuilder;
use crate::catalog::StreamDescriptor;
use crate::error::{Error, Result};
use chrono::{NaiveDateTime, Utc};
use uuid::Uuid;

/// Records requested per query page
pub const DEFAULT_PAGE_SIZE: u64 = 1000;

/// Web-services sender credentials carried in the envelope control block
#[derive(Debug, Clone)]
pub struct SenderCredentials {
    pub sender_id: String,
    pub sender_password: String,
}

/// Login credentials for session establishment
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    pub user_id: String,
    pub company_id: String,
    pub user_password: String,
}

/// One page of a query. Offsets advance by `size` until the vendor returns a
/// short page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    /// Zero-based record offset
    pub offset: u64,
    /// Records per page
    pub size: u64,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            offset: 0,
            size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Page {
    /// First page with the given size
    pub fn first(size: u64) -> Self {
        Self { offset: 0, size }
    }

    /// The page following this one
    pub fn next(&self) -> Self {
        Self {
            offset: self.offset + self.size,
            size: self.size,
        }
    }
}

/// Build the XML request body for one page of an incremental query.
///
/// `select.field` exactly matches the stream's declared schema fields in
/// declared order; the filter expresses "replication key >= watermark" and
/// the ordering is ascending by the replication key, so a resumed extraction
/// sees monotonically non-decreasing replication-key values.
///
/// The reserved audit stream is rejected here, before any request exists to
/// send.
pub fn build_query_request(
    stream: &StreamDescriptor,
    watermark: NaiveDateTime,
    page: Page,
    session_id: &str,
    sender: &SenderCredentials,
) -> Result<String> {
    if !stream.is_supported() {
        return Err(Error::unsupported_stream(&stream.name));
    }

    let mut b = XmlBuilder::new()?;
    b.open("request")?;
    write_control(&mut b, sender)?;
    b.open("operation")?;
    b.open("authentication")?
        .leaf("sessionid", session_id)?
        .close("authentication")?;
    b.open("content")?;
    b.open_with_attr("function", "controlid", &Uuid::new_v4().to_string())?;
    write_query(&mut b, stream, watermark, page)?;
    b.close("function")?
        .close("content")?
        .close("operation")?
        .close("request")?;
    b.finish()
}

/// Build the XML request body that establishes an API session
pub fn build_login_request(
    sender: &SenderCredentials,
    login: &LoginCredentials,
) -> Result<String> {
    let mut b = XmlBuilder::new()?;
    b.open("request")?;
    write_control(&mut b, sender)?;
    b.open("operation")?;
    b.open("authentication")?
        .open("login")?
        .leaf("userid", &login.user_id)?
        .leaf("companyid", &login.company_id)?
        .leaf("password", &login.user_password)?
        .close("login")?
        .close("authentication")?;
    b.open("content")?;
    b.open_with_attr("function", "controlid", &Uuid::new_v4().to_string())?;
    b.empty("getAPISession")?;
    b.close("function")?
        .close("content")?
        .close("operation")?
        .close("request")?;
    b.finish()
}

fn write_control(b: &mut XmlBuilder, sender: &SenderCredentials) -> Result<()> {
    let control_id = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();
    b.open("control")?
        .leaf("senderid", &sender.sender_id)?
        .leaf("password", &sender.sender_password)?
        .leaf("controlid", &control_id)?
        .leaf("uniqueid", "false")?
        .leaf("dtdversion", "3.0")?
        .leaf("includewhitespace", "false")?
        .close("control")?;
    Ok(())
}

fn write_query(
    b: &mut XmlBuilder,
    stream: &StreamDescriptor,
    watermark: NaiveDateTime,
    page: Page,
) -> Result<()> {
    b.open("query")?;
    b.leaf("object", &stream.object)?;

    b.open("select")?;
    for field in stream.field_names() {
        b.leaf("field", field)?;
    }
    b.close("select")?;

    b.open("options")?
        .leaf("showprivate", "true")?
        .close("options")?;

    b.open("filter")?
        .open("greaterthanorequalto")?
        .leaf("field", &stream.replication_key)?
        .leaf("value", &datetime::format_watermark(watermark))?
        .close("greaterthanorequalto")?
        .close("filter")?;

    b.leaf("pagesize", &page.size.to_string())?;
    b.leaf("offset", &page.offset.to_string())?;

    b.open("orderby")?
        .open("order")?
        .leaf("field", &stream.replication_key)?
        .empty("ascending")?
        .close("order")?
        .close("orderby")?;

    b.close("query")?;
    Ok(())
}
