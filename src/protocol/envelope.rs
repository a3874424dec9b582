//! Typed views over the decoded response envelope
//!
//! The response tree from [`super::xml`] is loosely shaped: blocks may be
//! absent, the embedded `error` element may be a single mapping or a list.
//! These structs make each level's presence and status explicit so the
//! parser never trusts key presence.

use crate::types::JsonValue;
use serde::Deserialize;

/// Status carried by every envelope level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvelopeStatus {
    Success,
    Failure,
}

/// Decoded response document root
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseDocument {
    #[serde(default)]
    pub response: Option<ResponseBody>,
}

/// `<response>` body
#[derive(Debug, Clone, Deserialize)]
pub struct ResponseBody {
    #[serde(default)]
    pub control: Option<ControlBlock>,
    #[serde(default)]
    pub operation: Option<OperationBlock>,
    #[serde(default)]
    pub errormessage: Option<ErrorMessage>,
}

/// `<control>` block
#[derive(Debug, Clone, Deserialize)]
pub struct ControlBlock {
    pub status: EnvelopeStatus,
}

/// `<operation>` block
#[derive(Debug, Clone, Deserialize)]
pub struct OperationBlock {
    #[serde(default)]
    pub authentication: Option<AuthenticationBlock>,
    #[serde(default)]
    pub result: Option<ResultBlock>,
    #[serde(default)]
    pub errormessage: Option<JsonValue>,
}

/// `<authentication>` block inside an operation
#[derive(Debug, Clone, Deserialize)]
pub struct AuthenticationBlock {
    pub status: EnvelopeStatus,
}

/// `<result>` block inside an operation
#[derive(Debug, Clone, Deserialize)]
pub struct ResultBlock {
    pub status: EnvelopeStatus,
    #[serde(default)]
    pub data: Option<JsonValue>,
    #[serde(default)]
    pub errormessage: Option<ErrorMessage>,
}

/// `<errormessage>` wrapper
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorMessage {
    #[serde(default)]
    pub error: Option<ErrorBlock>,
}

/// A single embedded error description
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ErrorDetail {
    pub errorno: Option<String>,
    pub description: Option<String>,
    pub description2: Option<String>,
    pub correction: Option<String>,
}

/// The vendor emits `error` as a single mapping or a list of mappings
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ErrorBlock {
    Many(Vec<ErrorDetail>),
    Single(ErrorDetail),
}

impl ErrorBlock {
    /// First error detail, if any
    pub fn first(&self) -> Option<&ErrorDetail> {
        match self {
            ErrorBlock::Single(detail) => Some(detail),
            ErrorBlock::Many(details) => details.first(),
        }
    }

    /// All error details
    pub fn details(&self) -> Vec<&ErrorDetail> {
        match self {
            ErrorBlock::Single(detail) => vec![detail],
            ErrorBlock::Many(details) => details.iter().collect(),
        }
    }

    /// `errorno` of the first detail, empty string when absent
    pub fn errorno(&self) -> &str {
        self.first()
            .and_then(|d| d.errorno.as_deref())
            .unwrap_or_default()
    }

    /// `description2` of the first detail, empty string when absent
    pub fn description2(&self) -> &str {
        self.first()
            .and_then(|d| d.description2.as_deref())
            .unwrap_or_default()
    }

    /// `correction` of the first detail, empty string when absent
    pub fn correction(&self) -> &str {
        self.first()
            .and_then(|d| d.correction.as_deref())
            .unwrap_or_default()
    }
}

impl ResponseDocument {
    /// Decode the typed view from a response tree. Any shape the views cannot
    /// represent is a decode failure the caller classifies.
    pub fn from_tree(tree: &JsonValue) -> Option<Self> {
        serde_json::from_value(tree.clone()).ok()
    }
}
