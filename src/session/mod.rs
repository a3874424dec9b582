//! Session establishment and diagnostic decoding
//!
//! # Overview
//!
//! The vendor accepts queries only against a previously established API
//! session. `establish` sends a `getAPISession` function through the same
//! envelope machinery the query path uses and returns the session id plus
//! the endpoint the vendor wants subsequent requests posted to.
//!
//! This module also provides the default [`DiagnosticDecoder`], which the
//! response parser consults when the outer control block rejects an
//! envelope.

use crate::error::{Error, Result};
use crate::http::Transport;
use crate::protocol::envelope::{ErrorDetail, ErrorMessage};
use crate::protocol::request::{build_login_request, LoginCredentials, SenderCredentials};
use crate::protocol::response::{parse_operation, DiagnosticDecoder};
use crate::types::JsonValue;
use tracing::info;

/// An established API session
#[derive(Debug, Clone)]
pub struct Session {
    /// Opaque session identifier, sent on every query
    pub session_id: String,
    /// Gateway URL the vendor assigned for this session
    pub endpoint: String,
}

/// Log in and return a session usable for queries.
///
/// On success the vendor responds with `result.data.api` carrying the
/// session id and the per-company endpoint; both are required.
pub async fn establish(
    transport: &dyn Transport,
    api_url: &str,
    sender: &SenderCredentials,
    login: &LoginCredentials,
) -> Result<Session> {
    let body = build_login_request(sender, login)?;
    let raw = transport.post_xml(api_url, body).await?;

    let data = parse_operation(raw.status, &raw.body, &DefaultDiagnosticDecoder)?
        .ok_or_else(|| Error::protocol("login response carried no data", JsonValue::Null))?;

    let session_id = data
        .pointer("/api/sessionid")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| Error::protocol("login response carried no session id", data.clone()))?
        .to_string();
    let endpoint = data
        .pointer("/api/endpoint")
        .and_then(JsonValue::as_str)
        .ok_or_else(|| Error::protocol("login response carried no endpoint", data.clone()))?
        .to_string();

    info!("established API session against {endpoint}");
    Ok(Session {
        session_id,
        endpoint,
    })
}

/// Default diagnostic decoder: flattens embedded error details into one
/// operator-readable line
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultDiagnosticDecoder;

impl DiagnosticDecoder for DefaultDiagnosticDecoder {
    fn decode_error_message(&self, payload: &JsonValue) -> String {
        let Ok(message) = serde_json::from_value::<ErrorMessage>(payload.clone()) else {
            return payload.to_string();
        };
        let Some(block) = message.error else {
            return payload.to_string();
        };

        let rendered: Vec<String> = block.details().iter().map(|d| render_detail(d)).collect();
        if rendered.is_empty() {
            payload.to_string()
        } else {
            rendered.join("; ")
        }
    }
}

fn render_detail(detail: &ErrorDetail) -> String {
    let mut parts = Vec::new();
    if let Some(errorno) = &detail.errorno {
        parts.push(format!("errorno={errorno}"));
    }
    if let Some(description) = &detail.description {
        parts.push(format!("description={description}"));
    }
    if let Some(description2) = &detail.description2 {
        parts.push(format!("description2={description2}"));
    }
    if let Some(correction) = &detail.correction {
        parts.push(format!("correction={correction}"));
    }
    if parts.is_empty() {
        "unspecified error".to_string()
    } else {
        parts.join(", ")
    }
}
