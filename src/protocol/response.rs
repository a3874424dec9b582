//! Vendor response parsing and error classification
//!
//! Given `(http_status, raw_body)` the parser either returns the extracted
//! record collection or produces exactly one classified [`Error`]. The
//! branch order matters and mirrors the vendor gateway's behavior:
//!
//! 1. Undecodable bodies classify by HTTP status (502/503/429) before
//!    falling back to an invalid-XML error.
//! 2. On HTTP 200 the envelope is walked level by level: control status,
//!    authentication status, result status.
//! 3. Everything else falls through to HTTP-status-driven classification,
//!    with a final check for the vendor's transient-retry correction text.

use super::envelope::{EnvelopeStatus, ErrorBlock, ResponseDocument};
use super::xml;
use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use tracing::error;

/// Vendor error code meaning an authentication value is wrong on HTTP 400
const GATEWAY_AUTH_ERROR_CODE: &str = "GW-0011";

/// Correction text the vendor uses to signal a transient condition
const TRY_AGAIN_LATER: &str = "Please Try Again Later";

/// Decodes vendor diagnostic error messages into operator-readable text.
///
/// Supplied by the session collaborator; consumed only in the
/// outer-control-failure branch of the parser.
pub trait DiagnosticDecoder: Send + Sync {
    /// Render the `errormessage` payload of a rejected envelope
    fn decode_error_message(&self, payload: &JsonValue) -> String;
}

/// Walk the response envelope and return `result.data` on full success.
///
/// Session login and record queries share this walk; they differ only in how
/// the returned data payload is interpreted.
pub fn parse_operation(
    http_status: u16,
    body: &str,
    diagnostics: &dyn DiagnosticDecoder,
) -> Result<Option<JsonValue>> {
    let Ok(tree) = xml::document_to_value(body) else {
        return Err(classify_undecodable(http_status, body));
    };

    let Some(doc) = ResponseDocument::from_tree(&tree) else {
        // A 200 that is not the vendor envelope is an invalid response; for
        // other statuses the status itself still classifies
        if http_status == 200 {
            return Err(invalid_xml(http_status, body));
        }
        return Err(classify_envelope_error(
            http_status,
            "",
            "",
            String::new(),
            tree,
        ));
    };
    let response = doc.response.as_ref();

    // description2 from a failed result block, carried into the generic
    // fall-through error below
    let mut failure_description = String::new();

    if http_status == 200 {
        let Some(response) = response else {
            return Err(invalid_xml(http_status, body));
        };
        let Some(control) = response.control.as_ref() else {
            return Err(invalid_xml(http_status, body));
        };

        match control.status {
            EnvelopeStatus::Failure => {
                // The outer envelope itself was rejected
                let payload = tree
                    .pointer("/response/errormessage")
                    .cloned()
                    .unwrap_or(JsonValue::Null);
                let message = diagnostics.decode_error_message(&payload);
                return Err(Error::WrongParameters { message, payload });
            }
            EnvelopeStatus::Success => {
                let Some(operation) = response.operation.as_ref() else {
                    return Err(invalid_xml(http_status, body));
                };
                let Some(authentication) = operation.authentication.as_ref() else {
                    return Err(invalid_xml(http_status, body));
                };

                if authentication.status == EnvelopeStatus::Failure {
                    // Session accepted transport-wise, rejected at the
                    // application layer: distinct from HTTP 401 and 498
                    let payload = operation.errormessage.clone().unwrap_or(JsonValue::Null);
                    return Err(Error::InvalidToken {
                        status: None,
                        payload,
                    });
                }

                if let Some(result) = operation.result.as_ref() {
                    if result.status == EnvelopeStatus::Success {
                        return Ok(result.data.clone());
                    }
                }

                let operation_payload = tree
                    .pointer("/response/operation")
                    .cloned()
                    .unwrap_or(JsonValue::Null);
                error!("Intacct error response: {operation_payload}");

                failure_description = operation
                    .result
                    .as_ref()
                    .and_then(|r| r.errormessage.as_ref())
                    .and_then(|m| m.error.as_ref())
                    .map(|e| e.description2().to_string())
                    .unwrap_or_default();
            }
        }
    }

    let outer_error = response
        .and_then(|r| r.errormessage.as_ref())
        .and_then(|m| m.error.as_ref());
    let errorno = outer_error.map(ErrorBlock::errorno).unwrap_or_default();
    let correction = outer_error.map(ErrorBlock::correction).unwrap_or_default();

    Err(classify_envelope_error(
        http_status,
        errorno,
        correction,
        failure_description,
        tree,
    ))
}

/// Parse one page of a query response into the raw record collection.
///
/// `data.<object>` tolerates all three shapes the vendor produces: absent
/// (empty page), a single record mapping, or a list of record mappings.
pub fn parse_query_response(
    http_status: u16,
    body: &str,
    object: &str,
    diagnostics: &dyn DiagnosticDecoder,
) -> Result<Vec<JsonObject>> {
    let data = parse_operation(http_status, body, diagnostics)?;
    Ok(records_from_data(data, object))
}

/// Normalize the result data payload to a record list: absent -> empty,
/// single mapping -> one element, list -> as-is
fn records_from_data(data: Option<JsonValue>, object: &str) -> Vec<JsonObject> {
    let Some(JsonValue::Object(mut container)) = data else {
        return Vec::new();
    };

    match container.remove(object) {
        None | Some(JsonValue::Null) => Vec::new(),
        Some(JsonValue::Object(record)) => vec![record],
        Some(JsonValue::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                JsonValue::Object(record) => Some(record),
                _ => None,
            })
            .collect(),
        Some(_) => Vec::new(),
    }
}

/// HTTP-status classification for bodies that did not decode as XML
fn classify_undecodable(status: u16, body: &str) -> Error {
    match status {
        502 => Error::BadGateway {
            status,
            body: body.to_string(),
        },
        503 => Error::OfflineService {
            status,
            body: body.to_string(),
        },
        429 => Error::RateLimit {
            status,
            body: body.to_string(),
        },
        _ => invalid_xml(status, body),
    }
}

fn invalid_xml(status: u16, body: &str) -> Error {
    Error::InvalidXmlResponse {
        status,
        body: body.to_string(),
    }
}

/// HTTP-status classification for decoded envelopes that did not succeed
fn classify_envelope_error(
    status: u16,
    errorno: &str,
    correction: &str,
    description: String,
    payload: JsonValue,
) -> Error {
    match status {
        400 if errorno == GATEWAY_AUTH_ERROR_CODE => Error::AuthFailure { status, payload },
        400 => Error::InvalidRequest { status, payload },
        401 => Error::InvalidToken {
            status: Some(status),
            payload,
        },
        403 => Error::NoPrivilege { status, payload },
        404 => Error::NotFound { status, payload },
        498 => Error::ExpiredToken { status, payload },
        500 => Error::InternalServerError { status, payload },
        _ if correction.contains(TRY_AGAIN_LATER) => Error::PleaseTryAgainLater { status, payload },
        _ => {
            let message = if description.is_empty() {
                "unclassified error response".to_string()
            } else {
                description
            };
            Error::Protocol { message, payload }
        }
    }
}
