use super::datetime::{self, format_watermark, parse_vendor_datetime};
use super::envelope::{ErrorBlock, ResponseDocument};
use super::request::{
    build_login_request, build_query_request, LoginCredentials, Page, SenderCredentials,
    DEFAULT_PAGE_SIZE,
};
use super::response::{parse_operation, parse_query_response, DiagnosticDecoder};
use super::xml::document_to_value;
use crate::catalog;
use crate::error::Error;
use crate::types::{JsonObject, JsonValue};
use chrono::NaiveDate;
use pretty_assertions::assert_eq;
use serde_json::json;
use test_case::test_case;

struct StubDecoder;

impl DiagnosticDecoder for StubDecoder {
    fn decode_error_message(&self, payload: &JsonValue) -> String {
        format!("decoded: {payload}")
    }
}

fn sender() -> SenderCredentials {
    SenderCredentials {
        sender_id: "sender".to_string(),
        sender_password: "sender-pass".to_string(),
    }
}

fn watermark() -> chrono::NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 15)
        .unwrap()
        .and_hms_opt(13, 45, 0)
        .unwrap()
}

// ============================================================================
// Request builder
// ============================================================================

#[test]
fn built_request_round_trips_schema_field_order() {
    let stream = catalog::find_stream("general_ledger_accounts").unwrap();
    let body = build_query_request(stream, watermark(), Page::default(), "sess-1", &sender())
        .unwrap();

    let tree = document_to_value(&body).unwrap();
    let query = tree
        .pointer("/request/operation/content/function/query")
        .unwrap();

    assert_eq!(query["object"], json!("GLACCOUNT"));

    let fields: Vec<&str> = query["select"]["field"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(fields, stream.field_names());
}

#[test]
fn built_request_filter_and_order_use_replication_key() {
    let stream = catalog::find_stream("vendors").unwrap();
    let body = build_query_request(stream, watermark(), Page::default(), "sess-1", &sender())
        .unwrap();

    let tree = document_to_value(&body).unwrap();
    let query = tree
        .pointer("/request/operation/content/function/query")
        .unwrap();

    let filter = &query["filter"]["greaterthanorequalto"];
    assert_eq!(filter["field"], json!("WHENMODIFIED"));
    assert_eq!(filter["value"], json!("01/15/2024 13:45:00"));

    let order = &query["orderby"]["order"];
    assert_eq!(order["field"], json!("WHENMODIFIED"));
    // xmltodict-style: an empty element decodes to null
    assert_eq!(order["ascending"], JsonValue::Null);

    assert_eq!(query["options"]["showprivate"], json!("true"));
    assert_eq!(query["pagesize"], json!("1000"));
    assert_eq!(query["offset"], json!("0"));
}

#[test]
fn built_request_control_block() {
    let stream = catalog::find_stream("customers").unwrap();
    let body = build_query_request(stream, watermark(), Page::default(), "sess-9", &sender())
        .unwrap();

    let tree = document_to_value(&body).unwrap();
    let control = tree.pointer("/request/control").unwrap();
    assert_eq!(control["senderid"], json!("sender"));
    assert_eq!(control["password"], json!("sender-pass"));
    assert_eq!(control["uniqueid"], json!("false"));
    assert_eq!(control["dtdversion"], json!("3.0"));
    assert_eq!(control["includewhitespace"], json!("false"));
    assert!(control["controlid"].is_string());

    let auth = tree.pointer("/request/operation/authentication").unwrap();
    assert_eq!(auth["sessionid"], json!("sess-9"));
}

#[test]
fn page_offset_is_serialized() {
    let stream = catalog::find_stream("projects").unwrap();
    let page = Page::first(500).next().next();
    assert_eq!(page.offset, 1000);

    let body = build_query_request(stream, watermark(), page, "sess-1", &sender()).unwrap();
    let tree = document_to_value(&body).unwrap();
    let query = tree
        .pointer("/request/operation/content/function/query")
        .unwrap();
    assert_eq!(query["pagesize"], json!("500"));
    assert_eq!(query["offset"], json!("1000"));
}

#[test]
fn audit_stream_is_rejected_before_any_request_exists() {
    let stream = catalog::find_stream(catalog::AUDIT_HISTORY_STREAM).unwrap();
    let err = build_query_request(stream, watermark(), Page::default(), "sess-1", &sender())
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedStream { stream } if stream == "audit_history"));
}

#[test]
fn login_request_shape() {
    let login = LoginCredentials {
        user_id: "svc".to_string(),
        company_id: "acme".to_string(),
        user_password: "pw".to_string(),
    };
    let body = build_login_request(&sender(), &login).unwrap();

    let tree = document_to_value(&body).unwrap();
    let auth = tree.pointer("/request/operation/authentication/login").unwrap();
    assert_eq!(auth["userid"], json!("svc"));
    assert_eq!(auth["companyid"], json!("acme"));
    assert_eq!(auth["password"], json!("pw"));

    let function = tree.pointer("/request/operation/content/function").unwrap();
    assert_eq!(function["getAPISession"], JsonValue::Null);
}

#[test]
fn request_escapes_credential_text() {
    let creds = SenderCredentials {
        sender_id: "s<&>".to_string(),
        sender_password: "p\"'".to_string(),
    };
    let stream = catalog::find_stream("vendors").unwrap();
    let body = build_query_request(stream, watermark(), Page::default(), "sess", &creds).unwrap();

    // The raw body must not contain an unescaped ampersand or angle bracket
    assert!(body.contains("s&lt;&amp;&gt;"));

    let tree = document_to_value(&body).unwrap();
    assert_eq!(
        tree.pointer("/request/control/senderid").unwrap(),
        &json!("s<&>")
    );
}

#[test]
fn default_page_matches_vendor_page_size() {
    let page = Page::default();
    assert_eq!(page.size, DEFAULT_PAGE_SIZE);
    assert_eq!(page.offset, 0);
}

// ============================================================================
// Watermark formatting
// ============================================================================

#[test]
fn watermark_round_trips_to_the_second() {
    let original = watermark();
    let formatted = format_watermark(original);
    assert_eq!(formatted, "01/15/2024 13:45:00");
    assert_eq!(parse_vendor_datetime(&formatted).unwrap(), original);
}

// ============================================================================
// Date normalizer
// ============================================================================

#[test]
fn parse_full_vendor_datetime() {
    let parsed = parse_vendor_datetime("01/15/2024 13:45:00").unwrap();
    assert_eq!(datetime::format_canonical(parsed), "2024-01-15T13:45:00");
}

#[test]
fn parse_date_only_falls_back_to_midnight() {
    let parsed = parse_vendor_datetime("01/15/2024").unwrap();
    assert_eq!(datetime::format_canonical(parsed), "2024-01-15T00:00:00");
}

#[test]
fn parse_invalid_date_names_the_offender() {
    let err = parse_vendor_datetime("not-a-date").unwrap_err();
    assert!(matches!(err, Error::InvalidDateFormat { value } if value == "not-a-date"));
}

#[test]
fn normalize_record_transforms_declared_fields_only() {
    let mut record: JsonObject = serde_json::from_value(json!({
        "RECORDNO": "7",
        "NAME": "01/15/2024",
        "WHENCREATED": "01/10/2024",
        "WHENMODIFIED": "01/15/2024 13:45:00"
    }))
    .unwrap();

    datetime::normalize_record(&mut record, &["WHENCREATED", "WHENMODIFIED"]).unwrap();

    assert_eq!(record["WHENCREATED"], json!("2024-01-10T00:00:00"));
    assert_eq!(record["WHENMODIFIED"], json!("2024-01-15T13:45:00"));
    // Not declared as datetime, so untouched even though it looks like a date
    assert_eq!(record["NAME"], json!("01/15/2024"));
}

#[test]
fn normalize_record_passes_nulls_through() {
    let mut record: JsonObject = serde_json::from_value(json!({
        "WHENCREATED": null,
        "WHENMODIFIED": "01/15/2024"
    }))
    .unwrap();

    datetime::normalize_record(&mut record, &["WHENCREATED", "WHENMODIFIED"]).unwrap();
    assert_eq!(record["WHENCREATED"], JsonValue::Null);
    assert_eq!(record["WHENMODIFIED"], json!("2024-01-15T00:00:00"));
}

#[test]
fn normalize_record_is_all_or_nothing() {
    let mut record: JsonObject = serde_json::from_value(json!({
        "WHENCREATED": "01/10/2024",
        "WHENMODIFIED": "garbage"
    }))
    .unwrap();

    let err = datetime::normalize_record(&mut record, &["WHENCREATED", "WHENMODIFIED"])
        .unwrap_err();
    assert!(matches!(err, Error::InvalidDateFormat { .. }));
    // First field must not have been rewritten
    assert_eq!(record["WHENCREATED"], json!("01/10/2024"));
}

// ============================================================================
// XML document model
// ============================================================================

#[test]
fn repeated_siblings_collapse_to_arrays() {
    let tree = document_to_value("<r><x>1</x><x>2</x><y>3</y></r>").unwrap();
    assert_eq!(tree, json!({"r": {"x": ["1", "2"], "y": "3"}}));
}

#[test]
fn empty_elements_become_null() {
    let tree = document_to_value("<r><a/><b></b></r>").unwrap();
    assert_eq!(tree, json!({"r": {"a": null, "b": null}}));
}

#[test]
fn text_entities_are_unescaped() {
    let tree = document_to_value("<r><v>a &amp; b &lt;c&gt;</v></r>").unwrap();
    assert_eq!(tree, json!({"r": {"v": "a & b <c>"}}));
}

#[test]
fn non_xml_body_is_an_error() {
    assert!(document_to_value("{\"not\": \"xml\"}").is_err());
    assert!(document_to_value("").is_err());
}

// ============================================================================
// Envelope views
// ============================================================================

#[test]
fn error_block_single_and_many() {
    let single: ErrorBlock = serde_json::from_value(json!({
        "errorno": "XL03000003",
        "description2": "boom",
        "correction": "fix it"
    }))
    .unwrap();
    assert_eq!(single.errorno(), "XL03000003");
    assert_eq!(single.description2(), "boom");
    assert_eq!(single.details().len(), 1);

    let many: ErrorBlock = serde_json::from_value(json!([
        {"description2": "first"},
        {"description2": "second"}
    ]))
    .unwrap();
    assert_eq!(many.description2(), "first");
    assert_eq!(many.correction(), "");
    assert_eq!(many.details().len(), 2);
}

#[test]
fn response_document_tolerates_missing_blocks() {
    let tree = json!({"response": {"errormessage": {"error": {"errorno": "E"}}}});
    let doc = ResponseDocument::from_tree(&tree).unwrap();
    let response = doc.response.unwrap();
    assert!(response.control.is_none());
    assert!(response.operation.is_none());
    assert_eq!(response.errormessage.unwrap().error.unwrap().errorno(), "E");
}

// ============================================================================
// Response parser: success depths
// ============================================================================

fn success_envelope(data_inner: &str) -> String {
    format!(
        "<response>\
           <control><status>success</status></control>\
           <operation>\
             <authentication><status>success</status></authentication>\
             <result><status>success</status><data>{data_inner}</data></result>\
           </operation>\
         </response>"
    )
}

#[test]
fn parse_success_with_absent_data_yields_empty_list() {
    let body = success_envelope("");
    let records = parse_query_response(200, &body, "GLACCOUNT", &StubDecoder).unwrap();
    assert!(records.is_empty());
}

#[test]
fn parse_success_with_single_record_yields_one() {
    let body = success_envelope("<GLACCOUNT><RECORDNO>1</RECORDNO></GLACCOUNT>");
    let records = parse_query_response(200, &body, "GLACCOUNT", &StubDecoder).unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["RECORDNO"], json!("1"));
}

#[test]
fn parse_success_with_list_yields_all() {
    let body = success_envelope(
        "<GLACCOUNT><RECORDNO>1</RECORDNO></GLACCOUNT>\
         <GLACCOUNT><RECORDNO>2</RECORDNO></GLACCOUNT>\
         <GLACCOUNT><RECORDNO>3</RECORDNO></GLACCOUNT>",
    );
    let records = parse_query_response(200, &body, "GLACCOUNT", &StubDecoder).unwrap();
    assert_eq!(records.len(), 3);
    assert_eq!(records[2]["RECORDNO"], json!("3"));
}

#[test]
fn parse_success_with_other_object_yields_empty() {
    let body = success_envelope("<VENDOR><RECORDNO>1</RECORDNO></VENDOR>");
    let records = parse_query_response(200, &body, "GLACCOUNT", &StubDecoder).unwrap();
    assert!(records.is_empty());
}

// ============================================================================
// Response parser: failure branches
// ============================================================================

#[test]
fn control_failure_raises_wrong_parameters_with_decoded_message() {
    let body = "<response>\
                  <control><status>failure</status></control>\
                  <errormessage><error><description2>bad control</description2></error></errormessage>\
                </response>";
    let err = parse_query_response(200, body, "GLACCOUNT", &StubDecoder).unwrap_err();
    match err {
        Error::WrongParameters { message, payload } => {
            assert!(message.starts_with("decoded:"));
            assert!(message.contains("bad control"));
            assert!(payload.to_string().contains("bad control"));
        }
        other => panic!("expected WrongParameters, got {other:?}"),
    }
}

#[test]
fn envelope_auth_failure_is_invalid_token_without_http_status() {
    let body = "<response>\
                  <control><status>success</status></control>\
                  <operation>\
                    <authentication><status>failure</status></authentication>\
                    <errormessage><error><description2>session dead</description2></error></errormessage>\
                  </operation>\
                </response>";
    let err = parse_query_response(200, body, "GLACCOUNT", &StubDecoder).unwrap_err();
    match err {
        Error::InvalidToken { status, payload } => {
            assert_eq!(status, None);
            assert!(payload.to_string().contains("session dead"));
        }
        other => panic!("expected InvalidToken, got {other:?}"),
    }
    assert!(
        matches!(
            parse_query_response(200, body, "GLACCOUNT", &StubDecoder).unwrap_err(),
            e if e.needs_reauthentication()
        )
    );
}

fn result_failure_envelope(error_inner: &str) -> String {
    format!(
        "<response>\
           <control><status>success</status></control>\
           <operation>\
             <authentication><status>success</status></authentication>\
             <result><status>failure</status>\
               <errormessage>{error_inner}</errormessage>\
             </result>\
           </operation>\
         </response>"
    )
}

#[test]
fn result_failure_surfaces_description2() {
    let body = result_failure_envelope(
        "<error><errorno>BL01001973</errorno><description2>Object not allowed</description2></error>",
    );
    let err = parse_query_response(200, &body, "GLACCOUNT", &StubDecoder).unwrap_err();
    match err {
        Error::Protocol { message, .. } => assert_eq!(message, "Object not allowed"),
        other => panic!("expected Protocol, got {other:?}"),
    }
}

#[test]
fn result_failure_with_error_list_uses_first_description2() {
    let body = result_failure_envelope(
        "<error><description2>first failure</description2></error>\
         <error><description2>second failure</description2></error>",
    );
    let err = parse_query_response(200, &body, "GLACCOUNT", &StubDecoder).unwrap_err();
    match err {
        Error::Protocol { message, .. } => assert_eq!(message, "first failure"),
        other => panic!("expected Protocol, got {other:?}"),
    }
}

#[test]
fn result_failure_without_description_still_classifies() {
    let body = result_failure_envelope("");
    let err = parse_query_response(200, &body, "GLACCOUNT", &StubDecoder).unwrap_err();
    match err {
        Error::Protocol { message, .. } => assert_eq!(message, "unclassified error response"),
        other => panic!("expected Protocol, got {other:?}"),
    }
}

// ============================================================================
// Response parser: HTTP status classification
// ============================================================================

fn gateway_error_body(errorno: &str, correction: &str) -> String {
    format!(
        "<response><errormessage><error>\
           <errorno>{errorno}</errorno>\
           <description2>details</description2>\
           <correction>{correction}</correction>\
         </error></errormessage></response>"
    )
}

#[test]
fn http_400_with_gateway_code_is_auth_failure() {
    let body = gateway_error_body("GW-0011", "");
    let err = parse_query_response(400, &body, "GLACCOUNT", &StubDecoder).unwrap_err();
    assert!(matches!(err, Error::AuthFailure { status: 400, .. }));
}

#[test]
fn http_400_without_gateway_code_is_invalid_request() {
    let body = gateway_error_body("XL03000003", "");
    let err = parse_query_response(400, &body, "GLACCOUNT", &StubDecoder).unwrap_err();
    assert!(matches!(err, Error::InvalidRequest { status: 400, .. }));
}

#[test_case(401 => matches Error::InvalidToken { status: Some(401), .. })]
#[test_case(403 => matches Error::NoPrivilege { status: 403, .. })]
#[test_case(404 => matches Error::NotFound { status: 404, .. })]
#[test_case(498 => matches Error::ExpiredToken { status: 498, .. })]
#[test_case(500 => matches Error::InternalServerError { status: 500, .. })]
fn http_status_mapping(status: u16) -> Error {
    let body = gateway_error_body("XL03000003", "");
    parse_query_response(status, &body, "GLACCOUNT", &StubDecoder).unwrap_err()
}

#[test]
fn correction_text_signals_transient_retry() {
    let body = gateway_error_body("XL03000003", "Please Try Again Later");
    let err = parse_query_response(521, &body, "GLACCOUNT", &StubDecoder).unwrap_err();
    assert!(matches!(err, Error::PleaseTryAgainLater { status: 521, .. }));
    assert!(err.is_retryable());
}

#[test]
fn unmatched_status_is_generic_protocol_error() {
    let body = gateway_error_body("XL03000003", "Contact support");
    let err = parse_query_response(521, &body, "GLACCOUNT", &StubDecoder).unwrap_err();
    match err {
        Error::Protocol { payload, .. } => {
            assert!(payload.to_string().contains("XL03000003"));
        }
        other => panic!("expected Protocol, got {other:?}"),
    }
}

// ============================================================================
// Response parser: undecodable bodies
// ============================================================================

#[test_case(502 => matches Error::BadGateway { status: 502, .. })]
#[test_case(503 => matches Error::OfflineService { status: 503, .. })]
#[test_case(429 => matches Error::RateLimit { status: 429, .. })]
#[test_case(200 => matches Error::InvalidXmlResponse { status: 200, .. })]
#[test_case(504 => matches Error::InvalidXmlResponse { status: 504, .. })]
fn undecodable_body_classifies_by_status(status: u16) -> Error {
    parse_query_response(status, "<html>gateway timeout", "GLACCOUNT", &StubDecoder)
        .unwrap_err()
}

#[test]
fn undecodable_error_keeps_raw_body_for_diagnosis() {
    let err =
        parse_query_response(503, "upstream connect error", "GLACCOUNT", &StubDecoder)
            .unwrap_err();
    assert!(err.to_string().contains("upstream connect error"));
}

// ============================================================================
// parse_operation (shared walk)
// ============================================================================

#[test]
fn parse_operation_returns_raw_data_payload() {
    let body = success_envelope("<api><sessionid>abc</sessionid><endpoint>https://x</endpoint></api>");
    let data = parse_operation(200, &body, &StubDecoder).unwrap().unwrap();
    assert_eq!(data["api"]["sessionid"], json!("abc"));
}
