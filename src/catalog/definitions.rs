//! Built-in stream definitions
//!
//! Field lists mirror the vendor objects; `RECORDNO` is the primary key and
//! `WHENCREATED`/`WHENMODIFIED` are date-time typed everywhere they appear.

use super::{FieldSpec, StreamDescriptor, AUDIT_HISTORY_STREAM, DEFAULT_REPLICATION_KEY};
use once_cell::sync::Lazy;

fn stream(
    name: &str,
    object: &str,
    replication_key: &str,
    fields: Vec<FieldSpec>,
) -> StreamDescriptor {
    StreamDescriptor {
        name: name.to_string(),
        object: object.to_string(),
        primary_key: vec!["RECORDNO".to_string()],
        replication_key: replication_key.to_string(),
        fields,
    }
}

static STREAMS: Lazy<Vec<StreamDescriptor>> = Lazy::new(|| {
    vec![
        stream(
            "accounts_payable_bills",
            "APBILL",
            DEFAULT_REPLICATION_KEY,
            vec![
                FieldSpec::plain("RECORDNO"),
                FieldSpec::plain("RECORDID"),
                FieldSpec::plain("VENDORID"),
                FieldSpec::plain("VENDORNAME"),
                FieldSpec::plain("STATE"),
                FieldSpec::plain("TOTALENTERED"),
                FieldSpec::plain("TOTALDUE"),
                FieldSpec::plain("CURRENCY"),
                FieldSpec::datetime("WHENDUE"),
                FieldSpec::datetime("WHENCREATED"),
                FieldSpec::datetime("WHENMODIFIED"),
            ],
        ),
        stream(
            "accounts_payable_payments",
            "APPYMT",
            DEFAULT_REPLICATION_KEY,
            vec![
                FieldSpec::plain("RECORDNO"),
                FieldSpec::plain("PAYMENTMETHOD"),
                FieldSpec::plain("VENDORID"),
                FieldSpec::plain("STATE"),
                FieldSpec::plain("TOTALENTERED"),
                FieldSpec::plain("TOTALPAID"),
                FieldSpec::plain("CURRENCY"),
                FieldSpec::datetime("WHENPAID"),
                FieldSpec::datetime("WHENCREATED"),
                FieldSpec::datetime("WHENMODIFIED"),
            ],
        ),
        stream(
            "accounts_receivable_invoices",
            "ARINVOICE",
            DEFAULT_REPLICATION_KEY,
            vec![
                FieldSpec::plain("RECORDNO"),
                FieldSpec::plain("RECORDID"),
                FieldSpec::plain("CUSTOMERID"),
                FieldSpec::plain("CUSTOMERNAME"),
                FieldSpec::plain("STATE"),
                FieldSpec::plain("TOTALENTERED"),
                FieldSpec::plain("TOTALDUE"),
                FieldSpec::plain("CURRENCY"),
                FieldSpec::datetime("WHENDUE"),
                FieldSpec::datetime("WHENCREATED"),
                FieldSpec::datetime("WHENMODIFIED"),
            ],
        ),
        stream(
            "accounts_receivable_payments",
            "ARPYMT",
            DEFAULT_REPLICATION_KEY,
            vec![
                FieldSpec::plain("RECORDNO"),
                FieldSpec::plain("PAYMENTMETHOD"),
                FieldSpec::plain("CUSTOMERID"),
                FieldSpec::plain("STATE"),
                FieldSpec::plain("TOTALENTERED"),
                FieldSpec::plain("TOTALPAID"),
                FieldSpec::plain("CURRENCY"),
                FieldSpec::datetime("WHENPAID"),
                FieldSpec::datetime("WHENCREATED"),
                FieldSpec::datetime("WHENMODIFIED"),
            ],
        ),
        stream(
            "general_ledger_accounts",
            "GLACCOUNT",
            DEFAULT_REPLICATION_KEY,
            vec![
                FieldSpec::plain("RECORDNO"),
                FieldSpec::plain("ACCOUNTNO"),
                FieldSpec::plain("TITLE"),
                FieldSpec::plain("ACCOUNTTYPE"),
                FieldSpec::plain("NORMALBALANCE"),
                FieldSpec::plain("CLOSINGTYPE"),
                FieldSpec::plain("STATUS"),
                FieldSpec::datetime("WHENCREATED"),
                FieldSpec::datetime("WHENMODIFIED"),
            ],
        ),
        stream(
            "general_ledger_journal_entries",
            "GLBATCH",
            DEFAULT_REPLICATION_KEY,
            vec![
                FieldSpec::plain("RECORDNO"),
                FieldSpec::plain("BATCHNO"),
                FieldSpec::plain("JOURNAL"),
                FieldSpec::plain("DESCRIPTION"),
                FieldSpec::plain("STATE"),
                FieldSpec::datetime("BATCH_DATE"),
                FieldSpec::datetime("WHENCREATED"),
                FieldSpec::datetime("WHENMODIFIED"),
            ],
        ),
        stream(
            "general_ledger_journal_entry_lines",
            "GLENTRY",
            DEFAULT_REPLICATION_KEY,
            vec![
                FieldSpec::plain("RECORDNO"),
                FieldSpec::plain("BATCHNO"),
                FieldSpec::plain("ACCOUNTNO"),
                FieldSpec::plain("TR_TYPE"),
                FieldSpec::plain("AMOUNT"),
                FieldSpec::plain("DEPARTMENT"),
                FieldSpec::plain("LOCATION"),
                FieldSpec::datetime("ENTRY_DATE"),
                FieldSpec::datetime("WHENCREATED"),
                FieldSpec::datetime("WHENMODIFIED"),
            ],
        ),
        stream(
            "vendors",
            "VENDOR",
            DEFAULT_REPLICATION_KEY,
            vec![
                FieldSpec::plain("RECORDNO"),
                FieldSpec::plain("VENDORID"),
                FieldSpec::plain("NAME"),
                FieldSpec::plain("STATUS"),
                FieldSpec::plain("VENDTYPE"),
                FieldSpec::datetime("WHENCREATED"),
                FieldSpec::datetime("WHENMODIFIED"),
            ],
        ),
        stream(
            "customers",
            "CUSTOMER",
            DEFAULT_REPLICATION_KEY,
            vec![
                FieldSpec::plain("RECORDNO"),
                FieldSpec::plain("CUSTOMERID"),
                FieldSpec::plain("NAME"),
                FieldSpec::plain("STATUS"),
                FieldSpec::plain("CUSTTYPE"),
                FieldSpec::datetime("WHENCREATED"),
                FieldSpec::datetime("WHENMODIFIED"),
            ],
        ),
        stream(
            "projects",
            "PROJECT",
            DEFAULT_REPLICATION_KEY,
            vec![
                FieldSpec::plain("RECORDNO"),
                FieldSpec::plain("PROJECTID"),
                FieldSpec::plain("NAME"),
                FieldSpec::plain("STATUS"),
                FieldSpec::plain("PROJECTCATEGORY"),
                FieldSpec::datetime("BEGINDATE"),
                FieldSpec::datetime("ENDDATE"),
                FieldSpec::datetime("WHENCREATED"),
                FieldSpec::datetime("WHENMODIFIED"),
            ],
        ),
        // Reserved: needs a different request shape (see protocol::request)
        stream(
            AUDIT_HISTORY_STREAM,
            "AUDITHISTORY",
            "ACCESSTIME",
            vec![
                FieldSpec::plain("ID"),
                FieldSpec::plain("RECORDTYPE"),
                FieldSpec::plain("USERID"),
                FieldSpec::plain("ACTION"),
                FieldSpec::datetime("ACCESSTIME"),
            ],
        ),
    ]
});

/// Built-in stream descriptors, audit stream included
pub fn builtin_streams() -> &'static [StreamDescriptor] {
    &STREAMS
}
