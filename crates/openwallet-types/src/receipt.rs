//! Receipt and reference number generation.
//!
//! Receipt numbers encode the transaction kind in a fixed prefix followed
//! by a nanosecond UNIX timestamp, so they sort by completion time and the
//! kind is recoverable from the first four digits.

use chrono::Utc;
use uuid::Uuid;

use crate::transaction::TransactionKind;

fn kind_prefix(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::TopUp => "1000",
        TransactionKind::Payment => "2000",
        TransactionKind::Distribution => "3000",
    }
}

/// Generate a receipt number for a completed transaction:
/// kind prefix + nanosecond timestamp.
#[must_use]
pub fn receipt_number(kind: TransactionKind) -> String {
    let nanos = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    format!("{}{nanos}", kind_prefix(kind))
}

/// Generate an internal reference number for an ingress request.
///
/// UUIDv7, so references sort by admission time.
#[must_use]
pub fn reference_number() -> String {
    Uuid::now_v7().to_string()
}
