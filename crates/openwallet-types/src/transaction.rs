//! Transaction request/result messages.
//!
//! One `Transaction` value describes one ledger mutation. It is created by
//! request ingress, consumed exactly once by the processor, and becomes
//! terminal when the result copy is emitted — never updated in place.
//! Payloads travel JSON-encoded; field names and the numeric/status wire
//! codes are part of the message contract.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ids::{AccountSelector, MerchantId, PartnerId, TerminalId};

// ---------------------------------------------------------------------------
// TransactionKind
// ---------------------------------------------------------------------------

/// Transaction kind. Wire numbers: 1 = TopUp, 2 = Payment, 3 = Distribution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum TransactionKind {
    /// Credit increasing a balance.
    TopUp = 1,
    /// Debit decreasing a balance (deduct).
    Payment = 2,
    /// Merchant-initiated credit fanned out to every active member.
    Distribution = 3,
}

impl From<TransactionKind> for u8 {
    fn from(k: TransactionKind) -> Self {
        k as Self
    }
}

impl TryFrom<u8> for TransactionKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::TopUp),
            2 => Ok(Self::Payment),
            3 => Ok(Self::Distribution),
            other => Err(format!("unknown transaction kind {other}")),
        }
    }
}

impl fmt::Display for TransactionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::TopUp => "topup",
            Self::Payment => "payment",
            Self::Distribution => "distribution",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// TransactionStatus
// ---------------------------------------------------------------------------

/// Two-digit transaction status codes, as seen by downstream callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionStatus {
    #[serde(rename = "00")]
    Success,
    #[serde(rename = "01")]
    Pending,
    #[serde(rename = "02")]
    PartialSuccess,
    #[serde(rename = "03")]
    InvalidParams,
    /// Account not found or inactive. Terminal, non-retryable.
    #[serde(rename = "04")]
    InvalidAccount,
    /// Write matched no document or the store call errored. Not auto-retried.
    #[serde(rename = "05")]
    Failed,
    /// Debit exceeds current balance. Requires caller correction.
    #[serde(rename = "06")]
    InsufficientFunds,
    #[serde(rename = "07")]
    CallbackFailed,
}

impl TransactionStatus {
    /// The wire code for this status.
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::Success => "00",
            Self::Pending => "01",
            Self::PartialSuccess => "02",
            Self::InvalidParams => "03",
            Self::InvalidAccount => "04",
            Self::Failed => "05",
            Self::InsufficientFunds => "06",
            Self::CallbackFailed => "07",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ---------------------------------------------------------------------------
// Transaction
// ---------------------------------------------------------------------------

/// One line item of a transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionItem {
    pub name: String,
    /// Unit amount in minor currency units.
    pub amount: i64,
    pub qty: u32,
}

/// A transaction request or result message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    /// Internal reference, assigned at ingress.
    #[serde(rename = "referenceNo")]
    pub reference_no: String,
    /// External partner-supplied reference, used for duplicate detection.
    #[serde(rename = "partnerRefNumber")]
    pub partner_ref_number: String,
    #[serde(rename = "partnerTransDate", default)]
    pub partner_trans_date: String,
    #[serde(rename = "partnerId")]
    pub partner_id: PartnerId,
    #[serde(rename = "merchantId")]
    pub merchant_id: MerchantId,
    #[serde(rename = "terminalId", skip_serializing_if = "Option::is_none")]
    pub terminal_id: Option<TerminalId>,
    #[serde(rename = "terminalName", default)]
    pub terminal_name: String,
    #[serde(rename = "transType")]
    pub kind: TransactionKind,
    pub items: Vec<TransactionItem>,
    /// Total in minor units. Derived, not supplied, for Distribution.
    #[serde(rename = "totalAmount")]
    pub total_amount: i64,
    pub status: TransactionStatus,
    /// Assigned on success only.
    #[serde(rename = "receiptNumber", default)]
    pub receipt_number: String,
    /// Post-transaction balance, set on the result copy.
    #[serde(rename = "lastBalance", default)]
    pub last_balance: i64,
    /// YYYYMMDDhhmmss, stamped on completion.
    #[serde(rename = "transDate", default)]
    pub trans_date: String,
    /// Epoch millis, stamped on completion.
    #[serde(rename = "transDateNumeric", default)]
    pub trans_date_numeric: i64,
    #[serde(rename = "createdAt", default)]
    pub created_at: i64,
    #[serde(rename = "updatedAt", default)]
    pub updated_at: i64,
}

impl Transaction {
    /// The account this transaction targets.
    ///
    /// An empty or absent terminal id addresses the merchant-level account.
    #[must_use]
    pub fn selector(&self) -> AccountSelector {
        let terminal_id = self
            .terminal_id
            .as_ref()
            .filter(|t| !t.as_str().is_empty())
            .cloned();
        AccountSelector {
            partner_id: self.partner_id.clone(),
            merchant_id: self.merchant_id.clone(),
            terminal_id,
        }
    }

    /// Per-member credit of a Distribution request (`items[0].amount`).
    #[must_use]
    pub fn per_member_amount(&self) -> i64 {
        self.items.first().map_or(0, |item| item.amount)
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// One validation failure on a request message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub field: String,
    pub message: String,
}

impl Violation {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation contract for inbound request messages.
///
/// Each message kind owns its rules; dispatch is by [`TransactionKind`],
/// never by runtime type inspection. An empty list means the request is
/// admissible.
pub trait Validate {
    fn validate(&self) -> Vec<Violation>;
}

impl Validate for Transaction {
    fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();

        if self.partner_id.is_empty() {
            violations.push(Violation::new("partnerId", "must not be empty"));
        }
        if self.merchant_id.is_empty() {
            violations.push(Violation::new("merchantId", "must not be empty"));
        }
        if self.partner_ref_number.is_empty() {
            violations.push(Violation::new("partnerRefNumber", "must not be empty"));
        }
        if self.items.is_empty() {
            violations.push(Violation::new("items", "at least one item required"));
        }
        for (idx, item) in self.items.iter().enumerate() {
            if item.amount <= 0 {
                violations.push(Violation::new(
                    "items",
                    format!("item {idx}: amount must be positive"),
                ));
            }
            if item.qty == 0 {
                violations.push(Violation::new(
                    "items",
                    format!("item {idx}: qty must be positive"),
                ));
            }
        }

        match self.kind {
            TransactionKind::TopUp | TransactionKind::Payment => {
                if self.total_amount <= 0 {
                    violations.push(Violation::new("totalAmount", "must be positive"));
                }
            }
            TransactionKind::Distribution => {
                // Derived as memberCount x perMemberAmount at processing
                // time; a supplied total is a malformed request.
                if self.total_amount != 0 {
                    violations.push(Violation::new(
                        "totalAmount",
                        "must not be supplied for distribution",
                    ));
                }
                if self.per_member_amount() <= 0 {
                    violations.push(Violation::new(
                        "items",
                        "per-member amount must be positive",
                    ));
                }
            }
        }

        violations
    }
}
