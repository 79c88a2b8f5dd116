//! Error types for the OpenWallet ledger.
//!
//! All errors use the `WL_ERR_` prefix convention for easy grepping in
//! logs. Error codes are grouped by subsystem:
//! - 1xx: Account errors
//! - 2xx: Balance errors
//! - 3xx: Admission errors
//! - 4xx: Cipher errors (defined in [`crate::cipher`])
//! - 5xx: Store errors
//! - 6xx: Publish errors
//! - 9xx: General / internal errors

use thiserror::Error;

use crate::cipher::CipherError;
use crate::ids::AccountSelector;
use crate::transaction::{TransactionStatus, Violation};

/// Central error enum for all ledger operations.
#[derive(Debug, Error)]
pub enum WalletError {
    // =================================================================
    // Account Errors (1xx)
    // =================================================================
    /// No account matches the supplied identity.
    #[error("WL_ERR_100: account not found: {0}")]
    AccountNotFound(AccountSelector),

    /// The account exists but has been deactivated; all mutation rejected.
    #[error("WL_ERR_101: account deactivated: {0}")]
    AccountInactive(AccountSelector),

    /// An account with this identity already exists.
    #[error("WL_ERR_102: account already registered: {0}")]
    AccountExists(AccountSelector),

    // =================================================================
    // Balance Errors (2xx)
    // =================================================================
    /// The debit exceeds the current balance. Ledger left unmodified.
    #[error("WL_ERR_200: insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: i64, available: i64 },

    // =================================================================
    // Admission Errors (3xx)
    // =================================================================
    /// The external reference number has already been recorded.
    #[error("WL_ERR_300: duplicate reference: {0}")]
    DuplicateReference(String),

    /// The request failed kind-specific validation.
    #[error("WL_ERR_301: invalid request: {}", format_violations(.0))]
    InvalidRequest(Vec<Violation>),

    // =================================================================
    // Cipher Errors (4xx — codes live in CipherError)
    // =================================================================
    /// Balance encryption or decryption failed. Aborts the mutation on
    /// write; data corruption for the account on read.
    #[error(transparent)]
    Cipher(#[from] CipherError),

    // =================================================================
    // Store Errors (5xx)
    // =================================================================
    /// The conditional write matched no document (lost race or the account
    /// moved). Not retried automatically.
    #[error("WL_ERR_500: balance write matched no document: {0}")]
    WriteMatchedNothing(AccountSelector),

    /// The store call itself failed.
    #[error("WL_ERR_501: store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// A store call exceeded its per-operation deadline.
    #[error("WL_ERR_502: store deadline exceeded during {operation}")]
    Deadline { operation: &'static str },

    // =================================================================
    // Publish Errors (6xx)
    // =================================================================
    /// A result message could not be delivered. Logged; never unwinds the
    /// balance mutation that already succeeded.
    #[error("WL_ERR_600: publish to {topic} failed: {reason}")]
    PublishFailed { topic: &'static str, reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Serialization / deserialization error.
    #[error("WL_ERR_900: serialization error: {0}")]
    Serialization(String),

    /// Configuration error.
    #[error("WL_ERR_901: configuration error: {0}")]
    Configuration(String),
}

fn format_violations(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl WalletError {
    /// The transaction status communicated downstream for this failure.
    ///
    /// Callers only see the final status code; the internal distinction
    /// between, say, a store timeout and a rejected write is not surfaced.
    #[must_use]
    pub fn status(&self) -> TransactionStatus {
        match self {
            Self::AccountNotFound(_) | Self::AccountInactive(_) | Self::AccountExists(_) => {
                TransactionStatus::InvalidAccount
            }
            Self::InsufficientFunds { .. } => TransactionStatus::InsufficientFunds,
            Self::DuplicateReference(_) | Self::InvalidRequest(_) => {
                TransactionStatus::InvalidParams
            }
            Self::Cipher(_)
            | Self::WriteMatchedNothing(_)
            | Self::StoreUnavailable { .. }
            | Self::Deadline { .. }
            | Self::PublishFailed { .. }
            | Self::Serialization(_)
            | Self::Configuration(_) => TransactionStatus::Failed,
        }
    }
}

impl From<serde_json::Error> for WalletError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, WalletError>;
