//! Identifiers used throughout OpenWallet.
//!
//! Accounts are addressed by the composite (partner, merchant, terminal)
//! identity supplied by the integrating partner — there is no synthetic
//! account id on the wire. Terminal-less selectors address the
//! merchant-level account.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PartnerId
// ---------------------------------------------------------------------------

/// Identifier of the platform integrating with the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartnerId(pub String);

impl PartnerId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for PartnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// MerchantId
// ---------------------------------------------------------------------------

/// Identifier of a merchant grouping member accounts under one partner.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MerchantId(pub String);

impl MerchantId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for MerchantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// TerminalId
// ---------------------------------------------------------------------------

/// Identifier of a member-level wallet terminal. Absent on merchant accounts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TerminalId(pub String);

impl TerminalId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TerminalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// AccountSelector
// ---------------------------------------------------------------------------

/// Composite account identity used by every filtered read and write.
///
/// A selector without a terminal id addresses the merchant-level account;
/// with one, the member (terminal) wallet. The selector is the only
/// mutual-exclusion mechanism on writes: a balance update is committed iff
/// the filter still matches exactly one document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AccountSelector {
    #[serde(rename = "partnerId")]
    pub partner_id: PartnerId,
    #[serde(rename = "merchantId")]
    pub merchant_id: MerchantId,
    #[serde(rename = "terminalId", skip_serializing_if = "Option::is_none")]
    pub terminal_id: Option<TerminalId>,
}

impl AccountSelector {
    /// Selector for a member (terminal) wallet.
    #[must_use]
    pub fn member(
        partner_id: impl Into<String>,
        merchant_id: impl Into<String>,
        terminal_id: impl Into<String>,
    ) -> Self {
        Self {
            partner_id: PartnerId::new(partner_id),
            merchant_id: MerchantId::new(merchant_id),
            terminal_id: Some(TerminalId::new(terminal_id)),
        }
    }

    /// Selector for a merchant-level account (no terminal id).
    #[must_use]
    pub fn merchant(partner_id: impl Into<String>, merchant_id: impl Into<String>) -> Self {
        Self {
            partner_id: PartnerId::new(partner_id),
            merchant_id: MerchantId::new(merchant_id),
            terminal_id: None,
        }
    }

    /// Whether this selector addresses the merchant-level account.
    #[must_use]
    pub fn is_merchant(&self) -> bool {
        self.terminal_id.is_none()
    }
}

impl fmt::Display for AccountSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.terminal_id {
            Some(t) => write!(f, "{}/{}/{}", self.partner_id, self.merchant_id, t),
            None => write!(f, "{}/{}", self.partner_id, self.merchant_id),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
