//! Account model: the balance-bearing entity.
//!
//! Persisted in the `accountBalances` collection. The encrypted balance
//! (`lastBalance`) and its plaintext mirror (`lastBalanceNumeric`) are set
//! together in the same write — no code path may update one without the
//! other.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::cipher::{self, CipherError};
use crate::ids::{AccountSelector, MerchantId, PartnerId, TerminalId};

/// Account type discriminator. Wire numbers are part of the stored format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum AccountType {
    /// Member-level wallet belonging to a merchant.
    Regular = 1,
    /// Merchant-level account grouping member wallets.
    Merchant = 2,
}

impl From<AccountType> for u8 {
    fn from(t: AccountType) -> Self {
        t as Self
    }
}

impl TryFrom<u8> for AccountType {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Regular),
            2 => Ok(Self::Merchant),
            other => Err(format!("unknown account type {other}")),
        }
    }
}

/// One balance-bearing entity, as persisted in `accountBalances`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// Opaque unique id assigned at registration.
    #[serde(rename = "uniqueId")]
    pub unique_id: String,
    /// Per-account symmetric key. Never exposed externally.
    #[serde(rename = "secretKey")]
    pub secret_key: String,
    /// Once false, the ledger rejects all balance mutation.
    pub active: bool,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    /// Ciphertext of the zero-padded decimal balance.
    #[serde(rename = "lastBalance")]
    pub encrypted_balance: String,
    /// Plaintext mirror of the same value, for fast comparisons.
    #[serde(rename = "lastBalanceNumeric")]
    pub numeric_balance: i64,
    #[serde(rename = "partnerId")]
    pub partner_id: PartnerId,
    #[serde(rename = "merchantId")]
    pub merchant_id: MerchantId,
    #[serde(rename = "terminalId", skip_serializing_if = "Option::is_none")]
    pub terminal_id: Option<TerminalId>,
    #[serde(rename = "terminalName", default)]
    pub terminal_name: String,
    /// Epoch millis.
    #[serde(rename = "createdAt")]
    pub created_at: i64,
    /// Epoch millis.
    #[serde(rename = "updatedAt")]
    pub updated_at: i64,
}

impl Account {
    /// Open a new account with a zero balance.
    ///
    /// Registration-flow constructor: generates the secret key and the
    /// ciphertext of the zero balance, activates the account, and stamps
    /// both timestamps.
    ///
    /// # Errors
    /// Returns [`CipherError`] if the zero balance cannot be encrypted.
    pub fn open(
        account_type: AccountType,
        partner_id: impl Into<String>,
        merchant_id: impl Into<String>,
        terminal_id: Option<String>,
        terminal_name: impl Into<String>,
    ) -> Result<Self, CipherError> {
        let secret_key = cipher::generate_secret_key();
        let encrypted_balance = cipher::encrypt_balance(&secret_key, 0)?;
        let now = Utc::now().timestamp_millis();
        Ok(Self {
            unique_id: Uuid::now_v7().to_string(),
            secret_key,
            active: true,
            account_type,
            encrypted_balance,
            numeric_balance: 0,
            partner_id: PartnerId::new(partner_id),
            merchant_id: MerchantId::new(merchant_id),
            terminal_id: terminal_id.map(TerminalId::new),
            terminal_name: terminal_name.into(),
            created_at: now,
            updated_at: now,
        })
    }

    /// The composite identity this account is addressed by.
    #[must_use]
    pub fn selector(&self) -> AccountSelector {
        AccountSelector {
            partner_id: self.partner_id.clone(),
            merchant_id: self.merchant_id.clone(),
            terminal_id: self.terminal_id.clone(),
        }
    }

    /// Whether a selector addresses this account.
    ///
    /// A terminal-less selector matches only the Merchant-typed document
    /// under (partner, merchant); with a terminal id it matches the exact
    /// member wallet.
    #[must_use]
    pub fn matches(&self, selector: &AccountSelector) -> bool {
        if self.partner_id != selector.partner_id || self.merchant_id != selector.merchant_id {
            return false;
        }
        match &selector.terminal_id {
            Some(t) => self.terminal_id.as_ref() == Some(t),
            None => self.account_type == AccountType::Merchant,
        }
    }

    /// Verify the mirror invariant:
    /// `numeric_balance == decrypt(secret_key, encrypted_balance)`.
    ///
    /// # Errors
    /// Returns [`CipherError`] if the stored ciphertext cannot be read —
    /// data corruption, fatal for this account.
    pub fn verify_mirror(&self) -> Result<bool, CipherError> {
        let decrypted = cipher::decrypt_balance(&self.secret_key, &self.encrypted_balance)?;
        Ok(decrypted == self.numeric_balance)
    }
}

/// Account projection safe for external readers.
///
/// Never includes `secretKey` or the ciphertext; only the numeric mirror,
/// surfaced as the current balance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountView {
    #[serde(rename = "uniqueId")]
    pub unique_id: String,
    pub active: bool,
    #[serde(rename = "type")]
    pub account_type: AccountType,
    #[serde(rename = "currentBalance")]
    pub current_balance: i64,
    #[serde(rename = "partnerId")]
    pub partner_id: PartnerId,
    #[serde(rename = "merchantId")]
    pub merchant_id: MerchantId,
    #[serde(rename = "terminalId", skip_serializing_if = "Option::is_none")]
    pub terminal_id: Option<TerminalId>,
    #[serde(rename = "terminalName")]
    pub terminal_name: String,
}

impl From<&Account> for AccountView {
    fn from(account: &Account) -> Self {
        Self {
            unique_id: account.unique_id.clone(),
            active: account.active,
            account_type: account.account_type,
            current_balance: account.numeric_balance,
            partner_id: account.partner_id.clone(),
            merchant_id: account.merchant_id.clone(),
            terminal_id: account.terminal_id.clone(),
            terminal_name: account.terminal_name.clone(),
        }
    }
}
