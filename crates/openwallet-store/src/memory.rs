//! In-process ledger store.
//!
//! Keeps the document collection behind an async `RwLock` and applies the
//! same filter semantics as the external document store it stands in for.
//! Used by the test suites and the standalone runner.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use openwallet_types::{
    Account, AccountSelector, AccountType, MerchantId, PartnerId, Result, WalletError,
};

use crate::ledger::LedgerStore;

/// In-memory `accountBalances` collection.
#[derive(Default)]
pub struct MemoryLedger {
    accounts: RwLock<Vec<Account>>,
}

impl MemoryLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the collection, bypassing the duplicate check. Test setup only.
    pub async fn seed(&self, accounts: impl IntoIterator<Item = Account>) {
        self.accounts.write().await.extend(accounts);
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    /// Whether the collection is empty.
    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn find_account(&self, selector: &AccountSelector) -> Result<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts.iter().find(|a| a.matches(selector)).cloned())
    }

    async fn find_members(
        &self,
        partner_id: &PartnerId,
        merchant_id: &MerchantId,
    ) -> Result<Vec<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .iter()
            .filter(|a| {
                a.partner_id == *partner_id
                    && a.merchant_id == *merchant_id
                    && a.account_type == AccountType::Regular
                    && a.active
            })
            .cloned()
            .collect())
    }

    async fn update_balance(
        &self,
        selector: &AccountSelector,
        numeric_balance: i64,
        encrypted_balance: &str,
    ) -> Result<Account> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .iter_mut()
            .find(|a| a.matches(selector))
            .ok_or_else(|| WalletError::WriteMatchedNothing(selector.clone()))?;

        // Both balance fields move in the same write, with the timestamp.
        account.numeric_balance = numeric_balance;
        account.encrypted_balance = encrypted_balance.to_string();
        account.updated_at = Utc::now().timestamp_millis();
        Ok(account.clone())
    }

    async fn insert_account(&self, account: Account) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let selector = account.selector();
        if accounts.iter().any(|a| a.matches(&selector)) {
            return Err(WalletError::AccountExists(selector));
        }
        accounts.push(account);
        Ok(())
    }

    async fn deactivate_account(&self, selector: &AccountSelector) -> Result<()> {
        let mut accounts = self.accounts.write().await;
        let account = accounts
            .iter_mut()
            .find(|a| a.matches(selector))
            .ok_or_else(|| WalletError::AccountNotFound(selector.clone()))?;
        account.active = false;
        account.updated_at = Utc::now().timestamp_millis();
        Ok(())
    }
}
