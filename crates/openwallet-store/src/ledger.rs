//! The Ledger Store contract.
//!
//! Every operation takes the filter or entity it needs as an argument —
//! there is no shared "current entity" state on the store handle, and one
//! handle is safely shared between the processor and all distribution
//! workers.
//!
//! Mutation safety relies entirely on filtered conditional writes: a
//! balance update is committed iff the identity filter still matches a
//! document. There is no lock, lease, or transaction wrapping
//! read-then-write, so a lost-update window exists between reading a
//! balance and writing the new one. That window is the documented baseline
//! contract of this store.

use async_trait::async_trait;

use openwallet_types::{Account, AccountSelector, MerchantId, PartnerId, Result};

/// Filtered read/update operations over the `accountBalances` collection.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Point read by composite identity. `Ok(None)` when no document
    /// matches.
    async fn find_account(&self, selector: &AccountSelector) -> Result<Option<Account>>;

    /// All active Regular member accounts under a merchant, fully
    /// materialized — distribution fan-out never paginates.
    async fn find_members(
        &self,
        partner_id: &PartnerId,
        merchant_id: &MerchantId,
    ) -> Result<Vec<Account>>;

    /// The single balance-write primitive.
    ///
    /// Sets the numeric balance, its ciphertext, and `updatedAt` together
    /// in one write scoped by the identity filter, then returns the
    /// post-write document.
    ///
    /// # Errors
    /// [`WalletError::WriteMatchedNothing`](openwallet_types::WalletError::WriteMatchedNothing)
    /// when the filter matches zero documents (lost race / account moved);
    /// the caller reports `Failed` and does not retry.
    async fn update_balance(
        &self,
        selector: &AccountSelector,
        numeric_balance: i64,
        encrypted_balance: &str,
    ) -> Result<Account>;

    /// Insert a newly opened account document.
    ///
    /// # Errors
    /// [`WalletError::AccountExists`](openwallet_types::WalletError::AccountExists)
    /// when a document with the same identity already exists.
    async fn insert_account(&self, account: Account) -> Result<()>;

    /// Soft-delete: set `active = false`. The processor rejects all further
    /// mutation for the account.
    ///
    /// # Errors
    /// [`WalletError::AccountNotFound`](openwallet_types::WalletError::AccountNotFound)
    /// when no document matches.
    async fn deactivate_account(&self, selector: &AccountSelector) -> Result<()>;
}
