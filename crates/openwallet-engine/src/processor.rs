//! Transaction Processor — the per-message state machine.
//!
//! `Received → {Invalid(unknown/inactive account), InsufficientFunds,
//! Applied} → ResultEmitted`.
//!
//! Every consumed request produces exactly one result message; failures are
//! captured into the transaction's status, not swallowed. Persistence
//! failures are terminal for the message — no automatic retry, that
//! responsibility sits with the broker's redelivery semantics.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use openwallet_store::LedgerStore;
use openwallet_types::{
    cipher, receipt, Account, AccountSelector, EngineConfig, Result, Transaction,
    TransactionKind, TransactionStatus, WalletError,
};

/// Wall-clock format of `transDate` on result messages.
pub(crate) const TRANS_DATE_FORMAT: &str = "%Y%m%d%H%M%S";

/// Run a store call under its per-operation deadline.
///
/// A timeout surfaces as a store-level error and is handled as a
/// processing failure for that unit of work.
pub(crate) async fn with_deadline<T>(
    deadline: Duration,
    operation: &'static str,
    call: impl Future<Output = Result<T>> + Send,
) -> Result<T> {
    tokio::time::timeout(deadline, call)
        .await
        .map_err(|_| WalletError::Deadline { operation })?
}

/// Consumes transaction-request messages, validates account state, computes
/// the new balance, persists it, and produces the result message.
///
/// The store handle is injected at construction and shared; each operation
/// takes the selector it targets as an argument.
pub struct TransactionProcessor<S> {
    store: Arc<S>,
    config: EngineConfig,
}

impl<S: LedgerStore> TransactionProcessor<S> {
    #[must_use]
    pub fn new(store: Arc<S>, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Process one request message to completion.
    ///
    /// Always returns the result copy of the message: on success with
    /// status `00`, a receipt number, and the post-write balance; on any
    /// failure with the corresponding status code and the ledger left
    /// untouched (except a lost write race, which reports `05`).
    pub async fn process(&self, request: Transaction) -> Transaction {
        let mut result = request;
        if let Err(err) = self.apply(&mut result).await {
            result.status = err.status();
            tracing::warn!(
                reference_no = %result.reference_no,
                kind = %result.kind,
                status = %result.status,
                error = %err,
                "transaction rejected",
            );
        }
        result
    }

    async fn apply(&self, trx: &mut Transaction) -> Result<()> {
        // 1-2. Resolve the target account and check it is mutable.
        let selector = trx.selector();
        let account = self.resolve_active(&selector).await?;

        // 3. Distribution totals are derived, never supplied:
        //    memberCount x perMemberAmount over currently active members.
        if trx.kind == TransactionKind::Distribution {
            let members = with_deadline(
                self.config.deadlines.scan,
                "find_members",
                self.store.find_members(&trx.partner_id, &trx.merchant_id),
            )
            .await?;
            trx.total_amount = member_total(members.len(), trx.per_member_amount());
        }

        let delta = match trx.kind {
            TransactionKind::TopUp => trx.total_amount,
            TransactionKind::Payment | TransactionKind::Distribution => -trx.total_amount,
        };

        // 4. Debits must be covered by the current balance.
        if delta < 0 && account.numeric_balance < trx.total_amount {
            return Err(WalletError::InsufficientFunds {
                needed: trx.total_amount,
                available: account.numeric_balance,
            });
        }

        // 5. Encrypt first: a balance is never committed without a valid
        //    ciphertext. Both fields go to the store in one write.
        let new_balance = account.numeric_balance + delta;
        let encrypted = cipher::encrypt_balance(&account.secret_key, new_balance)?;
        let updated = with_deadline(
            self.config.deadlines.write,
            "update_balance",
            self.store.update_balance(&selector, new_balance, &encrypted),
        )
        .await?;

        // 6. Stamp the result copy.
        let now = Utc::now();
        trx.receipt_number = receipt::receipt_number(trx.kind);
        trx.trans_date = now.format(TRANS_DATE_FORMAT).to_string();
        trx.trans_date_numeric = now.timestamp_millis();
        trx.last_balance = updated.numeric_balance;
        trx.status = TransactionStatus::Success;
        if trx.created_at == 0 {
            trx.created_at = now.timestamp_millis();
        }
        trx.updated_at = now.timestamp_millis();
        Ok(())
    }

    /// Resolve an account and reject missing or deactivated ones.
    async fn resolve_active(&self, selector: &AccountSelector) -> Result<Account> {
        let account = with_deadline(
            self.config.deadlines.read,
            "find_account",
            self.store.find_account(selector),
        )
        .await?
        .ok_or_else(|| WalletError::AccountNotFound(selector.clone()))?;

        if !account.active {
            return Err(WalletError::AccountInactive(selector.clone()));
        }
        Ok(account)
    }
}

/// Derived distribution total. Saturates rather than wrapping on the
/// (unrealistic) member-count overflow.
fn member_total(member_count: usize, per_member_amount: i64) -> i64 {
    i64::try_from(member_count)
        .unwrap_or(i64::MAX)
        .saturating_mul(per_member_amount)
}
