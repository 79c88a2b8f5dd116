//! # openwallet-types
//!
//! Shared types, errors, and configuration for the **OpenWallet** balance
//! ledger.
//!
//! This crate is the leaf dependency of the workspace — every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`PartnerId`], [`MerchantId`], [`TerminalId`], [`AccountSelector`]
//! - **Account model**: [`Account`], [`AccountType`], [`AccountView`]
//! - **Transaction model**: [`Transaction`], [`TransactionKind`], [`TransactionStatus`], [`TransactionItem`]
//! - **Balance cipher**: [`encrypt_balance`], [`decrypt_balance`], [`CipherError`]
//! - **Generators**: [`receipt_number`], [`reference_number`]
//! - **Topics**: [`Topic`] with request → result routing
//! - **Configuration**: [`EngineConfig`], [`WorkerPoolPolicy`], [`StoreDeadlines`]
//! - **Errors**: [`WalletError`] with `WL_ERR_` prefix codes

pub mod account;
pub mod cipher;
pub mod config;
pub mod error;
pub mod ids;
pub mod receipt;
pub mod topic;
pub mod transaction;

// Re-export all primary types at crate root for ergonomic imports:
//   use openwallet_types::{Account, Transaction, WalletError, ...};

pub use account::*;
pub use cipher::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use receipt::*;
pub use topic::*;
pub use transaction::*;
