//! # openwallet-store
//!
//! The Ledger Store boundary: filtered account reads, the single
//! conditional balance-write primitive, and the admission-time
//! idempotency guard.
//!
//! The document store itself is an external collaborator; this crate
//! defines the [`LedgerStore`] contract every backend must satisfy and
//! ships [`MemoryLedger`], an in-process implementation with the same
//! filter semantics, used by tests and the standalone runner.

pub mod idempotency;
pub mod ledger;
pub mod memory;

pub use idempotency::ReferenceGuard;
pub use ledger::LedgerStore;
pub use memory::MemoryLedger;
