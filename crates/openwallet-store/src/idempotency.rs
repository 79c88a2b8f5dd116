//! Admission-time duplicate detection for external reference numbers.
//!
//! Every admitted `partnerRefNumber` is recorded; admission performs a
//! point lookup against that record and rejects a reference it has seen
//! before, no matter how many requests arrived in between. The record is
//! never pruned — a duplicate must be caught whether the original is still
//! in flight or long since processed.
//!
//! The check runs once, at admission, before the request is queued. The
//! transaction processor trusts that any message it receives has already
//! passed the guard and does not re-check on consumption.

use std::collections::HashSet;

use openwallet_types::{Result, WalletError};

/// The set of external reference numbers already admitted.
#[derive(Debug, Default)]
pub struct ReferenceGuard {
    recorded: HashSet<String>,
}

impl ReferenceGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reference at admission.
    ///
    /// # Errors
    /// [`WalletError::DuplicateReference`] when the reference was admitted
    /// before. The rejected request must not proceed to balance mutation.
    pub fn record(&mut self, reference: &str) -> Result<()> {
        if !self.recorded.insert(reference.to_string()) {
            return Err(WalletError::DuplicateReference(reference.to_string()));
        }
        Ok(())
    }

    /// Point lookup without recording.
    #[must_use]
    pub fn is_duplicate(&self, reference: &str) -> bool {
        self.recorded.contains(reference)
    }

    /// Number of recorded references.
    #[must_use]
    pub fn len(&self) -> usize {
        self.recorded.len()
    }

    /// Whether any reference has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recorded.is_empty()
    }
}
