//! Request admission and the sequential consumer loop.
//!
//! Admission happens once, at the edge: a request is validated and its
//! partner reference recorded before it enters a request topic. A reference
//! seen before is rejected there and never reaches the processor — replays
//! of a request already in flight or already processed are silently
//! impossible downstream, because downstream never sees them.
//!
//! The [`Consumer`] drains request topics one message at a time. Requests
//! do not overlap: the only concurrency in the core is the distribution
//! fan-out, which the consumer runs to completion before taking the next
//! message.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;

use openwallet_store::{LedgerStore, ReferenceGuard};
use openwallet_types::{
    EngineConfig, Result, Topic, Transaction, TransactionKind, TransactionStatus, Validate,
    WalletError,
};

use crate::distribution::DistributionEngine;
use crate::processor::TransactionProcessor;
use crate::publish::ResultPublisher;

/// Admit one inbound request: structural validation, then the idempotency
/// check on its partner reference number.
///
/// The reference is recorded on first sight, so a duplicate is rejected
/// whether the original is still in flight or long since processed.
///
/// # Errors
/// [`WalletError::InvalidRequest`] when a structural rule fails,
/// [`WalletError::DuplicateReference`] on a replay. A structurally
/// rejected request does not record its reference; a corrected resubmission
/// under the same reference is still admissible.
pub fn admit(guard: &mut ReferenceGuard, request: &Transaction) -> Result<()> {
    let violations = request.validate();
    if !violations.is_empty() {
        return Err(WalletError::InvalidRequest(violations));
    }
    guard.record(&request.partner_ref_number)
}

/// Sequential consumer over the request topics.
pub struct Consumer<S, P> {
    processor: TransactionProcessor<S>,
    engine: DistributionEngine<S, P>,
    publisher: Arc<P>,
}

impl<S, P> Consumer<S, P>
where
    S: LedgerStore + 'static,
    P: ResultPublisher + 'static,
{
    #[must_use]
    pub fn new(store: Arc<S>, publisher: Arc<P>, config: EngineConfig) -> Self {
        Self {
            processor: TransactionProcessor::new(Arc::clone(&store), config.clone()),
            engine: DistributionEngine::new(store, Arc::clone(&publisher), config),
            publisher,
        }
    }

    /// Drain the inbound channel until every sender is dropped.
    ///
    /// Each message is handled to completion before the next is received,
    /// including any distribution fan-out it triggers.
    pub async fn run(&self, mut inbound: mpsc::Receiver<(Topic, Transaction)>) {
        while let Some((topic, request)) = inbound.recv().await {
            self.handle(topic, request).await;
        }
    }

    /// Process one admitted request and emit its result.
    ///
    /// Never returns an error: every failure mode ends up in the result
    /// message's status or in a log line, and the loop moves on.
    pub async fn handle(&self, topic: Topic, request: Transaction) {
        let Some(result_topic) = topic.result_topic() else {
            tracing::warn!(topic = topic.name(), "message on a non-request topic, skipping");
            return;
        };

        let result = self.processor.process(request).await;
        if let Err(err) = self.publisher.publish(result_topic, &result).await {
            tracing::warn!(
                reference_no = %result.reference_no,
                topic = result_topic.name(),
                error = %err,
                "cannot publish result",
            );
        }

        // A committed Distribution debit triggers the member fan-out. The
        // merchant's funds are already moved at this point; fan-out failures
        // are partial, reported per member, and never undo the debit.
        if result.kind == TransactionKind::Distribution
            && result.status == TransactionStatus::Success
        {
            let started = Instant::now();
            match self.engine.distribute(&result).await {
                Ok(report) => tracing::info!(
                    reference_no = %result.reference_no,
                    members = report.total_jobs,
                    updated = report.updated,
                    published = report.published,
                    elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
                    "distribution fan-out complete",
                ),
                Err(err) => tracing::warn!(
                    reference_no = %result.reference_no,
                    error = %err,
                    "distribution fan-out failed",
                ),
            }
        }
    }
}
