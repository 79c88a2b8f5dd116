//! Distribution Engine — merchant-to-member fan-out.
//!
//! Replicates one merchant-level credit across every active Regular member
//! account of that merchant, concurrently, and reports per-member outcomes:
//!
//! 1. Materialize the full work set (no pagination).
//! 2. Size a fixed worker pool once per run from the
//!    [`WorkerPoolPolicy`](openwallet_types::WorkerPoolPolicy).
//! 3. Feed member snapshots through a bounded hand-off queue; each worker
//!    applies the same increment-encrypt-persist primitive with the
//!    member's own secret key and publishes one result message per member.
//! 4. Wait for every worker to drain the queue (explicit completion
//!    barrier), then report aggregates.
//!
//! Partial failure is the expected mode: a member's update or publish
//! failure is counted and logged, never aborts the batch, and is never
//! rolled back — a distribution run is not atomic across members.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, Mutex};

use openwallet_store::LedgerStore;
use openwallet_types::{
    cipher, receipt, Account, EngineConfig, Result, StoreDeadlines, Topic, Transaction,
    TransactionItem, TransactionKind,
};

use crate::processor::{with_deadline, TRANS_DATE_FORMAT};
use crate::publish::ResultPublisher;

/// Aggregate outcome of one distribution run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DistributionReport {
    /// Members in the work set.
    pub total_jobs: usize,
    /// Members whose balance write committed.
    pub updated: usize,
    /// Member result messages delivered.
    pub published: usize,
}

/// Fans a processed Distribution transaction out across a worker pool.
pub struct DistributionEngine<S, P> {
    store: Arc<S>,
    publisher: Arc<P>,
    config: EngineConfig,
}

impl<S, P> DistributionEngine<S, P>
where
    S: LedgerStore + 'static,
    P: ResultPublisher + 'static,
{
    #[must_use]
    pub fn new(store: Arc<S>, publisher: Arc<P>, config: EngineConfig) -> Self {
        Self {
            store,
            publisher,
            config,
        }
    }

    /// Run the fan-out for one successful Distribution result message.
    ///
    /// Completion order across members is not guaranteed; result messages
    /// may be published out of enumeration order.
    ///
    /// # Errors
    /// Only the work-set scan can fail the run as a whole; per-member
    /// failures are counted in the report.
    pub async fn distribute(&self, source: &Transaction) -> Result<DistributionReport> {
        // 1. The full work set, materialized before fan-out begins.
        let members = with_deadline(
            self.config.deadlines.scan,
            "find_members",
            self.store
                .find_members(&source.partner_id, &source.merchant_id),
        )
        .await?;

        let total_jobs = members.len();
        if total_jobs == 0 {
            tracing::info!(
                merchant_id = %source.merchant_id,
                "no active members, nothing to distribute",
            );
            return Ok(DistributionReport::default());
        }

        // 2. Pool size from the policy, evaluated once per run.
        let worker_count = self.config.pool.workers_for(total_jobs);
        let per_member = source.per_member_amount();
        tracing::info!(
            merchant_id = %source.merchant_id,
            members = total_jobs,
            workers = worker_count,
            per_member,
            "starting balance distribution",
        );

        // 3. Bounded hand-off: the generator blocks when the queue is full,
        //    workers block when it is empty.
        let (job_tx, job_rx) = mpsc::channel::<Account>(self.config.queue_depth.max(1));
        let job_rx = Arc::new(Mutex::new(job_rx));

        let generator = tokio::spawn(async move {
            for member in members {
                if job_tx.send(member).await.is_err() {
                    break;
                }
            }
        });

        let mut workers = Vec::with_capacity(worker_count);
        for worker_idx in 0..worker_count {
            let job_rx = Arc::clone(&job_rx);
            let store = Arc::clone(&self.store);
            let publisher = Arc::clone(&self.publisher);
            let source = source.clone();
            let deadlines = self.config.deadlines.clone();

            workers.push(tokio::spawn(async move {
                let mut updated = 0_usize;
                let mut published = 0_usize;
                loop {
                    let member = { job_rx.lock().await.recv().await };
                    let Some(member) = member else { break };
                    let member_id = member.unique_id.clone();

                    match credit_member(store.as_ref(), &deadlines, &source, member, per_member)
                        .await
                    {
                        Ok(result) => {
                            updated += 1;
                            match publisher
                                .publish(Topic::DistributionResultMember, &result)
                                .await
                            {
                                Ok(()) => published += 1,
                                Err(err) => tracing::warn!(
                                    worker = worker_idx,
                                    receipt_number = %result.receipt_number,
                                    error = %err,
                                    "cannot publish member result",
                                ),
                            }
                        }
                        Err(err) => tracing::warn!(
                            worker = worker_idx,
                            member_id = %member_id,
                            error = %err,
                            "member balance update failed",
                        ),
                    }
                }
                (updated, published)
            }));
        }

        // 4. Completion barrier: all jobs handed off, all workers drained.
        let _ = generator.await;
        let mut report = DistributionReport {
            total_jobs,
            ..DistributionReport::default()
        };
        for worker in workers {
            if let Ok((updated, published)) = worker.await {
                report.updated += updated;
                report.published += published;
            }
        }

        tracing::info!(
            total = report.total_jobs,
            updated = report.updated,
            published = report.published,
            "balance distribution finished",
        );
        Ok(report)
    }
}

/// The same increment-encrypt-persist primitive the processor uses, applied
/// with the member's own secret key, plus the member's result message.
async fn credit_member<S: LedgerStore>(
    store: &S,
    deadlines: &StoreDeadlines,
    source: &Transaction,
    member: Account,
    amount: i64,
) -> Result<Transaction> {
    let new_balance = member.numeric_balance + amount;
    let encrypted = cipher::encrypt_balance(&member.secret_key, new_balance)?;
    let updated = with_deadline(
        deadlines.write,
        "update_balance",
        store.update_balance(&member.selector(), new_balance, &encrypted),
    )
    .await?;

    let now = Utc::now();
    Ok(Transaction {
        reference_no: source.reference_no.clone(),
        partner_ref_number: source.partner_ref_number.clone(),
        partner_trans_date: source.partner_trans_date.clone(),
        partner_id: updated.partner_id.clone(),
        merchant_id: updated.merchant_id.clone(),
        terminal_id: updated.terminal_id.clone(),
        terminal_name: updated.terminal_name.clone(),
        kind: source.kind,
        items: vec![TransactionItem {
            name: format!(
                "Receiving Balance From: {}-{}",
                updated.partner_id, updated.merchant_id
            ),
            amount,
            qty: 1,
        }],
        total_amount: amount,
        status: source.status,
        receipt_number: receipt::receipt_number(TransactionKind::Distribution),
        last_balance: updated.numeric_balance,
        trans_date: now.format(TRANS_DATE_FORMAT).to_string(),
        trans_date_numeric: now.timestamp_millis(),
        created_at: now.timestamp_millis(),
        updated_at: now.timestamp_millis(),
    })
}
