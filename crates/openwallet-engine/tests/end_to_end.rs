//! End-to-end integration tests across the full wallet pipeline.
//!
//! These tests exercise the complete message lifecycle:
//! admission (validation + idempotency) -> request topic -> Consumer ->
//! `TransactionProcessor` -> result topic -> distribution fan-out.
//!
//! They verify that admission, processing, and fan-out work together in
//! realistic scenarios: top-ups, payments, overdrafts, member
//! distributions, duplicate replays, and broker outages.

use std::sync::Arc;

use tokio::sync::mpsc;

use openwallet_engine::{admit, Consumer, MemoryPublisher};
use openwallet_store::{LedgerStore, MemoryLedger, ReferenceGuard};
use openwallet_types::*;

/// Helper: full wallet pipeline — admit, consume, process, fan out.
struct WalletPipeline {
    store: Arc<MemoryLedger>,
    publisher: Arc<MemoryPublisher>,
    consumer: Consumer<MemoryLedger, MemoryPublisher>,
    guard: ReferenceGuard,
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

impl WalletPipeline {
    fn new() -> Self {
        init_tracing();
        let store = Arc::new(MemoryLedger::new());
        let publisher = Arc::new(MemoryPublisher::new());
        let consumer = Consumer::new(
            Arc::clone(&store),
            Arc::clone(&publisher),
            EngineConfig::new(),
        );
        Self {
            store,
            publisher,
            consumer,
            guard: ReferenceGuard::new(),
        }
    }

    async fn open_merchant(&self, partner: &str, merchant: &str, balance: i64) -> AccountSelector {
        let mut account =
            Account::open(AccountType::Merchant, partner, merchant, None, "HQ").unwrap();
        account.numeric_balance = balance;
        account.encrypted_balance =
            cipher::encrypt_balance(&account.secret_key, balance).unwrap();
        let selector = account.selector();
        self.store.seed([account]).await;
        selector
    }

    async fn open_member(
        &self,
        partner: &str,
        merchant: &str,
        terminal: &str,
        balance: i64,
    ) -> AccountSelector {
        let mut account = Account::open(
            AccountType::Regular,
            partner,
            merchant,
            Some(terminal.to_string()),
            terminal,
        )
        .unwrap();
        account.numeric_balance = balance;
        account.encrypted_balance =
            cipher::encrypt_balance(&account.secret_key, balance).unwrap();
        let selector = account.selector();
        self.store.seed([account]).await;
        selector
    }

    /// Admit and consume one request, the way the broker path would.
    async fn submit(&mut self, topic: Topic, request: Transaction) -> Result<()> {
        admit(&mut self.guard, &request)?;
        self.consumer.handle(topic, request).await;
        Ok(())
    }

    async fn balance_of(&self, selector: &AccountSelector) -> i64 {
        self.store
            .find_account(selector)
            .await
            .unwrap()
            .unwrap()
            .numeric_balance
    }
}

fn request(
    kind: TransactionKind,
    reference: &str,
    amount: i64,
    terminal: Option<&str>,
) -> Transaction {
    Transaction {
        reference_no: receipt::reference_number(),
        partner_ref_number: reference.to_string(),
        partner_trans_date: "20260823120000".into(),
        partner_id: PartnerId::new("P1"),
        merchant_id: MerchantId::new("M1"),
        terminal_id: terminal.map(TerminalId::new),
        terminal_name: terminal.unwrap_or_default().into(),
        kind,
        items: vec![TransactionItem {
            name: "item".into(),
            amount,
            qty: 1,
        }],
        total_amount: match kind {
            TransactionKind::Distribution => 0,
            _ => amount,
        },
        status: TransactionStatus::Pending,
        receipt_number: String::new(),
        last_balance: 0,
        trans_date: String::new(),
        trans_date_numeric: 0,
        created_at: 0,
        updated_at: 0,
    }
}

// =============================================================================
// Test: Top-up full cycle — admit, process, result message
// =============================================================================
#[tokio::test]
async fn e2e_topup_full_cycle() {
    let mut pipeline = WalletPipeline::new();
    let member = pipeline.open_member("P1", "M1", "T1", 1_000).await;

    pipeline
        .submit(
            Topic::TopUpRequest,
            request(TransactionKind::TopUp, "EXT-1", 500, Some("T1")),
        )
        .await
        .unwrap();

    assert_eq!(pipeline.balance_of(&member).await, 1_500);

    let results = pipeline.publisher.on_topic(Topic::TopUpResult).await;
    assert_eq!(results.len(), 1, "Exactly one result per request");
    assert_eq!(results[0].status, TransactionStatus::Success);
    assert_eq!(results[0].last_balance, 1_500);
    assert!(results[0].receipt_number.starts_with("1000"));
    assert_eq!(results[0].trans_date.len(), 14);

    // Wire format: external field names and the two-digit status code.
    let wire = serde_json::to_string(&results[0]).unwrap();
    assert!(wire.contains("\"lastBalance\":1500"));
    assert!(wire.contains("\"status\":\"00\""));
    assert!(wire.contains("\"transType\":1"));

    // The stored ciphertext decrypts back to the numeric mirror.
    let stored = pipeline.store.find_account(&member).await.unwrap().unwrap();
    assert!(stored.verify_mirror().unwrap());
}

// =============================================================================
// Test: Payment debits, overdraft rejected without mutation
// =============================================================================
#[tokio::test]
async fn e2e_payment_and_overdraft() {
    let mut pipeline = WalletPipeline::new();
    let member = pipeline.open_member("P1", "M1", "T1", 1_000).await;

    pipeline
        .submit(
            Topic::DeductRequest,
            request(TransactionKind::Payment, "EXT-1", 400, Some("T1")),
        )
        .await
        .unwrap();
    assert_eq!(pipeline.balance_of(&member).await, 600);

    // 700 > 600: rejected, balance untouched, result still emitted.
    pipeline
        .submit(
            Topic::DeductRequest,
            request(TransactionKind::Payment, "EXT-2", 700, Some("T1")),
        )
        .await
        .unwrap();
    assert_eq!(pipeline.balance_of(&member).await, 600);

    let results = pipeline.publisher.on_topic(Topic::DeductResult).await;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].status, TransactionStatus::Success);
    assert!(results[0].receipt_number.starts_with("2000"));
    assert_eq!(results[1].status, TransactionStatus::InsufficientFunds);
}

// =============================================================================
// Test: Distribution fans out to every member
// =============================================================================
#[tokio::test]
async fn e2e_distribution_fans_out() {
    let mut pipeline = WalletPipeline::new();
    let merchant = pipeline.open_merchant("P1", "M1", 1_000).await;
    let members = [
        pipeline.open_member("P1", "M1", "T1", 100).await,
        pipeline.open_member("P1", "M1", "T2", 200).await,
        pipeline.open_member("P1", "M1", "T3", 300).await,
    ];

    pipeline
        .submit(
            Topic::DistributionRequest,
            request(TransactionKind::Distribution, "EXT-1", 50, None),
        )
        .await
        .unwrap();

    // Merchant debited 3 x 50, each member credited 50.
    assert_eq!(pipeline.balance_of(&merchant).await, 850);
    for (member, expected) in members.iter().zip([150, 250, 350]) {
        assert_eq!(pipeline.balance_of(member).await, expected);
    }

    let results = pipeline.publisher.on_topic(Topic::DistributionResult).await;
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, TransactionStatus::Success);
    assert_eq!(results[0].total_amount, 150);
    assert!(results[0].receipt_number.starts_with("3000"));

    let member_results = pipeline
        .publisher
        .on_topic(Topic::DistributionResultMember)
        .await;
    assert_eq!(member_results.len(), 3, "One message per member");
    for message in &member_results {
        assert_eq!(message.total_amount, 50);
        assert_eq!(message.reference_no, results[0].reference_no);
        assert!(message.items[0].name.starts_with("Receiving Balance From"));
    }
}

// =============================================================================
// Test: Distribution overdraft leaves merchant and members untouched
// =============================================================================
#[tokio::test]
async fn e2e_distribution_overdraft_is_atomic() {
    let mut pipeline = WalletPipeline::new();
    let merchant = pipeline.open_merchant("P1", "M1", 100).await;
    let member = pipeline.open_member("P1", "M1", "T1", 10).await;
    pipeline.open_member("P1", "M1", "T2", 20).await;
    pipeline.open_member("P1", "M1", "T3", 30).await;

    // 3 x 50 = 150 > 100: the debit is rejected before any fan-out.
    pipeline
        .submit(
            Topic::DistributionRequest,
            request(TransactionKind::Distribution, "EXT-1", 50, None),
        )
        .await
        .unwrap();

    assert_eq!(pipeline.balance_of(&merchant).await, 100);
    assert_eq!(pipeline.balance_of(&member).await, 10);

    let results = pipeline.publisher.on_topic(Topic::DistributionResult).await;
    assert_eq!(results[0].status, TransactionStatus::InsufficientFunds);
    assert!(pipeline
        .publisher
        .on_topic(Topic::DistributionResultMember)
        .await
        .is_empty());
}

// =============================================================================
// Test: Duplicate partner reference rejected at admission
// =============================================================================
#[tokio::test]
async fn e2e_duplicate_reference_blocked() {
    let mut pipeline = WalletPipeline::new();
    let member = pipeline.open_member("P1", "M1", "T1", 1_000).await;

    pipeline
        .submit(
            Topic::TopUpRequest,
            request(TransactionKind::TopUp, "EXT-1", 500, Some("T1")),
        )
        .await
        .unwrap();

    // Same partner reference — never reaches the processor.
    let err = pipeline
        .submit(
            Topic::TopUpRequest,
            request(TransactionKind::TopUp, "EXT-1", 500, Some("T1")),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::DuplicateReference(_)));

    assert_eq!(pipeline.balance_of(&member).await, 1_500);
    assert_eq!(pipeline.publisher.on_topic(Topic::TopUpResult).await.len(), 1);

    // The reference stays blocked however much traffic was admitted since.
    for n in 0..50 {
        pipeline
            .submit(
                Topic::TopUpRequest,
                request(
                    TransactionKind::TopUp,
                    &format!("EXT-{n}-later"),
                    1,
                    Some("T1"),
                ),
            )
            .await
            .unwrap();
    }
    let err = pipeline
        .submit(
            Topic::TopUpRequest,
            request(TransactionKind::TopUp, "EXT-1", 500, Some("T1")),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::DuplicateReference(_)));
    assert_eq!(pipeline.balance_of(&member).await, 1_550);
}

// =============================================================================
// Test: Malformed requests rejected at admission
// =============================================================================
#[tokio::test]
async fn e2e_malformed_request_blocked() {
    let mut pipeline = WalletPipeline::new();
    pipeline.open_member("P1", "M1", "T1", 1_000).await;

    // A distribution carries a per-member amount, never a supplied total.
    let mut bad = request(TransactionKind::Distribution, "EXT-1", 50, None);
    bad.total_amount = 150;
    let err = pipeline
        .submit(Topic::DistributionRequest, bad)
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::InvalidRequest(_)));

    // Zero-amount item.
    let err = pipeline
        .submit(
            Topic::TopUpRequest,
            request(TransactionKind::TopUp, "EXT-2", 0, Some("T1")),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, WalletError::InvalidRequest(_)));

    assert!(pipeline.publisher.messages().await.is_empty());
}

// =============================================================================
// Test: Unknown and inactive accounts produce status 04
// =============================================================================
#[tokio::test]
async fn e2e_invalid_account_status() {
    let mut pipeline = WalletPipeline::new();
    let member = pipeline.open_member("P1", "M1", "T1", 1_000).await;
    pipeline.store.deactivate_account(&member).await.unwrap();

    pipeline
        .submit(
            Topic::TopUpRequest,
            request(TransactionKind::TopUp, "EXT-1", 500, Some("T1")),
        )
        .await
        .unwrap();
    pipeline
        .submit(
            Topic::TopUpRequest,
            request(TransactionKind::TopUp, "EXT-2", 500, Some("T9")),
        )
        .await
        .unwrap();

    let results = pipeline.publisher.on_topic(Topic::TopUpResult).await;
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].status, TransactionStatus::InvalidAccount);
    assert_eq!(results[1].status, TransactionStatus::InvalidAccount);
}

// =============================================================================
// Test: Broker outage never rolls back a committed mutation
// =============================================================================
#[tokio::test]
async fn e2e_publish_failure_keeps_mutation() {
    let mut pipeline = WalletPipeline::new();
    let member = pipeline.open_member("P1", "M1", "T1", 1_000).await;

    pipeline.publisher.set_failing(true);
    pipeline
        .submit(
            Topic::TopUpRequest,
            request(TransactionKind::TopUp, "EXT-1", 500, Some("T1")),
        )
        .await
        .unwrap();

    // No result delivered, but the credit committed.
    assert!(pipeline.publisher.messages().await.is_empty());
    assert_eq!(pipeline.balance_of(&member).await, 1_500);

    // The pipeline keeps working once the broker returns.
    pipeline.publisher.set_failing(false);
    pipeline
        .submit(
            Topic::TopUpRequest,
            request(TransactionKind::TopUp, "EXT-2", 100, Some("T1")),
        )
        .await
        .unwrap();
    assert_eq!(pipeline.balance_of(&member).await, 1_600);
    assert_eq!(pipeline.publisher.on_topic(Topic::TopUpResult).await.len(), 1);
}

// =============================================================================
// Test: Sequential consumer over a live channel, mixed kinds
// =============================================================================
#[tokio::test]
async fn e2e_mixed_sequence_over_channel() {
    let pipeline = WalletPipeline::new();
    let merchant = pipeline.open_merchant("P1", "M1", 500).await;
    let member = pipeline.open_member("P1", "M1", "T1", 100).await;

    let (tx, rx) = mpsc::channel(16);
    let mut guard = ReferenceGuard::new();
    for (topic, req) in [
        (
            Topic::TopUpRequest,
            request(TransactionKind::TopUp, "EXT-1", 400, Some("T1")),
        ),
        (
            Topic::DeductRequest,
            request(TransactionKind::Payment, "EXT-2", 200, Some("T1")),
        ),
        (
            Topic::DistributionRequest,
            request(TransactionKind::Distribution, "EXT-3", 25, None),
        ),
    ] {
        admit(&mut guard, &req).unwrap();
        tx.send((topic, req)).await.unwrap();
    }
    drop(tx);
    pipeline.consumer.run(rx).await;

    // 100 + 400 - 200 + 25 (distribution credit) = 325
    assert_eq!(pipeline.balance_of(&member).await, 325);
    // Merchant funded one member's share: 500 - 25.
    assert_eq!(pipeline.balance_of(&merchant).await, 475);

    assert_eq!(pipeline.publisher.on_topic(Topic::TopUpResult).await.len(), 1);
    assert_eq!(pipeline.publisher.on_topic(Topic::DeductResult).await.len(), 1);
    assert_eq!(
        pipeline
            .publisher
            .on_topic(Topic::DistributionResult)
            .await
            .len(),
        1
    );
    assert_eq!(
        pipeline
            .publisher
            .on_topic(Topic::DistributionResultMember)
            .await
            .len(),
        1
    );
}

// =============================================================================
// Test: Large distribution drains completely under the large pool
// =============================================================================
#[tokio::test]
async fn e2e_large_distribution() {
    let mut pipeline = WalletPipeline::new();
    let merchant = pipeline.open_merchant("P1", "M1", 10_000).await;
    for idx in 0..60 {
        pipeline
            .open_member("P1", "M1", &format!("T{idx}"), 0)
            .await;
    }

    // 60 / 4 = 15 >= 10: this run uses the large pool.
    pipeline
        .submit(
            Topic::DistributionRequest,
            request(TransactionKind::Distribution, "EXT-1", 10, None),
        )
        .await
        .unwrap();

    assert_eq!(pipeline.balance_of(&merchant).await, 10_000 - 600);
    let member_results = pipeline
        .publisher
        .on_topic(Topic::DistributionResultMember)
        .await;
    assert_eq!(member_results.len(), 60);
    for message in &member_results {
        assert_eq!(message.last_balance, 10);
    }
}

// =============================================================================
// Test: Merchant addressed without a terminal, member requires one
// =============================================================================
#[tokio::test]
async fn e2e_terminal_addressing() {
    let mut pipeline = WalletPipeline::new();
    pipeline.open_merchant("P1", "M1", 1_000).await;
    pipeline.open_member("P1", "M1", "T1", 0).await;

    // A terminal-less top-up resolves the merchant account, not the member.
    pipeline
        .submit(
            Topic::TopUpRequest,
            request(TransactionKind::TopUp, "EXT-1", 500, None),
        )
        .await
        .unwrap();

    let results = pipeline.publisher.on_topic(Topic::TopUpResult).await;
    assert_eq!(results[0].status, TransactionStatus::Success);
    assert_eq!(results[0].last_balance, 1_500);
}
