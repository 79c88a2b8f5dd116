//! Result-message publisher boundary.
//!
//! The message broker is an external collaborator; the engine only needs
//! to hand a finished [`Transaction`] to a topic. A publish failure is
//! logged and counted by the caller — it never unwinds a balance mutation
//! that already succeeded (the mutation and the notification are not
//! atomic).

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use openwallet_types::{Result, Topic, Transaction, WalletError};

/// Delivers result messages to the broker. Payloads are JSON-encoded
/// [`Transaction`] records.
#[async_trait]
pub trait ResultPublisher: Send + Sync {
    async fn publish(&self, topic: Topic, transaction: &Transaction) -> Result<()>;
}

/// In-process publisher that captures every message. Used by tests and the
/// standalone runner.
#[derive(Default)]
pub struct MemoryPublisher {
    messages: Mutex<Vec<(Topic, Transaction)>>,
    failing: AtomicBool,
}

impl MemoryPublisher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent publish fail. Failure-path test hook.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All captured messages, in publish order.
    pub async fn messages(&self) -> Vec<(Topic, Transaction)> {
        self.messages.lock().await.clone()
    }

    /// Captured messages for one topic.
    pub async fn on_topic(&self, topic: Topic) -> Vec<Transaction> {
        self.messages
            .lock()
            .await
            .iter()
            .filter(|(t, _)| *t == topic)
            .map(|(_, trx)| trx.clone())
            .collect()
    }
}

#[async_trait]
impl ResultPublisher for MemoryPublisher {
    async fn publish(&self, topic: Topic, transaction: &Transaction) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(WalletError::PublishFailed {
                topic: topic.name(),
                reason: "publisher offline".into(),
            });
        }
        self.messages
            .lock()
            .await
            .push((topic, transaction.clone()));
        Ok(())
    }
}
