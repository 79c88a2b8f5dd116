//! # openwallet-engine
//!
//! The transaction processing and balance-distribution engine.
//!
//! ## Architecture
//!
//! One sequential consumer loop drives the [`TransactionProcessor`]: each
//! inbound request message is handled to completion — validate, mutate the
//! ledger, emit a result — before the next is taken. When a processed
//! transaction is a successful Distribution, the [`DistributionEngine`]
//! fans the credit out across every active member account of the merchant
//! through a bounded queue and a fixed worker pool, the only point of true
//! parallelism in the core.
//!
//! ## Pipeline
//!
//! ```text
//! request ingress ──admit──▶ request topic ──▶ Consumer (sequential)
//!                                                │
//!                                                ▼
//!                                       TransactionProcessor
//!                                                │ result message
//!                                                ▼
//!                                          result topic
//!                                                │ kind = Distribution, status = 00
//!                                                ▼
//!                                        DistributionEngine
//!                                   (bounded queue, worker pool)
//!                                                │ one message per member
//!                                                ▼
//!                                    distribution.result.member
//! ```

pub mod consumer;
pub mod distribution;
pub mod processor;
pub mod publish;

pub use consumer::{admit, Consumer};
pub use distribution::{DistributionEngine, DistributionReport};
pub use processor::TransactionProcessor;
pub use publish::{MemoryPublisher, ResultPublisher};
