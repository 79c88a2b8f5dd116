//! Configuration for the transaction engine.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default small worker pool for distribution fan-out.
pub const DEFAULT_SMALL_POOL: usize = 5;
/// Default large worker pool for distribution fan-out.
pub const DEFAULT_LARGE_POOL: usize = 10;
/// Default divisor applied to the member count before thresholding.
pub const DEFAULT_POOL_DIVISOR: usize = 4;
/// Default threshold separating small and large pools.
pub const DEFAULT_POOL_THRESHOLD: usize = 10;
/// Default depth of the bounded fan-out hand-off queue.
pub const DEFAULT_QUEUE_DEPTH: usize = 32;

/// Worker-pool sizing policy for distribution runs.
///
/// Coarse load heuristic, evaluated once per run: with `n` members, use the
/// small pool when `n / divisor < small_pool_threshold`, the large pool
/// otherwise. Every number is overridable; the defaults follow the
/// production heuristic (`members / 4 < 10` → 5 workers, else 10).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerPoolPolicy {
    pub divisor: usize,
    pub small_pool_threshold: usize,
    pub small_pool: usize,
    pub large_pool: usize,
}

impl WorkerPoolPolicy {
    /// Number of workers for a distribution run over `member_count` members.
    ///
    /// Never returns more workers than members (a pool larger than the work
    /// set would idle), and never fewer than 1.
    #[must_use]
    pub fn workers_for(&self, member_count: usize) -> usize {
        let pool = if member_count / self.divisor.max(1) < self.small_pool_threshold {
            self.small_pool
        } else {
            self.large_pool
        };
        pool.clamp(1, member_count.max(1))
    }
}

impl Default for WorkerPoolPolicy {
    fn default() -> Self {
        Self {
            divisor: DEFAULT_POOL_DIVISOR,
            small_pool_threshold: DEFAULT_POOL_THRESHOLD,
            small_pool: DEFAULT_SMALL_POOL,
            large_pool: DEFAULT_LARGE_POOL,
        }
    }
}

/// Per-operation deadlines for ledger store calls.
///
/// A timed-out call surfaces as a store error and is handled as a
/// processing failure for that unit of work — never retried automatically.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreDeadlines {
    /// Point reads.
    pub read: Duration,
    /// Conditional balance writes.
    pub write: Duration,
    /// Member-set scans.
    pub scan: Duration,
}

impl Default for StoreDeadlines {
    fn default() -> Self {
        Self {
            read: Duration::from_millis(500),
            write: Duration::from_secs(1),
            scan: Duration::from_secs(3),
        }
    }
}

/// Engine-wide configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    pub pool: WorkerPoolPolicy,
    pub deadlines: StoreDeadlines,
    /// Capacity of the bounded generator → worker hand-off channel.
    #[serde(default = "default_queue_depth")]
    pub queue_depth: usize,
}

fn default_queue_depth() -> usize {
    DEFAULT_QUEUE_DEPTH
}

impl EngineConfig {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pool: WorkerPoolPolicy::default(),
            deadlines: StoreDeadlines::default(),
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}
