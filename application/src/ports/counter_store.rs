//! Counter store port
//!
//! Keyed integer counters shared by every process serving requests. Used
//! for monthly quota counting.

use async_trait::async_trait;
use thiserror::Error;

/// Failure of a shared state store.
///
/// Callers treat any store error as "store unavailable" and fall back to
/// process-local state.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt store data: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Atomically add one and return the new value.
    async fn increment(&self, key: &str) -> Result<i64, StoreError>;

    /// Atomically subtract one and return the new value.
    async fn decrement(&self, key: &str) -> Result<i64, StoreError>;

    /// Current value, `None` if the key is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<i64>, StoreError>;

    /// Drop the key once Unix time reaches `epoch_secs`.
    async fn expire_at(&self, key: &str, epoch_secs: i64) -> Result<(), StoreError>;
}
