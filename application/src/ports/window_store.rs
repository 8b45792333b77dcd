//! Window store port
//!
//! Timestamped entries for sliding request and cost windows.

use super::counter_store::StoreError;
use async_trait::async_trait;
use conclave_domain::{WindowEntry, WindowKey};

#[async_trait]
pub trait WindowStore: Send + Sync {
    /// Record one entry in the window named by `key`.
    async fn append(&self, key: &WindowKey, entry: WindowEntry) -> Result<(), StoreError>;

    /// Entries of `key` still inside the window at `now_ms`, oldest first.
    ///
    /// Implementations prune expired entries as a side effect.
    async fn live_entries(
        &self,
        key: &WindowKey,
        now_ms: i64,
    ) -> Result<Vec<WindowEntry>, StoreError>;
}
