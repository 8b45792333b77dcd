//! Governance services
//!
//! - [`RateGovernor`] - sliding request and cost windows
//! - [`TierQuotaManager`] - monthly quota per subscription tier
//! - [`memory_store`] - process-local stores, also used as fallback

pub mod memory_store;
pub mod rate_governor;
pub mod tier_quota;

pub use memory_store::{InMemoryCounterStore, InMemoryWindowStore};
pub use rate_governor::RateGovernor;
pub use tier_quota::{QuotaReservation, TierQuotaManager};
