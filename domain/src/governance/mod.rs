//! Governance domain
//!
//! Throughput, spend and monthly quota policy. Everything here is pure:
//! the stores that hold window entries and quota counters are ports in the
//! application layer.
//!
//! - [`limits`] - configurable rate and cost limits
//! - [`window`] - sliding request/cost windows with lazy pruning
//! - [`admission`] - admission decisions and structured denials
//! - [`tier`] - subscription tiers, quota keys and month rollover

pub mod admission;
pub mod limits;
pub mod tier;
pub mod value_objects;
pub mod window;

pub use admission::{AdmissionDecision, AdmissionDenial, DenialReason, UsageSnapshot};
pub use limits::RateLimits;
pub use tier::{QuotaStatus, Tier, TierQuota, month_key, month_reset_epoch, quota_key};
pub use value_objects::{UserId, WindowKey, WindowScope, WindowSpan};
pub use window::{SlidingWindow, WindowEntry};
