//! Monthly quota per subscription tier.
//!
//! Usage is counted under `quota:{user}:{tier}:{YYYY-MM}`, so a new month
//! starts from zero without any reset job. The counter lives in a shared
//! [`CounterStore`] when one is configured; any store failure falls back to
//! a process-local counter.
//!
//! Admission increments first and releases the unit when the request is
//! denied or every agent fails. Between the two, a concurrent
//! [`TierQuotaManager::status`] may read a count one higher than the one it
//! settles at, so `used` is non-decreasing only across completed requests.
//! The local fallback under-enforces when several processes share a user.

use super::memory_store::InMemoryCounterStore;
use crate::ports::clock::Clock;
use crate::ports::counter_store::CounterStore;
use conclave_domain::{
    AdmissionDenial, DenialReason, QuotaStatus, Tier, TierQuota, UserId, month_reset_epoch,
    quota_key,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Where a reserved unit was counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Backend {
    Shared,
    Local,
}

/// One unit of monthly quota held for an in-flight request.
///
/// Pass it back to [`TierQuotaManager::release`] if the request fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaReservation {
    key: String,
    backend: Backend,
}

impl QuotaReservation {
    pub fn key(&self) -> &str {
        &self.key
    }
}

pub struct TierQuotaManager {
    quotas: HashMap<Tier, TierQuota>,
    shared: Option<Arc<dyn CounterStore>>,
    local: InMemoryCounterStore,
    clock: Arc<dyn Clock>,
}

impl TierQuotaManager {
    /// Manager with the built-in tier allocations and local counters only.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        let quotas = Tier::ALL
            .iter()
            .map(|tier| (*tier, TierQuota::default_for(*tier)))
            .collect();
        Self {
            quotas,
            shared: None,
            local: InMemoryCounterStore::new(Arc::clone(&clock)),
            clock,
        }
    }

    /// Use `store` as the primary counter store.
    pub fn with_shared_store(mut self, store: Arc<dyn CounterStore>) -> Self {
        self.shared = Some(store);
        self
    }

    /// Replace the allocation of one tier.
    pub fn with_quota(mut self, quota: TierQuota) -> Self {
        self.quotas.insert(quota.tier, quota);
        self
    }

    pub fn quota(&self, tier: Tier) -> TierQuota {
        self.quotas
            .get(&tier)
            .cloned()
            .unwrap_or_else(|| TierQuota::default_for(tier))
    }

    /// Current month's position of `user` on `tier`.
    pub async fn check_quota(&self, user: &UserId, tier: Tier) -> QuotaStatus {
        let now = self.clock.now_millis();
        let quota = self.quota(tier);
        let key = quota_key(user, tier, now);
        let used = self.read(&key).await.max(0) as u64;
        QuotaStatus {
            tier,
            allowed: used < quota.monthly_limit,
            used,
            limit: quota.monthly_limit,
            reset_epoch: month_reset_epoch(now),
            compute_profile: quota.compute_profile,
        }
    }

    /// Alias of [`check_quota`](Self::check_quota) for reporting.
    pub async fn status(&self, user: &UserId, tier: Tier) -> QuotaStatus {
        self.check_quota(user, tier).await
    }

    /// Count one generation against `user`'s monthly quota.
    ///
    /// Returns the new usage. Prefer [`reserve`](Self::reserve) when the
    /// generation has not happened yet.
    pub async fn increment(&self, user: &UserId, tier: Tier) -> u64 {
        let now = self.clock.now_millis();
        let key = quota_key(user, tier, now);
        let (used, _) = self.bump(&key, month_reset_epoch(now)).await;
        used.max(0) as u64
    }

    /// Hold one unit of quota for a request about to run.
    ///
    /// The counter is incremented first so concurrent requests cannot both
    /// take the last unit; an over-limit increment is undone and denied.
    pub async fn reserve(
        &self,
        user: &UserId,
        tier: Tier,
    ) -> Result<QuotaReservation, AdmissionDenial> {
        let now = self.clock.now_millis();
        let quota = self.quota(tier);
        let key = quota_key(user, tier, now);
        let reset_epoch = month_reset_epoch(now);

        let (used, backend) = self.bump(&key, reset_epoch).await;
        let reservation = QuotaReservation { key, backend };
        if used > quota.monthly_limit as i64 {
            self.release(&reservation).await;
            let retry_after_seconds = (reset_epoch - now.div_euclid(1000)).max(1) as u64;
            return Err(AdmissionDenial {
                reason: DenialReason::MonthlyQuota,
                message: format!(
                    "Monthly quota exceeded: {} requests on the {} tier",
                    quota.monthly_limit, tier
                ),
                limit: quota.monthly_limit as f64,
                current: (used - 1) as f64,
                retry_after_seconds,
            });
        }
        debug!(key = %reservation.key, used, "Reserved quota");
        Ok(reservation)
    }

    /// Give back a reservation whose request failed.
    ///
    /// The only path that lowers a month's count.
    pub async fn release(&self, reservation: &QuotaReservation) {
        if reservation.backend == Backend::Shared
            && let Some(shared) = &self.shared
        {
            if let Err(e) = shared.decrement(&reservation.key).await {
                warn!(
                    key = %reservation.key,
                    "Counter store release failed, quota unit stays counted: {}", e
                );
            }
            return;
        }
        let _ = self.local.decrement(&reservation.key).await;
    }

    async fn read(&self, key: &str) -> i64 {
        if let Some(shared) = &self.shared {
            match shared.get(key).await {
                Ok(value) => return value.unwrap_or(0),
                Err(e) => warn!(key, "Counter store read failed, using local counter: {}", e),
            }
        }
        self.local.get(key).await.ok().flatten().unwrap_or(0)
    }

    async fn bump(&self, key: &str, reset_epoch: i64) -> (i64, Backend) {
        if let Some(shared) = &self.shared {
            match shared.increment(key).await {
                Ok(value) => {
                    if let Err(e) = shared.expire_at(key, reset_epoch).await {
                        warn!(key, "Failed to set counter expiry: {}", e);
                    }
                    return (value, Backend::Shared);
                }
                Err(e) => warn!(key, "Counter store increment failed, using local counter: {}", e),
            }
        }
        let value = self.local.increment(key).await.unwrap_or(1);
        let _ = self.local.expire_at(key, reset_epoch).await;
        (value, Backend::Local)
    }
}
